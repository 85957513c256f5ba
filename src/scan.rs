//! Input collection.
//!
//! Turns command-line path arguments into the ordered list of images a batch
//! will process:
//!
//! - **Files** are kept in argument order if their extension is decodable.
//!   Anything else is skipped, like a drop zone that only accepts images.
//! - **Directories** are walked recursively; matching files are appended in
//!   path order so repeated runs see the same sequence.
//!
//! A path that does not exist is an error. So is a scan that finds nothing.

use crate::imaging::is_supported_image;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("No supported images found in the given inputs")]
    NoImages,
}

/// Collect image files from the given paths, de-duplicated, in a stable order.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(ScanError::NotFound(path.clone()));
        }
        let found = if path.is_dir() {
            walk_dir(path)?
        } else if is_supported_image(path) {
            vec![path.clone()]
        } else {
            Vec::new()
        };

        for image in found {
            if seen.insert(image.clone()) {
                images.push(image);
            }
        }
    }

    if images.is_empty() {
        return Err(ScanError::NoImages);
    }
    Ok(images)
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut images = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}
