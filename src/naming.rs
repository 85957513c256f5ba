//! Output filename derivation.
//!
//! Every processed image is written as `{stem}{suffix}.jpg`, where `stem` is
//! the source filename without its last extension:
//!
//! - `IMG_0042.HEIC.png` → `IMG_0042.HEIC_processed.jpg`
//! - `dawn.jpeg` → `dawn_processed.jpg`
//! - `.hidden.png` → `.hidden_processed.jpg`
//!
//! Inputs from different directories can share a stem. [`OutputNames`] hands
//! out unique names within one batch by appending `-2`, `-3`, … to the stem.
//! Names can also be reserved up front so an output never lands on an
//! input that sits in the output directory.

use std::collections::HashSet;
use std::path::Path;

/// Suffix appended to the stem when none is configured.
pub const DEFAULT_SUFFIX: &str = "_processed";

/// Derive the output filename for `source`.
pub fn output_file_name(source: &Path, suffix: &str) -> String {
    format!("{}{}.jpg", file_stem(source), suffix)
}

fn file_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// Allocates collision-free output names for one batch.
#[derive(Debug, Default)]
pub struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as unavailable, e.g. because an input file already has it.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_lowercase());
    }

    /// Name for `source`, disambiguated against every name handed out so far.
    ///
    /// Comparison is case-insensitive so the result is safe on
    /// case-insensitive filesystems.
    pub fn allocate(&mut self, source: &Path, suffix: &str) -> String {
        let stem = file_stem(source);
        let mut candidate = output_file_name(source, suffix);
        let mut n = 2;
        while !self.taken.insert(candidate.to_lowercase()) {
            candidate = format!("{stem}-{n}{suffix}.jpg");
            n += 1;
        }
        candidate
    }
}
