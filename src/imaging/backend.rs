//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the batch orchestrator and
//! the pixel-level collaborators: identify, decode, resample and JPEG
//! encode. The orchestrator never touches a codec directly, so tests can
//! substitute a recording mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate and statically linked into the binary.

use super::params::{Quality, ResampleParams};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load image: {0}")]
    Decode(String),
    #[error("JPEG encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a source or target raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Length of the longer edge.
    pub fn longest_side(self) -> u32 {
        self.width.max(self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Every operation returns owned data; the orchestrator decides what to keep
/// alive so that at most one full-resolution bitmap exists at a time.
pub trait ImageBackend {
    /// Read image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode raw file bytes into a bitmap.
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Resample to exact dimensions, optionally sharpening the result.
    fn resample(
        &self,
        image: &DynamicImage,
        params: &ResampleParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Encode as baseline sRGB JPEG at the given quality.
    fn encode_jpeg(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}
