//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | decoder header, EXIF orientation applied |
//! | **Plan** | [`plan_dimensions`] (pure arithmetic) |
//! | **Resample** | Lanczos3 + unsharp mask |
//! | **Encode** | [`encode_within_budget`] over `JpegEncoder` |
//! | **Inspect** | brightness histogram over a 200×200 sample |
//!
//! The module is split into:
//! - **Calculations**: Dimension planning (unit testable, no pixels)
//! - **Encoder**: Size-budgeted quality search, generic over the encode call
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Inspect**: Advisory watermark/text heuristic

pub mod backend;
mod calculations;
mod encoder;
pub mod inspect;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    MAX_TARGET_LONGEST_SIDE, MIN_LONGEST_SIDE, Plan, plan_dimensions, scale_to_longest_side,
};
pub use encoder::{EncodedArtifact, MAX_ENCODE_ATTEMPTS, encode_within_budget};
pub use params::{Quality, ResampleParams, Sharpening};
pub use rust_backend::{
    MAX_RESAMPLE_PIXELS, RustBackend, is_supported_image, supported_input_extensions,
};
