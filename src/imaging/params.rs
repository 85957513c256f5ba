//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the batch orchestrator (which decides what each image
//! needs) and the [`backend`](super::backend) (which does the pixel work).
//! Keeping them free of pixel code lets the orchestrator run against a mock
//! backend in tests.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality as a fraction in `[0.1, 1.0]`. Clamped on construction.
//! - [`Sharpening`]: Unsharp-mask parameters applied after resampling.
//! - [`ResampleParams`]: Target dimensions plus optional sharpening for one resample.

use serde::{Deserialize, Serialize};

/// Lossy JPEG quality as a fraction (0.1 = smallest, 1.0 = best).
///
/// The floor of 0.1 is also the lower bound of the size-budget search in
/// [`encode_within_budget`](super::encoder::encode_within_budget).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(f32);

impl Quality {
    /// Lowest quality the encoder will ever use.
    pub const FLOOR: Quality = Quality(0.1);
    /// Highest quality the encoder will ever use.
    pub const CEILING: Quality = Quality(1.0);

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::FLOOR;
        }
        Self(value.clamp(Self::FLOOR.0, Self::CEILING.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale used by JPEG encoders.
    pub fn to_percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.9)
    }
}

/// Unsharp-mask parameters applied to the resampled bitmap.
///
/// - `amount`: Strength in percent (80 = add 80% of the high-pass detail back)
/// - `radius`: Gaussian blur sigma used to build the mask
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sharpening {
    pub amount: f32,
    pub radius: f32,
    pub threshold: i32,
}

impl Default for Sharpening {
    fn default() -> Self {
        Self {
            amount: 80.0,
            radius: 0.6,
            threshold: 2,
        }
    }
}

/// Parameters for a single resample.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleParams {
    pub width: u32,
    pub height: u32,
    pub sharpening: Option<Sharpening>,
}
