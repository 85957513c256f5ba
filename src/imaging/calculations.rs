//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use serde::Serialize;

/// Hard floor for the longest side of an accepted source image, in pixels.
pub const MIN_LONGEST_SIDE: u32 = 1800;

/// Largest configurable target for the longest side.
pub const MAX_TARGET_LONGEST_SIDE: u32 = 10_000;

/// Outcome of planning the output size for one source image.
///
/// Rejection is a variant rather than an error because callers show the
/// reason next to the image instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Plan {
    /// Source already fits the target; no resample needed.
    Keep(Dimensions),
    /// Scale down so the dominant axis equals the target.
    Resize(Dimensions),
    /// Scale up to at least [`MIN_LONGEST_SIDE`].
    Upscale(Dimensions),
    /// Source is below [`MIN_LONGEST_SIDE`] and upscaling is disallowed.
    Rejected { longest_side: u32, minimum: u32 },
}

impl Plan {
    /// Output dimensions, or `None` when rejected.
    pub fn dimensions(&self) -> Option<Dimensions> {
        match *self {
            Plan::Keep(d) | Plan::Resize(d) | Plan::Upscale(d) => Some(d),
            Plan::Rejected { .. } => None,
        }
    }

    pub fn needs_upscaling(&self) -> bool {
        matches!(self, Plan::Upscale(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Plan::Rejected { .. })
    }

    /// Human-readable rejection reason.
    pub fn reason(&self) -> Option<String> {
        match *self {
            Plan::Rejected {
                longest_side,
                minimum,
            } => Some(format!(
                "Image resolution too small. Longest side is {longest_side}px, \
                 but minimum required is {minimum}px."
            )),
            _ => None,
        }
    }
}

/// Plan the output dimensions for a source image.
///
/// Policy, first match wins:
/// 1. Longest side below [`MIN_LONGEST_SIDE`], upscaling off → [`Plan::Rejected`]
/// 2. Longest side below [`MIN_LONGEST_SIDE`], upscaling on → scale to
///    `max(MIN_LONGEST_SIDE, target_longest_side)`
/// 3. Longest side above the target → scale down to the target
/// 4. Otherwise keep the source dimensions
///
/// # Examples
/// ```
/// # use image_prep::imaging::{plan_dimensions, Dimensions, Plan};
/// let plan = plan_dimensions(Dimensions::new(3000, 2000), 2000, false);
/// assert_eq!(plan, Plan::Resize(Dimensions::new(2000, 1333)));
/// ```
pub fn plan_dimensions(source: Dimensions, target_longest_side: u32, allow_upscaling: bool) -> Plan {
    let longest = source.longest_side();

    if longest < MIN_LONGEST_SIDE {
        if !allow_upscaling {
            return Plan::Rejected {
                longest_side: longest,
                minimum: MIN_LONGEST_SIDE,
            };
        }
        let target = MIN_LONGEST_SIDE.max(target_longest_side);
        return Plan::Upscale(scale_to_longest_side(source, target));
    }

    if longest > target_longest_side {
        return Plan::Resize(scale_to_longest_side(source, target_longest_side));
    }

    Plan::Keep(source)
}

/// Scale proportionally so the dominant axis equals `target`.
///
/// Width dominates only when strictly wider; squares take the height branch.
/// The derived axis is truncated so it never overshoots, and never drops
/// below one pixel.
pub fn scale_to_longest_side(source: Dimensions, target: u32) -> Dimensions {
    let aspect = source.width as f64 / source.height as f64;

    if source.width > source.height {
        let height = (target as f64 / aspect).floor() as u32;
        Dimensions::new(target, height.max(1))
    } else {
        let width = (target as f64 * aspect).floor() as u32;
        Dimensions::new(width.max(1), target)
    }
}
