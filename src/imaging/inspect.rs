//! Advisory content heuristics run on the source bitmap.
//!
//! The watermark/text check is a brightness histogram over a small sample,
//! not a classifier. Images with large flat black or white areas trip it
//! too, so its output is only ever a warning.

use image::DynamicImage;

/// Longest edge of the downscaled sample, per axis.
pub const SAMPLE_MAX_SIDE: u32 = 200;
/// Pixels darker than this average brightness count as high contrast.
pub const DARK_THRESHOLD: f64 = 50.0;
/// Pixels brighter than this average brightness count as high contrast.
pub const BRIGHT_THRESHOLD: f64 = 200.0;
/// Fraction of high-contrast pixels above which the image is flagged.
pub const CONTRAST_RATIO_LIMIT: f64 = 0.3;

pub const WATERMARK_WARNING: &str = "Potential watermark or text detected in image";

/// Fraction of sampled pixels whose mean channel value is below
/// [`DARK_THRESHOLD`] or above [`BRIGHT_THRESHOLD`].
///
/// Each axis is capped independently at [`SAMPLE_MAX_SIDE`], so the sample
/// does not keep the source aspect ratio.
pub fn high_contrast_ratio(image: &DynamicImage) -> f64 {
    let width = image.width().min(SAMPLE_MAX_SIDE);
    let height = image.height().min(SAMPLE_MAX_SIDE);
    if width == 0 || height == 0 {
        return 0.0;
    }

    let sample = if (width, height) == (image.width(), image.height()) {
        image.to_rgb8()
    } else {
        image.thumbnail_exact(width, height).to_rgb8()
    };

    let total = (sample.width() * sample.height()) as usize;
    let high_contrast = sample
        .pixels()
        .filter(|p| {
            let [r, g, b] = p.0;
            let brightness = (r as f64 + g as f64 + b as f64) / 3.0;
            brightness < DARK_THRESHOLD || brightness > BRIGHT_THRESHOLD
        })
        .count();

    high_contrast as f64 / total as f64
}

/// Run the heuristics and return any warnings for display.
pub fn detect_potential_issues(image: &DynamicImage) -> Vec<String> {
    let mut warnings = Vec::new();
    if high_contrast_ratio(image) > CONTRAST_RATIO_LIMIT {
        warnings.push(WATERMARK_WARNING.to_string());
    }
    warnings
}
