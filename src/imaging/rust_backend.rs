//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | decoder header + EXIF orientation (no pixel decode) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing, EXIF orientation applied |
//! | Resample | `image::imageops::resize` with `Lanczos3` filter |
//! | Sharpening | `image::imageops::unsharpen`, blended by `amount` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (baseline, RGB8) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, ResampleParams, Sharpening};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions mapped to the decoder that handles them.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an extension we can decode (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Largest raster `resample` will allocate, in pixels.
pub const MAX_RESAMPLE_PIXELS: u64 = 100_000_000;

/// Whether the EXIF orientation turns the image on its side.
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsharp mask with a strength control.
///
/// `image::imageops::unsharpen` always adds the full high-pass detail; the
/// result is blended back toward the input by `amount / 100`.
fn apply_sharpening(image: &DynamicImage, sharpening: Sharpening) -> DynamicImage {
    if sharpening.amount <= 0.0 || sharpening.radius <= 0.0 {
        return image.clone();
    }

    let base = image.to_rgb8();
    let sharp = image::imageops::unsharpen(&base, sharpening.radius, sharpening.threshold);
    let strength = sharpening.amount / 100.0;

    let blended = RgbImage::from_fn(base.width(), base.height(), |x, y| {
        let b = base.get_pixel(x, y);
        let s = sharp.get_pixel(x, y);
        let mut out = *b;
        for c in 0..3 {
            let delta = s[c] as f32 - b[c] as f32;
            out[c] = (b[c] as f32 + delta * strength).round().clamp(0.0, 255.0) as u8;
        }
        out
    });

    DynamicImage::ImageRgb8(blended)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let describe = |e: image::ImageError| {
            BackendError::Decode(format!("Failed to read dimensions of {}: {}", path.display(), e))
        };
        let mut decoder = ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()
            .map_err(describe)?;
        let (width, height) = decoder.dimensions();
        let orientation = decoder.orientation().map_err(describe)?;

        // Report upright dimensions, the same ones `decode` produces.
        Ok(if swaps_axes(orientation) {
            Dimensions::new(height, width)
        } else {
            Dimensions::new(width, height)
        })
    }

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        let mut decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let orientation = decoder
            .orientation()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let mut image =
            DynamicImage::from_decoder(decoder).map_err(|e| BackendError::Decode(e.to_string()))?;
        image.apply_orientation(orientation);
        Ok(image)
    }

    fn resample(
        &self,
        image: &DynamicImage,
        params: &ResampleParams,
    ) -> Result<DynamicImage, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Invalid target size {}×{}",
                params.width, params.height
            )));
        }
        let pixels = u64::from(params.width) * u64::from(params.height);
        if pixels > MAX_RESAMPLE_PIXELS {
            return Err(BackendError::ProcessingFailed(format!(
                "Target size {}×{} exceeds the {} pixel limit",
                params.width, params.height, MAX_RESAMPLE_PIXELS
            )));
        }

        let resized = if (params.width, params.height) == (image.width(), image.height()) {
            image.clone()
        } else {
            image.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };

        Ok(match params.sharpening {
            Some(sharpening) => apply_sharpening(&resized, sharpening),
            None => resized,
        })
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let rgb = image.to_rgb8();
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.to_percent());
        encoder
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(buf)
    }
}
