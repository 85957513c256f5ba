//! Tool configuration.
//!
//! Handles loading, validating, and merging `image-prep.toml`. Values are
//! layered: stock defaults, then the config file, then command-line flags.
//! Each layer only needs the keys it wants to override.
//!
//! ## Config File Location
//!
//! `image-prep.toml` in the working directory is picked up automatically.
//! `--config <FILE>` points at any other file; a missing explicit file is an
//! error, a missing implicit one is not.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [processing]
//! target_longest_side = 2000  # Longest edge of the output, in pixels (max 10000)
//! initial_quality = 0.9       # First JPEG quality tried (0 < q <= 1)
//! max_file_size_mb = 2.0      # Size budget per output file (MiB)
//! allow_upscaling = false     # Upscale sources below 1800px instead of rejecting
//!
//! [sharpening]
//! amount = 80.0               # Unsharp strength in percent (0 = off)
//! radius = 0.6                # Blur sigma for the unsharp mask
//! threshold = 2               # Minimum difference to sharpen
//!
//! [output]
//! suffix = "_processed"       # Appended to the source stem
//! report = true               # Write report.html next to the outputs
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{MAX_TARGET_LONGEST_SIDE, Quality, Sharpening};
use crate::naming::DEFAULT_SUFFIX;
use crate::process::ProcessingSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "image-prep.toml";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `image-prep.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    /// Resize and size-budget settings.
    pub processing: ProcessingConfig,
    /// Post-resample unsharp mask.
    pub sharpening: SharpeningConfig,
    /// Output naming and report settings.
    pub output: OutputConfig,
}

impl PrepConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.processing;
        if p.target_longest_side == 0 || p.target_longest_side > MAX_TARGET_LONGEST_SIDE {
            return Err(ConfigError::Validation(format!(
                "processing.target_longest_side must be between 1 and {MAX_TARGET_LONGEST_SIDE}"
            )));
        }
        if !(p.initial_quality > 0.0 && p.initial_quality <= 1.0) {
            return Err(ConfigError::Validation(
                "processing.initial_quality must be in (0, 1]".into(),
            ));
        }
        if !(p.max_file_size_mb > 0.0 && p.max_file_size_mb.is_finite()) {
            return Err(ConfigError::Validation(
                "processing.max_file_size_mb must be a positive number".into(),
            ));
        }
        if self.sharpening.amount < 0.0 || self.sharpening.radius < 0.0 {
            return Err(ConfigError::Validation(
                "sharpening.amount and sharpening.radius must not be negative".into(),
            ));
        }
        if self.output.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "output.suffix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Batch settings derived from this config.
    pub fn processing_settings(&self) -> ProcessingSettings {
        let p = &self.processing;
        ProcessingSettings {
            target_longest_side: p.target_longest_side,
            initial_quality: Quality::new(p.initial_quality),
            max_bytes: max_bytes(p.max_file_size_mb),
            allow_upscaling: p.allow_upscaling,
            sharpening: self.sharpening.to_sharpening(),
            suffix: self.output.suffix.clone(),
        }
    }
}

/// Convert a budget in MiB to bytes, rounding down.
pub fn max_bytes(max_file_size_mb: f64) -> u64 {
    (max_file_size_mb * BYTES_PER_MB).floor() as u64
}

/// Resize and size-budget settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Longest edge of the output image, in pixels.
    pub target_longest_side: u32,
    /// JPEG quality of the first encode attempt, in (0, 1].
    pub initial_quality: f32,
    /// Size budget per output file, in MiB.
    pub max_file_size_mb: f64,
    /// Upscale sources below the 1800px floor instead of rejecting them.
    pub allow_upscaling: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            target_longest_side: 2000,
            initial_quality: 0.9,
            max_file_size_mb: 2.0,
            allow_upscaling: false,
        }
    }
}

/// Unsharp mask applied after resampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SharpeningConfig {
    /// Strength in percent; 0 disables sharpening.
    pub amount: f32,
    /// Gaussian sigma of the mask.
    pub radius: f32,
    /// Minimum brightness difference to sharpen.
    pub threshold: i32,
}

impl Default for SharpeningConfig {
    fn default() -> Self {
        let s = Sharpening::default();
        Self {
            amount: s.amount,
            radius: s.radius,
            threshold: s.threshold,
        }
    }
}

impl SharpeningConfig {
    pub fn to_sharpening(&self) -> Sharpening {
        Sharpening {
            amount: self.amount,
            radius: self.radius,
            threshold: self.threshold,
        }
    }
}

/// Output naming and report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Appended to the source file stem before `.jpg`.
    pub suffix: String,
    /// Write `report.html` into the output directory.
    pub report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            report: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PrepConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<PrepConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: PrepConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file, layering `cli_overrides` on top.
///
/// `explicit` marks a path the user named; a missing explicit file is an
/// IO error rather than silently falling back to defaults.
pub fn load_config(
    path: &Path,
    explicit: bool,
    cli_overrides: Option<toml::Value>,
) -> Result<PrepConfig, ConfigError> {
    if explicit && !path.exists() {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        )));
    }
    let file = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), file.into_iter().chain(cli_overrides))
}

/// Returns a fully-commented stock `image-prep.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-prep Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as image-prep.toml in the working directory, or pass
# --config <FILE>. Command-line flags override values in this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Resize and size budget
# ---------------------------------------------------------------------------
[processing]
# Longest edge of the output image, in pixels. Larger sources are scaled
# down; sources between 1800px and this value are kept as they are.
# At most 10000.
target_longest_side = 2000

# JPEG quality of the first encode attempt, in (0, 1]. If the result is
# over budget, quality moves halfway toward 0.1 for up to 10 attempts.
initial_quality = 0.9

# Size budget per output file, in MiB. Best effort: a file that still does
# not fit after 10 attempts is kept and flagged with a warning.
max_file_size_mb = 2.0

# Sources whose longest side is below 1800px are rejected unless this is
# true, in which case they are upscaled to max(1800, target_longest_side).
allow_upscaling = false

# ---------------------------------------------------------------------------
# Sharpening (unsharp mask applied after resampling)
# ---------------------------------------------------------------------------
[sharpening]
# Strength in percent. 0 disables sharpening.
amount = 80.0

# Gaussian blur sigma used to build the mask.
radius = 0.6

# Minimum brightness difference before a pixel is sharpened.
threshold = 2

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Appended to the source file stem: dawn.png -> dawn_processed.jpg
suffix = "_processed"

# Write report.html next to the processed images.
report = true
"##
}
