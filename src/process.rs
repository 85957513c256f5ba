//! Batch image processing.
//!
//! Takes the collected inputs and runs each image through the pipeline:
//!
//! ```text
//! read → decode → plan → inspect → resample → encode (size budget) → write
//! ```
//!
//! ## Sequential by Design
//!
//! Images are processed one at a time. Each step of one image completes
//! before the next image is read, so at most one full-resolution bitmap and
//! one encode buffer are alive at any moment. Throughput is traded for a
//! bounded memory peak on large batches.
//!
//! ## Failure Isolation
//!
//! Nothing that goes wrong with a single image aborts the batch. A missing
//! file, an undecodable file, or a source below the 1800px floor becomes a
//! [`FailedImage`] at that image's position and processing moves on. Only
//! batch-level problems (the output directory cannot be created) return
//! [`ProcessError`].
//!
//! A missed size budget is not a failure: the oversize file is written,
//! flagged with `budget_met = false` and a warning.
//!
//! ## Output Structure
//!
//! ```text
//! processed/
//! ├── dawn_processed.jpg
//! ├── dusk_processed.jpg
//! ├── manifest.json      # Serialized BatchReport
//! └── report.html        # Visual summary (optional)
//! ```

use crate::imaging::{
    Dimensions, ImageBackend, Plan, Quality, ResampleParams, RustBackend, Sharpening,
    encode_within_budget, inspect, plan_dimensions,
};
use crate::config::PrepConfig;
use crate::naming::OutputNames;
use crate::output::format_file_size;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings shared by every image in one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingSettings {
    pub target_longest_side: u32,
    pub initial_quality: Quality,
    pub max_bytes: u64,
    pub allow_upscaling: bool,
    pub sharpening: Sharpening,
    /// Appended to each source stem to form the output filename.
    pub suffix: String,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        PrepConfig::default().processing_settings()
    }
}

/// One batch run: settings plus the ordered inputs.
///
/// All per-run state lives here or in the returned [`BatchReport`], so
/// independent batches never share anything.
#[derive(Debug, Clone)]
pub struct Batch {
    pub settings: ProcessingSettings,
    pub inputs: Vec<PathBuf>,
}

impl Batch {
    pub fn new(settings: ProcessingSettings, inputs: Vec<PathBuf>) -> Self {
        Self { settings, inputs }
    }
}

/// A successfully processed image.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedImage {
    /// 1-based position in the batch.
    pub index: usize,
    pub source_path: String,
    pub output_file_name: String,
    pub output_path: String,
    pub original_dimensions: Dimensions,
    pub new_dimensions: Dimensions,
    pub original_byte_size: u64,
    pub new_byte_size: u64,
    pub quality_used: Quality,
    /// Encode calls spent on the size budget.
    pub attempts: u32,
    pub warnings: Vec<String>,
    pub was_resized: bool,
    pub was_upscaled: bool,
    pub budget_met: bool,
}

impl ProcessedImage {
    /// Percentage of the original size saved; negative when the output grew.
    pub fn size_reduction_percent(&self) -> f64 {
        if self.original_byte_size == 0 {
            return 0.0;
        }
        let original = self.original_byte_size as f64;
        (original - self.new_byte_size as f64) / original * 100.0
    }
}

/// Why an image could not be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ReadFailed,
    DecodeFailed,
    TooSmall,
    ResampleFailed,
    EncodeFailed,
    WriteFailed,
}

/// An image that could not be processed, at its batch position.
#[derive(Debug, Clone, Serialize)]
pub struct FailedImage {
    /// 1-based position in the batch.
    pub index: usize,
    pub source_path: String,
    pub file_name: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Processed(ProcessedImage),
    Failed(FailedImage),
}

/// Everything a batch produced, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub settings: ProcessingSettings,
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn processed(&self) -> impl Iterator<Item = &ProcessedImage> {
        self.items.iter().filter_map(|item| match item {
            ItemOutcome::Processed(image) => Some(image),
            ItemOutcome::Failed(_) => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = &FailedImage> {
        self.items.iter().filter_map(|item| match item {
            ItemOutcome::Failed(failure) => Some(failure),
            ItemOutcome::Processed(_) => None,
        })
    }

    pub fn total_original_bytes(&self) -> u64 {
        self.processed().map(|i| i.original_byte_size).sum()
    }

    pub fn total_output_bytes(&self) -> u64 {
        self.processed().map(|i| i.new_byte_size).sum()
    }
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    BatchStarted { total: usize },
    ImageProcessed { total: usize, image: ProcessedImage },
    ImageFailed { total: usize, failure: FailedImage },
}

/// Per-image failure before it is tied to a batch position.
struct ImageFailure {
    kind: FailureKind,
    message: String,
}

impl ImageFailure {
    fn new(kind: FailureKind, err: impl std::fmt::Display) -> Self {
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Process a batch with the production backend.
pub fn process(
    batch: &Batch,
    output_dir: &Path,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    process_with_backend(&RustBackend::new(), batch, output_dir, events)
}

/// Process a batch using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    batch: &Batch,
    output_dir: &Path,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    fs::create_dir_all(output_dir)?;

    let total = batch.inputs.len();
    let emit = |event: ProcessEvent| {
        if let Some(tx) = &events {
            // A dropped receiver only means nobody is watching progress.
            tx.send(event).ok();
        }
    };
    emit(ProcessEvent::BatchStarted { total });

    let mut names = OutputNames::new();
    reserve_input_names(&mut names, &batch.inputs, output_dir);
    let mut items = Vec::with_capacity(total);

    for (i, source) in batch.inputs.iter().enumerate() {
        let index = i + 1;
        let outcome =
            match process_image(backend, source, &batch.settings, output_dir, &mut names) {
                Ok(mut image) => {
                    image.index = index;
                    emit(ProcessEvent::ImageProcessed {
                        total,
                        image: image.clone(),
                    });
                    ItemOutcome::Processed(image)
                }
                Err(ImageFailure { kind, message }) => {
                    let failure = FailedImage {
                        index,
                        source_path: source.display().to_string(),
                        file_name: display_name(source),
                        kind,
                        message,
                    };
                    emit(ProcessEvent::ImageFailed {
                        total,
                        failure: failure.clone(),
                    });
                    ItemOutcome::Failed(failure)
                }
            };
        items.push(outcome);
    }

    Ok(BatchReport {
        settings: batch.settings.clone(),
        items,
    })
}

/// Serialize a report as `manifest.json` in `output_dir`.
pub fn write_manifest(report: &BatchReport, output_dir: &Path) -> Result<PathBuf, ProcessError> {
    let path = output_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Keep outputs off any input that lives in `output_dir` itself.
fn reserve_input_names(names: &mut OutputNames, inputs: &[PathBuf], output_dir: &Path) {
    let Ok(output_dir) = output_dir.canonicalize() else {
        return;
    };
    for input in inputs {
        let parent = match input.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.canonicalize().is_ok_and(|p| p == output_dir) {
            continue;
        }
        if let Some(name) = input.file_name() {
            names.reserve(&name.to_string_lossy());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn process_image(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &ProcessingSettings,
    output_dir: &Path,
    names: &mut OutputNames,
) -> Result<ProcessedImage, ImageFailure> {
    let data = fs::read(source).map_err(|e| ImageFailure::new(FailureKind::ReadFailed, e))?;
    let original_byte_size = data.len() as u64;

    let original = backend
        .decode(&data)
        .map_err(|e| ImageFailure::new(FailureKind::DecodeFailed, e))?;
    drop(data);
    let original_dimensions = Dimensions::of(&original);

    let plan = plan_dimensions(
        original_dimensions,
        settings.target_longest_side,
        settings.allow_upscaling,
    );
    let new_dimensions = match plan {
        Plan::Rejected { .. } => {
            let reason = plan.reason().unwrap_or_default();
            return Err(ImageFailure::new(FailureKind::TooSmall, reason));
        }
        Plan::Keep(d) | Plan::Resize(d) | Plan::Upscale(d) => d,
    };

    let mut warnings = inspect::detect_potential_issues(&original);

    // Sharpening runs even when the size is kept, so every output gets the
    // same treatment.
    let bitmap = backend
        .resample(
            &original,
            &ResampleParams {
                width: new_dimensions.width,
                height: new_dimensions.height,
                sharpening: Some(settings.sharpening),
            },
        )
        .map_err(|e| ImageFailure::new(FailureKind::ResampleFailed, e))?;
    drop(original);

    let artifact = encode_within_budget(settings.initial_quality, settings.max_bytes, |q| {
        backend.encode_jpeg(&bitmap, q)
    })
    .map_err(|e| ImageFailure::new(FailureKind::EncodeFailed, e))?;

    if !artifact.budget_met {
        warnings.push(format!(
            "Output is {} after {} attempts, above the {} budget",
            format_file_size(artifact.byte_size()),
            artifact.attempts,
            format_file_size(settings.max_bytes),
        ));
    }
    if plan.needs_upscaling() {
        warnings.push(format!(
            "Upscaled from {original_dimensions}; fine detail may look soft"
        ));
    }

    let output_file_name = names.allocate(source, &settings.suffix);
    let output_path = output_dir.join(&output_file_name);
    fs::write(&output_path, &artifact.bytes)
        .map_err(|e| ImageFailure::new(FailureKind::WriteFailed, e))?;

    Ok(ProcessedImage {
        index: 0,
        source_path: source.display().to_string(),
        output_file_name,
        output_path: output_path.display().to_string(),
        original_dimensions,
        new_dimensions,
        original_byte_size,
        new_byte_size: artifact.byte_size(),
        quality_used: artifact.quality_used,
        attempts: artifact.attempts,
        warnings,
        was_resized: original_dimensions != new_dimensions,
        was_upscaled: plan.needs_upscaling(),
        budget_met: artifact.budget_met,
    })
}

// =============================================================================
// Planning without encoding
// =============================================================================

/// Result of planning one input without decoding pixels.
#[derive(Debug, Clone)]
pub struct PlannedImage {
    pub index: usize,
    pub source_path: PathBuf,
    pub outcome: PlanOutcome,
}

#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Planned {
        source: Dimensions,
        plan: Plan,
        output_file_name: String,
    },
    Unreadable(String),
}

/// Plan every input from its header dimensions only.
///
/// Used by `check` to preview what a batch would do without encoding.
pub fn plan_batch(backend: &impl ImageBackend, batch: &Batch) -> Vec<PlannedImage> {
    let settings = &batch.settings;
    let mut names = OutputNames::new();

    batch
        .inputs
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let outcome = match backend.identify(path) {
                Ok(source) => {
                    let plan = plan_dimensions(
                        source,
                        settings.target_longest_side,
                        settings.allow_upscaling,
                    );
                    PlanOutcome::Planned {
                        source,
                        plan,
                        output_file_name: names.allocate(path, &settings.suffix),
                    }
                }
                Err(e) => PlanOutcome::Unreadable(e.to_string()),
            };
            PlannedImage {
                index: i + 1,
                source_path: path.clone(),
                outcome,
            }
        })
        .collect()
}
