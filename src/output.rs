//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! Processing 3 images
//! 001 dawn.jpg → dawn_processed.jpg
//!     3000×2000 → 2000×1333 (resized)
//!     4.2 MB → 1.1 MB (-73.8%), quality 90, 1 attempt
//! 002 small.jpg: too small
//!     Image resolution too small. Longest side is 1600px, but minimum required is 1800px.
//! 003 text.png → text_processed.jpg
//!     2000×1500 (no resize needed)
//!     2.1 MB → 640 KB (-70.2%), quality 90, 1 attempt
//!     Warning: Potential watermark or text detected in image
//!
//! Processed 2 of 3 images, 1 failed
//! Total: 6.3 MB → 1.72 MB
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 dawn.jpg: 3000×2000 → 2000×1333 (resize) → dawn_processed.jpg
//! 002 small.jpg: 1600×1200 (rejected)
//!     Image resolution too small. Longest side is 1600px, but minimum required is 1800px.
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::Plan;
use crate::process::{
    BatchReport, FailedImage, FailureKind, PlanOutcome, PlannedImage, ProcessEvent,
    ProcessedImage,
};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Human-readable byte count in base-1024 units.
///
/// Up to two decimals, trailing zeros dropped:
///
/// ```text
/// 0        → 0 Bytes
/// 1536     → 1.5 KB
/// 2097152  → 2 MB
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

fn failure_label(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::ReadFailed => "unreadable",
        FailureKind::DecodeFailed => "not a decodable image",
        FailureKind::TooSmall => "too small",
        FailureKind::ResampleFailed => "resize failed",
        FailureKind::EncodeFailed => "encode failed",
        FailureKind::WriteFailed => "write failed",
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Process output
// ============================================================================

fn format_processed(image: &ProcessedImage) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} \u{2192} {}",
        format_index(image.index),
        file_name(&image.source_path),
        image.output_file_name
    )];

    let dims = if image.was_upscaled {
        format!(
            "{} \u{2192} {} (upscaled)",
            image.original_dimensions, image.new_dimensions
        )
    } else if image.was_resized {
        format!(
            "{} \u{2192} {} (resized)",
            image.original_dimensions, image.new_dimensions
        )
    } else {
        format!("{} (no resize needed)", image.new_dimensions)
    };
    lines.push(format!("{}{}", indent(1), dims));

    lines.push(format!(
        "{}{} \u{2192} {} ({:+.1}%), quality {}, {}",
        indent(1),
        format_file_size(image.original_byte_size),
        format_file_size(image.new_byte_size),
        -image.size_reduction_percent(),
        image.quality_used.to_percent(),
        plural(image.attempts as usize, "attempt"),
    ));

    for warning in &image.warnings {
        lines.push(format!("{}Warning: {}", indent(1), warning));
    }
    lines
}

fn format_failed(failure: &FailedImage) -> Vec<String> {
    vec![
        format!(
            "{} {}: {}",
            format_index(failure.index),
            failure.file_name,
            failure_label(failure.kind)
        ),
        format!("{}{}", indent(1), failure.message),
    ]
}

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total } => {
            vec![format!("Processing {}", plural(*total, "image"))]
        }
        ProcessEvent::ImageProcessed { image, .. } => format_processed(image),
        ProcessEvent::ImageFailed { failure, .. } => format_failed(failure),
    }
}

/// Format the closing summary of a batch.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let processed = report.processed().count();
    let failed = report.failed().count();
    let total = report.items.len();

    let mut headline = format!("Processed {} of {}", processed, plural(total, "image"));
    if failed > 0 {
        headline.push_str(&format!(", {failed} failed"));
    }

    let mut lines = vec![headline];
    if processed > 0 {
        lines.push(format!(
            "Total: {} \u{2192} {}",
            format_file_size(report.total_original_bytes()),
            format_file_size(report.total_output_bytes())
        ));
    }
    let over_budget = report.processed().filter(|i| !i.budget_met).count();
    if over_budget > 0 {
        lines.push(format!(
            "{} above the {} budget",
            plural(over_budget, "image"),
            format_file_size(report.settings.max_bytes)
        ));
    }
    lines
}

pub fn print_batch_summary(report: &BatchReport) {
    println!();
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the plan preview produced by `check`.
pub fn format_plan_output(plans: &[PlannedImage]) -> Vec<String> {
    let mut lines = Vec::new();
    for planned in plans {
        let name = file_name(&planned.source_path.to_string_lossy());
        let head = format!("{} {}", format_index(planned.index), name);

        match &planned.outcome {
            PlanOutcome::Planned {
                source,
                plan,
                output_file_name,
            } => match plan {
                Plan::Keep(_) => lines.push(format!(
                    "{head}: {source} (keep) \u{2192} {output_file_name}"
                )),
                Plan::Resize(d) => lines.push(format!(
                    "{head}: {source} \u{2192} {d} (resize) \u{2192} {output_file_name}"
                )),
                Plan::Upscale(d) => lines.push(format!(
                    "{head}: {source} \u{2192} {d} (upscale) \u{2192} {output_file_name}"
                )),
                Plan::Rejected { .. } => {
                    lines.push(format!("{head}: {source} (rejected)"));
                    if let Some(reason) = plan.reason() {
                        lines.push(format!("{}{}", indent(1), reason));
                    }
                }
            },
            PlanOutcome::Unreadable(err) => {
                lines.push(format!("{head}: unreadable"));
                lines.push(format!("{}{}", indent(1), err));
            }
        }
    }
    lines
}

pub fn print_plan_output(plans: &[PlannedImage]) {
    for line in format_plan_output(plans) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Dimensions, Quality};
    use crate::process::{ItemOutcome, ProcessingSettings};
    use std::path::PathBuf;

    fn processed(index: usize) -> ProcessedImage {
        ProcessedImage {
            index,
            source_path: "photos/dawn.jpg".to_string(),
            output_file_name: "dawn_processed.jpg".to_string(),
            output_path: "out/dawn_processed.jpg".to_string(),
            original_dimensions: Dimensions::new(3000, 2000),
            new_dimensions: Dimensions::new(2000, 1333),
            original_byte_size: 4 * 1024 * 1024,
            new_byte_size: 1024 * 1024,
            quality_used: Quality::default(),
            attempts: 1,
            warnings: Vec::new(),
            was_resized: true,
            was_upscaled: false,
            budget_met: true,
        }
    }

    fn too_small(index: usize) -> FailedImage {
        FailedImage {
            index,
            source_path: "photos/small.jpg".to_string(),
            file_name: "small.jpg".to_string(),
            kind: FailureKind::TooSmall,
            message: "Image resolution too small. Longest side is 1600px, but minimum required is 1800px.".to_string(),
        }
    }

    // =========================================================================
    // format_file_size
    // =========================================================================

    #[test]
    fn file_size_zero() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn file_size_bytes() {
        assert_eq!(format_file_size(1000), "1000 Bytes");
    }

    #[test]
    fn file_size_trims_trailing_zeros() {
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
    }

    #[test]
    fn file_size_rounds_to_two_decimals() {
        // 1.2345 MB
        assert_eq!(format_file_size(1_294_467), "1.23 MB");
    }

    #[test]
    fn file_size_caps_at_gigabytes() {
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(7), "007");
        assert_eq!(format_index(1234), "1234");
    }

    // =========================================================================
    // Process event formatting
    // =========================================================================

    #[test]
    fn format_batch_started() {
        let lines = format_process_event(&ProcessEvent::BatchStarted { total: 1 });
        assert_eq!(lines, vec!["Processing 1 image"]);
        let lines = format_process_event(&ProcessEvent::BatchStarted { total: 3 });
        assert_eq!(lines, vec!["Processing 3 images"]);
    }

    #[test]
    fn format_resized_image() {
        let event = ProcessEvent::ImageProcessed {
            total: 1,
            image: processed(1),
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "001 dawn.jpg \u{2192} dawn_processed.jpg");
        assert_eq!(lines[1], "    3000×2000 \u{2192} 2000×1333 (resized)");
        assert_eq!(lines[2], "    4 MB \u{2192} 1 MB (-75.0%), quality 90, 1 attempt");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn format_kept_image_with_warning() {
        let mut image = processed(2);
        image.original_dimensions = Dimensions::new(1900, 1900);
        image.new_dimensions = Dimensions::new(1900, 1900);
        image.was_resized = false;
        image.attempts = 3;
        image.warnings = vec!["Potential watermark or text detected in image".to_string()];

        let lines = format_process_event(&ProcessEvent::ImageProcessed { total: 2, image });
        assert_eq!(lines[1], "    1900×1900 (no resize needed)");
        assert!(lines[2].ends_with("3 attempts"));
        assert_eq!(
            lines[3],
            "    Warning: Potential watermark or text detected in image"
        );
    }

    #[test]
    fn format_upscaled_image() {
        let mut image = processed(1);
        image.original_dimensions = Dimensions::new(1600, 1200);
        image.new_dimensions = Dimensions::new(2000, 1500);
        image.was_upscaled = true;
        image.original_byte_size = 1024 * 1024;
        image.new_byte_size = 2 * 1024 * 1024;

        let lines = format_process_event(&ProcessEvent::ImageProcessed { total: 1, image });
        assert_eq!(lines[1], "    1600×1200 \u{2192} 2000×1500 (upscaled)");
        assert!(lines[2].contains("(+100.0%)"));
    }

    #[test]
    fn format_failed_image() {
        let event = ProcessEvent::ImageFailed {
            total: 2,
            failure: too_small(2),
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "002 small.jpg: too small");
        assert!(lines[1].starts_with("    Image resolution too small."));
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_counts_and_totals() {
        let report = BatchReport {
            settings: ProcessingSettings::default(),
            items: vec![
                ItemOutcome::Processed(processed(1)),
                ItemOutcome::Failed(too_small(2)),
                ItemOutcome::Processed(processed(3)),
            ],
        };
        let lines = format_batch_summary(&report);
        assert_eq!(lines[0], "Processed 2 of 3 images, 1 failed");
        assert_eq!(lines[1], "Total: 8 MB \u{2192} 2 MB");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn summary_mentions_budget_misses() {
        let mut image = processed(1);
        image.budget_met = false;
        let report = BatchReport {
            settings: ProcessingSettings::default(),
            items: vec![ItemOutcome::Processed(image)],
        };
        let lines = format_batch_summary(&report);
        assert_eq!(lines[0], "Processed 1 of 1 image");
        assert_eq!(lines[2], "1 image above the 2 MB budget");
    }

    #[test]
    fn summary_all_failed_has_no_totals() {
        let report = BatchReport {
            settings: ProcessingSettings::default(),
            items: vec![ItemOutcome::Failed(too_small(1))],
        };
        assert_eq!(
            format_batch_summary(&report),
            vec!["Processed 0 of 1 image, 1 failed"]
        );
    }

    // =========================================================================
    // Check output
    // =========================================================================

    #[test]
    fn format_plans() {
        let plans = vec![
            PlannedImage {
                index: 1,
                source_path: PathBuf::from("in/dawn.jpg"),
                outcome: PlanOutcome::Planned {
                    source: Dimensions::new(3000, 2000),
                    plan: Plan::Resize(Dimensions::new(2000, 1333)),
                    output_file_name: "dawn_processed.jpg".to_string(),
                },
            },
            PlannedImage {
                index: 2,
                source_path: PathBuf::from("in/small.jpg"),
                outcome: PlanOutcome::Planned {
                    source: Dimensions::new(1600, 1200),
                    plan: Plan::Rejected {
                        longest_side: 1600,
                        minimum: 1800,
                    },
                    output_file_name: "small_processed.jpg".to_string(),
                },
            },
            PlannedImage {
                index: 3,
                source_path: PathBuf::from("in/broken.jpg"),
                outcome: PlanOutcome::Unreadable("bad header".to_string()),
            },
        ];

        let lines = format_plan_output(&plans);
        assert_eq!(
            lines,
            vec![
                "001 dawn.jpg: 3000×2000 \u{2192} 2000×1333 (resize) \u{2192} dawn_processed.jpg",
                "002 small.jpg: 1600×1200 (rejected)",
                "    Image resolution too small. Longest side is 1600px, but minimum required is 1800px.",
                "003 broken.jpg: unreadable",
                "    bad header",
            ]
        );
    }
}
