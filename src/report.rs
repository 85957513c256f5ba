//! HTML batch report.
//!
//! Renders a [`BatchReport`] as a single self-contained `report.html` placed
//! next to the processed images. One card per input, in batch order:
//!
//! - **Processed**: original and processed side by side with dimensions and
//!   sizes, resize status, size reduction, warnings, and a download link.
//! - **Failed**: the error message, plus the remedy when the source was too
//!   small.
//!
//! Processed previews link to the output files by relative, percent-encoded
//! name, so the report stays valid as long as it sits in the same directory
//! as them. Originals are linked with `file://` URLs.
//!
//! Uses [maud](https://maud.lambda.xyz/) like the rest of the HTML output:
//! every interpolated filename and message is escaped.

use crate::imaging::MIN_LONGEST_SIDE;
use crate::output::format_file_size;
use crate::process::{BatchReport, FailedImage, FailureKind, ItemOutcome, ProcessedImage};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// File name of the report inside the output directory.
pub const REPORT_FILENAME: &str = "report.html";

const CSS: &str = include_str!("../static/report.css");

/// Write `report.html` into `output_dir`.
pub fn write_report(report: &BatchReport, output_dir: &Path) -> std::io::Result<PathBuf> {
    let path = output_dir.join(REPORT_FILENAME);
    fs::write(&path, render_report(report).into_string())?;
    Ok(path)
}

/// Render the full report document.
pub fn render_report(report: &BatchReport) -> Markup {
    let processed = report.processed().count();
    let failed = report.failed().count();

    let content = html! {
        header.report-header {
            h1 { "Processing Results" }
            p { (processed) " of " (report.items.len()) " images processed" @if failed > 0 { ", " (failed) " failed" } }
            @if processed > 0 {
                p {
                    "Total size: " (format_file_size(report.total_original_bytes()))
                    " \u{2192} " (format_file_size(report.total_output_bytes()))
                }
            }
            p {
                "Target " (report.settings.target_longest_side) "px longest side, budget "
                (format_file_size(report.settings.max_bytes)) " per file"
            }
        }
        main.image-grid {
            @for item in &report.items {
                @match item {
                    ItemOutcome::Processed(image) => { (render_processed_card(image)) }
                    ItemOutcome::Failed(failure) => { (render_failed_card(failure)) }
                }
            }
        }
    };

    base_document("Processing Results", content)
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

fn resize_status(image: &ProcessedImage) -> &'static str {
    if image.was_upscaled {
        "Upscaled"
    } else if image.was_resized {
        "Resized"
    } else {
        "No resize needed"
    }
}

/// `file://` URL for the "Original" preview, one encoded segment per component.
fn original_src(source_path: &str) -> String {
    let path = std::path::absolute(source_path).unwrap_or_else(|_| PathBuf::from(source_path));
    let segments: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Prefix(prefix) => Some(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::Normal(name) => Some(urlencoding::encode(&name.to_string_lossy()).into_owned()),
            _ => None,
        })
        .collect();
    format!("file:///{}", segments.join("/"))
}

/// Relative URL of an output file sitting next to the report.
fn output_href(file_name: &str) -> String {
    urlencoding::encode(file_name).into_owned()
}

fn render_processed_card(image: &ProcessedImage) -> Markup {
    html! {
        div.image-card {
            div.image-comparison {
                div.image-side {
                    h5 { "Original" }
                    img src=(original_src(&image.source_path)) alt="Original image";
                    p { (image.original_dimensions.to_string()) }
                    p { (format_file_size(image.original_byte_size)) }
                }
                div.image-side {
                    h5 { "Processed" }
                    img src=(output_href(&image.output_file_name)) alt="Processed image";
                    p { (image.new_dimensions.to_string()) }
                    p { (format_file_size(image.new_byte_size)) }
                }
            }
            div.image-info {
                h4 { (image.output_file_name) }
                p { strong { "Status:" } " " (resize_status(image)) }
                p { strong { "Size reduction:" } " " (format!("{:.1}", image.size_reduction_percent())) "%" }
                p { strong { "Quality:" } " " (image.quality_used.to_percent()) }
                p { strong { "Format:" } " JPEG (baseline, sRGB)" }
            }
            @for warning in &image.warnings {
                div.warning-box { "\u{26A0}\u{FE0F} " (warning) }
            }
            a.download-btn href=(output_href(&image.output_file_name)) download=(image.output_file_name) {
                "Download Processed Image"
            }
        }
    }
}

fn render_failed_card(failure: &FailedImage) -> Markup {
    html! {
        div.image-card.failed {
            div.image-info {
                h4 { (failure.file_name) }
                div.error-box {
                    strong { "Processing Failed:" } " " (failure.message)
                }
                @if failure.kind == FailureKind::TooSmall {
                    p {
                        strong { "Solution:" }
                        " Please use a higher resolution image with the longest side being at least "
                        (MIN_LONGEST_SIDE) " pixels, or rerun with --allow-upscaling."
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Dimensions, Quality};
    use crate::process::ProcessingSettings;
    use tempfile::TempDir;

    fn processed() -> ProcessedImage {
        ProcessedImage {
            index: 1,
            source_path: "in/dawn.png".to_string(),
            output_file_name: "dawn_processed.jpg".to_string(),
            output_path: "out/dawn_processed.jpg".to_string(),
            original_dimensions: Dimensions::new(3000, 2000),
            new_dimensions: Dimensions::new(2000, 1333),
            original_byte_size: 4000,
            new_byte_size: 1000,
            quality_used: Quality::new(0.5),
            attempts: 2,
            warnings: vec!["Potential watermark or text detected in image".to_string()],
            was_resized: true,
            was_upscaled: false,
            budget_met: true,
        }
    }

    fn failed(kind: FailureKind) -> FailedImage {
        FailedImage {
            index: 2,
            source_path: "in/<small>.jpg".to_string(),
            file_name: "<small>.jpg".to_string(),
            kind,
            message: "Image resolution too small.".to_string(),
        }
    }

    fn report(items: Vec<ItemOutcome>) -> BatchReport {
        BatchReport {
            settings: ProcessingSettings::default(),
            items,
        }
    }

    #[test]
    fn base_document_includes_doctype() {
        let doc = base_document("Test", html! { p { "test" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Test</title>"));
    }

    #[test]
    fn processed_card_details() {
        let html = render_report(&report(vec![ItemOutcome::Processed(processed())])).into_string();

        assert!(html.contains("3000×2000"));
        assert!(html.contains("2000×1333"));
        assert!(html.contains("3.91 KB"));
        assert!(html.contains("1000 Bytes"));
        assert!(html.contains("Resized"));
        assert!(html.contains("75.0%"));
        assert!(html.contains("JPEG (baseline, sRGB)"));
        assert!(html.contains("Potential watermark or text detected in image"));
        assert!(html.contains(r#"href="dawn_processed.jpg""#));
        assert!(html.contains(r#"download="dawn_processed.jpg""#));
    }

    #[test]
    fn links_are_percent_encoded() {
        let mut image = processed();
        image.source_path = "/photos/100% #1?.png".to_string();
        image.output_file_name = "100% #1?_processed.jpg".to_string();
        let html = render_report(&report(vec![ItemOutcome::Processed(image)])).into_string();

        assert!(html.contains(r#"src="file:///photos/100%25%20%231%3F.png""#));
        assert!(html.contains(r#"href="100%25%20%231%3F_processed.jpg""#));
        assert!(html.contains(r#"download="100% #1?_processed.jpg""#));
    }

    #[test]
    fn status_reflects_resize_outcome() {
        let mut kept = processed();
        kept.was_resized = false;
        assert_eq!(resize_status(&kept), "No resize needed");

        let mut upscaled = processed();
        upscaled.was_upscaled = true;
        assert_eq!(resize_status(&upscaled), "Upscaled");
    }

    #[test]
    fn too_small_card_offers_remedy() {
        let html = render_report(&report(vec![ItemOutcome::Failed(failed(FailureKind::TooSmall))]))
            .into_string();
        assert!(html.contains("Processing Failed:"));
        assert!(html.contains("at least 1800 pixels"));
    }

    #[test]
    fn other_failures_have_no_remedy() {
        let html = render_report(&report(vec![ItemOutcome::Failed(failed(
            FailureKind::DecodeFailed,
        ))]))
        .into_string();
        assert!(html.contains("Processing Failed:"));
        assert!(!html.contains("Solution:"));
    }

    #[test]
    fn filenames_are_escaped() {
        let html = render_report(&report(vec![ItemOutcome::Failed(failed(FailureKind::TooSmall))]))
            .into_string();
        assert!(html.contains("&lt;small&gt;.jpg"));
        assert!(!html.contains("<small>.jpg"));
    }

    #[test]
    fn header_summarizes_batch() {
        let html = render_report(&report(vec![
            ItemOutcome::Processed(processed()),
            ItemOutcome::Failed(failed(FailureKind::TooSmall)),
        ]))
        .into_string();
        assert!(html.contains("1 of 2 images processed, 1 failed"));
        assert!(html.contains("budget 2 MB per file"));
    }

    #[test]
    fn write_report_creates_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_report(&report(vec![ItemOutcome::Processed(processed())]), tmp.path())
            .unwrap();
        assert_eq!(path, tmp.path().join(REPORT_FILENAME));
        assert!(fs::read_to_string(path).unwrap().contains("Processing Results"));
    }
}
