//! # image-prep
//!
//! Batch photo preparation for upload targets with size and resolution
//! rules: every input comes out as a baseline sRGB JPEG whose longest side
//! matches a target, sharpened after resampling, and under a file size
//! budget where possible.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      paths     →  Vec<PathBuf>   (files + recursive directory walk)
//! 2. Process   Batch     →  BatchReport    (one image at a time)
//! 3. Report    BatchReport → manifest.json + report.html
//! ```
//!
//! Within step 2 each image goes through:
//!
//! ```text
//! decode → plan dimensions → watermark check → resample + sharpen
//!        → encode within budget → write {stem}_processed.jpg
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Turns file and directory arguments into the ordered input list |
//! | [`process`] | Batch orchestration, per-image outcomes, progress events |
//! | [`imaging`] | Dimension planning, size-budgeted encoding, backend trait, watermark heuristic |
//! | [`naming`] | Output filename derivation and per-batch de-duplication |
//! | [`config`] | `image-prep.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting for progress, summaries, and plans |
//! | [`report`] | Static HTML report rendered with Maud |
//!
//! # Design Decisions
//!
//! ## Resolution Floor
//!
//! Upload targets reject images whose longest side is below 1800px. Sources
//! under that are rejected up front, or upscaled when the user opts in. A
//! rejection is an ordinary per-image outcome and never stops the batch.
//!
//! ## Best-Effort Size Budget
//!
//! Encoding starts at the configured quality and moves halfway toward the
//! 0.1 floor on every miss, for at most 10 attempts. If the budget is still
//! not met, the last encode is kept and flagged.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling, unsharp masking and JPEG encoding all come
//! from the `image` crate. The binary has no system library dependencies.
//!
//! ## Sequential Processing
//!
//! One image is processed at a time so only one full-resolution bitmap and
//! one encode buffer are alive at once. Large batches of large photos stay
//! within a predictable memory envelope.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod report;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
