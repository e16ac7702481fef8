//! CLI output formatting for publish runs.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! [  0%]
//!     scripts/galerie-lib.js
//!     index.html
//!     pics/galerie.txt (new)
//! [ 50%]
//!     pics/a.jpg → delta
//!     pics/tn_a.jpg (unchanged)
//!     pics/tn_b.jpg (unchanged, stale delta removed)
//! [100%]
//! ==> Publish complete
//! Published 2 pictures, 9 files
//! Delta: 1 staged, 1 stale removed
//! ```
//!
//! ## Check
//!
//! ```text
//! Source: photos
//! Target: site
//! Delta: off
//!
//! Pictures
//! 001 a.jpg (JPEG)
//! 002 b.png (PNG)
//!
//! Manifest pics/galerie.txt
//!     {"title":"Demo","images":["a.jpg","b.png"]}
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::config::RunConfig;
use crate::delta::{DeltaOutcome, TreeDir};
use crate::manifest::{MANIFEST_FILE_NAME, Manifest};
use crate::publish::{RunEvent, RunOutcome, RunSummary};
use crate::scan::{PictureAsset, PictureFormat};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn outcome_marker(outcome: DeltaOutcome) -> &'static str {
    match outcome {
        DeltaOutcome::TargetOnly => "",
        DeltaOutcome::NotInReference => " (new)",
        DeltaOutcome::Unchanged => " (unchanged)",
        DeltaOutcome::UnchangedPruned => " (unchanged, stale delta removed)",
        DeltaOutcome::Staged => " \u{2192} delta",
    }
}

fn format_label(format: PictureFormat) -> &'static str {
    match format {
        PictureFormat::Jpeg => "JPEG",
        PictureFormat::Bmp => "BMP",
        PictureFormat::Gif => "GIF",
        PictureFormat::Png => "PNG",
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
// Build output
// ============================================================================

/// Format a single run event as display lines.
pub fn format_run_event(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::Progress(percent) => vec![format!("[{:>3}%]", percent)],
        RunEvent::Published { path, outcome } => {
            vec![format!("    {}{}", path, outcome_marker(*outcome))]
        }
        RunEvent::Finished(RunOutcome::Succeeded(_)) => vec!["==> Publish complete".to_string()],
        RunEvent::Finished(RunOutcome::Failed(message)) => {
            vec![format!("==> Publish failed: {}", message)]
        }
    }
}

/// Format the closing summary of a successful run.
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Published {}, {}",
        plural(summary.pictures, "picture"),
        plural(summary.files_written, "file")
    )];
    if summary.delta_enabled {
        lines.push(format!(
            "Delta: {} staged, {} stale removed",
            summary.staged, summary.pruned
        ));
    } else {
        lines.push("Delta: off".to_string());
    }
    lines
}

/// Print a run event to stdout.
pub fn print_run_event(event: &RunEvent) {
    for line in format_run_event(event) {
        println!("{}", line);
    }
}

/// Print the run summary to stdout.
pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format what a run with `config` would publish, without publishing it.
pub fn format_check_output(
    config: &RunConfig,
    assets: &[PictureAsset],
    manifest: &Manifest,
) -> Vec<String> {
    let mut lines = vec![
        format!("Source: {}", config.source.display()),
        format!("Target: {}", config.target.display()),
    ];
    match config.delta_trees() {
        Some(trees) => lines.push(format!(
            "Delta: {} \u{2192} {}",
            trees.reference_root.display(),
            trees.delta_root.display()
        )),
        None => lines.push("Delta: off".to_string()),
    }

    lines.push(String::new());
    lines.push("Pictures".to_string());
    if assets.is_empty() {
        lines.push("    (none)".to_string());
    }
    for (i, asset) in assets.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            asset.file_name,
            format_label(asset.format)
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Manifest {}",
        TreeDir::Pictures.relative_path(MANIFEST_FILE_NAME)
    ));
    lines.push(format!("    {}", manifest.to_wire()));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(config: &RunConfig, assets: &[PictureAsset], manifest: &Manifest) {
    for line in format_check_output(config, assets, manifest) {
        println!("{}", line);
    }
}
