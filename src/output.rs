//! CLI output formatting.
//!
//! Every formatter is a pure function returning display lines, so the exact
//! output is unit tested; `print_*` wrappers write them to stdout.
//!
//! # Output Format
//!
//! ## Pack
//!
//! ```text
//! Batch (3 files)
//!     001 001_front.png → 001/ [33%]
//!     002 002_side.png FAILED
//!         thumbnail: Failed to decode image: ...
//!     003 001_back.png → 001/ [67%]
//!         Overwrote: 001/001.jpg
//!         Overwrote: 001/001_thumbnail.jpg
//! Done: 2 of 3 succeeded
//!
//! Archive → out/compress_16-Oktober-2026-14:03:27.zip
//!     4 entries in 1 folders (81234 bytes)
//! ```
//!
//! ## Check
//!
//! ```text
//! Sources
//! 001 001_front.png → 001 (800x600)
//! 002 002_side.png → 002 (undecodable: Failed to decode image: ...)
//!
//! Skipped
//!     notes.txt
//!
//! Collisions
//!     001: 001_back.png, 001_front.png
//! ```

use crate::process::{BatchOutcome, CheckReport, ProcessEvent};
use std::path::{Path, PathBuf};

/// Indentation for context lines under an entity header.
const INDENT: &str = "    ";

// ============================================================================
// Pack
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total_files } => {
            vec![format!("Batch ({})", plural(*total_files, "file", "files"))]
        }
        ProcessEvent::FileProcessed {
            index,
            filename,
            key,
            progress,
        } => vec![format!(
            "{INDENT}{index:03} {filename} \u{2192} {key}/ [{progress}%]"
        )],
        ProcessEvent::FileFailed {
            index,
            filename,
            kind,
            error,
        } => vec![
            format!("{INDENT}{index:03} {filename} FAILED"),
            format!("{INDENT}{INDENT}{kind}: {error}"),
        ],
        ProcessEvent::KeyCollision { path, .. } => {
            vec![format!("{INDENT}{INDENT}Overwrote: {path}")]
        }
        ProcessEvent::BatchFinished { succeeded, failed } => vec![format!(
            "Done: {succeeded} of {} succeeded",
            succeeded + failed
        )],
    }
}

/// Format the result of `pack` once the archive is on disk.
pub fn format_pack_summary(outcome: &BatchOutcome, archive_path: &Path, size: usize) -> Vec<String> {
    let mut lines = vec![
        format!("Archive \u{2192} {}", archive_path.display()),
        format!(
            "{INDENT}{} in {} ({size} bytes)",
            plural(outcome.archive.entry_count(), "entry", "entries"),
            plural(outcome.archive.group_count(), "folder", "folders"),
        ),
    ];
    for failure in &outcome.failed {
        lines.push(format!(
            "{INDENT}Failed: {} ({})",
            failure.filename, failure.error
        ));
    }
    lines
}

/// Print pack summary to stdout.
pub fn print_pack_summary(outcome: &BatchOutcome, archive_path: &Path, size: usize) {
    for line in format_pack_summary(outcome, archive_path, size) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format `check` output: keys and sizes per source, skipped files, collisions.
pub fn format_check_output(report: &CheckReport, skipped: &[PathBuf]) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];
    for (i, file) in report.files.iter().enumerate() {
        let detail = match &file.dimensions {
            Ok(dims) => format!("{}x{}", dims.width, dims.height),
            Err(e) => format!("undecodable: {e}"),
        };
        lines.push(format!(
            "{:03} {} \u{2192} {} ({detail})",
            i + 1,
            file.filename,
            file.key
        ));
    }

    if !skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for path in skipped {
            lines.push(format!("{INDENT}{}", path.display()));
        }
    }

    if !report.collisions.is_empty() {
        lines.push(String::new());
        lines.push("Collisions".to_string());
        for (key, names) in &report.collisions {
            lines.push(format!("{INDENT}{key}: {}", names.join(", ")));
        }
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport, skipped: &[PathBuf]) {
    for line in format_check_output(report, skipped) {
        println!("{}", line);
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}
