//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Extract / Batch
//!
//! Each file leads with its positional index and file name; outcome details
//! are indented underneath.
//!
//! ```text
//! 001 cat_01.png
//!     Output: out/cat_01.png
//!     Subject: 1840 of 4096 opaque px (coverage 44.9% of opaque)
//! 002 cat_02.png
//!     Output: out/cat_02.png
//!     Subject: 310 of 4096 opaque px (coverage 7.6% of opaque, fallback)
//! 003 cat_03.png
//!     Error: Failed to decode cat_03.png: ...
//!
//! Processed 3 files: 2 ok, 1 failed, 1 used fallback
//! ```
//!
//! ## Rename
//!
//! ```text
//! 001 legend.png → cat_01.png
//! 002 photo (2).png → cat_02.png
//! 003 cat_03.png (unchanged)
//!
//! Renamed 2 files
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects. Diagnostics go through
//! `tracing` to stderr and never mix with these lines.

use crate::imaging::CoverageBasis;
use crate::naming::RenameStep;
use crate::process::ProcessEvent;
use crate::types::{BatchReport, ExtractionReport};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Last path component, or the whole string when there is none.
fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// One-line summary of an extraction outcome.
///
/// ```text
/// Subject: 36 of 400 opaque px (coverage 9.0% of opaque, fallback)
/// Subject: 112 of 400 opaque px (coverage 7.0% of canvas)
/// No opaque pixels, copied unchanged
/// ```
fn report_line(report: &ExtractionReport) -> String {
    if report.passthrough {
        return "No opaque pixels, copied unchanged".to_string();
    }
    let basis = match report.coverage_basis {
        CoverageBasis::Opaque => "opaque",
        CoverageBasis::Canvas => "canvas",
    };
    let fallback = if report.fallback_used { ", fallback" } else { "" };
    format!(
        "Subject: {} of {} opaque px (coverage {} of {}{})",
        report.subject_pixels,
        report.opaque_pixels,
        percent(report.coverage),
        basis,
        fallback
    )
}

// ============================================================================
// Extract
// ============================================================================

/// Format the result of a single `extract` run.
pub fn format_extract_output(input: &Path, output: &Path, report: &ExtractionReport) -> Vec<String> {
    vec![
        format!("{} ({}x{}, {})", input.display(), report.width, report.height, report.method),
        format!("{}Output: {}", indent(1), output.display()),
        format!("{}{}", indent(1), report_line(report)),
    ]
}

pub fn print_extract_output(input: &Path, output: &Path, report: &ExtractionReport) {
    for line in format_extract_output(input, output, report) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total } => {
            vec![format!("Processing {} files", total)]
        }
        ProcessEvent::ImageProcessed {
            index,
            source,
            output,
            report,
        } => vec![
            format!("{} {}", format_index(index + 1), display_name(source)),
            format!("{}Output: {}", indent(1), output),
            format!("{}{}", indent(1), report_line(report)),
        ],
        ProcessEvent::ImageFailed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}", format_index(index + 1), display_name(source)),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

/// Closing summary of a batch run.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let total = report.files.len();
    if total == 0 {
        return vec!["No matching files".to_string()];
    }
    let mut line = format!(
        "Processed {} file{}: {} ok, {} failed",
        total,
        if total == 1 { "" } else { "s" },
        report.succeeded(),
        report.failed()
    );
    let fallbacks = report.fallbacks();
    if fallbacks > 0 {
        line.push_str(&format!(", {} used fallback", fallbacks));
    }
    let passthroughs = report.passthroughs();
    if passthroughs > 0 {
        line.push_str(&format!(", {} passed through", passthroughs));
    }
    vec![String::new(), line]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Rename
// ============================================================================

/// Format a rename plan. `applied` switches the summary from "Would rename"
/// to "Renamed".
pub fn format_rename_plan(steps: &[RenameStep], applied: bool) -> Vec<String> {
    let file_name = |p: &Path| {
        p.file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    if steps.is_empty() {
        return vec!["No numbered files to rename".to_string()];
    }

    let mut lines: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            if step.is_noop() {
                format!("{} {} (unchanged)", format_index(i + 1), file_name(&step.from))
            } else {
                format!(
                    "{} {} → {}",
                    format_index(i + 1),
                    file_name(&step.from),
                    file_name(&step.to)
                )
            }
        })
        .collect();

    let moving = steps.iter().filter(|s| !s.is_noop()).count();
    let verb = if applied { "Renamed" } else { "Would rename" };
    lines.push(String::new());
    lines.push(format!(
        "{} {} file{}",
        verb,
        moving,
        if moving == 1 { "" } else { "s" }
    ));
    lines
}

pub fn print_rename_plan(steps: &[RenameStep], applied: bool) {
    for line in format_rename_plan(steps, applied) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Method;
    use crate::types::FileReport;
    use std::path::PathBuf;

    fn sample_report() -> ExtractionReport {
        ExtractionReport {
            width: 20,
            height: 20,
            method: Method::Advanced,
            opaque_pixels: 400,
            subject_pixels: 36,
            coverage: 0.09,
            coverage_basis: CoverageBasis::Opaque,
            passes: 2,
            fallback_used: true,
            passthrough: false,
        }
    }

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn report_line_with_fallback() {
        assert_eq!(
            report_line(&sample_report()),
            "Subject: 36 of 400 opaque px (coverage 9.0% of opaque, fallback)"
        );
    }

    #[test]
    fn report_line_names_canvas_basis() {
        let report = ExtractionReport {
            method: Method::Basic,
            subject_pixels: 112,
            coverage: 112.0 / 1600.0,
            coverage_basis: CoverageBasis::Canvas,
            passes: 1,
            fallback_used: false,
            ..sample_report()
        };
        assert_eq!(
            report_line(&report),
            "Subject: 112 of 400 opaque px (coverage 7.0% of canvas)"
        );
    }

    #[test]
    fn report_line_passthrough() {
        let report = ExtractionReport {
            passthrough: true,
            passes: 0,
            fallback_used: false,
            ..sample_report()
        };
        assert_eq!(report_line(&report), "No opaque pixels, copied unchanged");
    }

    #[test]
    fn extract_output_lines() {
        let lines = format_extract_output(
            Path::new("cat.png"),
            Path::new("cut.png"),
            &sample_report(),
        );
        assert_eq!(
            lines,
            vec![
                "cat.png (20x20, advanced)",
                "    Output: cut.png",
                "    Subject: 36 of 400 opaque px (coverage 9.0% of opaque, fallback)",
            ]
        );
    }

    #[test]
    fn processed_event_shows_name_and_output() {
        let event = ProcessEvent::ImageProcessed {
            index: 0,
            source: "/cats/cat_01.png".into(),
            output: "/out/cat_01.png".into(),
            report: sample_report(),
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "001 cat_01.png");
        assert_eq!(lines[1], "    Output: /out/cat_01.png");
    }

    #[test]
    fn failed_event_shows_error() {
        let event = ProcessEvent::ImageFailed {
            index: 4,
            source: "/cats/cat_05.png".into(),
            error: "Failed to decode".into(),
        };
        assert_eq!(
            format_process_event(&event),
            vec!["005 cat_05.png", "    Error: Failed to decode"]
        );
    }

    #[test]
    fn batch_summary_counts() {
        let ok = FileReport {
            source: "a.png".into(),
            output: "a.png".into(),
            report: Some(sample_report()),
            error: None,
        };
        let bad = FileReport {
            source: "b.png".into(),
            output: "b.png".into(),
            report: None,
            error: Some("boom".into()),
        };
        let report = BatchReport {
            files: vec![ok, bad],
        };
        assert_eq!(
            format_batch_summary(&report),
            vec![
                "".to_string(),
                "Processed 2 files: 1 ok, 1 failed, 1 used fallback".to_string()
            ]
        );
    }

    #[test]
    fn batch_summary_empty() {
        assert_eq!(
            format_batch_summary(&BatchReport::default()),
            vec!["No matching files"]
        );
    }

    #[test]
    fn rename_plan_lines() {
        let steps = vec![
            RenameStep {
                from: PathBuf::from("/c/photo (2).png"),
                to: PathBuf::from("/c/cat_01.png"),
            },
            RenameStep {
                from: PathBuf::from("/c/cat_02.png"),
                to: PathBuf::from("/c/cat_02.png"),
            },
        ];
        assert_eq!(
            format_rename_plan(&steps, false),
            vec![
                "001 photo (2).png → cat_01.png",
                "002 cat_02.png (unchanged)",
                "",
                "Would rename 1 file",
            ]
        );
        assert_eq!(format_rename_plan(&steps, true).last().unwrap(), "Renamed 1 file");
    }

    #[test]
    fn rename_plan_empty() {
        assert_eq!(format_rename_plan(&[], true), vec!["No numbered files to rename"]);
    }
}
