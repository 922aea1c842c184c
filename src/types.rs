//! Shared report types.
//!
//! These are what the library hands back to callers and what `batch --report`
//! writes as JSON, so field names are part of the on-disk format.

use crate::imaging::{CoverageBasis, Method};
use serde::{Deserialize, Serialize};

/// Outcome of extracting one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub width: u32,
    pub height: u32,
    pub method: Method,
    /// Pixels whose alpha exceeded the opaque threshold in the source.
    pub opaque_pixels: usize,
    /// Pixels left opaque in the output.
    pub subject_pixels: usize,
    /// `subject_pixels` over `coverage_basis`.
    pub coverage: f64,
    pub coverage_basis: CoverageBasis,
    /// Classification passes run: 0 for a passthrough, otherwise 1 or 2.
    pub passes: u8,
    pub fallback_used: bool,
    /// The source had no opaque pixel and was written back unchanged.
    pub passthrough: bool,
}

/// One line of a batch report: either a report or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub source: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ExtractionReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a whole batch run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    /// Files whose first pass was under-covered.
    pub fn fallbacks(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.report.as_ref())
            .filter(|r| r.fallback_used)
            .count()
    }

    pub fn passthroughs(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.report.as_ref())
            .filter(|r| r.passthrough)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}
