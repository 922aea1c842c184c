//! Subject extraction pipeline and batch driver.
//!
//! Ties the [`imaging`](crate::imaging) stages together for one image and
//! runs that pipeline over a list of files.
//!
//! ## Per-image pipeline
//!
//! ```text
//! load → opaque map ─┬─ nothing opaque ──────────────────────────→ write unchanged
//!                    └→ content bounds → classify → refine → ∩ opaque
//!                                          ↑                   │
//!                                          └── fallback params ┤ under-covered (once)
//!                                                              ↓
//!                                                          composite → write PNG
//! ```
//!
//! The coverage rule of the active [`Profile`] decides whether the second
//! pass runs. At most two passes run per image and the second result is
//! final, whatever its coverage.
//!
//! ## Batch
//!
//! [`process_batch`] runs one rayon task per file. A failing file is recorded
//! in the [`BatchReport`] and never stops the others. When several inputs map
//! to the same output (`x.jpg` next to `x.png`, or same-named files from
//! different subdirectories with an output directory), the first in list
//! order wins and the rest fail without being processed. Progress is sent as
//! [`ProcessEvent`]s over an optional channel so the CLI can print while
//! workers run.

use crate::config::{ConfigError, CutoutConfig};
use crate::imaging::{
    Anchor, BackendError, ClassificationParams, ContentBounds, ImageBackend, ImageSource, Mask,
    Profile, RefineParams, RustBackend, classify, composite, refine,
};
use crate::types::{BatchReport, ExtractionReport, FileReport};
use image::RgbaImage;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Output {} is already written by {}", output.display(), claimed_by.display())]
    OutputConflict { output: PathBuf, claimed_by: PathBuf },
}

/// Progress events emitted during batch processing.
///
/// Sent through an optional `Sender` so the caller can display progress
/// while rayon workers are still running. Events for different files may
/// arrive in any order; `index` is the file's position in the input list.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        total: usize,
    },
    ImageProcessed {
        index: usize,
        source: String,
        output: String,
        report: ExtractionReport,
    },
    ImageFailed {
        index: usize,
        source: String,
        error: String,
    },
}

/// An extracted image and what happened to it.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub image: RgbaImage,
    pub report: ExtractionReport,
}

/// Run the pipeline on an in-memory image.
pub fn extract_subject(image: RgbaImage, config: &CutoutConfig) -> Extraction {
    extract_from_source(ImageSource::new(image, config.opaque_threshold), config)
}

/// Run the pipeline on an already-loaded source.
pub fn extract_from_source(source: ImageSource, config: &CutoutConfig) -> Extraction {
    let method = config.method;
    let profile = config.profile();
    let (width, height) = source.image().dimensions();
    let area = width as usize * height as usize;
    let opaque_pixels = source.opaque_pixels();

    if source.is_fully_transparent() {
        debug!(width, height, "no opaque pixels, passing through");
        let (image, _) = source.into_parts();
        return Extraction {
            image,
            report: ExtractionReport {
                width,
                height,
                method,
                opaque_pixels: 0,
                subject_pixels: 0,
                coverage: 0.0,
                coverage_basis: profile.coverage.basis,
                passes: 0,
                fallback_used: false,
                passthrough: true,
            },
        };
    }

    let bounds = ContentBounds::from_opaque(source.opaque());
    let mut mask = run_pass(&source, &bounds, &profile.primary, &profile.refine);
    let mut passes = 1;
    let mut fallback_used = false;

    let coverage = profile.coverage.ratio(mask.count(), opaque_pixels, area);
    debug!(
        pass = 1,
        subject_pixels = mask.count(),
        opaque_pixels,
        coverage,
        "classification pass"
    );

    if undercovered(profile, &mask, opaque_pixels, area) {
        info!(
            coverage,
            min_ratio = profile.coverage.min_ratio,
            "coverage below threshold, retrying with fallback parameters"
        );
        mask = run_pass(&source, &bounds, &profile.fallback, &profile.refine);
        passes = 2;
        fallback_used = true;
        debug!(pass = 2, subject_pixels = mask.count(), "classification pass");
    }

    let subject_pixels = mask.count();
    let coverage = profile.coverage.ratio(subject_pixels, opaque_pixels, area);
    let (mut image, _) = source.into_parts();
    composite(&mut image, &mask);

    Extraction {
        image,
        report: ExtractionReport {
            width,
            height,
            method,
            opaque_pixels,
            subject_pixels,
            coverage,
            coverage_basis: profile.coverage.basis,
            passes,
            fallback_used,
            passthrough: false,
        },
    }
}

fn undercovered(profile: &Profile, mask: &Mask, opaque_pixels: usize, area: usize) -> bool {
    profile
        .coverage
        .is_undercovered(mask.count(), opaque_pixels, area)
}

/// Classify with `params`, clean up, and clip back to the opaque map.
fn run_pass(
    source: &ImageSource,
    content: &ContentBounds,
    params: &ClassificationParams,
    refine_params: &RefineParams,
) -> Mask {
    let bounds = match params.anchor {
        Anchor::Content => *content,
        Anchor::Canvas => {
            let (width, height) = source.image().dimensions();
            ContentBounds::canvas(width, height)
        }
    };
    let raw = classify(source.image(), source.opaque(), &bounds, params);
    refine(&raw, refine_params).intersect(source.opaque())
}

/// Extract the subject of `input` and write it to `output` as PNG.
///
/// `input` and `output` may be the same path.
pub fn process(
    input: &Path,
    output: &Path,
    config: &CutoutConfig,
) -> Result<ExtractionReport, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, input, output, config)
}

/// Process one image using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    config: &CutoutConfig,
) -> Result<ExtractionReport, ProcessError> {
    config.validate()?;
    process_validated(backend, input, output, config)
}

fn process_validated(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    config: &CutoutConfig,
) -> Result<ExtractionReport, ProcessError> {
    let source = ImageSource::load(backend, input, config.opaque_threshold)?;
    let extraction = extract_from_source(source, config);
    backend.save_png(&extraction.image, output)?;
    Ok(extraction.report)
}

/// Where a batch writes the result for `input`.
///
/// Without an output directory the result replaces the input (or sits next
/// to it, for non-PNG sources). With one, it is `output_dir/<stem>.png`.
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let png = input.with_extension("png");
    match (output_dir, png.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => png,
    }
}

/// Process every file in `files`, in parallel, with the production backend.
pub fn process_batch(
    files: &[PathBuf],
    output_dir: Option<&Path>,
    config: &CutoutConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let backend = RustBackend::new();
    process_batch_with_backend(&backend, files, output_dir, config, events)
}

/// Process a batch using a specific backend (allows testing with mock).
///
/// Only an invalid config or an uncreatable output directory fail the whole
/// call; per-file errors end up in the report.
pub fn process_batch_with_backend(
    backend: &impl ImageBackend,
    files: &[PathBuf],
    output_dir: Option<&Path>,
    config: &CutoutConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    config.validate()?;
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let emit = |event: ProcessEvent| {
        if let Some(tx) = &events {
            // receiver gone means nobody is listening; keep working
            let _ = tx.send(event);
        }
    };
    emit(ProcessEvent::Started { total: files.len() });
    info!(files = files.len(), method = %config.method, "starting batch");

    let outputs: Vec<PathBuf> = files.iter().map(|f| output_path(f, output_dir)).collect();
    let claims = claim_outputs(files, &outputs);

    let reports: Vec<FileReport> = files
        .par_iter()
        .zip(outputs.par_iter())
        .zip(claims.par_iter())
        .enumerate()
        .map(|(index, ((input, output), claimed_by))| {
            let source = input.to_string_lossy().into_owned();
            let output_str = output.to_string_lossy().into_owned();

            let result = match claimed_by {
                Some(first) => Err(ProcessError::OutputConflict {
                    output: output.clone(),
                    claimed_by: first.clone(),
                }),
                None => process_validated(backend, input, output, config),
            };
            match result {
                Ok(report) => {
                    emit(ProcessEvent::ImageProcessed {
                        index,
                        source: source.clone(),
                        output: output_str.clone(),
                        report: report.clone(),
                    });
                    FileReport {
                        source,
                        output: output_str,
                        report: Some(report),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(file = %input.display(), error = %e, "failed to process image");
                    let error = e.to_string();
                    emit(ProcessEvent::ImageFailed {
                        index,
                        source: source.clone(),
                        error: error.clone(),
                    });
                    FileReport {
                        source,
                        output: output_str,
                        report: None,
                        error: Some(error),
                    }
                }
            }
        })
        .collect();

    Ok(BatchReport { files: reports })
}

/// For each file, the earlier input already writing to the same output.
fn claim_outputs(files: &[PathBuf], outputs: &[PathBuf]) -> Vec<Option<PathBuf>> {
    let mut owners: HashMap<&Path, &Path> = HashMap::new();
    files
        .iter()
        .zip(outputs)
        .map(|(input, output)| {
            let owner = *owners.entry(output.as_path()).or_insert(input.as_path());
            (owner != input.as_path()).then(|| owner.to_path_buf())
        })
        .collect()
}

/// Write `report` as pretty JSON.
pub fn write_report(report: &BatchReport, path: &Path) -> Result<(), ProcessError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
