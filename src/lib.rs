//! # Cutout
//!
//! Heuristic subject extraction for flat-background artwork. Given images of
//! a single dominant subject on a mostly white or near-white background (the
//! typical scan or screenshot), cutout makes the background transparent and
//! keeps the subject, writing PNGs with a real alpha matte.
//!
//! No models, no user interaction: every pixel is scored on simple RGB
//! features and the resulting mask is cleaned up with binary morphology.
//!
//! # Architecture: One Pipeline, Two Passes
//!
//! ```text
//! 1. Load        file      →  RGBA8 + opaque map
//! 2. Classify    pixels    →  subject mask          (texture, whiteness, distance, saturation, edge band)
//! 3. Refine      mask      →  mask                  (opening, closing, hole fill, clip to opaque)
//! 4. Check       coverage  →  maybe repeat 2–3 once with relaxed thresholds
//! 5. Composite   mask      →  alpha = 0 outside the subject
//! ```
//!
//! Both extraction methods (`advanced` and `basic`) are this same pipeline
//! with different [`Profile`](imaging::Profile) data; only the thresholds
//! differ.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel stages: opaque map, bounds, classifier, morphology, compositing, PNG I/O |
//! | [`process`] | Per-image pipeline with coverage fallback, and the parallel batch driver |
//! | [`config`] | `cutout.toml` loading, merging onto stock defaults, and validation |
//! | [`scan`] | Batch file discovery by name pattern |
//! | [`naming`] | Canonical `cat_NN` renaming of `photo (N)` style files |
//! | [`types`] | Serializable per-image and per-batch reports |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Presets Are Data
//!
//! The classifier has a single decision rule. Strict, relaxed, basic and
//! basic-relaxed behavior come from [`ClassificationParams`](imaging::ClassificationParams)
//! values, all of which can be tuned in `cutout.toml` without code changes.
//!
//! ## Output Never Gains Alpha
//!
//! The refined mask is intersected with the source's opaque map, and the
//! compositor only ever lowers alpha to zero. Running cutout on its own
//! output changes nothing.
//!
//! ## Atomic Writes
//!
//! PNGs are encoded in memory and renamed into place, so overwriting the
//! inputs of a batch is safe even if the process dies halfway.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
