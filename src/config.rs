//! Extraction configuration module.
//!
//! Handles loading, validating, and merging `cutout.toml` files. Stock
//! defaults are the tuned values of both methods; a user file overrides only
//! the keys it names.
//!
//! ## Config File Location
//!
//! `cutout batch <DIR>` looks for `cutout.toml` in `<DIR>`. Any command
//! accepts `--config FILE` to point somewhere else.
//!
//! ```text
//! cats/
//! ├── cutout.toml     # optional
//! ├── cat_01.png
//! └── cat_02.png
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! method = "advanced"       # or "basic"
//! opaque_threshold = 10     # alpha above this counts as opaque
//!
//! [advanced.primary]
//! white_cutoff = 240
//! light_mean_cutoff = 235.0
//! saturation_cutoff = 0.15
//! edge_band = 0.05
//! core_radius = 1.2
//! interior = { within = 1.5 }
//! anchor = "content"
//!
//! [advanced.refine]
//! open = 2
//! close = 3
//! fill_holes = true
//!
//! [advanced.coverage]
//! min_ratio = 0.3
//! basis = "opaque"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [batch]
//! pattern = "cat_*.png"
//! recursive = false
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Be a little more forgiving about off-white paper
//! [advanced.primary]
//! white_cutoff = 230
//! ```
//!
//! Optional thresholds (`light_mean_cutoff`, `min_texture_variance`,
//! `saturation_cutoff`) can be added to any preset, but a preset that has one
//! by default cannot drop it through an overlay.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ClassificationParams, InteriorReach, Method, Profile, RefineParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in a batch directory.
pub const CONFIG_FILE_NAME: &str = "cutout.toml";

/// Largest structuring element accepted for opening or closing.
pub const MAX_ELEMENT_SIZE: u32 = 15;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Extraction configuration loaded from `cutout.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CutoutConfig {
    /// Which profile `extract` and `batch` use.
    pub method: Method,
    /// Alpha values above this count as opaque.
    pub opaque_threshold: u8,
    /// Profile for `method = "advanced"`.
    pub advanced: Profile,
    /// Profile for `method = "basic"`.
    pub basic: Profile,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Batch file selection.
    pub batch: BatchConfig,
}

impl Default for CutoutConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            opaque_threshold: crate::imaging::source::DEFAULT_OPAQUE_THRESHOLD,
            advanced: Profile::advanced(),
            basic: Profile::basic(),
            processing: ProcessingConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl CutoutConfig {
    /// The profile selected by [`method`](Self::method).
    pub fn profile(&self) -> &Profile {
        match self.method {
            Method::Advanced => &self.advanced,
            Method::Basic => &self.basic,
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_profile("advanced", &self.advanced)?;
        validate_profile("basic", &self.basic)?;
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.batch.pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "batch.pattern must not be empty".into(),
            ));
        }
        if let Err(e) = glob::Pattern::new(&self.batch.pattern) {
            return Err(ConfigError::Validation(format!(
                "batch.pattern is not a valid glob: {e}"
            )));
        }
        Ok(())
    }
}

fn validate_profile(name: &str, profile: &Profile) -> Result<(), ConfigError> {
    validate_params(&format!("{name}.primary"), &profile.primary)?;
    validate_params(&format!("{name}.fallback"), &profile.fallback)?;
    validate_refine(&format!("{name}.refine"), &profile.refine)?;
    let ratio = profile.coverage.min_ratio;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ConfigError::Validation(format!(
            "{name}.coverage.min_ratio must be 0-1, got {ratio}"
        )));
    }
    Ok(())
}

fn validate_params(section: &str, params: &ClassificationParams) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::Validation(format!("{section}.{msg}")));

    if !(0.0..0.5).contains(&params.edge_band) {
        return invalid(format!("edge_band must be in [0, 0.5), got {}", params.edge_band));
    }
    if !(params.core_radius >= 0.0 && params.core_radius.is_finite()) {
        return invalid(format!(
            "core_radius must be a non-negative number, got {}",
            params.core_radius
        ));
    }
    if let Some(limit) = params.light_mean_cutoff
        && !(0.0..=255.0).contains(&limit)
    {
        return invalid(format!("light_mean_cutoff must be 0-255, got {limit}"));
    }
    if let Some(floor) = params.min_texture_variance
        && !(floor >= 0.0 && floor.is_finite())
    {
        return invalid(format!(
            "min_texture_variance must be a non-negative number, got {floor}"
        ));
    }
    if let Some(cutoff) = params.saturation_cutoff
        && !(0.0..=1.0).contains(&cutoff)
    {
        return invalid(format!("saturation_cutoff must be 0-1, got {cutoff}"));
    }
    if let InteriorReach::Within(multiplier) = params.interior
        && !(multiplier >= 0.0 && multiplier.is_finite())
    {
        return invalid(format!(
            "interior.within must be a non-negative number, got {multiplier}"
        ));
    }
    Ok(())
}

fn validate_refine(section: &str, refine: &RefineParams) -> Result<(), ConfigError> {
    for (key, size) in [("open", refine.open), ("close", refine.close)] {
        if size > MAX_ELEMENT_SIZE {
            return Err(ConfigError::Validation(format!(
                "{section}.{key} must be at most {MAX_ELEMENT_SIZE}, got {size}"
            )));
        }
    }
    Ok(())
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Which files `batch` picks up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Glob matched against file names (not paths).
    pub pattern: String,
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pattern: "cat_*.png".to_string(),
            recursive: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CutoutConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<CutoutConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CutoutConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `cutout.toml` in the given directory.
///
/// Falls back to stock defaults when the directory has no config file.
pub fn load_config(dir: &Path) -> Result<CutoutConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    if overlay.is_some() {
        tracing::debug!(dir = %dir.display(), "loaded {CONFIG_FILE_NAME}");
    }
    resolve_config(overlay)
}

/// Load config from an explicit path. A missing file is an error here.
pub fn load_config_file(path: &Path) -> Result<CutoutConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `cutout.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Cutout Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# `cutout batch DIR` reads DIR/cutout.toml; any command accepts --config FILE.
# Unknown keys will cause an error.

# Extraction method: "advanced" or "basic".
method = "advanced"

# Alpha values above this count as opaque (0-255).
opaque_threshold = 10

# ---------------------------------------------------------------------------
# Advanced method: strict pass, relaxed fallback
# ---------------------------------------------------------------------------
# A pixel is subject when it is opaque, not whitish, passes the texture floor
# (if set), and either:
#   - lies within radius * core_radius of the content center, or
#   - lies outside the edge band and is saturated, or
#   - lies outside the edge band and the interior reach admits it.
#
# The radius is half the larger side of the opaque bounding box
# (anchor = "content"), or a third of the shorter canvas side
# (anchor = "canvas").
[advanced.primary]
# Every channel above this value -> whitish.
white_cutoff = 240
# Mean of the channels above this value -> whitish too (optional).
light_mean_cutoff = 235.0
# (max - min) / max above this -> saturated (optional).
saturation_cutoff = 0.15
# Fraction of each side treated as the border band.
edge_band = 0.05
core_radius = 1.2
# "off", "anywhere", or { within = multiplier }.
interior = { within = 1.5 }
anchor = "content"
# Local color variance floor over an 11x11 window (optional).
# min_texture_variance = 100.0

# Used when the primary pass covers too little of the opaque area.
[advanced.fallback]
white_cutoff = 240
edge_band = 0.05
core_radius = 1.5
interior = "anywhere"
anchor = "content"

# Square structuring elements; 0 or 1 disables a step.
[advanced.refine]
open = 2
close = 3
fill_holes = true

# Under-covered when subject / basis < min_ratio.
# basis: "opaque" (opaque pixels) or "canvas" (width * height).
[advanced.coverage]
min_ratio = 0.3
basis = "opaque"

# ---------------------------------------------------------------------------
# Basic method: texture near the canvas center
# ---------------------------------------------------------------------------
[basic.primary]
white_cutoff = 220
min_texture_variance = 100.0
edge_band = 0.05
core_radius = 1.5
interior = "off"
anchor = "canvas"

[basic.fallback]
white_cutoff = 220
edge_band = 0.05
core_radius = 2.0
interior = "off"
anchor = "canvas"

[basic.refine]
open = 3
close = 5
fill_holes = true

[basic.coverage]
min_ratio = 0.1
basis = "canvas"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Batch selection
# ---------------------------------------------------------------------------
[batch]
# Glob matched against file names.
pattern = "cat_*.png"
# Descend into subdirectories.
recursive = false
"##
}
