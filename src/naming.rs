//! Canonical file naming for batch inputs.
//!
//! Exported photo sets usually arrive as `photo (1).png`, `photo (2).png`, …
//! with gaps and out-of-order numbers. The batch driver wants a dense
//! `cat_01.png`, `cat_02.png`, … sequence instead. This module plans and
//! applies that renaming.
//!
//! ## Ordering
//!
//! - Files carrying a `(N)` sequence number are ordered by `N`
//!   (ties broken by file name).
//! - An optional *lead* file (named explicitly, no number needed) sorts
//!   before all of them.
//! - Everything else is left alone.
//!
//! ```text
//! legend.png        → cat_01.png   (lead)
//! photo (2).png     → cat_02.png
//! photo (7).png     → cat_03.png
//! photo (10).png    → cat_04.png
//! readme.png          untouched
//! ```
//!
//! Renaming happens in two phases (everything to a temporary name, then
//! everything to its target) so a plan that swaps two names never clobbers
//! a file.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Refusing to overwrite {0}: it is not part of the rename plan")]
    Collision(PathBuf),
}

/// How targets are named.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameOptions {
    /// Prepended to the two-digit index (`cat_` → `cat_01`).
    pub prefix: String,
    /// Only files with this extension are considered; also the target extension.
    pub extension: String,
    /// File name that sorts first regardless of numbering.
    pub lead: Option<String>,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            prefix: "cat_".to_string(),
            extension: "png".to_string(),
            lead: None,
        }
    }
}

/// One planned rename. `from == to` means the file is already in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameStep {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RenameStep {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Extract `N` from the first `(N)` in a file name.
///
/// - `"photo (12).png"` → `Some(12)`
/// - `"IMG (3) copy (9).png"` → `Some(3)`
/// - `"photo ().png"`, `"photo (x).png"`, `"photo.png"` → `None`
pub fn parse_sequence_number(name: &str) -> Option<u32> {
    let mut rest = name;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        let digits = after
            .find(|c: char| !c.is_ascii_digit())
            .map_or(after, |end| &after[..end]);
        if !digits.is_empty()
            && after[digits.len()..].starts_with(')')
            && let Ok(n) = digits.parse()
        {
            return Some(n);
        }
        rest = after;
    }
    None
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Order the numbered (and lead) files among `files` and assign targets.
///
/// Targets live next to their source. Fails with [`RenameError::Collision`]
/// if a target already exists on disk and is not itself being renamed.
pub fn plan_renames(
    files: &[PathBuf],
    options: &RenameOptions,
) -> Result<Vec<RenameStep>, RenameError> {
    let mut ranked: Vec<(u32, String, &PathBuf)> = files
        .iter()
        .filter(|path| has_extension(path, &options.extension))
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let rank = if options.lead.as_deref() == Some(name) {
                0
            } else {
                // lead takes slot 0, so numbered files start at 1
                parse_sequence_number(name)?.saturating_add(1)
            };
            Some((rank, name.to_string(), path))
        })
        .collect();
    ranked.sort();

    let steps: Vec<RenameStep> = ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (_, _, path))| RenameStep {
            from: path.clone(),
            to: path.with_file_name(format!(
                "{}{:02}.{}",
                options.prefix,
                idx + 1,
                options.extension
            )),
        })
        .collect();

    for step in &steps {
        let claimed = steps.iter().any(|s| s.from == step.to);
        if !claimed && step.to.exists() {
            return Err(RenameError::Collision(step.to.clone()));
        }
    }
    Ok(steps)
}

/// Plan renames for the files directly inside `dir`.
pub fn plan_directory(dir: &Path, options: &RenameOptions) -> Result<Vec<RenameStep>, RenameError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    plan_renames(&files, options)
}

/// Execute a plan. Returns the number of files actually renamed.
///
/// On failure every file is put back under its original name before the
/// error is returned, so nothing is left behind under a temporary name.
pub fn apply_renames(steps: &[RenameStep]) -> Result<usize, RenameError> {
    let moving: Vec<&RenameStep> = steps.iter().filter(|s| !s.is_noop()).collect();

    let mut staged: Vec<(PathBuf, &RenameStep)> = Vec::with_capacity(moving.len());
    for (i, step) in moving.iter().copied().enumerate() {
        let temp = step
            .from
            .with_file_name(format!(".cutout-rename-{}-{i}.tmp", std::process::id()));
        let result = if temp.exists() {
            Err(RenameError::Collision(temp.clone()))
        } else {
            fs::rename(&step.from, &temp).map_err(RenameError::from)
        };
        if let Err(e) = result {
            roll_back(&staged, 0);
            return Err(e);
        }
        staged.push((temp, step));
    }

    for (committed, (temp, step)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(temp, &step.to) {
            roll_back(&staged, committed);
            return Err(e.into());
        }
        tracing::debug!(to = %step.to.display(), "renamed");
    }
    Ok(staged.len())
}

/// Undo a partially applied plan: the first `committed` entries already sit
/// at their targets, the rest at their temporary names.
fn roll_back(staged: &[(PathBuf, &RenameStep)], committed: usize) {
    for (temp, step) in staged[..committed].iter().rev() {
        if let Err(e) = fs::rename(&step.to, temp) {
            tracing::warn!(file = %step.to.display(), error = %e, "could not undo rename");
        }
    }
    for (temp, step) in staged.iter().rev() {
        if let Err(e) = fs::rename(temp, &step.from) {
            tracing::warn!(
                file = %temp.display(),
                original = %step.from.display(),
                error = %e,
                "could not restore original name"
            );
        }
    }
}
