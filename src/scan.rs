//! Batch file discovery.
//!
//! Lists the images a `batch` run should touch: regular files whose *name*
//! matches a glob (default `cat_*.png`) and whose extension has a decoder.
//!
//! ```text
//! cats/
//! ├── cutout.toml        # ignored: not an image
//! ├── cat_01.png         # ✓
//! ├── cat_02.png         # ✓
//! ├── .cat_03.png.tmp    # ignored: hidden
//! ├── notes.png          # ignored: does not match the pattern
//! └── extra/
//!     └── cat_10.png     # ✓ only with --recursive
//! ```
//!
//! Results are sorted by path so batch output and reports are stable.

use crate::imaging::rust_backend::has_supported_extension;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// List files under `dir` whose name matches `pattern`, sorted by path.
///
/// Hidden files and directories are skipped. Without `recursive` only the
/// top level of `dir` is read.
pub fn scan(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }
    let matcher = glob::Pattern::new(pattern)?;

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| matcher.matches(name));
        if matches && has_supported_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::debug!(
        dir = %dir.display(),
        pattern,
        recursive,
        found = files.len(),
        "scanned batch directory"
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn setup() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for name in [
            "cat_02.png",
            "cat_01.png",
            "cat_10.png",
            "notes.png",
            "cat_03.txt",
            ".cat_04.png",
            "cutout.toml",
            "nested/cat_05.png",
            ".hidden/cat_06.png",
        ] {
            touch(&root.join(name));
        }
        tmp
    }

    #[test]
    fn matches_pattern_sorted() {
        let tmp = setup();
        let files = scan(tmp.path(), "cat_*.png", false).unwrap();
        assert_eq!(
            names(&files, tmp.path()),
            vec!["cat_01.png", "cat_02.png", "cat_10.png"]
        );
    }

    #[test]
    fn recursive_descends_but_skips_hidden_dirs() {
        let tmp = setup();
        let files = scan(tmp.path(), "cat_*.png", true).unwrap();
        assert_eq!(
            names(&files, tmp.path()),
            vec!["cat_01.png", "cat_02.png", "cat_10.png", "nested/cat_05.png"]
        );
    }

    #[test]
    fn non_image_extensions_are_skipped_even_if_matched() {
        let tmp = setup();
        let files = scan(tmp.path(), "*", false).unwrap();
        assert_eq!(
            names(&files, tmp.path()),
            vec!["cat_01.png", "cat_02.png", "cat_10.png", "notes.png"]
        );
    }

    #[test]
    fn empty_directory_is_empty_list() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(tmp.path(), "cat_*.png", true).unwrap().is_empty());
    }

    #[test]
    fn file_instead_of_directory_is_error() {
        let tmp = setup();
        let err = scan(&tmp.path().join("cat_01.png"), "*", false).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn invalid_pattern_is_error() {
        let tmp = setup();
        let err = scan(tmp.path(), "cat_[.png", false).unwrap_err();
        assert!(matches!(err, ScanError::Pattern(_)));
    }
}
