//! Image I/O backend trait and shared error type.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs
//! from the outside world: decode a file into RGBA8 and write RGBA8 back out
//! as PNG. Everything between those two calls is pure pixel work.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below to exercise the
//! pipeline without touching the filesystem.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Unsupported pixel format in {path}: {color}")]
    UnsupportedFormat { path: PathBuf, color: String },
    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Trait for image I/O backends.
///
/// `Sync` so one backend can be shared across rayon workers in a batch.
pub trait ImageBackend: Sync {
    /// Decode `path` and normalize it to four 8-bit channels.
    ///
    /// Sources without an alpha channel come back fully opaque.
    fn load(&self, path: &Path) -> Result<RgbaImage, BackendError>;

    /// Encode `image` as PNG at `path`, replacing any existing file.
    ///
    /// Implementations must not leave a partially written file behind.
    fn save_png(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError>;
}
