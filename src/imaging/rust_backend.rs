//! Pure Rust I/O backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Normalize to RGBA8 | `DynamicImage::into_rgba8` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` into memory |
//! | Atomic write | sibling temp file + `std::fs::rename` |

use super::backend::{BackendError, ImageBackend};
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`] (case-insensitive).
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// `image`-crate backend. See the [module docs](self) for the crate mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image from disk, sniffing the format from its contents.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let decode_error = |e: &dyn std::fmt::Display| BackendError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_error(&e))
}

/// Convert any supported color type to RGBA8; missing alpha becomes 255.
pub fn normalize_rgba(image: DynamicImage, path: &Path) -> Result<RgbaImage, BackendError> {
    match image.color() {
        ColorType::L8
        | ColorType::La8
        | ColorType::Rgb8
        | ColorType::Rgba8
        | ColorType::L16
        | ColorType::La16
        | ColorType::Rgb16
        | ColorType::Rgba16
        | ColorType::Rgb32F
        | ColorType::Rgba32F => Ok(image.into_rgba8()),
        other => Err(BackendError::UnsupportedFormat {
            path: path.to_path_buf(),
            color: format!("{other:?}"),
        }),
    }
}

/// Encode RGBA8 pixels as PNG into memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling path used while writing `path`.
///
/// Unique per call within the process, so concurrent writers never share a
/// temp file.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}-{seq}.cutout-tmp", std::process::id()))
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<RgbaImage, BackendError> {
        let image = load_image(path)?;
        normalize_rgba(image, path)
    }

    fn save_png(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError> {
        let bytes = encode_png(image).map_err(|e| BackendError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let tmp = temp_sibling(path);
        if let Err(e) = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(BackendError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}
