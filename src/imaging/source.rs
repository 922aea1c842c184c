//! A decoded source image together with its opaque-pixel map.

use super::backend::{BackendError, ImageBackend};
use super::mask::Mask;
use image::RgbaImage;
use std::path::Path;

/// Alpha values at or below this are treated as transparent.
pub const DEFAULT_OPAQUE_THRESHOLD: u8 = 10;

/// RGBA8 pixels plus the `alpha > threshold` map derived from them.
///
/// The opaque map is computed once here and never recomputed, even after the
/// compositor lowers alpha.
#[derive(Debug, Clone)]
pub struct ImageSource {
    image: RgbaImage,
    opaque: Mask,
}

impl ImageSource {
    pub fn new(image: RgbaImage, threshold: u8) -> Self {
        let opaque = Mask::opaque(&image, threshold);
        Self { image, opaque }
    }

    /// Decode `path` through `backend` and build the opaque map.
    pub fn load(
        backend: &impl ImageBackend,
        path: &Path,
        threshold: u8,
    ) -> Result<Self, BackendError> {
        let image = backend.load(path)?;
        Ok(Self::new(image, threshold))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn opaque(&self) -> &Mask {
        &self.opaque
    }

    pub fn opaque_pixels(&self) -> usize {
        self.opaque.count()
    }

    /// No pixel clears the threshold; extraction leaves such images alone.
    pub fn is_fully_transparent(&self) -> bool {
        self.opaque.is_empty()
    }

    pub fn into_parts(self) -> (RgbaImage, Mask) {
        (self.image, self.opaque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use image::Rgba;

    #[test]
    fn threshold_is_exclusive() {
        let mut img = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 10]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 11]));
        let source = ImageSource::new(img, DEFAULT_OPAQUE_THRESHOLD);
        assert_eq!(source.opaque_pixels(), 1);
        assert!(source.opaque().get(2, 0));
        assert!(!source.is_fully_transparent());
    }

    #[test]
    fn fully_transparent_image() {
        let source = ImageSource::new(RgbaImage::new(4, 4), DEFAULT_OPAQUE_THRESHOLD);
        assert!(source.is_fully_transparent());
    }

    #[test]
    fn load_goes_through_backend() {
        let backend = MockBackend::with_image(
            "/in/cat_01.png",
            RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])),
        );
        let source = ImageSource::load(&backend, Path::new("/in/cat_01.png"), 10).unwrap();
        assert_eq!(source.opaque_pixels(), 4);

        let err = ImageSource::load(&backend, Path::new("/in/nope.png"), 10).unwrap_err();
        assert!(matches!(err, BackendError::Decode { .. }));
    }
}
