//! Shared test utilities for the cutout test suite.
//!
//! Synthetic images are built in memory so pixel-level expectations stay
//! exact. `write_png` puts them on disk for tests that go through the real
//! backend.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut img = canvas(20, 20, NEAR_WHITE);
//! paint_block(&mut img, 7, 7, 6, RED);
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "cat_01.png", &img);
//! ```

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::imaging::{ImageBackend, RustBackend};

/// Typical scanned-paper background.
pub const NEAR_WHITE: [u8; 4] = [250, 250, 250, 255];
/// Strongly saturated subject color.
pub const RED: [u8; 4] = [200, 30, 30, 255];
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

// =========================================================================
// Synthetic images
// =========================================================================

/// A `width × height` image filled with one color.
pub fn canvas(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Paint the square `x0..x0+size × y0..y0+size`, clipped to the image.
pub fn paint_block(image: &mut RgbaImage, x0: u32, y0: u32, size: u32, color: [u8; 4]) {
    let (width, height) = image.dimensions();
    for y in y0..(y0 + size).min(height) {
        for x in x0..(x0 + size).min(width) {
            image.put_pixel(x, y, Rgba(color));
        }
    }
}

/// The 20×20 near-white canvas with a centered 6×6 red block.
pub fn red_block_scene() -> RgbaImage {
    let mut img = canvas(20, 20, NEAR_WHITE);
    paint_block(&mut img, 7, 7, 6, RED);
    img
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert that no pixel's alpha went up between `before` and `after`.
pub fn assert_alpha_not_raised(before: &RgbaImage, after: &RgbaImage) {
    assert_eq!(before.dimensions(), after.dimensions(), "dimensions changed");
    for ((x, y, b), a) in before.enumerate_pixels().zip(after.pixels()) {
        assert!(
            a[3] <= b[3],
            "alpha raised at ({x}, {y}): {} -> {}",
            b[3],
            a[3]
        );
    }
}

/// Assert that every RGB value is untouched.
pub fn assert_colors_unchanged(before: &RgbaImage, after: &RgbaImage) {
    for ((x, y, b), a) in before.enumerate_pixels().zip(after.pixels()) {
        assert_eq!(&b.0[..3], &a.0[..3], "color changed at ({x}, {y})");
    }
}

// =========================================================================
// Fixture files
// =========================================================================

/// Encode `image` as `dir/name` through the production backend.
pub fn write_png(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.join(name);
    RustBackend::new().save_png(image, &path).unwrap();
    path
}
