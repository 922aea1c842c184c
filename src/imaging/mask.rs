//! Boolean pixel grids.
//!
//! [`Mask`] is the one grid type used throughout the pipeline: the opaque map
//! built from the source alpha channel and every subject mask the classifier
//! and refiner produce are all `Mask` values of the same dimensions as the
//! image they describe.
//!
//! Storage is row-major (`index = y * width + x`), which lets the classifier
//! fill rows in parallel with `par_chunks_mut(width)`.

use image::RgbaImage;

/// A `width × height` grid of booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// An all-`false` mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Pixels whose alpha is strictly above `threshold`.
    pub fn opaque(image: &RgbaImage, threshold: u8) -> Self {
        let (width, height) = image.dimensions();
        let data = image.pixels().map(|p| p[3] > threshold).collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Value at `(x, y)`. Out-of-range coordinates read as `false`.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[self.index(x, y)]
    }

    /// Signed lookup used by neighborhood operators; `None` when outside the grid.
    pub(crate) fn get_signed(&self, x: i64, y: i64) -> Option<bool> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(self.data[self.index(x as u32, y as u32)])
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    /// Number of `true` pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Total number of pixels (`width × height`).
    pub fn area(&self) -> usize {
        self.data.len()
    }

    /// Pixel-wise AND with another mask of the same dimensions.
    pub fn intersect(mut self, other: &Mask) -> Mask {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a &= b;
        }
        self
    }

    /// `true` when every set pixel of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &Mask) -> bool {
        self.dimensions() == other.dimensions()
            && self.data.iter().zip(&other.data).all(|(&a, &b)| !a || b)
    }

    /// Coordinates of every `true` pixel, in row-major order.
    pub fn iter_set(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [bool] {
        &mut self.data
    }
}
