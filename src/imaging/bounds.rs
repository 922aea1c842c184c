//! Where the subject roughly is, before any classification.
//!
//! Sources often arrive with partial transparency already applied, so the
//! tight box around the opaque pixels is a better guess at the subject's
//! position than the canvas center. All arithmetic is integer (floor)
//! division, matching how the thresholds were tuned.

use super::mask::Mask;

/// Bounding box of opaque content plus the derived centroid and radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
    pub center_row: u32,
    pub center_col: u32,
    /// Estimated subject radius in pixels.
    pub radius: u32,
    /// `true` when derived from the canvas rather than from opaque content.
    pub degenerate: bool,
}

impl ContentBounds {
    /// Tight bounds of the `true` pixels in `opaque`.
    ///
    /// Falls back to [`ContentBounds::canvas`] when nothing is opaque; the
    /// pipeline treats that case as a passthrough.
    pub fn from_opaque(opaque: &Mask) -> Self {
        let mut extent: Option<(u32, u32, u32, u32)> = None;
        for (x, y) in opaque.iter_set() {
            extent = Some(match extent {
                None => (y, y, x, x),
                Some((r0, r1, c0, c1)) => (r0.min(y), r1.max(y), c0.min(x), c1.max(x)),
            });
        }

        let Some((min_row, max_row, min_col, max_col)) = extent else {
            return Self::canvas(opaque.width(), opaque.height());
        };

        let bbox_height = max_row - min_row;
        let bbox_width = max_col - min_col;
        Self {
            min_row,
            max_row,
            min_col,
            max_col,
            center_row: (min_row + max_row) / 2,
            center_col: (min_col + max_col) / 2,
            radius: bbox_height.max(bbox_width) / 2,
            degenerate: false,
        }
    }

    /// The whole canvas, centered on the image with radius `min(h, w) / 3`.
    pub fn canvas(width: u32, height: u32) -> Self {
        Self {
            min_row: 0,
            max_row: height.saturating_sub(1),
            min_col: 0,
            max_col: width.saturating_sub(1),
            center_row: height / 2,
            center_col: width / 2,
            radius: height.min(width) / 3,
            degenerate: true,
        }
    }

    /// Euclidean distance from `(x, y)` to the centroid.
    pub fn distance_to_center(&self, x: u32, y: u32) -> f64 {
        let dy = f64::from(y) - f64::from(self.center_row);
        let dx = f64::from(x) - f64::from(self.center_col);
        (dy * dy + dx * dx).sqrt()
    }
}
