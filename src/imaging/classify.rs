//! Per-pixel subject classification.
//!
//! Every opaque pixel is judged on five features:
//!
//! | Feature | Measure |
//! |---|---|
//! | Texture | mean per-channel variance over the clamped 11×11 window (opaque pixels only) |
//! | Whiteness | all channels above `white_cutoff`, or mean above `light_mean_cutoff` |
//! | Proximity | distance to the anchor centroid vs `radius × multiplier` |
//! | Saturation | `(max − min) / max` |
//! | Edge band | within `edge_band` of any side of the canvas |
//!
//! The decision rule is the same for every preset; only the
//! [`ClassificationParams`] differ. Each pixel reads a fixed window of the
//! immutable source, so rows are classified in parallel with rayon.

use super::bounds::ContentBounds;
use super::mask::Mask;
use super::params::ClassificationParams;
use image::RgbaImage;
use rayon::prelude::*;

/// Half-width of the texture window (11×11).
pub const TEXTURE_RADIUS: u32 = 5;

/// Classify every pixel of `image`.
///
/// `bounds` supplies the centroid and radius for the proximity test; the
/// caller resolves the params' [`Anchor`](super::params::Anchor) before
/// calling. Pixels outside `opaque` are never subject.
pub fn classify(
    image: &RgbaImage,
    opaque: &Mask,
    bounds: &ContentBounds,
    params: &ClassificationParams,
) -> Mask {
    let (width, height) = image.dimensions();
    let mut mask = Mask::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    mask.as_mut_slice()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, out)| {
            let y = row as u32;
            for (x, slot) in (0..width).zip(out.iter_mut()) {
                *slot = opaque.get(x, y) && is_subject(image, opaque, bounds, params, x, y);
            }
        });

    mask
}

/// Decision for a single opaque pixel.
fn is_subject(
    image: &RgbaImage,
    opaque: &Mask,
    bounds: &ContentBounds,
    params: &ClassificationParams,
    x: u32,
    y: u32,
) -> bool {
    let [r, g, b, _] = image.get_pixel(x, y).0;

    if is_whitish(r, g, b, params) {
        return false;
    }

    if let Some(floor) = params.min_texture_variance {
        let textured = texture_variance(image, opaque, x, y, TEXTURE_RADIUS)
            .is_some_and(|variance| variance > floor);
        if !textured {
            return false;
        }
    }

    let (width, height) = image.dimensions();
    let radius = f64::from(bounds.radius);
    let distance = bounds.distance_to_center(x, y);

    if distance < radius * params.core_radius {
        return true;
    }

    if in_edge_band(x, y, width, height, params.edge_band) {
        return false;
    }

    let colorful = params
        .saturation_cutoff
        .is_some_and(|cutoff| saturation(r, g, b) > cutoff);

    colorful || params.interior.admits(distance, radius)
}

/// Whether a color reads as background or watermark fill.
pub fn is_whitish(r: u8, g: u8, b: u8, params: &ClassificationParams) -> bool {
    let cutoff = params.white_cutoff;
    if r > cutoff && g > cutoff && b > cutoff {
        return true;
    }
    params.light_mean_cutoff.is_some_and(|limit| {
        let mean = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0;
        mean > limit
    })
}

/// `(max − min) / max`, or 0 for black.
pub fn saturation(r: u8, g: u8, b: u8) -> f64 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        0.0
    } else {
        f64::from(max - min) / f64::from(max)
    }
}

/// Whether `(x, y)` lies in the outer `band` fraction of the canvas.
pub fn in_edge_band(x: u32, y: u32, width: u32, height: u32, band: f64) -> bool {
    let (x, y) = (f64::from(x), f64::from(y));
    let (w, h) = (f64::from(width), f64::from(height));
    x < w * band || x > w * (1.0 - band) || y < h * band || y > h * (1.0 - band)
}

/// Mean of the per-channel population variances of the opaque pixels in the
/// `(2·radius + 1)²` window around `(x, y)`, clamped to the image.
///
/// Returns `None` when the window holds no opaque pixel.
pub fn texture_variance(
    image: &RgbaImage,
    opaque: &Mask,
    x: u32,
    y: u32,
    radius: u32,
) -> Option<f64> {
    let (width, height) = image.dimensions();
    let x0 = x.saturating_sub(radius);
    let y0 = y.saturating_sub(radius);
    let x1 = x.saturating_add(radius).min(width.saturating_sub(1));
    let y1 = y.saturating_add(radius).min(height.saturating_sub(1));

    let mut n = 0u32;
    let mut sum = [0f64; 3];
    let mut sum_sq = [0f64; 3];
    for wy in y0..=y1 {
        for wx in x0..=x1 {
            if !opaque.get(wx, wy) {
                continue;
            }
            let p = image.get_pixel(wx, wy).0;
            for c in 0..3 {
                let v = f64::from(p[c]);
                sum[c] += v;
                sum_sq[c] += v * v;
            }
            n += 1;
        }
    }

    if n == 0 {
        return None;
    }
    let n = f64::from(n);
    let total: f64 = (0..3)
        .map(|c| {
            let mean = sum[c] / n;
            (sum_sq[c] / n - mean * mean).max(0.0)
        })
        .sum();
    Some(total / 3.0)
}
