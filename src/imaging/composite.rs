//! Applying a subject mask to the alpha channel.

use super::mask::Mask;
use image::RgbaImage;

/// Zero the alpha of every pixel outside `mask`; leave the rest untouched.
///
/// Color channels are never modified and alpha is never raised, so applying
/// the same mask twice gives the same bytes as applying it once.
pub fn composite(image: &mut RgbaImage, mask: &Mask) {
    debug_assert_eq!(image.dimensions(), mask.dimensions());
    for (pixel, &keep) in image.pixels_mut().zip(mask.as_slice()) {
        if !keep {
            pixel[3] = 0;
        }
    }
}
