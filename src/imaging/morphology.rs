//! Binary morphology for cleaning up raw subject masks.
//!
//! Refinement runs three steps in order:
//!
//! 1. **Opening** (erode, then dilate) removes specks smaller than the
//!    structuring element.
//! 2. **Closing** (dilate, then erode) bridges gaps narrower than the element.
//! 3. **Hole filling** turns every background region that does not touch the
//!    border into foreground.
//!
//! Structuring elements are `k × k` squares whose origin sits at `k / 2`, so
//! erosion samples offsets `-(k/2) ..= k-1-(k/2)` and dilation samples the
//! reflected offsets. With that pairing, opening never grows a mask and
//! closing never shrinks it, for even and odd `k` alike.
//!
//! Outside the image counts as background while opening (specks touching the
//! border are removed like any other) and is ignored while closing (closing
//! never eats into a subject that touches the border).
//!
//! The closing border deliberately differs from `scipy.ndimage.binary_closing`
//! with its default `border_value=0`, which erodes a subject touching the
//! image edge by up to one pixel per side. Here that strip stays subject, so
//! border-touching subjects keep their full extent.

use super::mask::Mask;
use super::params::RefineParams;
use std::collections::VecDeque;

/// How erosion treats samples that fall outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Border {
    Background,
    Ignore,
}

/// Run opening, closing and hole filling as configured by `params`.
pub fn refine(mask: &Mask, params: &RefineParams) -> Mask {
    let opened = open(mask, params.open);
    let closed = close(&opened, params.close);
    if params.fill_holes {
        fill_holes(&closed)
    } else {
        closed
    }
}

/// Erosion followed by dilation with a `size × size` square.
pub fn open(mask: &Mask, size: u32) -> Mask {
    if size <= 1 {
        return mask.clone();
    }
    dilate(&erode(mask, size, Border::Background), size)
}

/// Dilation followed by erosion with a `size × size` square.
pub fn close(mask: &Mask, size: u32) -> Mask {
    if size <= 1 {
        return mask.clone();
    }
    erode(&dilate(mask, size), size, Border::Ignore)
}

/// Erosion offsets along one axis for a `size`-wide element.
fn offsets(size: u32) -> std::ops::RangeInclusive<i64> {
    let origin = i64::from(size / 2);
    -origin..=(i64::from(size) - 1 - origin)
}

fn erode(mask: &Mask, size: u32, border: Border) -> Mask {
    let (width, height) = mask.dimensions();
    Mask::from_fn(width, height, |x, y| {
        offsets(size).all(|dy| {
            offsets(size).all(|dx| {
                match mask.get_signed(i64::from(x) + dx, i64::from(y) + dy) {
                    Some(v) => v,
                    None => border == Border::Ignore,
                }
            })
        })
    })
}

fn dilate(mask: &Mask, size: u32) -> Mask {
    let (width, height) = mask.dimensions();
    Mask::from_fn(width, height, |x, y| {
        offsets(size).any(|dy| {
            offsets(size).any(|dx| {
                mask.get_signed(i64::from(x) - dx, i64::from(y) - dy)
                    .unwrap_or(false)
            })
        })
    })
}

/// Fill background regions that are not 4-connected to the image border.
pub fn fill_holes(mask: &Mask) -> Mask {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }
    let mut outside = Mask::new(width, height);
    let mut queue = VecDeque::new();

    let seed = |x: u32, y: u32, outside: &mut Mask, queue: &mut VecDeque<(u32, u32)>| {
        if !mask.get(x, y) && !outside.get(x, y) {
            outside.set(x, y, true);
            queue.push_back((x, y));
        }
    };

    for x in 0..width {
        seed(x, 0, &mut outside, &mut queue);
        seed(x, height.saturating_sub(1), &mut outside, &mut queue);
    }
    for y in 0..height {
        seed(0, y, &mut outside, &mut queue);
        seed(width.saturating_sub(1), y, &mut outside, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        if x > 0 {
            seed(x - 1, y, &mut outside, &mut queue);
        }
        if x + 1 < width {
            seed(x + 1, y, &mut outside, &mut queue);
        }
        if y > 0 {
            seed(x, y - 1, &mut outside, &mut queue);
        }
        if y + 1 < height {
            seed(x, y + 1, &mut outside, &mut queue);
        }
    }

    Mask::from_fn(width, height, |x, y| !outside.get(x, y))
}
