use crate::geom::Vec2f;
use crate::image::{Image, ImageView};

/// A component with larger magnitude than this marks the vector as unknown.
pub const UNKNOWN_FLOW_THRESH: f32 = 1e9;

/// Value written into both components of an unknown vector.
pub const UNKNOWN_FLOW: f32 = 1e10;

/// Value of a set pixel in a [`Mask`].
pub const MASK_SET: u8 = 255;

/// Dense motion field, `x` = `u`, `y` = `v`.
pub type FlowField = Image<Vec2f>;

/// Binary mask, `0` = unset, [`MASK_SET`] = set.
pub type Mask = Image<u8>;

/// Returns whether a flow vector is unknown: `|u| > 1e9`, `|v| > 1e9`, or
/// either component is NaN.
///
/// Takes `f64` so that callers with 32-bit components (widened exactly) and
/// callers probing the boundary at full precision share one comparison.
#[inline]
pub fn is_unknown_flow(u: f64, v: f64) -> bool {
    let thresh = f64::from(UNKNOWN_FLOW_THRESH);
    u.abs() > thresh || v.abs() > thresh || u.is_nan() || v.is_nan()
}

impl Vec2f {
    pub const UNKNOWN: Vec2f = Vec2f {
        x: UNKNOWN_FLOW,
        y: UNKNOWN_FLOW,
    };

    #[inline]
    pub fn is_unknown(self) -> bool {
        is_unknown_flow(f64::from(self.x), f64::from(self.y))
    }
}

/// Per-pixel validity of a flow field: [`MASK_SET`] where the vector is known.
pub fn validity_mask(flow: &ImageView<'_, Vec2f>) -> Mask {
    flow.map(|v| if v.is_unknown() { 0 } else { MASK_SET })
}

/// Field whose cell `(x, y)` holds `(x + origin.x, y + origin.y)`.
pub fn meshgrid(width: usize, height: usize, origin: Vec2f) -> FlowField {
    Image::from_fn(width, height, |x, y| Vec2f {
        x: x as f32 + origin.x,
        y: y as f32 + origin.y,
    })
}

/// Maps any non-zero pixel to [`MASK_SET`].
pub fn binarize_mask(src: &ImageView<'_, u8>) -> Mask {
    src.map(|&v| if v > 0 { MASK_SET } else { 0 })
}

pub fn invert_mask(src: &ImageView<'_, u8>) -> Mask {
    src.map(|&v| if v > 0 { 0 } else { MASK_SET })
}

/// Number of set (non-zero) pixels.
pub fn count_set(mask: &ImageView<'_, u8>) -> usize {
    mask.pixels().filter(|&&v| v != 0).count()
}
