use fe_core::{Error, Image, ImageView, MASK_SET, Mask, Vec2f};

/// Error assigned where exactly one of the compared vectors is unknown.
pub const DISAGREEMENT_ERROR: f32 = 1000.0;

#[inline]
pub(crate) fn endpoint_error(flow: Vec2f, flow_gt: Vec2f) -> f32 {
    if flow.is_unknown() != flow_gt.is_unknown() {
        DISAGREEMENT_ERROR
    } else {
        (flow - flow_gt).norm()
    }
}

/// Per-pixel Euclidean distance between `flow` and `flow_gt`.
pub fn flow_error(
    flow: &ImageView<'_, Vec2f>,
    flow_gt: &ImageView<'_, Vec2f>,
) -> Result<Image<f32>, Error> {
    Error::ensure_same_size(flow_gt.size(), flow.size())?;

    Ok(Image::from_fn(flow.width(), flow.height(), |x, y| {
        endpoint_error(flow.row(y)[x], flow_gt.row(y)[x])
    }))
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaxMotion {
    /// Largest `sqrt(u^2 + v^2)` over known pixels, `0.0` if none is known.
    pub max_radius: f32,
    /// [`MASK_SET`] where the vector is known.
    pub valid: Mask,
}

pub fn compute_max_motion(flow: &ImageView<'_, Vec2f>) -> MaxMotion {
    let mut max_radius = 0.0f32;
    let valid = flow.map(|&v| {
        if v.is_unknown() {
            0
        } else {
            max_radius = max_radius.max(v.norm());
            MASK_SET
        }
    });

    MaxMotion { max_radius, valid }
}
