use fe_core::{Image, ImageView, MASK_SET, Mask, Vec2f};
use fe_warp::warp;

use crate::endpoint::endpoint_error;

/// Endpoint-error bound under which a forward/backward pair counts as
/// consistent.
pub const DEFAULT_CONSISTENCY_THRESH: f32 = 20.0;

/// Marks pixels of `flow` whose vector is undone by `reverse`.
///
/// `reverse` is pulled back along `flow` (unknown where the target position
/// leaves the frame), negated, and compared to `flow`; pixels with an
/// endpoint error strictly below `thresh` are set.
pub fn consistency_mask(
    flow: &ImageView<'_, Vec2f>,
    reverse: &ImageView<'_, Vec2f>,
    thresh: f32,
) -> Mask {
    let warped = warp(flow, reverse, Vec2f::UNKNOWN);
    Image::from_fn(flow.width(), flow.height(), |x, y| {
        let back = warped.data()[y * flow.width() + x];
        if endpoint_error(flow.row(y)[x], -back) < thresh {
            MASK_SET
        } else {
            0
        }
    })
}

/// Consistency masks for both directions of a flow pair.
pub fn consistency_masks(
    flow1: &ImageView<'_, Vec2f>,
    flow2: &ImageView<'_, Vec2f>,
    thresh: f32,
) -> (Mask, Mask) {
    (
        consistency_mask(flow1, flow2, thresh),
        consistency_mask(flow2, flow1, thresh),
    )
}
