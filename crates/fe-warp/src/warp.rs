use fe_core::{BorderMode, FlowField, Image, ImageView, Interpolate, Vec2f, sample_bilinear};

/// Absolute sampling positions: each cell holds its own coordinates plus its
/// flow vector.
pub fn sampling_map(flow: &ImageView<'_, Vec2f>) -> FlowField {
    Image::from_fn(flow.width(), flow.height(), |x, y| {
        let v = flow.row(y)[x];
        Vec2f {
            x: x as f32 + v.x,
            y: y as f32 + v.y,
        }
    })
}

/// Samples `target` at every position of `map` with bilinear interpolation.
///
/// Positions outside `[0, w - 1] x [0, h - 1]` (NaN included) resolve to
/// `border`.
pub fn remap<T: Interpolate>(
    map: &ImageView<'_, Vec2f>,
    target: &ImageView<'_, T>,
    border: T,
) -> Image<T> {
    let max_x = target.width() as f32 - 1.0;
    let max_y = target.height() as f32 - 1.0;

    Image::from_fn(map.width(), map.height(), |x, y| {
        let p = map.row(y)[x];
        if (0.0..=max_x).contains(&p.x) && (0.0..=max_y).contains(&p.y) {
            sample_bilinear(target, p.x, p.y, &BorderMode::Clamp)
        } else {
            border
        }
    })
}

/// Pulls `target` back along `flow`: output pixel `(x, y)` is `target`
/// sampled at `(x + u, y + v)`.
///
/// Unknown vectors need no special case; their sentinel magnitude always
/// lands outside the target and yields `border`.
pub fn warp<T: Interpolate>(
    flow: &ImageView<'_, Vec2f>,
    target: &ImageView<'_, T>,
    border: T,
) -> Image<T> {
    remap(&sampling_map(flow).as_view(), target, border)
}
