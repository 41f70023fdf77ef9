use fe_core::{
    BorderMode, Error, FlowField, Image, ImageView, Interpolate, MASK_SET, Mask, Size, Vec2f,
    bilinear_taps, map_index, sample_bilinear, validity_mask,
};

/// Source coordinate of destination pixel center `dst` under `scale = src/dst`.
#[inline]
fn src_coord(dst: usize, scale: f64) -> f32 {
    ((dst as f64 + 0.5) * scale - 0.5) as f32
}

#[inline]
fn scales(src: Size, dst: Size) -> (f64, f64) {
    (
        src.width as f64 / dst.width as f64,
        src.height as f64 / dst.height as f64,
    )
}

/// Bilinear resize with pixel-center alignment and clamped borders.
pub fn resize_bilinear<T: Interpolate>(
    src: &ImageView<'_, T>,
    dst: Size,
) -> Result<Image<T>, Error> {
    if src.size().is_empty() || dst.is_empty() {
        return Err(Error::EmptyImage);
    }

    let (sx, sy) = scales(src.size(), dst);
    Ok(Image::from_fn(dst.width, dst.height, |x, y| {
        sample_bilinear(src, src_coord(x, sx), src_coord(y, sy), &BorderMode::Clamp)
    }))
}

/// Resizes a binary mask bilinearly and re-binarizes it at `> 128`.
pub fn resize_mask(src: &ImageView<'_, u8>, dst: Size) -> Result<Mask, Error> {
    let resized = resize_bilinear(src, dst)?;
    Ok(resized.map(|&v| if v > 128 { MASK_SET } else { 0 }))
}

/// Resizes a validity mask so that a destination pixel stays valid only when
/// every source tap contributing to its bilinear sample is valid.
pub fn resize_validity(valid: &ImageView<'_, u8>, dst: Size) -> Result<Mask, Error> {
    if valid.size().is_empty() || dst.is_empty() {
        return Err(Error::EmptyImage);
    }

    let (sx, sy) = scales(valid.size(), dst);
    let clamp = BorderMode::<u8>::Clamp;
    Ok(Image::from_fn(dst.width, dst.height, |x, y| {
        let all_valid = bilinear_taps(src_coord(x, sx), src_coord(y, sy))
            .iter()
            .filter(|&&(_, _, w)| w != 0.0)
            .all(|&(tx, ty, _)| {
                match (
                    map_index(tx, valid.width(), &clamp),
                    map_index(ty, valid.height(), &clamp),
                ) {
                    (Some(xi), Some(yi)) => valid.get(xi, yi).is_some_and(|&v| v != 0),
                    _ => false,
                }
            });
        if all_valid { MASK_SET } else { 0 }
    }))
}

/// Resizes a flow field from `src.size()` to `dst` while its companion frame
/// (the frame the vectors point into) goes from `companion_src` to
/// `companion_dst`.
///
/// Each vector is re-expressed as motion between the resized grids:
/// `u' = (u + x * src_w / dst_w) * companion_dst_w / companion_src_w - x`,
/// likewise for `v`. Destination pixels whose interpolation window touches an
/// unknown source vector are written as [`Vec2f::UNKNOWN`].
pub fn resize_with_validity(
    src: &ImageView<'_, Vec2f>,
    companion_src: Size,
    dst: Size,
    companion_dst: Size,
) -> Result<FlowField, Error> {
    if src.size().is_empty()
        || dst.is_empty()
        || companion_src.is_empty()
        || companion_dst.is_empty()
    {
        return Err(Error::EmptyImage);
    }

    if src.size() == dst && companion_src == companion_dst {
        return Ok(src.to_image());
    }

    // Validity is resolved before any arithmetic touches the sentinels.
    let valid = resize_validity(&validity_mask(src).as_view(), dst)?;
    let resized = resize_bilinear(src, dst)?;

    let (grid_sx, grid_sy) = scales(src.size(), dst);
    let (comp_sx, comp_sy) = scales(companion_dst, companion_src);

    Ok(Image::from_fn(dst.width, dst.height, |x, y| {
        let idx = y * dst.width + x;
        if valid.data()[idx] == 0 {
            return Vec2f::UNKNOWN;
        }

        let v = resized.data()[idx];
        let (xf, yf) = (x as f64, y as f64);
        Vec2f {
            x: ((f64::from(v.x) + xf * grid_sx) * comp_sx - xf) as f32,
            y: ((f64::from(v.y) + yf * grid_sy) * comp_sy - yf) as f32,
        }
    }))
}

/// Resizes a forward/backward flow pair, each being the other's companion.
///
/// Leaves both fields untouched when they already have the requested sizes.
pub fn resize_flow_pair(
    flow_a: &mut FlowField,
    flow_b: &mut FlowField,
    new_a: Size,
    new_b: Size,
) -> Result<(), Error> {
    let old_a = flow_a.size();
    let old_b = flow_b.size();
    if old_a == new_a && old_b == new_b {
        return Ok(());
    }

    let resized_a = resize_with_validity(&flow_a.as_view(), old_b, new_a, new_b)?;
    let resized_b = resize_with_validity(&flow_b.as_view(), old_a, new_b, new_a)?;
    *flow_a = resized_a;
    *flow_b = resized_b;
    Ok(())
}
