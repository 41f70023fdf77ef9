use crate::border::{BorderMode, map_index};
use crate::geom::Vec2f;
use crate::image::{ImageView, Rgb8};

/// Pixel types that can be bilinearly interpolated.
pub trait Interpolate: Copy {
    /// Weighted sum of a 2x2 neighborhood given as `(value, weight)` taps.
    ///
    /// Taps with a weight of exactly zero must not contribute.
    fn blend(taps: &[(Self, f32); 4]) -> Self;
}

#[inline]
fn blend_channel(taps: impl Iterator<Item = (f32, f32)>) -> f32 {
    let mut acc = 0.0f32;
    for (v, w) in taps {
        if w != 0.0 {
            acc += v * w;
        }
    }
    acc
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

impl Interpolate for f32 {
    fn blend(taps: &[(Self, f32); 4]) -> Self {
        blend_channel(taps.iter().copied())
    }
}

impl Interpolate for u8 {
    fn blend(taps: &[(Self, f32); 4]) -> Self {
        to_u8(blend_channel(taps.iter().map(|&(v, w)| (v as f32, w))))
    }
}

impl Interpolate for Vec2f {
    fn blend(taps: &[(Self, f32); 4]) -> Self {
        Vec2f {
            x: blend_channel(taps.iter().map(|&(v, w)| (v.x, w))),
            y: blend_channel(taps.iter().map(|&(v, w)| (v.y, w))),
        }
    }
}

impl Interpolate for Rgb8 {
    fn blend(taps: &[(Self, f32); 4]) -> Self {
        let mut out = [0u8; 3];
        for (c, px) in out.iter_mut().enumerate() {
            *px = to_u8(blend_channel(taps.iter().map(|&(v, w)| (v[c] as f32, w))));
        }
        out
    }
}

/// Floor-based 2x2 neighborhood of `(x, y)` as `(xi, yi, weight)` taps in
/// the order `p00, p10, p01, p11`.
pub fn bilinear_taps(x: f32, y: f32) -> [(isize, isize, f32); 4] {
    let fx = x.floor();
    let fy = y.floor();
    let dx = x - fx;
    let dy = y - fy;
    let x0 = fx as isize;
    let y0 = fy as isize;
    let x1 = x0.saturating_add(1);
    let y1 = y0.saturating_add(1);

    [
        (x0, y0, (1.0 - dx) * (1.0 - dy)),
        (x1, y0, dx * (1.0 - dy)),
        (x0, y1, (1.0 - dx) * dy),
        (x1, y1, dx * dy),
    ]
}

pub fn sample_bilinear<T: Interpolate>(
    img: &ImageView<'_, T>,
    x: f32,
    y: f32,
    border: &BorderMode<T>,
) -> T {
    if img.width() == 0 || img.height() == 0 {
        if let BorderMode::Constant(v) = border {
            return *v;
        }
        panic!("cannot sample an empty image with non-constant border");
    }

    let taps = bilinear_taps(x, y).map(|(tx, ty, w)| (sample_at(img, tx, ty, border), w));
    T::blend(&taps)
}

fn sample_at<T: Copy>(img: &ImageView<'_, T>, x: isize, y: isize, border: &BorderMode<T>) -> T {
    match (
        map_index(x, img.width(), border),
        map_index(y, img.height(), border),
    ) {
        // SAFETY: `map_index` returns indices in `[0, len)`.
        (Some(xi), Some(yi)) => unsafe { *img.get_unchecked(xi, yi) },
        _ => match border {
            BorderMode::Constant(c) => *c,
            BorderMode::Clamp => panic!("clamped index must exist for a non-empty image"),
        },
    }
}
