use fe_core::{Image, ImageView, Rgb8, Vec2f};
use fe_metrics::compute_max_motion;

use crate::wheel::ColorWheel;

/// Colorizes `flow`, normalizing vectors by `max_motion`.
///
/// Without a positive `max_motion` the largest known radius of `flow` is used,
/// and `1.0` stands in when that is zero. Unknown pixels get `background`.
pub fn render(
    flow: &ImageView<'_, Vec2f>,
    max_motion: Option<f32>,
    background: Rgb8,
    wheel: &ColorWheel,
) -> Image<Rgb8> {
    let motion = compute_max_motion(flow);
    let mut max_radius = match max_motion {
        Some(m) if m > 0.0 => m,
        _ => motion.max_radius,
    };
    if max_radius == 0.0 {
        max_radius = 1.0;
    }

    let width = flow.width();
    Image::from_fn(width, flow.height(), |x, y| {
        if motion.valid.data()[y * width + x] == 0 {
            return background;
        }
        let v = flow.row(y)[x];
        wheel.color_for_vector(v.x / max_radius, v.y / max_radius)
    })
}

#[cfg(test)]
mod tests {
    use fe_core::{Image, Vec2f};

    use crate::render::render;
    use crate::wheel::ColorWheel;

    #[test]
    fn zero_flow_renders_white_without_nan() {
        let flow = Image::new_fill(3, 2, Vec2f::default());
        let rgb = render(&flow.as_view(), None, [1, 2, 3], &ColorWheel::new());
        assert!(rgb.data().iter().all(|&px| px == [255, 255, 255]));
    }

    #[test]
    fn unknown_pixels_keep_background() {
        let flow = Image::from_vec(
            3,
            1,
            vec![Vec2f::UNKNOWN, Vec2f::new(f32::NAN, 0.0), Vec2f::new(1.0, 0.0)],
        )
        .expect("valid image");
        let rgb = render(&flow.as_view(), None, [128, 128, 128], &ColorWheel::new());
        assert_eq!(rgb.data(), &[[128, 128, 128], [128, 128, 128], [255, 0, 0]]);
    }

    #[test]
    fn normalizes_by_computed_or_given_maximum() {
        let flow = Image::from_vec(2, 1, vec![Vec2f::new(2.0, 0.0), Vec2f::new(1.0, 0.0)])
            .expect("valid image");
        let wheel = ColorWheel::new();

        let auto = render(&flow.as_view(), None, [0, 0, 0], &wheel);
        assert_eq!(auto.data(), &[[255, 0, 0], [255, 128, 128]]);

        let given = render(&flow.as_view(), Some(4.0), [0, 0, 0], &wheel);
        assert_eq!(given.data()[0], [255, 128, 128]);

        // Non-positive maxima fall back to the computed one.
        let fallback = render(&flow.as_view(), Some(-1.0), [0, 0, 0], &wheel);
        assert_eq!(fallback, auto);
    }
}
