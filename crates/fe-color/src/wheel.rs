use std::f32::consts::PI;
use std::sync::OnceLock;

use fe_core::Rgb8;

/// Transition lengths red→yellow→green→cyan→blue→magenta→red.
const SEGMENTS: [usize; 6] = [15, 6, 4, 11, 13, 6];

pub const WHEEL_LEN: usize = 55;

/// Hue table sampled by [`ColorWheel::color_for_vector`], stored as RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorWheel {
    colors: Vec<Rgb8>,
}

impl ColorWheel {
    pub fn new() -> Self {
        let [ry, yg, gc, cb, bm, mr] = SEGMENTS;
        let ramp = |i: usize, n: usize| (255 * i / n) as u8;

        let mut colors = Vec::with_capacity(WHEEL_LEN);
        colors.extend((0..ry).map(|i| [255, ramp(i, ry), 0]));
        colors.extend((0..yg).map(|i| [255 - ramp(i, yg), 255, 0]));
        colors.extend((0..gc).map(|i| [0, 255, ramp(i, gc)]));
        colors.extend((0..cb).map(|i| [0, 255 - ramp(i, cb), 255]));
        colors.extend((0..bm).map(|i| [ramp(i, bm), 0, 255]));
        colors.extend((0..mr).map(|i| [255, 0, 255 - ramp(i, mr)]));
        debug_assert_eq!(colors.len(), WHEEL_LEN);

        Self { colors }
    }

    /// Process-wide instance, built on first use.
    pub fn shared() -> &'static ColorWheel {
        static WHEEL: OnceLock<ColorWheel> = OnceLock::new();
        WHEEL.get_or_init(ColorWheel::new)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Rgb8> {
        self.colors.get(idx).copied()
    }

    /// Color of a motion vector already normalized by the maximum radius.
    ///
    /// The angle `atan2(-v, -u)` picks a position on the wheel, interpolated
    /// between neighbouring entries. Radii up to 1 fade from white toward the
    /// full hue; longer vectors get the hue scaled by 0.75.
    pub fn color_for_vector(&self, u: f32, v: f32) -> Rgb8 {
        let n = self.colors.len();
        let radius = (u * u + v * v).sqrt();
        let angle = (-v).atan2(-u) / PI;
        let fk = (angle + 1.0) / 2.0 * (n - 1) as f32;
        let k0 = (fk as usize).min(n - 1);
        let k1 = (k0 + 1) % n;
        let f = fk - k0 as f32;

        let (c0, c1) = (self.colors[k0], self.colors[k1]);
        let mut out = [0u8; 3];
        for (ch, px) in out.iter_mut().enumerate() {
            let col = (1.0 - f) * f32::from(c0[ch]) / 255.0 + f * f32::from(c1[ch]) / 255.0;
            let col = if radius <= 1.0 {
                1.0 - radius * (1.0 - col)
            } else {
                col * 0.75
            };
            *px = (255.0 * col).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

impl Default for ColorWheel {
    fn default() -> Self {
        Self::new()
    }
}
