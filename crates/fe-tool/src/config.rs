use fe_core::Rgb8;
use fe_metrics::DEFAULT_CONSISTENCY_THRESH;

#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Invert both candidate masks when that matches ground truth better.
    pub auto_flip: bool,
    pub num_thresholds: usize,
    /// Threshold spacing in percent of the image's larger side.
    pub threshold_step_percent: f64,
    /// Endpoint-error bound for masks synthesized from flow consistency.
    pub consistency_thresh: f32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            auto_flip: false,
            num_thresholds: 50,
            threshold_step_percent: 1.0,
            consistency_thresh: DEFAULT_CONSISTENCY_THRESH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisConfig {
    /// Output sub-directory inside each case's results directory.
    pub sub_dir: String,
    /// Fill for background pixels of foreground and warped images.
    pub image_bg: Rgb8,
    /// Fill for background and unknown pixels of color-coded flow.
    pub flow_bg: Rgb8,
    pub auto_flip: bool,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            sub_dir: String::new(),
            image_bg: [0, 255, 255],
            flow_bg: [128, 128, 128],
            auto_flip: false,
        }
    }
}

/// Decodes a decimal `RRRGGGBBB` color; each channel saturates at 255.
pub fn color_from_code(code: u32) -> Rgb8 {
    let channel = |c: u32| (c % 1000).min(255) as u8;
    [
        channel(code / 1_000_000),
        channel(code / 1000),
        channel(code),
    ]
}
