//! Accuracy measures for estimated flow fields and foreground masks.
//!
//! - [`flow_error`]: per-pixel endpoint error. Pixels where exactly one of the
//!   two fields is unknown score [`DISAGREEMENT_ERROR`].
//! - [`compute_max_motion`]: largest known motion magnitude.
//! - [`score_against_ground_truth`]: a [`ScoreVector`] holding mask IoU in
//!   slot 0 and, per threshold, the fraction of ground-truth-known pixels whose
//!   endpoint error stays within it.
//! - [`consistency_masks`]: foreground masks from forward/backward agreement,
//!   for candidates that ship flows without masks.
//!
//! Ratios with an empty denominator follow fixed rules: IoU of two empty
//! masks is `1.0`; accuracy without any known ground-truth pixel is NaN.

mod consistency;
mod endpoint;
mod score;

pub use consistency::{DEFAULT_CONSISTENCY_THRESH, consistency_mask, consistency_masks};
pub use endpoint::{DISAGREEMENT_ERROR, MaxMotion, compute_max_motion, flow_error};
pub use score::{
    ScoreVector, accuracy_thresholds, mask_iou, score_against_ground_truth, should_flip,
};
