use std::ops::{Add, AddAssign, Index};

use fe_core::{Error, ImageView, Vec2f, invert_mask};

use crate::endpoint::endpoint_error;

/// Per-direction evaluation result: slot 0 is the mask IoU, slots `1..=N`
/// the accuracy at each endpoint-error threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    values: Vec<f64>,
}

impl ScoreVector {
    pub fn zeros(num_thresholds: usize) -> Self {
        Self {
            values: vec![0.0; num_thresholds + 1],
        }
    }

    /// Builds a vector from raw slots; `None` without at least the IoU slot.
    pub fn from_values(values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self { values })
    }

    pub fn num_thresholds(&self) -> usize {
        self.values.len() - 1
    }

    pub fn iou(&self) -> f64 {
        self.values[0]
    }

    pub fn accuracy(&self) -> &[f64] {
        &self.values[1..]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }
}

impl Index<usize> for ScoreVector {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.values[idx]
    }
}

/// Element-wise sum.
///
/// # Panics
/// Panics if the two vectors hold a different number of thresholds. Vectors
/// built from one threshold ladder always match.
impl AddAssign<&ScoreVector> for ScoreVector {
    fn add_assign(&mut self, rhs: &ScoreVector) {
        assert_eq!(
            self.values.len(),
            rhs.values.len(),
            "score vectors differ in threshold count"
        );
        for (a, b) in self.values.iter_mut().zip(&rhs.values) {
            *a += b;
        }
    }
}

impl Add for ScoreVector {
    type Output = ScoreVector;

    fn add(mut self, rhs: ScoreVector) -> ScoreVector {
        self += &rhs;
        self
    }
}

/// Intersection over union of the set pixels of two masks.
///
/// Two empty masks match perfectly and score `1.0`, where a plain
/// `intersection / union` ratio would give NaN.
pub fn mask_iou(a: &ImageView<'_, u8>, b: &ImageView<'_, u8>) -> Result<f64, Error> {
    Error::ensure_same_size(a.size(), b.size())?;

    let (mut inter, mut union) = (0usize, 0usize);
    for y in 0..a.height() {
        for (&pa, &pb) in a.row(y).iter().zip(b.row(y)) {
            let (sa, sb) = (pa != 0, pb != 0);
            inter += usize::from(sa && sb);
            union += usize::from(sa || sb);
        }
    }

    if union == 0 {
        return Ok(1.0);
    }
    Ok(inter as f64 / union as f64)
}

/// Scores a candidate against ground truth.
///
/// Slot 0 receives [`mask_iou`] when `mask` is given and stays `0.0`
/// otherwise. Slot `i + 1` receives the fraction of ground-truth-known pixels
/// whose endpoint error is at most `thresholds[i]` when `flow` is given; with
/// no known ground-truth pixel those slots are NaN.
pub fn score_against_ground_truth(
    mask_gt: &ImageView<'_, u8>,
    flow_gt: &ImageView<'_, Vec2f>,
    mask: Option<&ImageView<'_, u8>>,
    flow: Option<&ImageView<'_, Vec2f>>,
    thresholds: &[f64],
) -> Result<ScoreVector, Error> {
    let mut score = ScoreVector::zeros(thresholds.len());

    if let Some(mask) = mask {
        score.values[0] = mask_iou(mask_gt, mask)?;
    }

    if let Some(flow) = flow {
        Error::ensure_same_size(flow_gt.size(), flow.size())?;

        let mut valid_gt = 0usize;
        let mut exceeded = vec![0usize; thresholds.len()];
        for y in 0..flow_gt.height() {
            for (&gt, &est) in flow_gt.row(y).iter().zip(flow.row(y)) {
                if gt.is_unknown() {
                    continue;
                }
                valid_gt += 1;
                let err = f64::from(endpoint_error(est, gt));
                for (count, &t) in exceeded.iter_mut().zip(thresholds) {
                    if err > t {
                        *count += 1;
                    }
                }
            }
        }

        for (slot, &count) in score.values[1..].iter_mut().zip(&exceeded) {
            *slot = 1.0 - count as f64 / valid_gt as f64;
        }
    }

    Ok(score)
}

/// Threshold ladder `t_i = (i + 1) * step_percent / 100 * scale`.
pub fn accuracy_thresholds(count: usize, step_percent: f64, scale: f64) -> Vec<f64> {
    (0..count)
        .map(|i| (i + 1) as f64 * step_percent / 100.0 * scale)
        .collect()
}

/// Whether the inverted candidate masks match ground truth better than the
/// candidate masks as given, summed over both frames.
pub fn should_flip(
    mask_gt1: &ImageView<'_, u8>,
    mask_gt2: &ImageView<'_, u8>,
    mask1: &ImageView<'_, u8>,
    mask2: &ImageView<'_, u8>,
) -> Result<bool, Error> {
    let direct = mask_iou(mask_gt1, mask1)? + mask_iou(mask_gt2, mask2)?;
    let flipped = mask_iou(mask_gt1, &invert_mask(mask1).as_view())?
        + mask_iou(mask_gt2, &invert_mask(mask2).as_view())?;
    Ok(direct < flipped)
}

#[cfg(test)]
mod tests {
    use fe_core::{Error, Image, MASK_SET, Size, Vec2f, invert_mask};

    use crate::score::{
        ScoreVector, accuracy_thresholds, mask_iou, score_against_ground_truth, should_flip,
    };

    fn mask(bits: &[u8]) -> Image<u8> {
        let data = bits.iter().map(|&b| if b != 0 { MASK_SET } else { 0 }).collect();
        Image::from_vec(bits.len(), 1, data).expect("valid image")
    }

    #[test]
    fn identical_masks_score_one() {
        let m = mask(&[1, 0, 1, 1, 0]);
        assert_eq!(mask_iou(&m.as_view(), &m.as_view()), Ok(1.0));
    }

    #[test]
    fn iou_partial_disjoint_and_empty() {
        let a = mask(&[1, 1, 0, 0]);
        let b = mask(&[0, 1, 1, 0]);
        let c = mask(&[0, 0, 1, 1]);
        let empty = mask(&[0, 0, 0, 0]);

        assert_eq!(mask_iou(&a.as_view(), &b.as_view()), Ok(1.0 / 3.0));
        assert_eq!(mask_iou(&a.as_view(), &c.as_view()), Ok(0.0));
        assert_eq!(mask_iou(&empty.as_view(), &empty.as_view()), Ok(1.0));
    }

    #[test]
    fn iou_rejects_size_mismatch() {
        let a = mask(&[1, 1]);
        let b = mask(&[1, 1, 1]);
        assert_eq!(
            mask_iou(&a.as_view(), &b.as_view()),
            Err(Error::DimensionMismatch {
                expected: Size::new(2, 1),
                actual: Size::new(3, 1)
            })
        );
    }

    #[test]
    fn accuracy_counts_only_known_ground_truth() {
        let gt = Image::from_vec(
            5,
            1,
            vec![
                Vec2f::new(0.0, 0.0),
                Vec2f::new(0.0, 0.0),
                Vec2f::new(0.0, 0.0),
                Vec2f::new(0.0, 0.0),
                Vec2f::UNKNOWN,
            ],
        )
        .expect("valid image");
        let est = Image::from_vec(
            5,
            1,
            vec![
                Vec2f::new(0.0, 0.0),
                Vec2f::new(1.5, 0.0),
                Vec2f::new(0.0, -3.0),
                Vec2f::UNKNOWN,
                Vec2f::new(100.0, 0.0),
            ],
        )
        .expect("valid image");
        let mask_gt = mask(&[1, 1, 0, 0, 0]);

        let score = score_against_ground_truth(
            &mask_gt.as_view(),
            &gt.as_view(),
            None,
            Some(&est.as_view()),
            &[1.0, 2.0, 5.0],
        )
        .expect("same sizes");

        assert_eq!(score.iou(), 0.0);
        assert_eq!(score.accuracy(), &[0.25, 0.5, 0.75]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let gt = Image::new_fill(1, 1, Vec2f::default());
        let est = Image::new_fill(1, 1, Vec2f::new(3.0, 4.0));
        let m = mask(&[1]);

        let score = score_against_ground_truth(
            &m.as_view(),
            &gt.as_view(),
            Some(&m.as_view()),
            Some(&est.as_view()),
            &[4.0, 5.0],
        )
        .expect("same sizes");
        assert_eq!(score.as_slice(), &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn no_known_ground_truth_gives_nan_accuracy() {
        let gt = Image::new_fill(2, 2, Vec2f::UNKNOWN);
        let est = Image::new_fill(2, 2, Vec2f::default());
        let m = Image::new_fill(2, 2, 0u8);

        let score = score_against_ground_truth(
            &m.as_view(),
            &gt.as_view(),
            Some(&m.as_view()),
            Some(&est.as_view()),
            &[1.0],
        )
        .expect("same sizes");
        assert_eq!(score.iou(), 1.0);
        assert!(score.accuracy()[0].is_nan());
    }

    #[test]
    fn missing_flow_leaves_accuracy_at_zero() {
        let gt = Image::new_fill(2, 1, Vec2f::default());
        let m = mask(&[1, 0]);
        let score =
            score_against_ground_truth(&m.as_view(), &gt.as_view(), Some(&m.as_view()), None, &[1.0, 2.0])
                .expect("same sizes");
        assert_eq!(score.as_slice(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn score_vector_arithmetic() {
        let mut sum = ScoreVector::zeros(2);
        sum += &ScoreVector::from_values(vec![0.5, 1.0, 0.25]).expect("iou slot");
        let sum = sum + ScoreVector::from_values(vec![1.0, 0.0, 0.75]).expect("iou slot");

        assert_eq!(sum.num_thresholds(), 2);
        assert_eq!(sum.scaled(0.5).as_slice(), &[0.75, 0.5, 0.5]);
        assert_eq!(sum[2], 1.0);
    }

    #[test]
    fn empty_values_are_not_a_score_vector() {
        assert!(ScoreVector::from_values(Vec::new()).is_none());
        let iou_only = ScoreVector::from_values(vec![0.5]).expect("iou slot");
        assert_eq!(iou_only.num_thresholds(), 0);
    }

    #[test]
    #[should_panic(expected = "threshold count")]
    fn adding_mismatched_vectors_panics() {
        let mut a = ScoreVector::zeros(2);
        a += &ScoreVector::zeros(3);
    }

    #[test]
    fn threshold_ladder() {
        let ladder = accuracy_thresholds(3, 1.0, 200.0);
        assert_eq!(ladder.len(), 3);
        for (t, expected) in ladder.iter().zip([2.0, 4.0, 6.0]) {
            assert!((t - expected).abs() < 1e-12, "{t} != {expected}");
        }
        let coarse = accuracy_thresholds(2, 5.0, 40.0);
        assert!((coarse[1] - 4.0).abs() < 1e-12);
        assert!(accuracy_thresholds(0, 1.0, 640.0).is_empty());
    }

    #[test]
    fn flip_detects_inverted_masks() {
        let gt1 = mask(&[1, 1, 0, 0]);
        let gt2 = mask(&[0, 1, 1, 0]);
        let inv1 = invert_mask(&gt1.as_view());
        let inv2 = invert_mask(&gt2.as_view());

        assert!(should_flip(&gt1.as_view(), &gt2.as_view(), &inv1.as_view(), &inv2.as_view())
            .expect("same sizes"));
        assert!(!should_flip(&gt1.as_view(), &gt2.as_view(), &gt1.as_view(), &gt2.as_view())
            .expect("same sizes"));
    }

    #[test]
    fn flip_inverts_the_candidate_not_the_ground_truth() {
        // IoU(gt, m) = 1/5 while IoU(gt, !m) = 4/10; IoU(!gt, m) would be 0.
        let gt = mask(&[1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
        let m = mask(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let inv = invert_mask(&m.as_view());
        assert_eq!(mask_iou(&gt.as_view(), &m.as_view()), Ok(0.2));
        assert_eq!(mask_iou(&gt.as_view(), &inv.as_view()), Ok(0.4));

        assert!(should_flip(&gt.as_view(), &gt.as_view(), &m.as_view(), &m.as_view())
            .expect("same sizes"));
        assert!(!should_flip(&gt.as_view(), &gt.as_view(), &inv.as_view(), &inv.as_view())
            .expect("same sizes"));
    }
}
