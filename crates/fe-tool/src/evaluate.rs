use std::path::Path;

use fe_core::{Image, Mask, Size, invert_mask};
use fe_metrics::{
    ScoreVector, accuracy_thresholds, consistency_masks, score_against_ground_truth, should_flip,
};
use fe_warp::{resize_flow_pair, resize_mask};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::EvalConfig;
use crate::dataset::{CaseData, list_cases, read_flip_flag, read_pair_names};
use crate::error::EvalError;
use crate::report::{EvalSummary, ReportRow, SCORES_FILE, ScoreTable, mean_score};

/// Scores of one case in both directions.
#[derive(Debug, Clone)]
pub struct CaseScores {
    pub case: String,
    pub src: String,
    pub reference: String,
    pub flip: i32,
    pub forward: ScoreVector,
    pub backward: ScoreVector,
}

impl CaseScores {
    pub fn rows(&self) -> [ReportRow; 2] {
        [
            ReportRow::new(
                format!("{}_1to2", self.case),
                self.src.as_str(),
                self.reference.as_str(),
                &self.forward,
                self.flip,
            ),
            ReportRow::new(
                format!("{}_2to1", self.case),
                self.reference.as_str(),
                self.src.as_str(),
                &self.backward,
                self.flip,
            ),
        ]
    }

    fn total(&self) -> ScoreVector {
        self.forward.clone() + self.backward.clone()
    }
}

/// Brings a mask to `size`, re-binarizing after interpolation.
pub(crate) fn fit_mask(mask: Mask, size: Size) -> Result<Mask, fe_core::Error> {
    if mask.size() == size {
        return Ok(mask);
    }
    resize_mask(&mask.as_view(), size)
}

/// Scores the candidate in `results_dir/case` against `dataset_dir/case`.
///
/// Returns `Ok(None)` when the ground truth is incomplete.
pub fn evaluate_case(
    results_dir: &Path,
    dataset_dir: &Path,
    case: &str,
    cfg: &EvalConfig,
) -> Result<Option<CaseScores>, EvalError> {
    let gt_dir = dataset_dir.join(case);
    let gt = CaseData::load(&gt_dir);
    let (Some((flow_gt1, flow_gt2)), Some(mask_gt1), Some(mask_gt2)) =
        (gt.flows, gt.mask1, gt.mask2)
    else {
        debug!("{case}: incomplete ground truth, skipped");
        return Ok(None);
    };
    let (src, reference) = read_pair_names(&gt_dir).unwrap_or_default();
    let flip = read_flip_flag(&gt_dir);

    let candidate = CaseData::load(&results_dir.join(case));
    let mut mask1 = candidate
        .mask1
        .map(|m| fit_mask(m, mask_gt1.size()))
        .transpose()?;
    let mut mask2 = candidate
        .mask2
        .map(|m| fit_mask(m, mask_gt2.size()))
        .transpose()?;
    let mut flows = candidate.flows;
    if let Some((f1, f2)) = flows.as_mut() {
        resize_flow_pair(f1, f2, flow_gt1.size(), flow_gt2.size())?;
    }

    if cfg.auto_flip
        && let (Some(m1), Some(m2)) = (mask1.as_mut(), mask2.as_mut())
        && should_flip(
            &mask_gt1.as_view(),
            &mask_gt2.as_view(),
            &m1.as_view(),
            &m2.as_view(),
        )?
    {
        debug!("{case}: candidate masks flipped");
        let (inv1, inv2) = (invert_mask(&m1.as_view()), invert_mask(&m2.as_view()));
        *m1 = inv1;
        *m2 = inv2;
    }

    if mask1.is_none() || mask2.is_none() {
        (mask1, mask2) = match &flows {
            Some((f1, f2)) => {
                debug!("{case}: masks synthesized from flow consistency");
                let (c1, c2) =
                    consistency_masks(&f1.as_view(), &f2.as_view(), cfg.consistency_thresh);
                (Some(c1), Some(c2))
            }
            None => (None, None),
        };
    }

    let n = cfg.num_thresholds;
    let step = cfg.threshold_step_percent;
    let thresholds1 = accuracy_thresholds(n, step, flow_gt2.size().max_side() as f64);
    let thresholds2 = accuracy_thresholds(n, step, flow_gt1.size().max_side() as f64);

    let mask1_view = mask1.as_ref().map(Image::as_view);
    let mask2_view = mask2.as_ref().map(Image::as_view);
    let flow1_view = flows.as_ref().map(|(f1, _)| f1.as_view());
    let flow2_view = flows.as_ref().map(|(_, f2)| f2.as_view());

    let forward = score_against_ground_truth(
        &mask_gt1.as_view(),
        &flow_gt1.as_view(),
        mask1_view.as_ref(),
        flow1_view.as_ref(),
        &thresholds1,
    )?;
    let backward = score_against_ground_truth(
        &mask_gt2.as_view(),
        &flow_gt2.as_view(),
        mask2_view.as_ref(),
        flow2_view.as_ref(),
        &thresholds2,
    )?;
    debug!("{case}: IoU {:.3}/{:.3}", forward.iou(), backward.iou());

    Ok(Some(CaseScores {
        case: case.to_owned(),
        src,
        reference,
        flip,
        forward,
        backward,
    }))
}

/// Evaluates every case directory under `results_root` and writes
/// `scores.csv` there.
///
/// Failing to create the score table aborts the run; failures of single cases
/// are logged and the case is left out.
pub fn run_evaluation(
    results_root: &Path,
    dataset_root: &Path,
    cfg: &EvalConfig,
) -> Result<EvalSummary, EvalError> {
    let mut table = ScoreTable::create(&results_root.join(SCORES_FILE), cfg.num_thresholds)?;
    let cases = list_cases(results_root)?;
    info!("evaluating {} result directories", cases.len());

    let scored: Vec<CaseScores> = cases
        .par_iter()
        .filter_map(|case| match evaluate_case(results_root, dataset_root, case, cfg) {
            Ok(scores) => scores,
            Err(err) => {
                warn!("{case}: evaluation failed: {err}");
                None
            }
        })
        .collect();

    let zeros = || ScoreVector::zeros(cfg.num_thresholds);
    let total = scored
        .par_iter()
        .map(CaseScores::total)
        .reduce(zeros, |a, b| a + b);
    let no_flip: Vec<&CaseScores> = scored.iter().filter(|c| c.flip == 0).collect();
    let total_no_flip = no_flip
        .par_iter()
        .map(|c| c.total())
        .reduce(zeros, |a, b| a + b);

    let mut rows = Vec::with_capacity(scored.len() * 2);
    for case in &scored {
        for row in case.rows() {
            table.write_row(&row)?;
            rows.push(row);
        }
    }

    let average = ReportRow::new("Average", "-", "-", &mean_score(&total, scored.len() * 2), 1);
    let without_flip = ReportRow::new(
        "w/o flip",
        "-",
        "-",
        &mean_score(&total_no_flip, no_flip.len() * 2),
        0,
    );
    table.write_row(&average)?;
    table.write_row(&without_flip)?;
    table.finish()?;
    info!(
        "scored {} of {} cases into {}",
        scored.len(),
        cases.len(),
        results_root.join(SCORES_FILE).display()
    );

    Ok(EvalSummary {
        cases: scored.len(),
        rows,
        average,
        without_flip,
    })
}
