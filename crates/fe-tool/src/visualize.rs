use std::fs;
use std::path::Path;

use fe_color::{ColorWheel, render};
use fe_core::{Error, FlowField, Image, MASK_SET, Mask, Rgb8, invert_mask};
use fe_metrics::{compute_max_motion, should_flip};
use fe_warp::{resize_bilinear, resize_flow_pair, warp};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::VisConfig;
use crate::dataset::{CaseData, IMAGE1_FILE, IMAGE2_FILE, list_cases};
use crate::error::EvalError;
use crate::evaluate::fit_mask;
use crate::io::{load_rgb, save_rgb};

/// Replaces pixels outside `mask` with `background`.
fn apply_mask(img: &mut Image<Rgb8>, mask: &Mask, background: Rgb8) -> Result<(), Error> {
    Error::ensure_same_size(mask.size(), img.size())?;
    for (px, &m) in img.data_mut().iter_mut().zip(mask.data()) {
        if m == 0 {
            *px = background;
        }
    }
    Ok(())
}

/// One direction's view of a case: its mask and flow, the image they live on
/// and the image the flow points into.
struct Direction<'a> {
    suffix: &'a str,
    mask: Option<&'a Mask>,
    flow: Option<&'a FlowField>,
    image: &'a Image<Rgb8>,
    companion: &'a Image<Rgb8>,
}

fn write_direction(
    dir: &Path,
    d: &Direction<'_>,
    max_motion: Option<f32>,
    cfg: &VisConfig,
    wheel: &ColorWheel,
) -> Result<(), EvalError> {
    let full;
    let mask = match (d.mask, d.flow) {
        (Some(mask), _) => {
            let mut foreground = d.image.clone();
            apply_mask(&mut foreground, mask, cfg.image_bg)?;
            save_rgb(&dir.join(format!("foreground{}.png", d.suffix)), &foreground)?;
            mask
        }
        (None, Some(flow)) => {
            full = Mask::new_fill(flow.width(), flow.height(), MASK_SET);
            &full
        }
        (None, None) => return Ok(()),
    };

    if let Some(flow) = d.flow {
        let mut warped = warp(&flow.as_view(), &d.companion.as_view(), cfg.image_bg);
        apply_mask(&mut warped, mask, cfg.image_bg)?;
        save_rgb(&dir.join(format!("warped{}.png", d.suffix)), &warped)?;

        let mut colored = render(&flow.as_view(), max_motion, cfg.flow_bg, wheel);
        apply_mask(&mut colored, mask, cfg.flow_bg)?;
        save_rgb(&dir.join(format!("flow{}.png", d.suffix)), &colored)?;
    }
    Ok(())
}

fn fit_image(
    img: Image<Rgb8>,
    mask: Option<&Mask>,
    flow: Option<&FlowField>,
) -> Result<Image<Rgb8>, Error> {
    let target = match (mask, flow) {
        (Some(m), _) => m.size(),
        (None, Some(f)) => f.size(),
        (None, None) => return Ok(img),
    };
    if img.size() == target {
        return Ok(img);
    }
    resize_bilinear(&img.as_view(), target)
}

/// Largest ground-truth motion over both frames, measured at the image sizes.
fn ground_truth_motion(
    gt: &mut CaseData,
    image1: &Image<Rgb8>,
    image2: &Image<Rgb8>,
) -> Result<Option<f32>, Error> {
    let Some((g1, g2)) = gt.flows.as_mut() else {
        return Ok(None);
    };
    resize_flow_pair(g1, g2, image1.size(), image2.size())?;
    let m1 = compute_max_motion(&g1.as_view()).max_radius;
    let m2 = compute_max_motion(&g2.as_view()).max_radius;
    Ok(Some(m1.max(m2)))
}

/// Renders the candidate in `results_root/case` into
/// `results_root/case/<sub_dir>`.
///
/// Returns `Ok(false)` when the case was skipped.
pub fn visualize_case(
    results_root: &Path,
    dataset_root: &Path,
    case: &str,
    cfg: &VisConfig,
    wheel: &ColorWheel,
) -> Result<bool, EvalError> {
    let case_dir = results_root.join(case);
    let data_dir = dataset_root.join(case);

    let mut candidate = CaseData::load(&case_dir);
    if candidate.is_empty() {
        debug!("{case}: no flows or masks, skipped");
        return Ok(false);
    }

    let (image1, image2) = match (
        load_rgb(&data_dir.join(IMAGE1_FILE)),
        load_rgb(&data_dir.join(IMAGE2_FILE)),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(err), _) | (_, Err(err)) => {
            warn!("{case}: missing dataset image, skipped: {err}");
            return Ok(false);
        }
    };

    let (flow1, flow2) = match candidate.flows.as_ref() {
        Some((f1, f2)) => (Some(f1), Some(f2)),
        None => (None, None),
    };
    let image1 = fit_image(image1, candidate.mask1.as_ref(), flow1)?;
    let image2 = fit_image(image2, candidate.mask2.as_ref(), flow2)?;

    let mut gt = CaseData::load(&data_dir);
    let max_motion = ground_truth_motion(&mut gt, &image1, &image2)?;

    if cfg.auto_flip
        && let (Some(g1), Some(g2)) = (gt.mask1.as_ref(), gt.mask2.as_ref())
        && let (Some(m1), Some(m2)) = (candidate.mask1.as_mut(), candidate.mask2.as_mut())
    {
        let g1 = fit_mask(g1.clone(), m1.size())?;
        let g2 = fit_mask(g2.clone(), m2.size())?;
        if should_flip(&g1.as_view(), &g2.as_view(), &m1.as_view(), &m2.as_view())? {
            debug!("{case}: candidate masks flipped");
            let (inv1, inv2) = (invert_mask(&m1.as_view()), invert_mask(&m2.as_view()));
            *m1 = inv1;
            *m2 = inv2;
        }
    }

    let out_dir = case_dir.join(&cfg.sub_dir);
    fs::create_dir_all(&out_dir).map_err(EvalError::io(&out_dir))?;

    let (flow1, flow2) = match candidate.flows.as_ref() {
        Some((f1, f2)) => (Some(f1), Some(f2)),
        None => (None, None),
    };
    let directions = [
        Direction {
            suffix: "1",
            mask: candidate.mask1.as_ref(),
            flow: flow1,
            image: &image1,
            companion: &image2,
        },
        Direction {
            suffix: "2",
            mask: candidate.mask2.as_ref(),
            flow: flow2,
            image: &image2,
            companion: &image1,
        },
    ];
    for d in &directions {
        write_direction(&out_dir, d, max_motion, cfg, wheel)?;
    }
    debug!("{case}: wrote {}", out_dir.display());
    Ok(true)
}

/// Renders every case directory under `results_root`; returns how many
/// cases produced output.
pub fn run_visualization(
    results_root: &Path,
    dataset_root: &Path,
    cfg: &VisConfig,
) -> Result<usize, EvalError> {
    let cases = list_cases(results_root)?;
    info!("visualizing {} result directories", cases.len());

    let wheel = ColorWheel::shared();
    let rendered = cases
        .par_iter()
        .filter(|case| match visualize_case(results_root, dataset_root, case, cfg, wheel) {
            Ok(done) => done,
            Err(err) => {
                warn!("{case}: visualization failed: {err}");
                false
            }
        })
        .count();

    info!("visualized {rendered} of {} cases", cases.len());
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use fe_color::ColorWheel;
    use fe_core::{Image, MASK_SET, Mask, Rgb8, Vec2f};
    use fe_flo::write_flo;

    use crate::config::VisConfig;
    use crate::dataset::{
        FLOW1_FILE, FLOW2_FILE, IMAGE1_FILE, IMAGE2_FILE, MASK1_FILE, MASK2_FILE,
    };
    use crate::io::{load_rgb, save_mask, save_rgb};
    use crate::visualize::{run_visualization, visualize_case};

    fn gradient(w: usize, h: usize) -> Image<Rgb8> {
        Image::from_fn(w, h, |x, y| [(x * 30) as u8, (y * 30) as u8, 200])
    }

    fn left_half(w: usize, h: usize) -> Mask {
        Image::from_fn(w, h, |x, _| if x < w / 2 { MASK_SET } else { 0 })
    }

    fn write_flows(dir: &Path, v: Vec2f, w: usize, h: usize) {
        fs::create_dir_all(dir).expect("mkdir");
        write_flo(dir.join(FLOW1_FILE), &Image::new_fill(w, h, v).as_view()).expect("flow1");
        write_flo(dir.join(FLOW2_FILE), &Image::new_fill(w, h, -v).as_view()).expect("flow2");
    }

    fn write_images(dir: &Path, w: usize, h: usize) {
        fs::create_dir_all(dir).expect("mkdir");
        save_rgb(&dir.join(IMAGE1_FILE), &gradient(w, h)).expect("image1");
        save_rgb(&dir.join(IMAGE2_FILE), &gradient(w, h)).expect("image2");
    }

    #[test]
    fn writes_all_outputs_with_masked_backgrounds() {
        let root = tempfile::tempdir().expect("temp dir");
        let (results, dataset) = (root.path().join("results"), root.path().join("dataset"));
        let case = results.join("c0");
        write_flows(&case, Vec2f::new(1.0, 0.0), 6, 4);
        save_mask(&case.join(MASK1_FILE), &left_half(6, 4)).expect("mask1");
        save_mask(&case.join(MASK2_FILE), &left_half(6, 4)).expect("mask2");
        write_images(&dataset.join("c0"), 6, 4);
        write_flows(&dataset.join("c0"), Vec2f::new(2.0, 0.0), 6, 4);

        let cfg = VisConfig {
            sub_dir: "vis".into(),
            ..VisConfig::default()
        };
        let done = visualize_case(&results, &dataset, "c0", &cfg, &ColorWheel::new());
        assert!(done.expect("renders"));

        let out = case.join("vis");
        for name in ["foreground", "warped", "flow"] {
            for suffix in ["1", "2"] {
                let path = out.join(format!("{name}{suffix}.png"));
                assert!(path.is_file(), "missing {}", path.display());
            }
        }

        let fg = load_rgb(&out.join("foreground1.png")).expect("load");
        assert_eq!(fg.get(0, 0), Some(&gradient(6, 4).data()[0]));
        assert_eq!(fg.get(5, 0), Some(&cfg.image_bg));

        // Image 2 pulled back by one pixel.
        let warped = load_rgb(&out.join("warped1.png")).expect("load");
        assert_eq!(warped.get(1, 2), gradient(6, 4).get(2, 2));
        assert_eq!(warped.get(4, 2), Some(&cfg.image_bg));

        // Normalized by the ground-truth motion of 2: radius 0.5 toward red.
        let flow = load_rgb(&out.join("flow1.png")).expect("load");
        assert_eq!(flow.get(0, 0), Some(&[255, 128, 128]));
        assert_eq!(flow.get(5, 3), Some(&cfg.flow_bg));
    }

    #[test]
    fn flow_only_candidate_gets_full_masks() {
        let root = tempfile::tempdir().expect("temp dir");
        let (results, dataset) = (root.path().join("results"), root.path().join("dataset"));
        write_flows(&results.join("c0"), Vec2f::default(), 4, 4);
        write_images(&dataset.join("c0"), 8, 8);

        let cfg = VisConfig::default();
        let done = visualize_case(&results, &dataset, "c0", &cfg, &ColorWheel::new());
        assert!(done.expect("renders"));

        let out = results.join("c0");
        assert!(!out.join("foreground1.png").exists());
        let flow = load_rgb(&out.join("flow2.png")).expect("load");
        assert_eq!(flow.size(), fe_core::Size::new(4, 4));
        assert!(flow.data().iter().all(|&px| px == [255, 255, 255]));
    }

    #[test]
    fn missing_images_or_outputs_skip_the_case() {
        let root = tempfile::tempdir().expect("temp dir");
        let (results, dataset) = (root.path().join("results"), root.path().join("dataset"));
        write_flows(&results.join("with_flow"), Vec2f::default(), 4, 4);
        fs::create_dir_all(results.join("empty")).expect("mkdir");
        write_images(&dataset.join("empty"), 4, 4);

        let cfg = VisConfig::default();
        let wheel = ColorWheel::new();
        assert!(!visualize_case(&results, &dataset, "with_flow", &cfg, &wheel).expect("skips"));
        assert!(!visualize_case(&results, &dataset, "empty", &cfg, &wheel).expect("skips"));

        assert_eq!(run_visualization(&results, &dataset, &cfg).expect("run"), 0);
    }

    #[test]
    fn auto_flip_inverts_masks_before_rendering() {
        let root = tempfile::tempdir().expect("temp dir");
        let (results, dataset) = (root.path().join("results"), root.path().join("dataset"));
        let case = results.join("c0");
        fs::create_dir_all(&case).expect("mkdir");
        let inverted = fe_core::invert_mask(&left_half(6, 4).as_view());
        save_mask(&case.join(MASK1_FILE), &inverted).expect("mask1");
        save_mask(&case.join(MASK2_FILE), &inverted).expect("mask2");
        write_images(&dataset.join("c0"), 6, 4);
        // Ground truth at twice the resolution; resized to the candidate masks.
        save_mask(&dataset.join("c0").join(MASK1_FILE), &left_half(12, 8)).expect("gt1");
        save_mask(&dataset.join("c0").join(MASK2_FILE), &left_half(12, 8)).expect("gt2");

        let cfg = VisConfig {
            auto_flip: true,
            ..VisConfig::default()
        };
        let done = visualize_case(&results, &dataset, "c0", &cfg, &ColorWheel::new());
        assert!(done.expect("renders"));

        let fg = load_rgb(&case.join("foreground1.png")).expect("load");
        assert_eq!(fg.get(0, 0), Some(&gradient(6, 4).data()[0]));
        assert_eq!(fg.get(5, 0), Some(&cfg.image_bg));
    }
}
