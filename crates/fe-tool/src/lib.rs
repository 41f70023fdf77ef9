//! Batch driver for optical-flow evaluation.
//!
//! A results root and a dataset root share one sub-directory per case. The
//! dataset side holds ground truth (`flow{1,2}.flo`, `mask{1,2}.png`,
//! `pair.txt`, `flip_gt.txt`, `image{1,2}.png`); the results side holds a
//! candidate's flows and/or masks under the same names.
//!
//! [`run_evaluation`] scores every case and writes `scores.csv` into the
//! results root. [`run_visualization`] renders foreground, warped and
//! color-coded flow images per case.

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod report;
pub mod visualize;

pub use config::{EvalConfig, VisConfig, color_from_code};
pub use error::EvalError;
pub use evaluate::{CaseScores, evaluate_case, run_evaluation};
pub use report::{EvalSummary, ReportRow, print_summary, write_json_summary};
pub use visualize::{run_visualization, visualize_case};
