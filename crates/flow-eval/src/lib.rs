//! Umbrella crate for the `flow-eval` workspace.
//!
//! Re-exports the data model, the `.flo` codec, flow geometry, metrics and
//! colorization so applications depend on a single crate.

pub use fe_color::*;
pub use fe_core::*;
pub use fe_flo::*;
pub use fe_metrics::*;
pub use fe_warp::*;
