//! Flow visualization with the Middlebury color wheel.
//!
//! Hue encodes direction, saturation encodes magnitude relative to the
//! field's largest known motion. Vectors longer than the normalization radius
//! are darkened; unknown vectors keep the background color.
//!
//! ```
//! use fe_color::{ColorWheel, render};
//! use fe_core::{Image, Vec2f};
//!
//! let flow = Image::new_fill(4, 4, Vec2f::default());
//! let rgb = render(&flow.as_view(), None, [0, 0, 0], ColorWheel::shared());
//! assert!(rgb.data().iter().all(|&px| px == [255, 255, 255]));
//! ```

mod render;
mod wheel;

pub use render::render;
pub use wheel::{ColorWheel, WHEEL_LEN};
