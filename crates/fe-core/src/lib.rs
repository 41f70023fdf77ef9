//! Foundational primitives for optical-flow evaluation.
//!
//! ## Image Grids
//! [`Image`] owns a dense row-major grid of any pixel type. [`ImageView`] is a
//! borrowed view with an element stride (not byte stride): `stride` is the
//! distance, in elements, between adjacent row starts and may exceed `width`.
//!
//! ## Flow Fields
//! A [`FlowField`] is an `Image<Vec2f>` where `x` holds the horizontal motion
//! `u` and `y` the vertical motion `v`. Undefined motion is stored in-band as a
//! sentinel (`|u| > 1e9`, `|v| > 1e9` or NaN); use [`is_unknown_flow`],
//! [`Vec2f::is_unknown`] or [`validity_mask`] instead of testing values inline.
//!
//! ## Masks
//! A [`Mask`] is an `Image<u8>` with binary convention `0` = unset,
//! [`MASK_SET`] (`255`) = set.
//!
//! ## Sampling Coordinates
//! Integer coordinates refer to pixel centers. Bilinear sampling uses the
//! floor-based 2x2 neighborhood; taps whose weight is exactly zero never
//! contribute, so sentinel or NaN neighbors cannot leak into exact samples.

mod border;
mod error;
mod flow;
mod geom;
mod image;
mod sample;

pub use border::{BorderMode, map_index};
pub use error::Error;
pub use flow::{
    FlowField, MASK_SET, Mask, UNKNOWN_FLOW, UNKNOWN_FLOW_THRESH, binarize_mask, count_set,
    invert_mask, is_unknown_flow, meshgrid, validity_mask,
};
pub use geom::{Size, Vec2f};
pub use image::{Image, ImageView, Rgb8};
pub use sample::{Interpolate, bilinear_taps, sample_bilinear};
