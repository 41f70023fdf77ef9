//! Geometric transforms over flow fields and images.
//!
//! Resizing uses bilinear interpolation with pixel-center alignment: a
//! destination pixel `x` samples the source at `(x + 0.5) * src_w / dst_w - 0.5`
//! with edge pixels replicated.
//!
//! Flow vectors describe motion into a companion frame, so resizing a flow
//! field also re-expresses each vector in the resized companion's pixels
//! ([`resize_with_validity`]). Unknown vectors are never mixed arithmetically:
//! any destination pixel whose interpolation window touches one becomes
//! unknown itself.
//!
//! Warping pulls a target image back along a flow field; samples falling
//! outside the target take a caller-supplied border value.

mod resize;
mod warp;

pub use resize::{
    resize_bilinear, resize_flow_pair, resize_mask, resize_validity, resize_with_validity,
};
pub use warp::{remap, sampling_map, warp};
