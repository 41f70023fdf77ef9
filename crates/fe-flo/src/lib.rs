//! The `.flo` optical-flow file format.
//!
//! Layout, little-endian throughout:
//!
//! | Offset | Size | Content |
//! |---|---|---|
//! | 0 | 4 | tag: ASCII `"PIEH"`, which reads back as the float `202021.25` |
//! | 4 | 4 | width (`i32`, `1..=99999`) |
//! | 8 | 4 | height (`i32`, `1..=99999`) |
//! | 12 | `width * height * 8` | `u, v` as `f32`, interleaved, row-major |
//!
//! Unknown vectors are stored in-band (see [`fe_core::is_unknown_flow`]); the
//! codec preserves every bit pattern, NaN payloads included.
//!
//! Path-level helpers insist on the `.flo` extension before touching the
//! filesystem.

mod codec;
mod error;

pub use codec::{
    HEADER_LEN, MAX_DIMENSION, TAG_FLOAT, TAG_STRING, decode, encode, encode_interleaved,
    read_flo, write_flo,
};
pub use error::{FloError, FormatIssue};
