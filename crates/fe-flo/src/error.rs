use std::path::PathBuf;

use thiserror::Error;

use crate::codec::MAX_DIMENSION;

#[derive(Debug, Error)]
pub enum FloError {
    #[error("malformed flow data: {0}")]
    Format(#[from] FormatIssue),
    #[error("{}: extension .flo expected", .0.display())]
    Extension(PathBuf),
    #[error("flow image must have 2 channels, got {0}")]
    ChannelCount(usize),
    #[error("illegal flow dimensions {width}x{height} (each must be within 1..={})", MAX_DIMENSION)]
    Dimension { width: i64, height: i64 },
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a byte stream is not a well-formed `.flo` payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatIssue {
    #[error("header needs 12 bytes, got {0}")]
    ShortHeader(usize),
    #[error("wrong tag {0:#010x} (possibly due to big-endian data)")]
    WrongTag(u32),
    #[error("file is too short: expected {expected} payload bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("file is too long: {extra} trailing bytes")]
    TrailingBytes { extra: usize },
}
