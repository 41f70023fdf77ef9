use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: crate::Size,
        actual: crate::Size,
    },
    #[error("invalid stride")]
    InvalidStride,
    #[error("empty image")]
    EmptyImage,
}

impl Error {
    /// Fails with [`Error::DimensionMismatch`] unless both sizes are equal.
    pub fn ensure_same_size(expected: crate::Size, actual: crate::Size) -> Result<(), Error> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::DimensionMismatch { expected, actual })
        }
    }
}
