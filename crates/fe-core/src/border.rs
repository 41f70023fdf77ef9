/// How samples outside the grid are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum BorderMode<T> {
    /// Replicate the nearest edge pixel.
    Clamp,
    /// Use a fixed value for every out-of-grid tap.
    Constant(T),
}

/// Maps a possibly out-of-range index into `[0, len)`.
///
/// Returns `None` for constant borders or an empty axis; the caller then uses
/// the constant value.
pub fn map_index<T>(i: isize, len: usize, mode: &BorderMode<T>) -> Option<usize> {
    match mode {
        BorderMode::Constant(_) => {
            if i < 0 || i as usize >= len {
                None
            } else {
                Some(i as usize)
            }
        }
        BorderMode::Clamp => {
            if len == 0 {
                return None;
            }
            if i < 0 {
                Some(0)
            } else {
                let idx = i as usize;
                Some(idx.min(len - 1))
            }
        }
    }
}
