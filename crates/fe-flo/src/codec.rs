use std::fs;
use std::path::Path;

use fe_core::{FlowField, Image, ImageView, Vec2f};

use crate::error::{FloError, FormatIssue};

/// Tag value expected when reading; the bytes of [`TAG_STRING`] as LE `f32`.
pub const TAG_FLOAT: f32 = 202021.25;

/// Tag bytes emitted when writing.
pub const TAG_STRING: [u8; 4] = *b"PIEH";

/// Largest accepted width or height.
pub const MAX_DIMENSION: i32 = 99999;

pub const HEADER_LEN: usize = 12;

const CHANNELS: usize = 2;
const BYTES_PER_VECTOR: usize = CHANNELS * 4;

pub fn decode(bytes: &[u8]) -> Result<FlowField, FloError> {
    if bytes.len() < HEADER_LEN {
        return Err(FormatIssue::ShortHeader(bytes.len()).into());
    }

    let tag = u32::from_le_bytes(le_word(bytes, 0));
    if f32::from_bits(tag) != TAG_FLOAT {
        return Err(FormatIssue::WrongTag(tag).into());
    }

    let width = i32::from_le_bytes(le_word(bytes, 4));
    let height = i32::from_le_bytes(le_word(bytes, 8));
    let (w, h) = checked_dims(i64::from(width), i64::from(height))?;

    let expected = w * h * BYTES_PER_VECTOR;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() < expected {
        return Err(FormatIssue::Truncated {
            expected,
            actual: payload.len(),
        }
        .into());
    }
    if payload.len() > expected {
        return Err(FormatIssue::TrailingBytes {
            extra: payload.len() - expected,
        }
        .into());
    }

    let data = payload
        .chunks_exact(BYTES_PER_VECTOR)
        .map(|c| Vec2f {
            x: f32::from_le_bytes(le_word(c, 0)),
            y: f32::from_le_bytes(le_word(c, 4)),
        })
        .collect();

    Ok(Image::from_vec(w, h, data).expect("payload length checked against header"))
}

pub fn encode(flow: &ImageView<'_, Vec2f>) -> Result<Vec<u8>, FloError> {
    let mut out = header(flow.width(), flow.height())?;
    out.reserve(flow.width() * flow.height() * BYTES_PER_VECTOR);
    for v in flow.pixels() {
        out.extend_from_slice(&v.x.to_le_bytes());
        out.extend_from_slice(&v.y.to_le_bytes());
    }
    Ok(out)
}

/// Encodes a channel-interleaved float buffer; only 2-channel data is a flow.
pub fn encode_interleaved(
    width: usize,
    height: usize,
    channels: usize,
    data: &[f32],
) -> Result<Vec<u8>, FloError> {
    if channels != CHANNELS {
        return Err(FloError::ChannelCount(channels));
    }

    let mut out = header(width, height)?;
    let expected = width * height * CHANNELS;
    if data.len() < expected {
        return Err(FormatIssue::Truncated {
            expected: expected * 4,
            actual: data.len() * 4,
        }
        .into());
    }
    if data.len() > expected {
        return Err(FormatIssue::TrailingBytes {
            extra: (data.len() - expected) * 4,
        }
        .into());
    }

    out.reserve(expected * 4);
    for value in data {
        out.extend_from_slice(&value.to_le_bytes());
    }
    Ok(out)
}

pub fn read_flo(path: impl AsRef<Path>) -> Result<FlowField, FloError> {
    let path = path.as_ref();
    check_extension(path)?;

    let bytes = fs::read(path).map_err(|source| FloError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes)
}

pub fn write_flo(path: impl AsRef<Path>, flow: &ImageView<'_, Vec2f>) -> Result<(), FloError> {
    let path = path.as_ref();
    check_extension(path)?;

    let bytes = encode(flow)?;
    fs::write(path, bytes).map_err(|source| FloError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn check_extension(path: &Path) -> Result<(), FloError> {
    if path.extension().and_then(|e| e.to_str()) == Some("flo") {
        Ok(())
    } else {
        Err(FloError::Extension(path.to_path_buf()))
    }
}

fn checked_dims(width: i64, height: i64) -> Result<(usize, usize), FloError> {
    let range = 1..=i64::from(MAX_DIMENSION);
    if !range.contains(&width) || !range.contains(&height) {
        return Err(FloError::Dimension { width, height });
    }
    Ok((width as usize, height as usize))
}

fn header(width: usize, height: usize) -> Result<Vec<u8>, FloError> {
    let w = i64::try_from(width).unwrap_or(i64::MAX);
    let h = i64::try_from(height).unwrap_or(i64::MAX);
    checked_dims(w, h)?;

    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(&TAG_STRING);
    out.extend_from_slice(&(w as i32).to_le_bytes());
    out.extend_from_slice(&(h as i32).to_le_bytes());
    Ok(out)
}

#[inline]
fn le_word(bytes: &[u8], offset: usize) -> [u8; 4] {
    [
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]
}
