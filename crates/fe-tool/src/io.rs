//! PNG adapter between the `image` crate and `fe-core` grids.

use std::path::Path;

use fe_core::{Image, Mask, Rgb8, binarize_mask};
use image::{GrayImage, RgbImage};

use crate::error::EvalError;

fn image_error(path: &Path) -> impl FnOnce(image::ImageError) -> EvalError + '_ {
    move |source| EvalError::Image {
        path: path.to_path_buf(),
        source,
    }
}

pub fn load_rgb(path: &Path) -> Result<Image<Rgb8>, EvalError> {
    let rgb = image::open(path).map_err(image_error(path))?.to_rgb8();
    let (w, h) = rgb.dimensions();
    let data = rgb.pixels().map(|p| p.0).collect();
    Ok(Image::from_vec(w as usize, h as usize, data)?)
}

/// Loads a single-channel mask; any non-zero value counts as set.
pub fn load_mask(path: &Path) -> Result<Mask, EvalError> {
    let luma = image::open(path).map_err(image_error(path))?.to_luma8();
    let (w, h) = luma.dimensions();
    let raw = Image::from_vec(w as usize, h as usize, luma.into_raw())?;
    Ok(binarize_mask(&raw.as_view()))
}

pub fn save_rgb(path: &Path, img: &Image<Rgb8>) -> Result<(), EvalError> {
    let raw: Vec<u8> = img.data().iter().flatten().copied().collect();
    let rgb = RgbImage::from_raw(img.width() as u32, img.height() as u32, raw)
        .expect("dimensions and data length must match");
    rgb.save(path).map_err(image_error(path))
}

pub fn save_mask(path: &Path, mask: &Mask) -> Result<(), EvalError> {
    let gray = GrayImage::from_raw(
        mask.width() as u32,
        mask.height() as u32,
        mask.data().to_vec(),
    )
    .expect("dimensions and data length must match");
    gray.save(path).map_err(image_error(path))
}
