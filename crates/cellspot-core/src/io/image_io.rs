use std::path::Path;

use image::{GrayImage, ImageFormat};
use ndarray::Array2;

use crate::consts::MASK_FOREGROUND_VALUE;
use crate::error::{CellspotError, Result};
use crate::frame::{Frame, Mask};

/// Load an image file as an 8-bit grayscale frame.
pub fn load_frame(path: &Path, frame_index: usize) -> Result<Frame> {
    let gray = image::open(path)?.to_luma8();
    Ok(Frame::with_index(gray_to_array(&gray), frame_index))
}

pub fn gray_to_array(img: &GrayImage) -> Array2<u8> {
    let (w, h) = img.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        img.get_pixel(col as u32, row as u32).0[0]
    })
}

pub fn array_to_gray(data: &Array2<u8>) -> Result<GrayImage> {
    let (h, w) = data.dim();
    let pixels: Vec<u8> = data.iter().copied().collect();
    GrayImage::from_raw(w as u32, h as u32, pixels).ok_or(CellspotError::InvalidDimensions {
        width: w as u32,
        height: h as u32,
    })
}

/// Save 8-bit gray pixels; TIFF for `.tif`/`.tiff`, PNG for `.png`, and
/// whatever the extension implies otherwise.
pub fn save_gray(data: &Array2<u8>, path: &Path) -> Result<()> {
    let img = array_to_gray(data)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => img.save_with_format(path, ImageFormat::Tiff)?,
        Some("png") => img.save_with_format(path, ImageFormat::Png)?,
        _ => img.save(path)?,
    }
    Ok(())
}

/// Render a mask as 0 / 255 pixels at its own resolution.
pub fn mask_to_gray(mask: &Mask) -> Array2<u8> {
    mask.data
        .mapv(|fg| if fg { MASK_FOREGROUND_VALUE } else { 0 })
}

pub fn save_mask(mask: &Mask, path: &Path) -> Result<()> {
    save_gray(&mask_to_gray(mask), path)
}
