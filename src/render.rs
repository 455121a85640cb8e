//! Conversion of float arrays to `image` buffers for display or saving.

use image::{ImageBuffer, Luma, Rgb};
use ndarray::{ArrayView2, ArrayView3};
use rayon::prelude::*;

use crate::colormix::Window;

#[inline]
fn unit_to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Window a 2-D slice to 8-bit grey levels. Returns `None` for an invalid
/// window or a slice too large for an image buffer.
pub fn slice_to_image(
    slice: &ArrayView2<'_, f32>,
    window: Window,
) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
    if !window.is_valid() {
        return None;
    }
    let (height, width) = slice.dim();
    let pixel_data: Vec<u8> = slice
        .into_par_iter()
        .map(|&v| unit_to_u8(window.normalise(v)))
        .collect();
    ImageBuffer::from_raw(u32::try_from(width).ok()?, u32::try_from(height).ok()?, pixel_data)
}

/// Convert an `(height, width, 3)` array with values in `[0, 1]` to an RGB
/// image. Returns `None` for arrays without exactly three channels.
pub fn rgb_to_image(rgb: &ArrayView3<'_, f32>) -> Option<ImageBuffer<Rgb<u8>, Vec<u8>>> {
    let (height, width, channels) = rgb.dim();
    if channels != 3 {
        return None;
    }
    // Logical iteration order is row-major with channels innermost.
    let pixel_data: Vec<u8> = rgb.iter().map(|&v| unit_to_u8(v)).collect();
    ImageBuffer::from_raw(u32::try_from(width).ok()?, u32::try_from(height).ok()?, pixel_data)
}
