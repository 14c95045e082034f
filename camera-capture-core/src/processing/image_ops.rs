//! Still-image finishing: upright normalization and JPEG encoding.
//!
//! Callers never see rotated output; the rotation recorded at capture time
//! is applied here before encoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};

use crate::models::error::CameraError;
use crate::models::frame::{CapturedFrame, Frame};
use crate::models::orientation::VideoRotation;

/// Default JPEG quality used when a capture request does not specify one.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Rotate the captured frame upright and encode it as JPEG.
///
/// Returns `(jpeg_bytes, width, height)` with the post-rotation dimensions.
/// A frame that cannot be interpreted as an image maps to `Unknown`: the
/// hardware reported success but produced nothing decodable.
pub fn encode_upright_jpeg(
    captured: &CapturedFrame,
    quality: u8,
) -> Result<(Vec<u8>, u32, u32), CameraError> {
    let rgb = packed_rgb(&captured.frame)?;
    let rgb = RgbImage::from_raw(captured.frame.width, captured.frame.height, rgb)
        .ok_or_else(|| CameraError::unknown("capture produced no decodable image"))?;

    let upright = match captured.rotation {
        VideoRotation::Deg0 => DynamicImage::ImageRgb8(rgb),
        VideoRotation::Deg90 => DynamicImage::ImageRgb8(rgb).rotate90(),
        VideoRotation::Deg180 => DynamicImage::ImageRgb8(rgb).rotate180(),
        VideoRotation::Deg270 => DynamicImage::ImageRgb8(rgb).rotate270(),
    };

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality.clamp(1, 100));
    upright
        .write_with_encoder(encoder)
        .map_err(|e| CameraError::unknown(format!("jpeg encoding failed: {e}")))?;

    let (out_width, out_height) = match captured.rotation {
        VideoRotation::Deg0 | VideoRotation::Deg180 => (captured.frame.width, captured.frame.height),
        VideoRotation::Deg90 | VideoRotation::Deg270 => (captured.frame.height, captured.frame.width),
    };
    Ok((jpeg, out_width, out_height))
}

/// Strip row padding so the buffer is exactly `width * 3 * height` bytes.
fn packed_rgb(frame: &Frame) -> Result<Vec<u8>, CameraError> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let row = width * 3;

    if width == 0 || height == 0 || stride < row {
        return Err(CameraError::unknown("capture produced no decodable image"));
    }
    let needed = (height - 1) * stride + row;
    if frame.data.len() < needed {
        return Err(CameraError::unknown("capture produced a truncated image"));
    }

    if stride == row && frame.data.len() == row * height {
        return Ok(frame.data.clone());
    }

    let mut packed = Vec::with_capacity(row * height);
    for y in 0..height {
        let start = y * stride;
        packed.extend_from_slice(&frame.data[start..start + row]);
    }
    Ok(packed)
}
