use super::orientation::VideoRotation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
}

/// One uncompressed video frame as delivered by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Bytes per row; at least `width * 3` for `Rgb8`.
    pub stride: u32,
    pub pixel_format: PixelFormat,
}

impl Frame {
    pub fn new_rgb8(data: Vec<u8>, width: u32, height: u32, stride: u32) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            pixel_format: PixelFormat::Rgb8,
        }
    }
}

/// A frame delivered by a still-capture completion, together with the
/// rotation that must be applied to bring it upright.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub frame: Frame,
    pub rotation: VideoRotation,
}
