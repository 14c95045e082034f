use camera_capture_core::models::capability::DeviceDescriptor;
use camera_capture_core::models::error::CameraError;
use camera_capture_core::traits::camera_device::CameraDevice;
use camera_capture_core::traits::device_provider::DeviceProvider;

use crate::camera::{FfmpegCamera, StreamConfig};
use crate::probe;

/// Device provider that discovers capture inputs for the ffmpeg backend.
///
/// Enumeration scans the platform's device nodes on every call so hot-plugged
/// cameras show up. On hosts where discovery needs platform APIs (DirectShow),
/// construct the provider with an explicit input instead.
pub struct FfmpegProvider {
    explicit: Option<DeviceDescriptor>,
    config: StreamConfig,
}

impl FfmpegProvider {
    pub fn new() -> Self {
        Self {
            explicit: None,
            config: StreamConfig::default(),
        }
    }

    /// Address a single named input directly, e.g. `video=Integrated Camera`
    /// on Windows or an avfoundation index on macOS.
    pub fn for_input(input: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            explicit: Some(probe::descriptor_for_input(input, name)),
            config: StreamConfig::default(),
        }
    }

    pub fn with_stream_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for FfmpegProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProvider for FfmpegProvider {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError> {
        if let Some(descriptor) = &self.explicit {
            return Ok(vec![descriptor.clone()]);
        }
        probe::enumerate_video_devices()
    }

    fn open(&self, id: &str) -> Result<Box<dyn CameraDevice>, CameraError> {
        let descriptor = self
            .enumerate()?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or(CameraError::NoCamerasAvailable)?;
        Ok(Box::new(FfmpegCamera::new(descriptor, self.config)))
    }
}
