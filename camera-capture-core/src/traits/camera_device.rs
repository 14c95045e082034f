use std::sync::Arc;

use crate::models::capability::{
    DeviceDescriptor, ExposureMode, FlashMode, FocusMode, PictureSize, PointOfInterest, TorchMode,
    WhiteBalanceMode,
};
use crate::models::error::CameraError;
use crate::models::frame::{CapturedFrame, Frame};
use crate::models::orientation::VideoRotation;
use crate::models::photo::VideoArtifact;

/// Callback invoked for every preview frame a device delivers.
///
/// Fires on the backend's capture thread — keep processing minimal.
pub type FrameSink = Arc<dyn Fn(Frame) + Send + Sync + 'static>;

/// Single-shot completion for a still capture. The backend must invoke it
/// exactly once: success with the captured frame, or the hardware error.
pub type PhotoCompletion = Box<dyn FnOnce(Result<CapturedFrame, CameraError>) + Send + 'static>;

/// Settings resolved by the session at the moment a still is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillSettings {
    pub flash_mode: FlashMode,
    pub rotation: VideoRotation,
    pub picture_size: PictureSize,
}

/// Hardware mutation surface, reachable only inside the exclusive
/// configuration scope opened by [`CameraDevice::configure`].
///
/// Callers validate values against the device's capability snapshot before
/// calling in; a backend may still reject a mutation, which surfaces as
/// `InvalidOperation` to the immediate caller.
pub trait DeviceControl {
    fn set_flash(&mut self, mode: FlashMode) -> Result<(), CameraError>;
    fn set_torch(&mut self, mode: TorchMode) -> Result<(), CameraError>;
    fn set_zoom(&mut self, factor: f32) -> Result<(), CameraError>;
    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), CameraError>;
    fn set_exposure_bias(&mut self, bias: f32) -> Result<(), CameraError>;
    fn set_white_balance_mode(&mut self, mode: WhiteBalanceMode) -> Result<(), CameraError>;
    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<(), CameraError>;
    fn set_focus_point(&mut self, point: PointOfInterest) -> Result<(), CameraError>;
    fn set_exposure_point(&mut self, point: PointOfInterest) -> Result<(), CameraError>;
    /// Rotation applied to the preview and photo output connections.
    fn set_rotation(&mut self, rotation: VideoRotation) -> Result<(), CameraError>;
}

/// Interface to one physical camera.
///
/// Implemented by platform backends (ffmpeg desktop backend, simulated
/// hardware in `testing`). The session core owns exactly one attached device
/// at a time and reaches hardware only through this trait.
pub trait CameraDevice: Send {
    /// The immutable descriptor queried when this device was opened.
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Run `apply` inside the device's exclusive configuration lock.
    ///
    /// The lock is released on every exit path, including when `apply`
    /// returns an error; no two configuration mutations may interleave.
    fn configure(
        &mut self,
        apply: &mut dyn FnMut(&mut dyn DeviceControl) -> Result<(), CameraError>,
    ) -> Result<(), CameraError>;

    /// Begin delivering preview frames to `sink`.
    fn start_streaming(&mut self, sink: FrameSink) -> Result<(), CameraError>;

    /// Stop delivering preview frames. Idempotent.
    fn stop_streaming(&mut self) -> Result<(), CameraError>;

    /// Trigger a dedicated hardware still capture.
    ///
    /// Must not block: the completion fires later from a backend thread,
    /// exactly once.
    fn trigger_still(
        &mut self,
        settings: StillSettings,
        completion: PhotoCompletion,
    ) -> Result<(), CameraError>;

    /// Begin recording a video segment.
    fn begin_recording(&mut self) -> Result<(), CameraError>;

    /// Finish recording and hand back the artifact, or `None` when the
    /// backend was not recording.
    fn end_recording(&mut self) -> Result<Option<VideoArtifact>, CameraError>;
}
