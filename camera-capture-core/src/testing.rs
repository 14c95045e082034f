//! Simulated camera hardware for offline testing.
//!
//! No physical device or camera permission is needed: the provider hands out
//! [`SimulatedCamera`]s that stream synthetic frames, complete still captures
//! from a background thread, and record every hardware mutation into a
//! shared [`HardwareLog`] for assertions. Failure injection is available
//! through [`SimulatedBehavior`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::capability::{
    CameraPosition, DeviceCapabilities, DeviceDescriptor, ExposureMode, FlashMode, FocusMode,
    LensKind, PictureSize, PointOfInterest, TorchMode, WhiteBalanceMode,
};
use crate::models::error::CameraError;
use crate::models::frame::{CapturedFrame, Frame};
use crate::models::orientation::VideoRotation;
use crate::models::photo::VideoArtifact;
use crate::traits::camera_device::{
    CameraDevice, DeviceControl, FrameSink, PhotoCompletion, StillSettings,
};
use crate::traits::device_provider::DeviceProvider;

/// One hardware mutation or action observed by the simulated backend.
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCall {
    Flash(FlashMode),
    Torch(TorchMode),
    Zoom(f32),
    ExposureMode(ExposureMode),
    ExposureBias(f32),
    WhiteBalanceMode(WhiteBalanceMode),
    FocusMode(FocusMode),
    FocusPoint(PointOfInterest),
    ExposurePoint(PointOfInterest),
    Rotation(VideoRotation),
    StreamStarted(String),
    StreamStopped(String),
    StillTriggered(StillSettings),
    RecordingStarted(String),
    RecordingStopped(String),
}

/// Shared record of everything the session asked the hardware to do.
#[derive(Default)]
pub struct HardwareLog {
    calls: Mutex<Vec<HardwareCall>>,
}

impl HardwareLog {
    pub fn calls(&self) -> Vec<HardwareCall> {
        self.calls.lock().clone()
    }

    pub fn still_triggers(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, HardwareCall::StillTriggered(_)))
            .count()
    }

    pub fn last_still_settings(&self) -> Option<StillSettings> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                HardwareCall::StillTriggered(settings) => Some(*settings),
                _ => None,
            })
    }

    fn push(&self, call: HardwareCall) {
        self.calls.lock().push(call);
    }
}

/// Failure injection knobs, read live at each hardware call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedBehavior {
    /// Every still capture completes with a hardware error.
    pub fail_still_captures: bool,
    /// Still captures complete "successfully" with an undecodable frame.
    pub produce_undecodable_frames: bool,
    /// Still captures never complete (the completion is dropped).
    pub stall_still_captures: bool,
    /// Every configuration mutation is rejected by the hardware.
    pub reject_configuration: bool,
}

/// Produce a deterministic gradient frame of the given size.
pub fn synthetic_frame(width: u32, height: u32) -> Frame {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x % 256) as u8);
            data.push((y % 256) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Frame::new_rgb8(data, width, height, width * 3)
}

struct SimulatedControls {
    device_id: String,
    log: Arc<HardwareLog>,
    behavior: Arc<Mutex<SimulatedBehavior>>,
}

impl SimulatedControls {
    fn guard(&self) -> Result<(), CameraError> {
        if self.behavior.lock().reject_configuration {
            return Err(CameraError::invalid_operation(format!(
                "simulated hardware rejected configuration of {}",
                self.device_id
            )));
        }
        Ok(())
    }
}

impl DeviceControl for SimulatedControls {
    fn set_flash(&mut self, mode: FlashMode) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::Flash(mode));
        Ok(())
    }

    fn set_torch(&mut self, mode: TorchMode) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::Torch(mode));
        Ok(())
    }

    fn set_zoom(&mut self, factor: f32) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::Zoom(factor));
        Ok(())
    }

    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::ExposureMode(mode));
        Ok(())
    }

    fn set_exposure_bias(&mut self, bias: f32) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::ExposureBias(bias));
        Ok(())
    }

    fn set_white_balance_mode(&mut self, mode: WhiteBalanceMode) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::WhiteBalanceMode(mode));
        Ok(())
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::FocusMode(mode));
        Ok(())
    }

    fn set_focus_point(&mut self, point: PointOfInterest) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::FocusPoint(point));
        Ok(())
    }

    fn set_exposure_point(&mut self, point: PointOfInterest) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::ExposurePoint(point));
        Ok(())
    }

    fn set_rotation(&mut self, rotation: VideoRotation) -> Result<(), CameraError> {
        self.guard()?;
        self.log.push(HardwareCall::Rotation(rotation));
        Ok(())
    }
}

struct StreamWorker {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// Simulated physical camera.
pub struct SimulatedCamera {
    descriptor: DeviceDescriptor,
    controls: SimulatedControls,
    log: Arc<HardwareLog>,
    behavior: Arc<Mutex<SimulatedBehavior>>,
    stream: Option<StreamWorker>,
    recording_since: Option<Instant>,
}

impl SimulatedCamera {
    fn new(
        descriptor: DeviceDescriptor,
        log: Arc<HardwareLog>,
        behavior: Arc<Mutex<SimulatedBehavior>>,
    ) -> Self {
        Self {
            controls: SimulatedControls {
                device_id: descriptor.id.clone(),
                log: Arc::clone(&log),
                behavior: Arc::clone(&behavior),
            },
            descriptor,
            log,
            behavior,
            stream: None,
            recording_since: None,
        }
    }
}

impl CameraDevice for SimulatedCamera {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn configure(
        &mut self,
        apply: &mut dyn FnMut(&mut dyn DeviceControl) -> Result<(), CameraError>,
    ) -> Result<(), CameraError> {
        apply(&mut self.controls)
    }

    fn start_streaming(&mut self, sink: FrameSink) -> Result<(), CameraError> {
        if self.stream.is_some() {
            return Err(CameraError::invalid_operation("preview already streaming"));
        }
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("simulated-preview".into())
            .spawn(move || {
                // First frame lands immediately so sample captures never
                // wait a full tick.
                while !worker_stop.load(Ordering::SeqCst) {
                    sink(synthetic_frame(64, 48));
                    thread::sleep(Duration::from_millis(10));
                }
            })
            .map_err(|e| CameraError::unknown(format!("failed to spawn preview thread: {e}")))?;
        self.stream = Some(StreamWorker { stop, handle });
        self.log
            .push(HardwareCall::StreamStarted(self.descriptor.id.clone()));
        Ok(())
    }

    fn stop_streaming(&mut self) -> Result<(), CameraError> {
        if let Some(worker) = self.stream.take() {
            worker.stop.store(true, Ordering::SeqCst);
            let _ = worker.handle.join();
            self.log
                .push(HardwareCall::StreamStopped(self.descriptor.id.clone()));
        }
        Ok(())
    }

    fn trigger_still(
        &mut self,
        settings: StillSettings,
        completion: PhotoCompletion,
    ) -> Result<(), CameraError> {
        self.log.push(HardwareCall::StillTriggered(settings));
        let behavior = *self.behavior.lock();
        let device_id = self.descriptor.id.clone();
        thread::Builder::new()
            .name("simulated-still".into())
            .spawn(move || {
                thread::sleep(Duration::from_millis(2));
                if behavior.stall_still_captures {
                    // Drop the completion without firing it: the session's
                    // stop path is responsible for resolving the slot.
                    drop(completion);
                    return;
                }
                if behavior.fail_still_captures {
                    completion(Err(CameraError::invalid_operation(format!(
                        "simulated capture failure on {device_id}"
                    ))));
                    return;
                }
                if behavior.produce_undecodable_frames {
                    completion(Ok(CapturedFrame {
                        frame: Frame::new_rgb8(Vec::new(), 0, 0, 0),
                        rotation: settings.rotation,
                    }));
                    return;
                }
                completion(Ok(CapturedFrame {
                    frame: synthetic_frame(settings.picture_size.width, settings.picture_size.height),
                    rotation: settings.rotation,
                }));
            })
            .map_err(|e| CameraError::unknown(format!("failed to spawn capture thread: {e}")))?;
        Ok(())
    }

    fn begin_recording(&mut self) -> Result<(), CameraError> {
        if self.recording_since.is_some() {
            return Err(CameraError::invalid_operation("already recording"));
        }
        self.recording_since = Some(Instant::now());
        self.log
            .push(HardwareCall::RecordingStarted(self.descriptor.id.clone()));
        Ok(())
    }

    fn end_recording(&mut self) -> Result<Option<VideoArtifact>, CameraError> {
        let started = match self.recording_since.take() {
            Some(started) => started,
            None => return Ok(None),
        };
        let path = std::env::temp_dir().join(format!(
            "simulated_recording_{}.mp4",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, b"")
            .map_err(|e| CameraError::unknown(format!("failed to write recording: {e}")))?;
        self.log
            .push(HardwareCall::RecordingStopped(self.descriptor.id.clone()));
        Ok(Some(VideoArtifact {
            path,
            duration_secs: started.elapsed().as_secs_f64(),
        }))
    }
}

impl Drop for SimulatedCamera {
    fn drop(&mut self) {
        let _ = self.stop_streaming();
    }
}

/// Device provider backed by simulated hardware.
pub struct SimulatedProvider {
    devices: Vec<DeviceDescriptor>,
    log: Arc<HardwareLog>,
    behavior: Arc<Mutex<SimulatedBehavior>>,
}

impl SimulatedProvider {
    pub fn with_devices(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices,
            log: Arc::new(HardwareLog::default()),
            behavior: Arc::new(Mutex::new(SimulatedBehavior::default())),
        }
    }

    /// A phone-shaped setup: wide-angle front camera plus multi-lens rear.
    pub fn dual_camera() -> Self {
        Self::with_devices(vec![
            Self::front_wide_descriptor(),
            Self::rear_multi_lens_descriptor(),
        ])
    }

    pub fn log(&self) -> Arc<HardwareLog> {
        Arc::clone(&self.log)
    }

    /// Change the failure behavior of every device opened from this
    /// provider, including already-open ones.
    pub fn set_behavior(&self, behavior: SimulatedBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn front_wide_descriptor() -> DeviceDescriptor {
        DeviceDescriptor {
            id: "sim:front-wide".into(),
            name: "Simulated Front Camera".into(),
            position: CameraPosition::Front,
            lens: LensKind::WideAngle,
            capabilities: DeviceCapabilities {
                flash_modes: vec![FlashMode::Off],
                torch_modes: Vec::new(),
                exposure_modes: vec![
                    ExposureMode::ContinuousAuto,
                    ExposureMode::Auto,
                    ExposureMode::Locked,
                ],
                white_balance_modes: vec![
                    WhiteBalanceMode::ContinuousAuto,
                    WhiteBalanceMode::Auto,
                    WhiteBalanceMode::Locked,
                ],
                focus_modes: vec![FocusMode::ContinuousAuto, FocusMode::Auto],
                picture_sizes: vec![PictureSize::new(640, 480), PictureSize::new(1280, 960)],
                max_zoom: 4.0,
                min_exposure_bias: -2.0,
                max_exposure_bias: 2.0,
                supports_focus_point_of_interest: true,
                supports_exposure_point_of_interest: true,
            },
        }
    }

    pub fn rear_multi_lens_descriptor() -> DeviceDescriptor {
        DeviceDescriptor {
            id: "sim:rear-multi".into(),
            name: "Simulated Rear Triple Camera".into(),
            position: CameraPosition::Rear,
            lens: LensKind::MultiLens,
            capabilities: DeviceCapabilities {
                flash_modes: vec![FlashMode::Off, FlashMode::On, FlashMode::Auto],
                torch_modes: vec![TorchMode::Off, TorchMode::On, TorchMode::Auto],
                exposure_modes: vec![
                    ExposureMode::ContinuousAuto,
                    ExposureMode::Auto,
                    ExposureMode::Locked,
                ],
                white_balance_modes: vec![
                    WhiteBalanceMode::ContinuousAuto,
                    WhiteBalanceMode::Auto,
                    WhiteBalanceMode::Locked,
                ],
                focus_modes: vec![FocusMode::ContinuousAuto, FocusMode::Auto, FocusMode::Locked],
                picture_sizes: vec![
                    PictureSize::new(640, 480),
                    PictureSize::new(1920, 1080),
                    PictureSize::new(4032, 3024),
                ],
                max_zoom: 10.0,
                min_exposure_bias: -2.0,
                max_exposure_bias: 2.0,
                supports_focus_point_of_interest: true,
                supports_exposure_point_of_interest: true,
            },
        }
    }

    pub fn rear_wide_descriptor() -> DeviceDescriptor {
        DeviceDescriptor {
            id: "sim:rear-wide".into(),
            name: "Simulated Rear Camera".into(),
            position: CameraPosition::Rear,
            lens: LensKind::WideAngle,
            capabilities: DeviceCapabilities {
                flash_modes: vec![FlashMode::Off, FlashMode::On, FlashMode::Auto],
                torch_modes: vec![TorchMode::Off, TorchMode::On, TorchMode::Auto],
                exposure_modes: vec![ExposureMode::ContinuousAuto, ExposureMode::Locked],
                white_balance_modes: vec![
                    WhiteBalanceMode::ContinuousAuto,
                    WhiteBalanceMode::Locked,
                ],
                focus_modes: vec![FocusMode::ContinuousAuto, FocusMode::Auto],
                picture_sizes: vec![PictureSize::new(640, 480), PictureSize::new(1920, 1080)],
                max_zoom: 4.0,
                min_exposure_bias: -2.0,
                max_exposure_bias: 2.0,
                supports_focus_point_of_interest: true,
                supports_exposure_point_of_interest: true,
            },
        }
    }

    /// A desktop webcam: no facing direction, no flash or torch, unit zoom.
    pub fn webcam_descriptor() -> DeviceDescriptor {
        DeviceDescriptor {
            id: "sim:webcam-0".into(),
            name: "Simulated Webcam".into(),
            position: CameraPosition::Unspecified,
            lens: LensKind::WideAngle,
            capabilities: DeviceCapabilities {
                flash_modes: vec![FlashMode::Off],
                torch_modes: Vec::new(),
                exposure_modes: vec![ExposureMode::ContinuousAuto],
                white_balance_modes: vec![WhiteBalanceMode::ContinuousAuto],
                focus_modes: vec![FocusMode::ContinuousAuto],
                picture_sizes: vec![PictureSize::new(640, 480), PictureSize::new(1280, 720)],
                max_zoom: 1.0,
                min_exposure_bias: 0.0,
                max_exposure_bias: 0.0,
                supports_focus_point_of_interest: false,
                supports_exposure_point_of_interest: false,
            },
        }
    }
}

impl DeviceProvider for SimulatedProvider {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError> {
        Ok(self.devices.clone())
    }

    fn open(&self, id: &str) -> Result<Box<dyn CameraDevice>, CameraError> {
        let descriptor = self
            .devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(CameraError::NoCamerasAvailable)?;
        Ok(Box::new(SimulatedCamera::new(
            descriptor,
            Arc::clone(&self.log),
            Arc::clone(&self.behavior),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_frames_are_tightly_packed() {
        let frame = synthetic_frame(8, 4);
        assert_eq!(frame.data.len(), 8 * 4 * 3);
        assert_eq!(frame.stride, 24);
    }

    #[test]
    fn open_unknown_id_fails() {
        let provider = SimulatedProvider::dual_camera();
        assert_eq!(
            provider.open("sim:nope").err().unwrap(),
            CameraError::NoCamerasAvailable
        );
    }

    #[test]
    fn streaming_delivers_frames_and_stops() {
        let provider = SimulatedProvider::dual_camera();
        let mut camera = provider.open("sim:front-wide").unwrap();
        let delivered = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&delivered);
        camera
            .start_streaming(Arc::new(move |_frame| {
                *counter.lock() += 1;
            }))
            .unwrap();
        std::thread::sleep(Duration::from_millis(30));
        camera.stop_streaming().unwrap();
        assert!(*delivered.lock() > 0);
    }

    #[test]
    fn double_start_streaming_is_rejected() {
        let provider = SimulatedProvider::dual_camera();
        let mut camera = provider.open("sim:front-wide").unwrap();
        camera.start_streaming(Arc::new(|_| {})).unwrap();
        assert!(camera.start_streaming(Arc::new(|_| {})).is_err());
    }
}
