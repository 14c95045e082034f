use std::sync::Arc;

use crate::control::gesture::GestureBridge;
use crate::control::mediator::ConfigurationMediator;
use crate::models::capability::{
    DeviceDescriptor, ExposureMode, FlashMode, PictureSize, WhiteBalanceMode,
};
use crate::models::config::SessionConfig;
use crate::models::error::CameraError;
use crate::models::orientation::DeviceOrientation;
use crate::models::photo::{CapturedPhoto, VideoArtifact};
use crate::models::state::SessionState;
use crate::processing::image_ops::DEFAULT_JPEG_QUALITY;
use crate::session::controller::SessionController;
use crate::session::coordinator::CaptureCoordinator;
use crate::session::orientation::OrientationAdapter;
use crate::session::shared::SessionShared;
use crate::session::SessionDiagnostics;
use crate::traits::device_provider::DeviceProvider;
use crate::traits::session_delegate::SessionDelegate;

/// The assembled capture kit: session controller, capture coordinator,
/// configuration mediator, gesture bridge, and orientation adapter wired
/// over one shared session state.
///
/// The method surface matches the commands the dispatch layer exposes, so a
/// host binding stays a thin 1:1 mapping.
pub struct CameraKit {
    provider: Arc<dyn DeviceProvider>,
    shared: Arc<SessionShared>,
    controller: SessionController,
    coordinator: CaptureCoordinator,
    mediator: ConfigurationMediator,
    gestures: GestureBridge,
    orientation: OrientationAdapter,
}

impl CameraKit {
    pub fn new(provider: Arc<dyn DeviceProvider>) -> Self {
        let shared = SessionShared::new();
        let mediator = ConfigurationMediator::new(Arc::clone(&shared));
        Self {
            controller: SessionController::new(Arc::clone(&shared), Arc::clone(&provider)),
            coordinator: CaptureCoordinator::new(Arc::clone(&shared)),
            gestures: GestureBridge::new(mediator.clone()),
            orientation: OrientationAdapter::new(Arc::clone(&shared)),
            mediator,
            shared,
            provider,
        }
    }

    // --- Session lifecycle ---

    pub fn start(&self, config: SessionConfig) -> Result<(), CameraError> {
        self.gestures.set_zoom_enabled(config.zoom_enabled);
        self.controller.prepare(&config)
    }

    pub fn stop(&self) {
        self.controller.stop();
    }

    pub fn flip(&self) -> Result<(), CameraError> {
        self.controller.switch_camera()
    }

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        self.controller.set_delegate(delegate);
    }

    pub fn get_available_devices(&self) -> Result<Vec<DeviceDescriptor>, CameraError> {
        self.provider.enumerate()
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.shared.inner.lock().diagnostics
    }

    // --- Capture ---

    /// Capture a still photo. `None` uses the default JPEG quality of 85.
    pub fn capture(&self, quality: Option<u8>) -> Result<CapturedPhoto, CameraError> {
        self.coordinator
            .capture_still(quality.unwrap_or(DEFAULT_JPEG_QUALITY))
    }

    /// Capture from the preview stream without triggering the shutter.
    pub fn capture_sample(&self, quality: Option<u8>) -> Result<CapturedPhoto, CameraError> {
        self.coordinator
            .capture_sample(quality.unwrap_or(DEFAULT_JPEG_QUALITY))
    }

    pub fn start_record_video(&self) -> Result<(), CameraError> {
        self.coordinator.start_record_video()
    }

    pub fn stop_record_video(&self) -> Result<Option<VideoArtifact>, CameraError> {
        self.coordinator.stop_record_video()
    }

    // --- Configuration ---

    pub fn get_supported_picture_sizes(&self) -> Result<Vec<PictureSize>, CameraError> {
        self.mediator.supported_picture_sizes()
    }

    pub fn get_supported_flash_modes(&self) -> Result<Vec<FlashMode>, CameraError> {
        self.mediator.supported_flash_modes()
    }

    pub fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CameraError> {
        self.mediator.set_flash_mode(mode)
    }

    pub fn get_exposure_modes(&self) -> Result<Vec<ExposureMode>, CameraError> {
        self.mediator.exposure_modes()
    }

    pub fn get_exposure_mode(&self) -> Result<ExposureMode, CameraError> {
        self.mediator.exposure_mode()
    }

    pub fn set_exposure_mode(&self, mode: ExposureMode) -> Result<(), CameraError> {
        self.mediator.set_exposure_mode(mode)
    }

    pub fn get_exposure_compensation(&self) -> Result<f32, CameraError> {
        self.mediator.exposure_compensation()
    }

    pub fn get_exposure_compensation_range(&self) -> Result<(f32, f32), CameraError> {
        self.mediator.exposure_compensation_range()
    }

    pub fn set_exposure_compensation(&self, value: f32) -> Result<(), CameraError> {
        self.mediator.set_exposure_compensation(value)
    }

    pub fn get_supported_white_balance_modes(&self) -> Result<Vec<WhiteBalanceMode>, CameraError> {
        self.mediator.white_balance_modes()
    }

    pub fn get_white_balance_mode(&self) -> Result<WhiteBalanceMode, CameraError> {
        self.mediator.white_balance_mode()
    }

    pub fn set_white_balance_mode(&self, mode: WhiteBalanceMode) -> Result<(), CameraError> {
        self.mediator.set_white_balance_mode(mode)
    }

    pub fn get_zoom(&self) -> Result<f32, CameraError> {
        self.mediator.zoom()
    }

    pub fn set_zoom(&self, factor: f32) -> Result<(), CameraError> {
        self.mediator.set_zoom(factor)
    }

    pub fn set_opacity(&self, opacity: f32) -> Result<(), CameraError> {
        self.mediator.set_opacity(opacity)
    }

    // --- Gestures and orientation ---

    pub fn handle_tap(&self, x: f32, y: f32, view_width: f32, view_height: f32) {
        self.gestures.handle_tap(x, y, view_width, view_height);
    }

    pub fn pinch_began(&self, scale: f32) {
        self.gestures.pinch_began(scale);
    }

    pub fn pinch_changed(&self, scale: f32) {
        self.gestures.pinch_changed(scale);
    }

    pub fn pinch_ended(&self) {
        self.gestures.pinch_ended();
    }

    pub fn set_orientation(&self, orientation: DeviceOrientation) {
        self.orientation.orientation_changed(orientation);
    }

    // --- Component access for hosts that need more than the command set ---

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn coordinator(&self) -> &CaptureCoordinator {
        &self.coordinator
    }

    pub fn mediator(&self) -> &ConfigurationMediator {
        &self.mediator
    }

    pub fn gestures(&self) -> &GestureBridge {
        &self.gestures
    }

    pub fn orientation_adapter(&self) -> &OrientationAdapter {
        &self.orientation
    }
}
