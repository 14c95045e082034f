use std::sync::Arc;

use crate::models::capability::{
    CameraPosition, DeviceDescriptor, ExposureMode, FlashMode, FocusMode, LensKind, PictureSize,
    TorchMode, WhiteBalanceMode, MIN_ZOOM,
};
use crate::models::config::{ActiveConfiguration, SessionConfig};
use crate::models::error::CameraError;
use crate::models::orientation::VideoRotation;
use crate::models::state::SessionState;
use crate::session::selector::DeviceSelector;
use crate::session::shared::SessionShared;
use crate::traits::camera_device::{CameraDevice, FrameSink};
use crate::traits::device_provider::DeviceProvider;
use crate::traits::session_delegate::SessionDelegate;

/// Baseline zoom for multi-lens units, whose native 1.0 factor maps to an
/// ultra-wide field of view most callers do not want as default.
const MULTI_LENS_BASELINE_ZOOM: f32 = 2.0;

/// Owns the capture session lifecycle: prepare, stop, switch camera.
///
/// All reconfiguration runs inside the shared session lock, so concurrent
/// capability queries and capture requests never observe a half-applied
/// device swap.
pub struct SessionController {
    shared: Arc<SessionShared>,
    provider: Arc<dyn DeviceProvider>,
    selector: DeviceSelector,
}

impl SessionController {
    pub(crate) fn new(shared: Arc<SessionShared>, provider: Arc<dyn DeviceProvider>) -> Self {
        let selector = DeviceSelector::new(Arc::clone(&provider));
        Self {
            shared,
            provider,
            selector,
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().phase
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        self.shared.set_delegate(delegate);
    }

    /// Select a device for the requested position, wire it up, and start the
    /// session running.
    pub fn prepare(&self, config: &SessionConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(CameraError::InputsAreInvalid)?;

        let events;
        {
            let mut inner = self.shared.inner.lock();
            if inner.phase.is_running() {
                return Err(CameraError::CaptureSessionAlreadyRunning);
            }

            let selection = self.selector.select(config.position)?;
            let (device, baseline) = self.open_and_wire(&selection.primary.id, inner.rotation)?;

            inner.still_size = still_size_for(device.descriptor(), config.high_resolution);
            inner.high_resolution = config.high_resolution;
            inner.opacity = config.opacity;
            inner.active = baseline;
            inner.standby = selection.standby;
            inner.device = Some(device);
            inner.phase = SessionState::Running;
            events = [SessionState::Prepared, SessionState::Running];
        }

        for state in events {
            self.shared.notify(|d| d.on_state_changed(state));
        }
        self.shared.notify(|d| d.on_opacity_changed(config.opacity));
        Ok(())
    }

    /// Halt the session. Idempotent; the device wiring is kept attached so a
    /// later `prepare` is cheap. Pending captures are fulfilled with
    /// `CaptureSessionIsMissing`, never left dangling.
    pub fn stop(&self) {
        {
            let mut inner = self.shared.inner.lock();
            if !inner.phase.is_running() {
                return;
            }
            let was_recording = inner.recording;
            if let Some(device) = inner.device.as_mut() {
                if was_recording {
                    if let Err(e) = device.end_recording() {
                        log::warn!("failed to finish recording during stop: {e}");
                    }
                }
                if let Err(e) = device.stop_streaming() {
                    log::warn!("failed to stop preview stream: {e}");
                }
            }
            inner.recording = false;
            inner.phase = SessionState::Stopped;
        }

        self.shared.preview.close();
        self.shared
            .pending
            .fail_all(CameraError::CaptureSessionIsMissing);
        self.shared
            .notify(|d| d.on_state_changed(SessionState::Stopped));
    }

    /// Swap the active input for the opposite logical position's device.
    ///
    /// A no-op (not an error) when the active device has no front/rear
    /// position; `InvalidOperation` when the opposite device was never
    /// discovered.
    pub fn switch_camera(&self) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        if !inner.phase.is_running() {
            return Err(CameraError::CaptureSessionIsMissing);
        }

        let position = match inner.device.as_ref() {
            Some(device) => device.descriptor().position,
            None => return Err(CameraError::CaptureSessionIsMissing),
        };
        if position == CameraPosition::Unspecified {
            return Ok(());
        }

        let standby = inner.standby.clone().ok_or_else(|| {
            CameraError::invalid_operation("the opposite camera was never discovered")
        })?;

        // The whole swap happens with the session lock held: this is the
        // begin/commit bracket around the multi-step reconfiguration.
        let mut previous = match inner.device.take() {
            Some(device) => device,
            None => return Err(CameraError::CaptureSessionIsMissing),
        };
        if let Err(e) = previous.stop_streaming() {
            log::warn!("failed to detach previous camera input: {e}");
        }

        match self.open_and_wire(&standby.id, inner.rotation) {
            Ok((device, baseline)) => {
                inner.standby = Some(previous.descriptor().clone());
                inner.still_size = still_size_for(device.descriptor(), inner.high_resolution);
                inner.active = baseline;
                inner.device = Some(device);
                inner.diagnostics.camera_switches += 1;
                Ok(())
            }
            Err(e) => {
                // Re-attach the previous input so the session never ends up
                // half-switched.
                let sink = self.preview_sink();
                if let Err(restore) = previous.start_streaming(sink) {
                    log::error!("failed to restore camera after switch failure: {restore}");
                }
                inner.device = Some(previous);
                Err(e)
            }
        }
    }

    /// Open a device, apply its baseline configuration and the current
    /// rotation, and attach the preview sink.
    fn open_and_wire(
        &self,
        id: &str,
        rotation: VideoRotation,
    ) -> Result<(Box<dyn CameraDevice>, ActiveConfiguration), CameraError> {
        let mut device = self.provider.open(id)?;
        let baseline = baseline_configuration(device.descriptor());
        apply_baseline(device.as_mut(), &baseline)?;
        device.configure(&mut |c| c.set_rotation(rotation))?;
        self.shared.preview.open();
        device.start_streaming(self.preview_sink())?;
        Ok((device, baseline))
    }

    fn preview_sink(&self) -> FrameSink {
        let tap = Arc::clone(&self.shared.preview);
        Arc::new(move |frame| tap.push(frame))
    }
}

/// The default per-device configuration applied right after selection:
/// continuous autofocus/exposure/white balance where supported, and the
/// multi-lens zoom bump.
fn baseline_configuration(descriptor: &DeviceDescriptor) -> ActiveConfiguration {
    let caps = &descriptor.capabilities;
    let zoom_factor = if descriptor.lens == LensKind::MultiLens {
        caps.clamp_zoom(MULTI_LENS_BASELINE_ZOOM)
    } else {
        MIN_ZOOM
    };
    ActiveConfiguration {
        flash_mode: FlashMode::Off,
        torch_mode: TorchMode::Off,
        zoom_factor,
        exposure_mode: preferred_mode(
            &caps.exposure_modes,
            ExposureMode::ContinuousAuto,
            ExposureMode::Locked,
        ),
        exposure_bias: 0.0,
        white_balance_mode: preferred_mode(
            &caps.white_balance_modes,
            WhiteBalanceMode::ContinuousAuto,
            WhiteBalanceMode::Locked,
        ),
        focus_mode: preferred_mode(
            &caps.focus_modes,
            FocusMode::ContinuousAuto,
            FocusMode::Locked,
        ),
    }
}

fn preferred_mode<M: Copy + PartialEq>(supported: &[M], preferred: M, fallback: M) -> M {
    if supported.contains(&preferred) {
        preferred
    } else {
        supported.first().copied().unwrap_or(fallback)
    }
}

fn apply_baseline(
    device: &mut dyn CameraDevice,
    baseline: &ActiveConfiguration,
) -> Result<(), CameraError> {
    let caps = device.descriptor().capabilities.clone();
    let baseline = *baseline;
    device.configure(&mut |c| {
        c.set_zoom(baseline.zoom_factor)?;
        if caps.supports_focus_mode(baseline.focus_mode) {
            c.set_focus_mode(baseline.focus_mode)?;
        }
        if caps.supports_exposure_mode(baseline.exposure_mode) {
            c.set_exposure_mode(baseline.exposure_mode)?;
        }
        if caps.supports_white_balance_mode(baseline.white_balance_mode) {
            c.set_white_balance_mode(baseline.white_balance_mode)?;
        }
        if caps.supports_flash_mode(FlashMode::Off) {
            c.set_flash(FlashMode::Off)?;
        }
        if caps.supports_torch() {
            c.set_torch(TorchMode::Off)?;
        }
        Ok(())
    })
}

/// High-resolution capture uses the largest supported size; otherwise the
/// device's first-reported (default) size.
fn still_size_for(descriptor: &DeviceDescriptor, high_resolution: bool) -> PictureSize {
    let caps = &descriptor.capabilities;
    let fallback = PictureSize::new(640, 480);
    if high_resolution {
        caps.largest_picture_size().unwrap_or(fallback)
    } else {
        caps.picture_sizes.first().copied().unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimulatedProvider;

    use approx::assert_relative_eq;

    fn controller_over(provider: SimulatedProvider) -> SessionController {
        SessionController::new(SessionShared::new(), Arc::new(provider))
    }

    #[test]
    fn prepare_twice_without_stop_fails() {
        let controller = controller_over(SimulatedProvider::dual_camera());
        controller.prepare(&SessionConfig::default()).unwrap();
        assert_eq!(
            controller.prepare(&SessionConfig::default()).unwrap_err(),
            CameraError::CaptureSessionAlreadyRunning
        );
        controller.stop();
        controller.prepare(&SessionConfig::default()).unwrap();
    }

    #[test]
    fn prepare_fails_without_matching_device() {
        let controller = controller_over(SimulatedProvider::with_devices(vec![]));
        assert_eq!(
            controller.prepare(&SessionConfig::default()).unwrap_err(),
            CameraError::NoCamerasAvailable
        );
        assert_eq!(controller.state(), SessionState::Unprepared);
    }

    #[test]
    fn stop_is_idempotent() {
        let controller = controller_over(SimulatedProvider::dual_camera());
        controller.prepare(&SessionConfig::default()).unwrap();
        controller.stop();
        controller.stop();
        assert_eq!(controller.state(), SessionState::Stopped);
    }

    #[test]
    fn multi_lens_rear_gets_baseline_zoom_bump() {
        let shared = SessionShared::new();
        let provider = Arc::new(SimulatedProvider::dual_camera());
        let controller = SessionController::new(Arc::clone(&shared), provider);
        controller.prepare(&SessionConfig::default()).unwrap();
        assert_relative_eq!(shared.inner.lock().active.zoom_factor, 2.0);
    }

    #[test]
    fn single_wide_rear_keeps_unit_baseline_zoom() {
        let shared = SessionShared::new();
        let provider = Arc::new(SimulatedProvider::with_devices(vec![
            SimulatedProvider::rear_wide_descriptor(),
        ]));
        let controller = SessionController::new(Arc::clone(&shared), provider);
        controller.prepare(&SessionConfig::default()).unwrap();
        assert_relative_eq!(shared.inner.lock().active.zoom_factor, 1.0);
    }

    #[test]
    fn switch_requires_running_session() {
        let controller = controller_over(SimulatedProvider::dual_camera());
        assert_eq!(
            controller.switch_camera().unwrap_err(),
            CameraError::CaptureSessionIsMissing
        );
    }

    #[test]
    fn switch_without_opposite_device_is_rejected() {
        let controller = controller_over(SimulatedProvider::with_devices(vec![
            SimulatedProvider::rear_wide_descriptor(),
        ]));
        controller.prepare(&SessionConfig::default()).unwrap();
        match controller.switch_camera() {
            Err(CameraError::InvalidOperation(_)) => {}
            other => panic!("expected InvalidOperation, got {other:?}"),
        }
    }

    #[test]
    fn switch_on_unspecified_position_is_a_noop() {
        let shared = SessionShared::new();
        let provider = Arc::new(SimulatedProvider::with_devices(vec![
            SimulatedProvider::webcam_descriptor(),
        ]));
        let controller = SessionController::new(Arc::clone(&shared), provider);
        controller
            .prepare(&SessionConfig::with_position(CameraPosition::Unspecified))
            .unwrap();
        controller.switch_camera().unwrap();
        assert_eq!(shared.inner.lock().diagnostics.camera_switches, 0);
    }

    #[test]
    fn double_switch_restores_original_position_and_baseline() {
        let shared = SessionShared::new();
        let provider = Arc::new(SimulatedProvider::dual_camera());
        let controller = SessionController::new(Arc::clone(&shared), provider);
        controller.prepare(&SessionConfig::default()).unwrap();

        controller.switch_camera().unwrap();
        {
            let inner = shared.inner.lock();
            let descriptor = inner.device.as_ref().unwrap().descriptor();
            assert_eq!(descriptor.position, CameraPosition::Front);
            assert_relative_eq!(inner.active.zoom_factor, 1.0);
        }

        controller.switch_camera().unwrap();
        {
            let inner = shared.inner.lock();
            let descriptor = inner.device.as_ref().unwrap().descriptor();
            assert_eq!(descriptor.position, CameraPosition::Rear);
            assert_relative_eq!(inner.active.zoom_factor, 2.0);
            assert_eq!(inner.diagnostics.camera_switches, 2);
        }
    }

    #[test]
    fn high_resolution_picks_largest_picture_size() {
        let shared = SessionShared::new();
        let provider = Arc::new(SimulatedProvider::dual_camera());
        let controller = SessionController::new(Arc::clone(&shared), provider);
        let config = SessionConfig {
            high_resolution: true,
            ..Default::default()
        };
        controller.prepare(&config).unwrap();
        let expected = SimulatedProvider::rear_multi_lens_descriptor()
            .capabilities
            .largest_picture_size()
            .unwrap();
        assert_eq!(shared.inner.lock().still_size, expected);
    }

    #[test]
    fn invalid_start_options_are_inputs_are_invalid() {
        let controller = controller_over(SimulatedProvider::dual_camera());
        let config = SessionConfig {
            opacity: 2.0,
            ..Default::default()
        };
        match controller.prepare(&config) {
            Err(CameraError::InputsAreInvalid(_)) => {}
            other => panic!("expected InputsAreInvalid, got {other:?}"),
        }
    }
}
