use std::sync::Arc;

use crate::models::capability::{
    DeviceCapabilities, ExposureMode, FlashMode, FocusMode, PictureSize, PointOfInterest,
    TorchMode, WhiteBalanceMode,
};
use crate::models::error::CameraError;
use crate::session::shared::SessionShared;

/// Applies and reads exposure, white-balance, flash/torch, and zoom settings
/// against the active device.
///
/// Every setter validates against the device's capability snapshot first and
/// degrades to a successful no-op for unsupported values (zoom clamps
/// instead); mutations happen only inside the device's exclusive
/// configuration scope, and hardware rejections surface as
/// `InvalidOperation` without touching the tracked configuration.
#[derive(Clone)]
pub struct ConfigurationMediator {
    shared: Arc<SessionShared>,
}

impl ConfigurationMediator {
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    fn capabilities(&self) -> Result<DeviceCapabilities, CameraError> {
        let inner = self.shared.inner.lock();
        inner
            .device
            .as_ref()
            .map(|d| d.descriptor().capabilities.clone())
            .ok_or(CameraError::CaptureSessionIsMissing)
    }

    // --- Read surface (hardware-reported order preserved) ---

    pub fn supported_picture_sizes(&self) -> Result<Vec<PictureSize>, CameraError> {
        Ok(self.capabilities()?.picture_sizes)
    }

    pub fn supported_flash_modes(&self) -> Result<Vec<FlashMode>, CameraError> {
        Ok(self.capabilities()?.flash_modes)
    }

    pub fn exposure_modes(&self) -> Result<Vec<ExposureMode>, CameraError> {
        Ok(self.capabilities()?.exposure_modes)
    }

    pub fn exposure_mode(&self) -> Result<ExposureMode, CameraError> {
        let inner = self.shared.inner.lock();
        if inner.device.is_none() {
            return Err(CameraError::CaptureSessionIsMissing);
        }
        Ok(inner.active.exposure_mode)
    }

    pub fn exposure_compensation(&self) -> Result<f32, CameraError> {
        let inner = self.shared.inner.lock();
        if inner.device.is_none() {
            return Err(CameraError::CaptureSessionIsMissing);
        }
        Ok(inner.active.exposure_bias)
    }

    pub fn exposure_compensation_range(&self) -> Result<(f32, f32), CameraError> {
        let caps = self.capabilities()?;
        Ok((caps.min_exposure_bias, caps.max_exposure_bias))
    }

    pub fn white_balance_modes(&self) -> Result<Vec<WhiteBalanceMode>, CameraError> {
        Ok(self.capabilities()?.white_balance_modes)
    }

    pub fn white_balance_mode(&self) -> Result<WhiteBalanceMode, CameraError> {
        let inner = self.shared.inner.lock();
        if inner.device.is_none() {
            return Err(CameraError::CaptureSessionIsMissing);
        }
        Ok(inner.active.white_balance_mode)
    }

    pub fn zoom(&self) -> Result<f32, CameraError> {
        let inner = self.shared.inner.lock();
        if inner.device.is_none() {
            return Err(CameraError::CaptureSessionIsMissing);
        }
        Ok(inner.active.zoom_factor)
    }

    pub fn max_zoom(&self) -> Result<f32, CameraError> {
        Ok(self.capabilities()?.max_zoom)
    }

    // --- Setters ---

    /// Set the flash mode. `FlashMode::Torch` engages the best supported
    /// torch sub-mode (`On > Auto > Off`); setting any flash mode turns an
    /// active torch off, since flash and torch are mutually exclusive at the
    /// hardware level.
    pub fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        let caps = match inner.device.as_ref() {
            Some(device) => device.descriptor().capabilities.clone(),
            None => return Err(CameraError::CaptureSessionIsMissing),
        };

        if mode == FlashMode::Torch {
            let torch = match best_torch_mode(&caps) {
                Some(torch) => torch,
                None => return Ok(()), // no torch hardware: graceful no-op
            };
            if let Some(device) = inner.device.as_mut() {
                device.configure(&mut |c| {
                    c.set_flash(FlashMode::Off)?;
                    c.set_torch(torch)
                })?;
            }
            inner.active.flash_mode = FlashMode::Off;
            inner.active.torch_mode = torch;
            return Ok(());
        }

        if !caps.supports_flash_mode(mode) {
            return Ok(());
        }
        let torch_active = inner.active.torch_mode != TorchMode::Off;
        if let Some(device) = inner.device.as_mut() {
            device.configure(&mut |c| {
                if torch_active {
                    c.set_torch(TorchMode::Off)?;
                }
                c.set_flash(mode)
            })?;
        }
        inner.active.torch_mode = TorchMode::Off;
        inner.active.flash_mode = mode;
        Ok(())
    }

    pub fn set_exposure_mode(&self, mode: ExposureMode) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        let caps = match inner.device.as_ref() {
            Some(device) => device.descriptor().capabilities.clone(),
            None => return Err(CameraError::CaptureSessionIsMissing),
        };
        if !caps.supports_exposure_mode(mode) {
            return Ok(());
        }
        if let Some(device) = inner.device.as_mut() {
            device.configure(&mut |c| c.set_exposure_mode(mode))?;
        }
        inner.active.exposure_mode = mode;
        Ok(())
    }

    pub fn set_exposure_compensation(&self, bias: f32) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        let caps = match inner.device.as_ref() {
            Some(device) => device.descriptor().capabilities.clone(),
            None => return Err(CameraError::CaptureSessionIsMissing),
        };
        if !caps.exposure_bias_in_range(bias) {
            return Ok(());
        }
        if let Some(device) = inner.device.as_mut() {
            device.configure(&mut |c| c.set_exposure_bias(bias))?;
        }
        inner.active.exposure_bias = bias;
        Ok(())
    }

    pub fn set_white_balance_mode(&self, mode: WhiteBalanceMode) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        let caps = match inner.device.as_ref() {
            Some(device) => device.descriptor().capabilities.clone(),
            None => return Err(CameraError::CaptureSessionIsMissing),
        };
        if !caps.supports_white_balance_mode(mode) {
            return Ok(());
        }
        if let Some(device) = inner.device.as_mut() {
            device.configure(&mut |c| c.set_white_balance_mode(mode))?;
        }
        inner.active.white_balance_mode = mode;
        Ok(())
    }

    /// Set the zoom factor, clamped into `[1.0, max_zoom]`. Out-of-range
    /// values are clamped rather than rejected, to tolerate noisy gesture
    /// input.
    pub fn set_zoom(&self, factor: f32) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        let caps = match inner.device.as_ref() {
            Some(device) => device.descriptor().capabilities.clone(),
            None => return Err(CameraError::CaptureSessionIsMissing),
        };
        let clamped = caps.clamp_zoom(factor);
        if let Some(device) = inner.device.as_mut() {
            device.configure(&mut |c| c.set_zoom(clamped))?;
        }
        inner.active.zoom_factor = clamped;
        Ok(())
    }

    /// Point the device's focus and exposure at a normalized coordinate and
    /// switch both to continuous auto. A no-op when the device supports
    /// neither point of interest.
    pub fn set_point_of_interest(&self, point: PointOfInterest) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        let caps = match inner.device.as_ref() {
            Some(device) => device.descriptor().capabilities.clone(),
            None => return Err(CameraError::CaptureSessionIsMissing),
        };
        let focus = caps.supports_focus_point_of_interest;
        let exposure = caps.supports_exposure_point_of_interest;
        if !focus && !exposure {
            return Ok(());
        }
        if let Some(device) = inner.device.as_mut() {
            device.configure(&mut |c| {
                if focus {
                    c.set_focus_point(point)?;
                    if caps.supports_focus_mode(FocusMode::ContinuousAuto) {
                        c.set_focus_mode(FocusMode::ContinuousAuto)?;
                    }
                }
                if exposure {
                    c.set_exposure_point(point)?;
                    if caps.supports_exposure_mode(ExposureMode::ContinuousAuto) {
                        c.set_exposure_mode(ExposureMode::ContinuousAuto)?;
                    }
                }
                Ok(())
            })?;
        }
        if focus && caps.supports_focus_mode(FocusMode::ContinuousAuto) {
            inner.active.focus_mode = FocusMode::ContinuousAuto;
        }
        if exposure && caps.supports_exposure_mode(ExposureMode::ContinuousAuto) {
            inner.active.exposure_mode = ExposureMode::ContinuousAuto;
        }
        Ok(())
    }

    /// Preview opacity pass-through for the surrounding view layer; the
    /// session only records and forwards it.
    pub fn set_opacity(&self, opacity: f32) -> Result<(), CameraError> {
        let clamped = opacity.clamp(0.0, 1.0);
        self.shared.inner.lock().opacity = clamped;
        self.shared.notify(|d| d.on_opacity_changed(clamped));
        Ok(())
    }
}

fn best_torch_mode(caps: &DeviceCapabilities) -> Option<TorchMode> {
    if !caps.supports_torch() {
        return None;
    }
    [TorchMode::On, TorchMode::Auto, TorchMode::Off]
        .into_iter()
        .find(|m| caps.torch_modes.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::SessionConfig;
    use crate::session::controller::SessionController;
    use crate::testing::{SimulatedBehavior, SimulatedProvider};

    use approx::assert_relative_eq;

    struct Harness {
        shared: Arc<SessionShared>,
        controller: SessionController,
        mediator: ConfigurationMediator,
        provider: Arc<SimulatedProvider>,
    }

    fn running_harness(provider: SimulatedProvider, config: &SessionConfig) -> Harness {
        let shared = SessionShared::new();
        let provider = Arc::new(provider);
        let controller = SessionController::new(Arc::clone(&shared), provider.clone());
        controller.prepare(config).unwrap();
        Harness {
            mediator: ConfigurationMediator::new(Arc::clone(&shared)),
            shared,
            controller,
            provider,
        }
    }

    fn rear_harness() -> Harness {
        running_harness(SimulatedProvider::dual_camera(), &SessionConfig::default())
    }

    #[test]
    fn getters_fail_without_a_device() {
        let mediator = ConfigurationMediator::new(SessionShared::new());
        assert_eq!(
            mediator.supported_flash_modes().unwrap_err(),
            CameraError::CaptureSessionIsMissing
        );
        assert_eq!(mediator.zoom().unwrap_err(), CameraError::CaptureSessionIsMissing);
    }

    #[test]
    fn zoom_clamps_into_device_range() {
        let h = rear_harness();
        h.mediator.set_zoom(500.0).unwrap();
        let max = h.mediator.max_zoom().unwrap();
        assert_relative_eq!(h.mediator.zoom().unwrap(), max);

        h.mediator.set_zoom(0.25).unwrap();
        assert_relative_eq!(h.mediator.zoom().unwrap(), 1.0);
    }

    #[test]
    fn supported_flash_mode_is_applied() {
        let h = rear_harness();
        h.mediator.set_flash_mode(FlashMode::Auto).unwrap();
        assert_eq!(h.shared.inner.lock().active.flash_mode, FlashMode::Auto);
    }

    #[test]
    fn unsupported_flash_mode_leaves_previous_mode() {
        // Rear wide device supports only off/on.
        let mut descriptor = SimulatedProvider::rear_wide_descriptor();
        descriptor.capabilities.flash_modes = vec![FlashMode::Off, FlashMode::On];
        let h = running_harness(
            SimulatedProvider::with_devices(vec![descriptor]),
            &SessionConfig::default(),
        );
        h.mediator.set_flash_mode(FlashMode::On).unwrap();
        h.mediator.set_flash_mode(FlashMode::Auto).unwrap();
        assert_eq!(h.shared.inner.lock().active.flash_mode, FlashMode::On);
    }

    #[test]
    fn torch_request_engages_torch_and_clears_flash() {
        let h = rear_harness();
        h.mediator.set_flash_mode(FlashMode::On).unwrap();
        h.mediator.set_flash_mode(FlashMode::Torch).unwrap();
        let inner = h.shared.inner.lock();
        assert_eq!(inner.active.torch_mode, TorchMode::On);
        assert_eq!(inner.active.flash_mode, FlashMode::Off);
    }

    #[test]
    fn flash_mode_turns_off_active_torch() {
        let h = rear_harness();
        h.mediator.set_flash_mode(FlashMode::Torch).unwrap();
        h.mediator.set_flash_mode(FlashMode::Auto).unwrap();
        let inner = h.shared.inner.lock();
        assert_eq!(inner.active.torch_mode, TorchMode::Off);
        assert_eq!(inner.active.flash_mode, FlashMode::Auto);
    }

    #[test]
    fn torch_degrades_through_priority_order() {
        let mut descriptor = SimulatedProvider::rear_wide_descriptor();
        descriptor.capabilities.torch_modes = vec![TorchMode::Off, TorchMode::Auto];
        let h = running_harness(
            SimulatedProvider::with_devices(vec![descriptor]),
            &SessionConfig::default(),
        );
        h.mediator.set_flash_mode(FlashMode::Torch).unwrap();
        assert_eq!(h.shared.inner.lock().active.torch_mode, TorchMode::Auto);
    }

    #[test]
    fn torch_request_without_torch_hardware_is_a_noop() {
        let mut descriptor = SimulatedProvider::rear_wide_descriptor();
        descriptor.capabilities.torch_modes = Vec::new();
        let h = running_harness(
            SimulatedProvider::with_devices(vec![descriptor]),
            &SessionConfig::default(),
        );
        h.mediator.set_flash_mode(FlashMode::Torch).unwrap();
        assert_eq!(h.shared.inner.lock().active.torch_mode, TorchMode::Off);
    }

    #[test]
    fn exposure_setters_validate_against_snapshot() {
        let h = rear_harness();
        h.mediator.set_exposure_mode(ExposureMode::Locked).unwrap();
        assert_eq!(h.mediator.exposure_mode().unwrap(), ExposureMode::Locked);

        h.mediator.set_exposure_compensation(1.5).unwrap();
        assert_relative_eq!(h.mediator.exposure_compensation().unwrap(), 1.5);

        // Out of range: successful no-op.
        h.mediator.set_exposure_compensation(99.0).unwrap();
        assert_relative_eq!(h.mediator.exposure_compensation().unwrap(), 1.5);
    }

    #[test]
    fn hardware_rejection_surfaces_without_state_change() {
        let h = rear_harness();
        h.provider.set_behavior(SimulatedBehavior {
            reject_configuration: true,
            ..Default::default()
        });
        let before = h.shared.inner.lock().active;
        match h.mediator.set_zoom(3.0) {
            Err(CameraError::InvalidOperation(_)) => {}
            other => panic!("expected InvalidOperation, got {other:?}"),
        }
        assert_eq!(h.shared.inner.lock().active, before);
        // Keep the controller alive so the session stays valid for the check.
        drop(h.controller);
    }

    #[test]
    fn mode_lists_preserve_hardware_order() {
        let descriptor = SimulatedProvider::rear_multi_lens_descriptor();
        let h = rear_harness();
        assert_eq!(
            h.mediator.supported_picture_sizes().unwrap(),
            descriptor.capabilities.picture_sizes
        );
        assert_eq!(
            h.mediator.exposure_modes().unwrap(),
            descriptor.capabilities.exposure_modes
        );
    }

    #[test]
    fn point_of_interest_is_a_noop_when_unsupported() {
        let h = running_harness(
            SimulatedProvider::with_devices(vec![SimulatedProvider::webcam_descriptor()]),
            &SessionConfig::with_position(crate::models::capability::CameraPosition::Unspecified),
        );
        let calls_before = h.provider.log().calls().len();
        h.mediator
            .set_point_of_interest(PointOfInterest::new(0.5, 0.5))
            .unwrap();
        assert_eq!(h.provider.log().calls().len(), calls_before);
    }

    #[test]
    fn exposure_range_reflects_snapshot() {
        let h = rear_harness();
        let descriptor = SimulatedProvider::rear_multi_lens_descriptor();
        assert_eq!(
            h.mediator.exposure_compensation_range().unwrap(),
            (
                descriptor.capabilities.min_exposure_bias,
                descriptor.capabilities.max_exposure_bias
            )
        );
    }
}
