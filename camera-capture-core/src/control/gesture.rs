use parking_lot::Mutex;

use crate::control::mediator::ConfigurationMediator;
use crate::models::capability::PointOfInterest;

struct GestureState {
    /// Zoom factor the last gesture (or baseline) committed; pinch scales
    /// multiply from here rather than resetting to 1.0.
    committed_zoom: f32,
    zoom_enabled: bool,
}

/// Converts raw pointer gestures into configuration calls.
///
/// Gestures are best-effort UX, not explicit commands: every hardware
/// failure on this path is logged and swallowed.
pub struct GestureBridge {
    mediator: ConfigurationMediator,
    state: Mutex<GestureState>,
}

impl GestureBridge {
    pub(crate) fn new(mediator: ConfigurationMediator) -> Self {
        Self {
            mediator,
            state: Mutex::new(GestureState {
                committed_zoom: 1.0,
                zoom_enabled: true,
            }),
        }
    }

    pub fn set_zoom_enabled(&self, enabled: bool) {
        self.state.lock().zoom_enabled = enabled;
    }

    pub fn zoom_enabled(&self) -> bool {
        self.state.lock().zoom_enabled
    }

    /// Tap-to-focus: convert a view-space point into a normalized point of
    /// interest. A no-op for degenerate view dimensions or unsupporting
    /// devices.
    pub fn handle_tap(&self, x: f32, y: f32, view_width: f32, view_height: f32) {
        if view_width <= 0.0 || view_height <= 0.0 {
            return;
        }
        let point = PointOfInterest::new(x / view_width, y / view_height);
        if let Err(e) = self.mediator.set_point_of_interest(point) {
            log::warn!("tap-to-focus ignored: {e}");
        }
    }

    /// Pinch began: snapshot the factor this gesture multiplies from.
    pub fn pinch_began(&self, scale: f32) {
        let target = {
            let mut state = self.state.lock();
            if !state.zoom_enabled {
                return;
            }
            if let Ok(current) = self.mediator.zoom() {
                state.committed_zoom = current;
            }
            state.committed_zoom * scale
        };
        self.apply_zoom(target);
    }

    /// Pinch changed: live-update the zoom while the gesture is in flight.
    pub fn pinch_changed(&self, scale: f32) {
        let target = {
            let state = self.state.lock();
            if !state.zoom_enabled {
                return;
            }
            state.committed_zoom * scale
        };
        self.apply_zoom(target);
    }

    /// Pinch ended: commit the applied factor for the next gesture.
    pub fn pinch_ended(&self) {
        let mut state = self.state.lock();
        if !state.zoom_enabled {
            return;
        }
        if let Ok(current) = self.mediator.zoom() {
            state.committed_zoom = current;
        }
    }

    fn apply_zoom(&self, target: f32) {
        if let Err(e) = self.mediator.set_zoom(target) {
            log::warn!("pinch zoom ignored: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::capability::{CameraPosition, FocusMode};
    use crate::models::config::SessionConfig;
    use crate::session::controller::SessionController;
    use crate::session::shared::SessionShared;
    use crate::testing::{HardwareCall, SimulatedProvider};

    use approx::assert_relative_eq;

    struct Harness {
        shared: Arc<SessionShared>,
        _controller: SessionController,
        mediator: ConfigurationMediator,
        bridge: GestureBridge,
        provider: Arc<SimulatedProvider>,
    }

    fn running_harness(provider: SimulatedProvider, config: &SessionConfig) -> Harness {
        let shared = SessionShared::new();
        let provider = Arc::new(provider);
        let controller = SessionController::new(Arc::clone(&shared), provider.clone());
        controller.prepare(config).unwrap();
        let mediator = ConfigurationMediator::new(Arc::clone(&shared));
        Harness {
            bridge: GestureBridge::new(mediator.clone()),
            shared,
            _controller: controller,
            mediator,
            provider,
        }
    }

    fn wide_rear_harness() -> Harness {
        running_harness(
            SimulatedProvider::with_devices(vec![SimulatedProvider::rear_wide_descriptor()]),
            &SessionConfig::default(),
        )
    }

    #[test]
    fn consecutive_pinches_resume_from_committed_factor() {
        let h = wide_rear_harness();

        h.bridge.pinch_began(1.0);
        h.bridge.pinch_changed(1.5);
        h.bridge.pinch_ended();

        h.bridge.pinch_began(1.0);
        h.bridge.pinch_changed(1.2);

        assert_relative_eq!(h.mediator.zoom().unwrap(), 1.5 * 1.2, epsilon = 1e-6);
    }

    #[test]
    fn pinch_clamps_to_device_range() {
        let h = wide_rear_harness();
        h.bridge.pinch_began(1.0);
        h.bridge.pinch_changed(1000.0);
        assert_relative_eq!(h.mediator.zoom().unwrap(), h.mediator.max_zoom().unwrap());
    }

    #[test]
    fn disabled_zoom_ignores_pinches() {
        let h = wide_rear_harness();
        h.bridge.set_zoom_enabled(false);
        h.bridge.pinch_began(1.0);
        h.bridge.pinch_changed(2.0);
        assert_relative_eq!(h.mediator.zoom().unwrap(), 1.0);
    }

    #[test]
    fn gestures_never_surface_errors() {
        let shared = SessionShared::new();
        let mediator = ConfigurationMediator::new(shared);
        let bridge = GestureBridge::new(mediator);
        // No session at all: everything is swallowed.
        bridge.pinch_began(1.0);
        bridge.pinch_changed(1.4);
        bridge.pinch_ended();
        bridge.handle_tap(10.0, 10.0, 100.0, 100.0);
    }

    #[test]
    fn pinch_resumes_from_multi_lens_baseline() {
        let h = running_harness(SimulatedProvider::dual_camera(), &SessionConfig::default());
        h.bridge.pinch_began(1.0);
        h.bridge.pinch_changed(1.5);
        assert_relative_eq!(h.mediator.zoom().unwrap(), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn tap_sets_both_points_and_continuous_modes() {
        let h = running_harness(SimulatedProvider::dual_camera(), &SessionConfig::default());
        h.bridge.handle_tap(50.0, 25.0, 100.0, 100.0);
        let calls = h.provider.log().calls();
        let point = PointOfInterest::new(0.5, 0.25);
        assert!(calls.contains(&HardwareCall::FocusPoint(point)));
        assert!(calls.contains(&HardwareCall::ExposurePoint(point)));
        assert!(calls.contains(&HardwareCall::FocusMode(FocusMode::ContinuousAuto)));
        assert_eq!(
            h.shared.inner.lock().active.focus_mode,
            FocusMode::ContinuousAuto
        );
    }

    #[test]
    fn tap_on_unsupporting_device_is_a_noop() {
        let h = running_harness(
            SimulatedProvider::with_devices(vec![SimulatedProvider::webcam_descriptor()]),
            &SessionConfig::with_position(CameraPosition::Unspecified),
        );
        let before = h.provider.log().calls().len();
        h.bridge.handle_tap(10.0, 10.0, 100.0, 100.0);
        assert_eq!(h.provider.log().calls().len(), before);
    }
}
