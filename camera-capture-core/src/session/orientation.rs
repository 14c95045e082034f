use std::sync::Arc;

use crate::models::orientation::{DeviceOrientation, VideoRotation};
use crate::session::shared::SessionShared;

/// Maps interface orientation onto the video rotation applied to the live
/// preview and photo connections.
///
/// The stored rotation also stamps the settings of every subsequent still
/// capture. Failures to re-apply a rotation are logged, never surfaced:
/// orientation updates are advisory.
pub struct OrientationAdapter {
    shared: Arc<SessionShared>,
}

impl OrientationAdapter {
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    pub fn orientation_changed(&self, orientation: DeviceOrientation) {
        let rotation = VideoRotation::from_orientation(orientation);
        let mut inner = self.shared.inner.lock();
        inner.rotation = rotation;
        if let Some(device) = inner.device.as_mut() {
            if let Err(e) = device.configure(&mut |c| c.set_rotation(rotation)) {
                log::warn!("failed to apply video rotation: {e}");
            }
        }
    }

    pub fn current_rotation(&self) -> VideoRotation {
        self.shared.inner.lock().rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::SessionConfig;
    use crate::session::controller::SessionController;
    use crate::testing::{HardwareCall, SimulatedProvider};

    #[test]
    fn unknown_orientation_degrades_to_upright() {
        let shared = SessionShared::new();
        let adapter = OrientationAdapter::new(Arc::clone(&shared));
        adapter.orientation_changed(DeviceOrientation::LandscapeRight);
        adapter.orientation_changed(DeviceOrientation::Unknown);
        assert_eq!(adapter.current_rotation(), VideoRotation::Deg0);
    }

    #[test]
    fn rotation_is_applied_to_the_active_device() {
        let shared = SessionShared::new();
        let provider = Arc::new(SimulatedProvider::dual_camera());
        let controller = SessionController::new(Arc::clone(&shared), provider.clone());
        controller.prepare(&SessionConfig::default()).unwrap();

        let adapter = OrientationAdapter::new(shared);
        adapter.orientation_changed(DeviceOrientation::LandscapeRight);
        assert!(provider
            .log()
            .calls()
            .contains(&HardwareCall::Rotation(VideoRotation::Deg90)));
    }
}
