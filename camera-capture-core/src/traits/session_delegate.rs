use crate::models::error::CameraError;
use crate::models::photo::PhotoMetadata;
use crate::models::state::SessionState;

/// Event delegate for session notifications.
///
/// Methods are called from whatever thread completed the work, after the
/// session lock has been released. Implementations should marshal to the UI
/// thread if needed. All methods default to no-ops.
pub trait SessionDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, _state: SessionState) {}

    /// Called after a still capture completes successfully.
    fn on_photo_captured(&self, _metadata: &PhotoMetadata) {}

    /// Called when a capture or reconfiguration fails.
    fn on_error(&self, _error: &CameraError) {}

    /// Preview opacity pass-through for the surrounding view layer.
    fn on_opacity_changed(&self, _opacity: f32) {}
}
