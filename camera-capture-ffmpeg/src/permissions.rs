//! Best-effort camera access check.
//!
//! The capture core never inspects permission state itself; hosts can call
//! this before starting a session to produce a friendlier prompt. An
//! unpermitted device simply fails to open as a session error otherwise.

use camera_capture_core::models::error::CameraError;

/// Check whether the current process can read a video capture device.
///
/// Returns `Ok(false)` when no device exists or access is denied. Unexpected
/// errors are logged and treated as available, since the open that follows
/// will surface them properly.
#[cfg(target_os = "linux")]
pub fn check_camera_permission() -> Result<bool, CameraError> {
    let devices = crate::probe::enumerate_video_devices()?;
    let Some(first) = devices.first() else {
        return Ok(false);
    };

    match std::fs::OpenOptions::new().read(true).open(&first.id) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Ok(false),
        Err(e) => {
            log::warn!("unexpected error probing {}: {e}", first.id);
            Ok(true)
        }
    }
}

/// Camera access is mediated by the OS prompt at first use on this platform.
#[cfg(not(target_os = "linux"))]
pub fn check_camera_permission() -> Result<bool, CameraError> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_check_never_panics() {
        // Whatever hardware the host has, the probe must come back cleanly.
        let _ = check_camera_permission().unwrap();
    }
}
