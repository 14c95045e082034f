//! Device discovery and the desktop capability snapshot.
//!
//! Desktop webcams expose no facing direction, flash, or zoom optics, so the
//! snapshot is honest about that: the configuration mediator degrades the
//! corresponding setters to no-ops and `flip` is a documented no-op.

use camera_capture_core::models::capability::{
    CameraPosition, DeviceCapabilities, DeviceDescriptor, ExposureMode, FlashMode, FocusMode,
    LensKind, PictureSize, WhiteBalanceMode,
};
use camera_capture_core::models::error::CameraError;

/// Capability snapshot reported for every ffmpeg-driven webcam.
pub fn webcam_capabilities() -> DeviceCapabilities {
    DeviceCapabilities {
        flash_modes: vec![FlashMode::Off],
        torch_modes: Vec::new(),
        exposure_modes: vec![ExposureMode::ContinuousAuto],
        white_balance_modes: vec![WhiteBalanceMode::ContinuousAuto],
        focus_modes: vec![FocusMode::ContinuousAuto],
        picture_sizes: vec![
            PictureSize::new(640, 480),
            PictureSize::new(1280, 720),
            PictureSize::new(1920, 1080),
        ],
        max_zoom: 1.0,
        min_exposure_bias: 0.0,
        max_exposure_bias: 0.0,
        supports_focus_point_of_interest: false,
        supports_exposure_point_of_interest: false,
    }
}

/// Build the descriptor for one capture input.
pub fn descriptor_for_input(id: impl Into<String>, name: impl Into<String>) -> DeviceDescriptor {
    DeviceDescriptor {
        id: id.into(),
        name: name.into(),
        position: CameraPosition::Unspecified,
        lens: LensKind::WideAngle,
        capabilities: webcam_capabilities(),
    }
}

/// Enumerate the video capture devices ffmpeg can address on this host.
#[cfg(target_os = "linux")]
pub fn enumerate_video_devices() -> Result<Vec<DeviceDescriptor>, CameraError> {
    let mut indices: Vec<u32> = Vec::new();
    let entries = std::fs::read_dir("/dev")
        .map_err(|e| CameraError::unknown(format!("failed to scan /dev: {e}")))?;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(index) = name.strip_prefix("video").and_then(|n| n.parse().ok()) {
            indices.push(index);
        }
    }
    indices.sort_unstable();

    Ok(indices
        .into_iter()
        .map(|index| {
            let path = format!("/dev/video{index}");
            let name = sysfs_device_name(index).unwrap_or_else(|| format!("Video Device {index}"));
            descriptor_for_input(path, name)
        })
        .collect())
}

/// On macOS the default avfoundation input is addressable by index without
/// scanning device files.
#[cfg(target_os = "macos")]
pub fn enumerate_video_devices() -> Result<Vec<DeviceDescriptor>, CameraError> {
    Ok(vec![descriptor_for_input("0", "Default Camera")])
}

/// DirectShow inputs are addressed by friendly name, which ffmpeg cannot
/// report without platform APIs; construct a provider with an explicit
/// input instead.
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn enumerate_video_devices() -> Result<Vec<DeviceDescriptor>, CameraError> {
    Ok(Vec::new())
}

#[cfg(target_os = "linux")]
fn sysfs_device_name(index: u32) -> Option<String> {
    let name = std::fs::read_to_string(format!("/sys/class/video4linux/video{index}/name")).ok()?;
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// ffmpeg demuxer name for this host's camera subsystem.
pub fn input_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

/// Normalize a device id into the form the ffmpeg demuxer expects.
pub fn input_device(id: &str) -> String {
    if cfg!(target_os = "linux") && id.chars().all(|c| c.is_ascii_digit()) {
        format!("/dev/video{id}")
    } else if cfg!(target_os = "windows") && !id.starts_with("video=") {
        format!("video={id}")
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webcam_snapshot_is_degenerate() {
        let caps = webcam_capabilities();
        assert!(!caps.supports_torch());
        assert_eq!(caps.max_zoom, 1.0);
        assert_eq!(caps.flash_modes, vec![FlashMode::Off]);
        assert!(!caps.supports_focus_point_of_interest);
    }

    #[test]
    fn descriptors_have_no_facing_direction() {
        let descriptor = descriptor_for_input("/dev/video0", "Test Camera");
        assert_eq!(descriptor.position, CameraPosition::Unspecified);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn numeric_ids_map_to_device_nodes() {
        assert_eq!(input_device("0"), "/dev/video0");
        assert_eq!(input_device("/dev/video3"), "/dev/video3");
    }

    #[test]
    fn enumeration_never_panics_without_cameras() {
        // On hosts with no capture hardware this returns an empty list.
        let _ = enumerate_video_devices();
    }
}
