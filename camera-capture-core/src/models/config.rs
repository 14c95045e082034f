use serde::{Deserialize, Serialize};

use super::capability::{
    CameraPosition, ExposureMode, FlashMode, FocusMode, TorchMode, WhiteBalanceMode, MIN_ZOOM,
};

/// Options for starting a capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Logical position to open. `Unspecified` takes the first device found.
    pub position: CameraPosition,
    /// Capture stills at the device's largest supported picture size.
    pub high_resolution: bool,
    /// Whether pinch gestures may drive the zoom factor.
    pub zoom_enabled: bool,
    /// Preview compositing opacity, passed through to the view layer.
    pub opacity: f32,
}

impl SessionConfig {
    pub fn with_position(position: CameraPosition) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(format!("opacity out of range: {}", self.opacity));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            position: CameraPosition::Rear,
            high_resolution: false,
            zoom_enabled: true,
            opacity: 1.0,
        }
    }
}

/// The session's view of the active device configuration.
///
/// Owned exclusively by the session state and mutated only through the
/// configuration mediator's locked-device protocol, never directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveConfiguration {
    pub flash_mode: FlashMode,
    pub torch_mode: TorchMode,
    pub zoom_factor: f32,
    pub exposure_mode: ExposureMode,
    pub exposure_bias: f32,
    pub white_balance_mode: WhiteBalanceMode,
    pub focus_mode: FocusMode,
}

impl Default for ActiveConfiguration {
    fn default() -> Self {
        Self {
            flash_mode: FlashMode::Off,
            torch_mode: TorchMode::Off,
            zoom_factor: MIN_ZOOM,
            exposure_mode: ExposureMode::ContinuousAuto,
            exposure_bias: 0.0,
            white_balance_mode: WhiteBalanceMode::ContinuousAuto,
            focus_mode: FocusMode::ContinuousAuto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn opacity_out_of_range_rejected() {
        let config = SessionConfig {
            opacity: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn start_options_accept_camel_case_json() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"position":"front","highResolution":true}"#).unwrap();
        assert_eq!(config.position, CameraPosition::Front);
        assert!(config.high_resolution);
        assert!(config.zoom_enabled);
    }
}
