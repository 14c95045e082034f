use serde::{Deserialize, Serialize};

/// Logical position of a physical camera.
///
/// Desktop webcams that report no facing direction enumerate as
/// `Unspecified`; switching cameras is a no-op for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Rear,
    Unspecified,
}

impl CameraPosition {
    /// The position a camera switch targets, if one is well-defined.
    pub fn opposite(&self) -> Option<CameraPosition> {
        match self {
            Self::Front => Some(Self::Rear),
            Self::Rear => Some(Self::Front),
            Self::Unspecified => None,
        }
    }
}

/// Physical lens arrangement of a device.
///
/// `MultiLens` units expose an ultra-wide field of view at their native 1.0
/// zoom factor, which is why they get a non-default baseline zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensKind {
    WideAngle,
    MultiLens,
}

/// Command-level flash mode. `Torch` selects sustained illumination and is
/// mutually exclusive with the single-flash-at-capture modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
    Torch,
}

/// Torch sub-mode applied at the hardware level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TorchMode {
    Off,
    On,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureMode {
    Locked,
    Auto,
    ContinuousAuto,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteBalanceMode {
    Locked,
    Auto,
    ContinuousAuto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    Locked,
    Auto,
    ContinuousAuto,
}

/// A still-image output size supported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureSize {
    pub width: u32,
    pub height: u32,
}

impl PictureSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A normalized coordinate telling the device where to prioritize
/// focus or exposure. Both axes are clamped into `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub x: f32,
    pub y: f32,
}

impl PointOfInterest {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// Minimum zoom factor every device supports.
pub const MIN_ZOOM: f32 = 1.0;

/// Capability snapshot of a physical device.
///
/// Queried once per device selection and immutable afterwards; mode and size
/// lists keep the hardware-reported support order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub flash_modes: Vec<FlashMode>,
    pub torch_modes: Vec<TorchMode>,
    pub exposure_modes: Vec<ExposureMode>,
    pub white_balance_modes: Vec<WhiteBalanceMode>,
    pub focus_modes: Vec<FocusMode>,
    pub picture_sizes: Vec<PictureSize>,
    /// Zoom range is `[MIN_ZOOM, max_zoom]`.
    pub max_zoom: f32,
    pub min_exposure_bias: f32,
    pub max_exposure_bias: f32,
    pub supports_focus_point_of_interest: bool,
    pub supports_exposure_point_of_interest: bool,
}

impl DeviceCapabilities {
    pub fn supports_flash_mode(&self, mode: FlashMode) -> bool {
        self.flash_modes.contains(&mode)
    }

    pub fn supports_torch(&self) -> bool {
        self.torch_modes.iter().any(|m| *m != TorchMode::Off)
    }

    pub fn supports_exposure_mode(&self, mode: ExposureMode) -> bool {
        self.exposure_modes.contains(&mode)
    }

    pub fn supports_white_balance_mode(&self, mode: WhiteBalanceMode) -> bool {
        self.white_balance_modes.contains(&mode)
    }

    pub fn supports_focus_mode(&self, mode: FocusMode) -> bool {
        self.focus_modes.contains(&mode)
    }

    pub fn exposure_bias_in_range(&self, bias: f32) -> bool {
        bias >= self.min_exposure_bias && bias <= self.max_exposure_bias
    }

    pub fn clamp_zoom(&self, factor: f32) -> f32 {
        factor.clamp(MIN_ZOOM, self.max_zoom.max(MIN_ZOOM))
    }

    /// Largest supported picture size, used for high-resolution capture.
    pub fn largest_picture_size(&self) -> Option<PictureSize> {
        self.picture_sizes
            .iter()
            .copied()
            .max_by_key(PictureSize::pixel_count)
    }
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            flash_modes: vec![FlashMode::Off],
            torch_modes: Vec::new(),
            exposure_modes: vec![ExposureMode::ContinuousAuto],
            white_balance_modes: vec![WhiteBalanceMode::ContinuousAuto],
            focus_modes: vec![FocusMode::ContinuousAuto],
            picture_sizes: vec![PictureSize::new(640, 480)],
            max_zoom: MIN_ZOOM,
            min_exposure_bias: 0.0,
            max_exposure_bias: 0.0,
            supports_focus_point_of_interest: false,
            supports_exposure_point_of_interest: false,
        }
    }
}

/// A physical camera available for capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
    pub position: CameraPosition,
    pub lens: LensKind,
    pub capabilities: DeviceCapabilities,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_of_interest_clamps() {
        let p = PointOfInterest::new(-0.5, 1.5);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 1.0);
    }

    #[test]
    fn largest_picture_size_by_pixel_count() {
        let caps = DeviceCapabilities {
            picture_sizes: vec![
                PictureSize::new(1280, 720),
                PictureSize::new(640, 480),
                PictureSize::new(1920, 1080),
            ],
            ..Default::default()
        };
        assert_eq!(caps.largest_picture_size(), Some(PictureSize::new(1920, 1080)));
    }

    #[test]
    fn opposite_position() {
        assert_eq!(CameraPosition::Front.opposite(), Some(CameraPosition::Rear));
        assert_eq!(CameraPosition::Rear.opposite(), Some(CameraPosition::Front));
        assert_eq!(CameraPosition::Unspecified.opposite(), None);
    }

    #[test]
    fn modes_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&FlashMode::Torch).unwrap(), "\"torch\"");
        assert_eq!(
            serde_json::to_string(&WhiteBalanceMode::ContinuousAuto).unwrap(),
            "\"continuousauto\""
        );
    }
}
