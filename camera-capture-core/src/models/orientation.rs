use serde::{Deserialize, Serialize};

/// Coarse device/interface orientation fed in from the sensor plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    Unknown,
}

/// Rotation applied to the live preview and photo connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoRotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl VideoRotation {
    /// Unknown or unsupported orientations degrade to portrait upright.
    pub fn from_orientation(orientation: DeviceOrientation) -> Self {
        match orientation {
            DeviceOrientation::Portrait | DeviceOrientation::Unknown => Self::Deg0,
            DeviceOrientation::LandscapeRight => Self::Deg90,
            DeviceOrientation::PortraitUpsideDown => Self::Deg180,
            DeviceOrientation::LandscapeLeft => Self::Deg270,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_degrades_to_upright() {
        assert_eq!(
            VideoRotation::from_orientation(DeviceOrientation::Unknown),
            VideoRotation::Deg0
        );
    }

    #[test]
    fn landscape_maps_to_quarter_turns() {
        assert_eq!(
            VideoRotation::from_orientation(DeviceOrientation::LandscapeRight).degrees(),
            90
        );
        assert_eq!(
            VideoRotation::from_orientation(DeviceOrientation::LandscapeLeft).degrees(),
            270
        );
    }
}
