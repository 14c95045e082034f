use std::sync::Arc;

use crate::models::capability::{CameraPosition, DeviceDescriptor, LensKind};
use crate::models::error::CameraError;
use crate::traits::device_provider::DeviceProvider;

/// A selected primary device plus the opposite position's device, retained
/// so a later switch does not re-scan hardware.
#[derive(Debug, Clone)]
pub struct Selection {
    pub primary: DeviceDescriptor,
    pub standby: Option<DeviceDescriptor>,
}

/// Chooses a physical device for a requested logical position.
///
/// For the rear position a multi-lens unit is preferred over a single
/// wide-angle device; the front position uses the wide-angle device.
/// `Unspecified` takes the first device the platform reports, which is how
/// desktop webcams are addressed.
pub struct DeviceSelector {
    provider: Arc<dyn DeviceProvider>,
}

impl DeviceSelector {
    pub fn new(provider: Arc<dyn DeviceProvider>) -> Self {
        Self { provider }
    }

    pub fn select(&self, position: CameraPosition) -> Result<Selection, CameraError> {
        let devices = self.provider.enumerate()?;
        let primary =
            Self::pick(&devices, position).ok_or(CameraError::NoCamerasAvailable)?;
        let standby = position
            .opposite()
            .and_then(|opposite| Self::pick(&devices, opposite));
        Ok(Selection { primary, standby })
    }

    fn pick(devices: &[DeviceDescriptor], position: CameraPosition) -> Option<DeviceDescriptor> {
        match position {
            CameraPosition::Unspecified => devices.first().cloned(),
            CameraPosition::Rear => devices
                .iter()
                .find(|d| d.position == CameraPosition::Rear && d.lens == LensKind::MultiLens)
                .or_else(|| devices.iter().find(|d| d.position == CameraPosition::Rear))
                .cloned(),
            CameraPosition::Front => devices
                .iter()
                .find(|d| d.position == CameraPosition::Front && d.lens == LensKind::WideAngle)
                .or_else(|| devices.iter().find(|d| d.position == CameraPosition::Front))
                .cloned(),
        }
    }
}
