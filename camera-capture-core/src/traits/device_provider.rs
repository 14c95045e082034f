use crate::models::capability::DeviceDescriptor;
use crate::models::error::CameraError;
use crate::traits::camera_device::CameraDevice;

/// Discovery and opening of physical camera devices.
///
/// Implemented once per backend. Enumeration reports descriptors in the
/// order the platform reports devices; the selector layers its position
/// preference rules on top.
pub trait DeviceProvider: Send + Sync {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError>;

    /// Open the device with the given id, attaching it as the session input.
    fn open(&self, id: &str) -> Result<Box<dyn CameraDevice>, CameraError>;
}
