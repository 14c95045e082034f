pub mod camera_device;
pub mod device_provider;
pub mod session_delegate;
