//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Owns the capture-session lifecycle, device capability negotiation, the
//! capture protocol (still photo, continuous sample, video segment), and the
//! gesture/orientation pipelines. Platform backends (the ffmpeg desktop
//! backend, simulated hardware) implement the `CameraDevice` and
//! `DeviceProvider` traits and plug into the generic session components.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← CameraDevice, DeviceControl, DeviceProvider, SessionDelegate
//! ├── models/       ← CameraError, SessionState, capability snapshot, frames, photos
//! ├── processing/   ← CompletionSlot, FrameTap, JPEG finishing
//! ├── session/      ← SessionController, CaptureCoordinator, DeviceSelector,
//! │                   OrientationAdapter over one shared session state
//! ├── control/      ← ConfigurationMediator, GestureBridge
//! ├── storage/      ← recording metadata sidecars
//! └── testing       ← simulated hardware provider for offline tests
//! ```

pub mod control;
pub mod kit;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod testing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use control::gesture::GestureBridge;
pub use control::mediator::ConfigurationMediator;
pub use kit::CameraKit;
pub use models::capability::{
    CameraPosition, DeviceCapabilities, DeviceDescriptor, ExposureMode, FlashMode, FocusMode,
    LensKind, PictureSize, PointOfInterest, TorchMode, WhiteBalanceMode, MIN_ZOOM,
};
pub use models::config::{ActiveConfiguration, SessionConfig};
pub use models::error::CameraError;
pub use models::frame::{CapturedFrame, Frame, PixelFormat};
pub use models::orientation::{DeviceOrientation, VideoRotation};
pub use models::photo::{CapturedPhoto, PhotoMetadata, VideoArtifact, VideoMetadata};
pub use models::state::SessionState;
pub use processing::image_ops::DEFAULT_JPEG_QUALITY;
pub use session::controller::SessionController;
pub use session::coordinator::CaptureCoordinator;
pub use session::orientation::OrientationAdapter;
pub use session::selector::{DeviceSelector, Selection};
pub use session::SessionDiagnostics;
pub use traits::camera_device::{
    CameraDevice, DeviceControl, FrameSink, PhotoCompletion, StillSettings,
};
pub use traits::device_provider::DeviceProvider;
pub use traits::session_delegate::SessionDelegate;
