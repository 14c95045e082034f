//! # camera-capture-ffmpeg
//!
//! Desktop backend for camera-capture-kit, driving an external `ffmpeg`
//! process instead of platform capture APIs.
//!
//! Provides:
//! - `FfmpegCamera` — `CameraDevice` implementation: rgb24 preview frames
//!   over a pipe, one-shot still capture, tee'd mp4 recording
//! - `FfmpegProvider` — capture input discovery (`/dev/video*` on Linux,
//!   default avfoundation input on macOS, explicit inputs elsewhere)
//! - `permissions` — best-effort device access check
//!
//! ## Host Requirements
//! - `ffmpeg` on `PATH` with the platform camera demuxer compiled in
//!   (`v4l2`, `avfoundation`, or `dshow`)
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_capture_core::CameraKit;
//! use camera_capture_ffmpeg::FfmpegProvider;
//!
//! let kit = CameraKit::new(Arc::new(FfmpegProvider::new()));
//! kit.start(Default::default())?;
//! let photo = kit.capture(None)?;
//! ```

pub mod camera;
pub mod permissions;
pub mod probe;
pub mod provider;

pub use camera::{FfmpegCamera, StreamConfig};
pub use provider::FfmpegProvider;
