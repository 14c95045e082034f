use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::models::capability::{DeviceDescriptor, PictureSize};
use crate::models::config::ActiveConfiguration;
use crate::models::error::CameraError;
use crate::models::frame::CapturedFrame;
use crate::models::orientation::VideoRotation;
use crate::models::state::SessionState;
use crate::processing::completion::CompletionSlot;
use crate::processing::frame_tap::FrameTap;
use crate::traits::camera_device::CameraDevice;
use crate::traits::session_delegate::SessionDelegate;

/// Counters for debugging capture sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDiagnostics {
    pub stills_requested: u64,
    pub stills_completed: u64,
    pub stills_failed: u64,
    pub samples_served: u64,
    pub camera_switches: u64,
    pub recordings_finished: u64,
}

/// Interior session state, protected by one `parking_lot::Mutex`.
///
/// This mutex is the single logical owner of device state: every device
/// mutation and every session-level reconfiguration happens with it held,
/// which is what makes the begin/commit bracket atomic for concurrent
/// capability queries and capture requests.
pub(crate) struct SessionInner {
    pub phase: SessionState,
    pub device: Option<Box<dyn CameraDevice>>,
    /// The opposite position's descriptor, resolved eagerly at selection so a
    /// switch does not re-scan hardware.
    pub standby: Option<DeviceDescriptor>,
    pub active: ActiveConfiguration,
    pub rotation: VideoRotation,
    pub still_size: PictureSize,
    pub high_resolution: bool,
    pub recording: bool,
    pub opacity: f32,
    pub diagnostics: SessionDiagnostics,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            phase: SessionState::Unprepared,
            device: None,
            standby: None,
            active: ActiveConfiguration::default(),
            rotation: VideoRotation::Deg0,
            still_size: PictureSize::new(640, 480),
            high_resolution: false,
            recording: false,
            opacity: 1.0,
            diagnostics: SessionDiagnostics::default(),
        }
    }
}

/// Registry of in-flight still captures.
///
/// Each capture gets its own single-shot slot; the registry only exists so
/// session stop can fulfill stale requests with a session-missing error
/// instead of leaving callers suspended.
pub(crate) struct PendingStills {
    slots: Mutex<Vec<Arc<CompletionSlot<CapturedFrame>>>>,
}

impl PendingStills {
    fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, slot: Arc<CompletionSlot<CapturedFrame>>) {
        self.slots.lock().push(slot);
    }

    pub fn unregister(&self, slot: &Arc<CompletionSlot<CapturedFrame>>) {
        self.slots.lock().retain(|s| !Arc::ptr_eq(s, slot));
    }

    pub fn fail_all(&self, error: CameraError) {
        let drained: Vec<_> = std::mem::take(&mut *self.slots.lock());
        for slot in drained {
            slot.fulfill(Err(error.clone()));
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// State shared between the session components.
pub(crate) struct SessionShared {
    pub inner: Mutex<SessionInner>,
    pub pending: PendingStills,
    pub preview: Arc<FrameTap>,
    delegate: Mutex<Option<Arc<dyn SessionDelegate>>>,
}

impl SessionShared {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(SessionInner::new()),
            pending: PendingStills::new(),
            preview: Arc::new(FrameTap::new()),
            delegate: Mutex::new(None),
        })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    /// Run `f` against the delegate, if one is installed.
    ///
    /// Callers must not hold the session lock: delegates are free to call
    /// back into the session.
    pub fn notify<F: FnOnce(&dyn SessionDelegate)>(&self, f: F) {
        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            f(delegate.as_ref());
        }
    }
}
