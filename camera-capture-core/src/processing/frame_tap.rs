use parking_lot::{Condvar, Mutex};

use crate::models::error::CameraError;
use crate::models::frame::Frame;

struct TapState {
    latest: Option<Frame>,
    open: bool,
    frames_delivered: u64,
}

/// Latest-frame slot fed by the preview stream.
///
/// Newer frames overwrite older ones (continuous-sample capture wants the
/// most recent image, not a backlog). `next_frame` blocks until the first
/// frame arrives; closing the tap wakes every waiter with a session-missing
/// error so stale sample requests are never left dangling.
pub struct FrameTap {
    state: Mutex<TapState>,
    cond: Condvar,
}

impl FrameTap {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TapState {
                latest: None,
                open: false,
                frames_delivered: 0,
            }),
            cond: Condvar::new(),
        }
    }

    /// Open for a new streaming run, discarding any frame from the last one.
    pub fn open(&self) {
        let mut state = self.state.lock();
        state.latest = None;
        state.open = true;
    }

    pub fn close(&self) {
        let mut state = self.state.lock();
        state.open = false;
        state.latest = None;
        self.cond.notify_all();
    }

    pub fn push(&self, frame: Frame) {
        let mut state = self.state.lock();
        if !state.open {
            return;
        }
        state.latest = Some(frame);
        state.frames_delivered += 1;
        self.cond.notify_all();
    }

    /// The most recent frame, or the next one delivered.
    ///
    /// Fails with `CaptureSessionIsMissing` when the tap is (or becomes)
    /// closed, which is how session stop resolves outstanding sample waits.
    pub fn next_frame(&self) -> Result<Frame, CameraError> {
        let mut state = self.state.lock();
        loop {
            if !state.open {
                return Err(CameraError::CaptureSessionIsMissing);
            }
            if let Some(frame) = state.latest.clone() {
                return Ok(frame);
            }
            self.cond.wait(&mut state);
        }
    }

    pub fn frames_delivered(&self) -> u64 {
        self.state.lock().frames_delivered
    }
}

impl Default for FrameTap {
    fn default() -> Self {
        Self::new()
    }
}
