use parking_lot::{Condvar, Mutex};

use crate::models::error::CameraError;

enum SlotState<T> {
    Pending,
    Done(Result<T, CameraError>),
    Taken,
}

/// Single-shot completion slot bridging an asynchronous hardware callback to
/// a synchronously waiting caller.
///
/// A slot is fulfilled exactly once; later fulfillments are ignored. The
/// session fails every registered slot on stop so no caller is left dangling.
pub struct CompletionSlot<T> {
    state: Mutex<SlotState<T>>,
    cond: Condvar,
}

impl<T> CompletionSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending),
            cond: Condvar::new(),
        }
    }

    /// Deliver the result. Returns `false` if the slot was already fulfilled.
    pub fn fulfill(&self, result: Result<T, CameraError>) -> bool {
        let mut state = self.state.lock();
        match *state {
            SlotState::Pending => {
                *state = SlotState::Done(result);
                self.cond.notify_all();
                true
            }
            _ => false,
        }
    }

    /// Block until the slot is fulfilled and take the result.
    ///
    /// There is no timeout at this layer; a capture the hardware never
    /// completes leaves the caller waiting.
    pub fn wait(&self) -> Result<T, CameraError> {
        let mut state = self.state.lock();
        loop {
            match std::mem::replace(&mut *state, SlotState::Taken) {
                SlotState::Done(result) => return result,
                SlotState::Pending => {
                    *state = SlotState::Pending;
                    self.cond.wait(&mut state);
                }
                SlotState::Taken => {
                    return Err(CameraError::unknown("completion already consumed"))
                }
            }
        }
    }
}

impl<T> Default for CompletionSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn waits_for_fulfillment() {
        let slot = Arc::new(CompletionSlot::new());
        let worker = Arc::clone(&slot);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            worker.fulfill(Ok(7u32));
        });
        assert_eq!(slot.wait(), Ok(7));
        handle.join().unwrap();
    }

    #[test]
    fn fulfills_exactly_once() {
        let slot = CompletionSlot::new();
        assert!(slot.fulfill(Ok(1u32)));
        assert!(!slot.fulfill(Ok(2)));
        assert_eq!(slot.wait(), Ok(1));
    }

    #[test]
    fn forwards_errors() {
        let slot: CompletionSlot<u32> = CompletionSlot::new();
        slot.fulfill(Err(CameraError::CaptureSessionIsMissing));
        assert_eq!(slot.wait(), Err(CameraError::CaptureSessionIsMissing));
    }
}
