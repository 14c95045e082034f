use thiserror::Error;

/// Errors that can occur during camera session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Device discovery found nothing backing the requested position.
    #[error("no cameras available for the requested position")]
    NoCamerasAvailable,

    /// The operation requires a running capture session.
    #[error("capture session is missing")]
    CaptureSessionIsMissing,

    /// `prepare` was called while the session is already running.
    #[error("capture session is already running")]
    CaptureSessionAlreadyRunning,

    /// The hardware rejected the session inputs being attached.
    #[error("capture inputs are invalid: {0}")]
    InputsAreInvalid(String),

    /// The hardware rejected a reconfiguration or control mutation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The hardware reported success but produced no usable result.
    #[error("unknown capture failure: {0}")]
    Unknown(String),
}

impl CameraError {
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}
