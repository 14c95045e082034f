/// Capture session state machine.
///
/// State transitions:
/// ```text
/// unprepared → prepared → running → stopped
///                  ↑                    │
///                  └──── (prepare) ─────┘
/// ```
///
/// `stopped` keeps the session wiring attached so a later `prepare` is cheap;
/// only `running` accepts capture and reconfiguration requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unprepared,
    Prepared,
    Running,
    Stopped,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}
