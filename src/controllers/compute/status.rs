use std::fmt;

/// Lifecycle state of a [`FlameComputer`](super::flame_computer::FlameComputer).
///
/// `Idle -> Running -> {Completed, Aborted, Failed}`; any state moves back
/// to `Running` on the next compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComputeStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
    Failed,
}

impl ComputeStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ComputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
