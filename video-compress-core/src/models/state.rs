use super::compression_result::CompressionResult;
use super::error::TranscodeError;

/// Compression session state machine.
///
/// State transitions:
/// ```text
/// idle → loading → playing → draining → completed
///           ↓         ↓          ↓
///           └──────── failed ────┘
/// ```
/// Admission no-ops go straight from `idle` to `completed`.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeState {
    Idle,
    Loading,
    Playing { progress: f64 },
    Draining,
    Completed(Box<CompressionResult>),
    Failed(TranscodeError),
}

impl TranscodeState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Short label for logs and host UIs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing { .. } => "playing",
            Self::Draining => "draining",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TranscodeState::Failed(TranscodeError::Cancelled).is_terminal());
        assert!(!TranscodeState::Draining.is_terminal());
        assert!(TranscodeState::Playing { progress: 12.0 }.is_playing());
        assert_eq!(TranscodeState::Loading.name(), "loading");
    }
}
