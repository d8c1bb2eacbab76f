use thiserror::Error;

/// Errors that can end a compression run.
///
/// Audio bridge failures are not errors. They surface as
/// `AudioBridgeOutcome::VideoOnly` and the run continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    #[error("failed to load source: {0}")]
    Load(String),

    #[error("drawing surface unavailable: {0}")]
    Context(String),

    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("cancelled")]
    Cancelled,
}

impl TranscodeError {
    /// Short machine-friendly label, stable across message changes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Context(_) => "context",
            Self::Encode(_) => "encode",
            Self::Configuration(_) => "configuration",
            Self::Storage(_) => "storage",
            Self::Cancelled => "cancelled",
        }
    }
}
