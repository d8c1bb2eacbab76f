use serde::{Deserialize, Serialize};

/// Pipeline stage a progress value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Loading,
    Compressing,
    Finalizing,
}

/// A single progress notification (0–100 within the run).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub progress: f64,
}

impl ProgressEvent {
    pub fn new(stage: ProgressStage, progress: f64) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 100.0),
        }
    }
}
