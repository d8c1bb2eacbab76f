use std::sync::Arc;

use crate::models::compression_result::CompressionResult;
use crate::models::error::TranscodeError;
use crate::models::progress::ProgressEvent;
use crate::models::state::TranscodeState;

/// Per-call progress sink passed to `compress`.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync + 'static>;

/// Event delegate for compression session notifications.
///
/// All methods are called from the thread driving `compress`.
pub trait TranscodeDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &TranscodeState);

    /// Called for every progress event that reaches the caller.
    fn on_progress(&self, event: &ProgressEvent);

    /// Called when a run fails.
    fn on_error(&self, error: &TranscodeError);

    /// Called when a run completes, including admission no-ops.
    fn on_finished(&self, result: &CompressionResult);
}
