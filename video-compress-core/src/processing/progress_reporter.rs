use std::sync::Arc;

use crate::models::progress::{ProgressEvent, ProgressStage};
use crate::traits::transcode_delegate::{ProgressCallback, TranscodeDelegate};

/// Fans progress out to the per-call callback and the session delegate.
///
/// Guarantees, per run:
/// - stages only move forward (loading → compressing → finalizing);
/// - values never decrease within a stage;
/// - compressing values never exceed `compressing_cap`;
/// - repeated identical values are not re-emitted.
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    delegate: Option<Arc<dyn TranscodeDelegate>>,
    compressing_cap: f64,
    last: Option<ProgressEvent>,
}

impl ProgressReporter {
    pub fn new(
        callback: Option<ProgressCallback>,
        delegate: Option<Arc<dyn TranscodeDelegate>>,
        compressing_cap: f64,
    ) -> Self {
        Self {
            callback,
            delegate,
            compressing_cap,
            last: None,
        }
    }

    /// Emit `progress` for `stage`, subject to the guarantees above.
    ///
    /// Returns the event actually delivered, if any.
    pub fn report(&mut self, stage: ProgressStage, progress: f64) -> Option<ProgressEvent> {
        let mut progress = if progress.is_finite() { progress } else { 0.0 };
        if stage == ProgressStage::Compressing {
            progress = progress.min(self.compressing_cap);
        }

        if let Some(last) = self.last {
            if stage_rank(stage) < stage_rank(last.stage) {
                log::debug!("Ignoring {:?} progress after {:?}", stage, last.stage);
                return None;
            }
            if stage == last.stage {
                progress = progress.max(last.progress);
                if progress == last.progress {
                    return None;
                }
            }
        }

        let event = ProgressEvent::new(stage, progress);
        self.last = Some(event);

        if let Some(ref callback) = self.callback {
            callback(&event);
        }
        if let Some(ref delegate) = self.delegate {
            delegate.on_progress(&event);
        }
        Some(event)
    }

    /// Compressing progress from the playback position: `current / duration`, capped.
    pub fn report_playback(&mut self, current_time: f64, duration: f64) -> Option<ProgressEvent> {
        self.report(ProgressStage::Compressing, playback_percent(current_time, duration))
    }

    pub fn last(&self) -> Option<ProgressEvent> {
        self.last
    }
}

/// Playback position as a percentage. Zero for unknown or zero durations.
pub fn playback_percent(current_time: f64, duration: f64) -> f64 {
    if !(duration > 0.0 && duration.is_finite()) || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration * 100.0).clamp(0.0, 100.0)
}

fn stage_rank(stage: ProgressStage) -> u8 {
    match stage {
        ProgressStage::Loading => 0,
        ProgressStage::Compressing => 1,
        ProgressStage::Finalizing => 2,
    }
}
