use std::time::Duration;

use crate::models::error::TranscodeError;
use crate::processing::progress_reporter::playback_percent;

/// Frame pump state.
///
/// ```text
/// not_started → playing → draining → done
///      ↓           ↓          ↓
///      └────────── failed ────┘
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PumpState {
    NotStarted,
    Playing,
    Draining,
    Done,
    Failed(TranscodeError),
}

/// Named inputs to the frame pump.
#[derive(Debug, Clone, PartialEq)]
pub enum PumpEvent {
    /// The decoder reported that playback began.
    PlaybackStarted,
    /// One animation frame elapsed.
    Tick {
        current_time: f64,
        duration: f64,
        ended: bool,
        paused: bool,
    },
    /// The decoder reported the natural end of the source.
    PlaybackEnded,
    /// The encoder delivered its last chunk after stop.
    EncoderFinalized,
    /// Something fatal happened outside the pump.
    Failure(TranscodeError),
}

/// What the session must do in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum PumpAction {
    EmitProgress(f64),
    PaintFrame,
    /// Stop the encoder after the grace delay.
    ScheduleStop(Duration),
    /// Stop the encoder right away.
    StopNow,
    Finish,
    Fail(TranscodeError),
}

/// Explicit state machine for one compression run's render loop.
///
/// Pure: it never touches the decoder, surface or encoder itself, it only
/// tells the session what to do. Encoder stop is requested at most once.
#[derive(Debug)]
pub struct RenderLoop {
    state: PumpState,
    progress_cap: f64,
    grace_delay: Duration,
}

impl RenderLoop {
    pub fn new(progress_cap: f64, grace_delay: Duration) -> Self {
        Self {
            state: PumpState::NotStarted,
            progress_cap,
            grace_delay,
        }
    }

    pub fn state(&self) -> &PumpState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PumpState::Playing
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, PumpState::Done | PumpState::Failed(_))
    }

    pub fn handle(&mut self, event: PumpEvent) -> Vec<PumpAction> {
        match (self.state.clone(), event) {
            (PumpState::Done | PumpState::Failed(_), _) => Vec::new(),

            (_, PumpEvent::Failure(error)) => {
                self.state = PumpState::Failed(error.clone());
                vec![PumpAction::Fail(error)]
            }

            (PumpState::NotStarted, PumpEvent::PlaybackStarted) => {
                self.state = PumpState::Playing;
                vec![PumpAction::EmitProgress(0.0)]
            }

            (PumpState::NotStarted, PumpEvent::PlaybackEnded) => {
                // Ended before a single frame was drawn: nothing to pump, just drain.
                self.state = PumpState::Draining;
                vec![PumpAction::StopNow]
            }

            (
                PumpState::Playing,
                PumpEvent::Tick {
                    current_time,
                    duration,
                    ended,
                    paused,
                },
            ) => {
                if ended || paused {
                    self.state = PumpState::Draining;
                    return vec![PumpAction::StopNow];
                }
                let progress = playback_percent(current_time, duration).min(self.progress_cap);
                vec![PumpAction::PaintFrame, PumpAction::EmitProgress(progress)]
            }

            (PumpState::Playing, PumpEvent::PlaybackEnded) => {
                self.state = PumpState::Draining;
                vec![PumpAction::ScheduleStop(self.grace_delay)]
            }

            (PumpState::Draining, PumpEvent::EncoderFinalized) => {
                self.state = PumpState::Done;
                vec![PumpAction::Finish]
            }

            (PumpState::NotStarted | PumpState::Playing, PumpEvent::EncoderFinalized) => {
                let error = TranscodeError::Encode("encoder stopped before playback finished".into());
                self.state = PumpState::Failed(error.clone());
                vec![PumpAction::Fail(error)]
            }

            // Ticks before start or while draining, duplicate start/end signals.
            _ => Vec::new(),
        }
    }
}
