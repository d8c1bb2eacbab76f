//! Deterministic stand-ins for host primitives.
//!
//! A `ManualClock` is shared between the scheduler and the decoder so that
//! playback advances exactly one frame interval per tick.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::compression_result::CompressionResult;
use crate::models::error::TranscodeError;
use crate::models::media::{AudioTrack, MediaMetadata, PlaybackEvent, SourceMedia, VideoFrame};
use crate::models::progress::ProgressEvent;
use crate::models::state::TranscodeState;
use crate::processing::frame_surface::FrameSurface;
use crate::traits::audio_router::AudioRouter;
use crate::traits::frame_scheduler::FrameScheduler;
use crate::traits::media_decoder::MediaDecoder;
use crate::traits::stream_encoder::{EncoderSettings, EncoderSink, StreamEncoder};
use crate::traits::transcode_delegate::TranscodeDelegate;

/// Tick length used by `ManualScheduler::new`.
pub const TICK: Duration = Duration::from_millis(20);

const TICK_LIMIT: u64 = 100_000;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn source_of(len: usize) -> SourceMedia {
    SourceMedia::new("clip.mp4", "video/mp4", vec![0x42; len])
}

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        *self.now.lock()
    }

    pub fn advance(&self, by: Duration) -> Duration {
        let mut now = self.now.lock();
        *now += by;
        *now
    }
}

pub struct ManualScheduler {
    clock: ManualClock,
    interval: Duration,
    ticks: u64,
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            interval: TICK,
            ticks: 0,
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn next_frame(&mut self) -> Duration {
        self.ticks += 1;
        assert!(self.ticks < TICK_LIMIT, "frame pump never terminated");
        self.clock.advance(self.interval)
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.clock.advance(duration);
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }
}

/// Calls observed on a `FakeDecoder`.
#[derive(Debug, Default)]
pub struct DecoderCalls {
    pub opened: u32,
    pub play_calls: u32,
    pub paused: u32,
    pub released: u32,
}

pub struct FakeDecoder {
    clock: ManualClock,
    metadata: MediaMetadata,
    frame: VideoFrame,
    pub calls: Arc<Mutex<DecoderCalls>>,
    pub fail_open: Option<String>,
    pub withhold_metadata: bool,
    /// Number of `metadata()` polls answered with `None` first.
    pub metadata_delay: u32,
    /// Never report `Ended`, only the `ended`/`paused` flags.
    pub suppress_ended_event: bool,
    /// Report a decode error once playback passes this position.
    pub error_at: Option<f64>,
    /// Never report `Playing` after `play()`.
    pub stall_on_play: bool,
    /// Position reported by `current_time` instead of the clock.
    pub reported_time: Option<f64>,
    play_requested: bool,
    started_at: Option<Duration>,
    ended_reported: bool,
    error_reported: bool,
    explicitly_paused: bool,
}

impl FakeDecoder {
    pub fn new(clock: ManualClock, width: u32, height: u32, duration_secs: f64) -> Self {
        Self {
            clock,
            metadata: MediaMetadata {
                width,
                height,
                duration_secs,
            },
            frame: VideoFrame::solid(16, 8, [10, 20, 30, 255]),
            calls: Arc::new(Mutex::new(DecoderCalls::default())),
            fail_open: None,
            withhold_metadata: false,
            metadata_delay: 0,
            suppress_ended_event: false,
            error_at: None,
            stall_on_play: false,
            reported_time: None,
            play_requested: false,
            started_at: None,
            ended_reported: false,
            error_reported: false,
            explicitly_paused: false,
        }
    }

    fn position(&self) -> f64 {
        match self.started_at {
            Some(start) => {
                let elapsed = self.clock.now().saturating_sub(start).as_secs_f64();
                elapsed.min(self.metadata.duration_secs)
            }
            None => 0.0,
        }
    }
}

impl MediaDecoder for FakeDecoder {
    fn open(&mut self, _source: &SourceMedia) -> Result<(), String> {
        self.calls.lock().opened += 1;
        match self.fail_open {
            Some(ref reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    fn metadata(&mut self) -> Result<Option<MediaMetadata>, String> {
        if self.withhold_metadata {
            return Ok(None);
        }
        if self.metadata_delay > 0 {
            self.metadata_delay -= 1;
            return Ok(None);
        }
        Ok(Some(self.metadata))
    }

    fn play(&mut self) -> Result<(), String> {
        self.calls.lock().play_calls += 1;
        self.play_requested = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.lock().paused += 1;
        self.explicitly_paused = true;
    }

    fn current_time(&self) -> f64 {
        self.reported_time.unwrap_or_else(|| self.position())
    }

    fn is_paused(&self) -> bool {
        self.explicitly_paused || self.is_ended()
    }

    fn is_ended(&self) -> bool {
        self.started_at.is_some() && self.position() >= self.metadata.duration_secs
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        if self.play_requested && self.started_at.is_none() && !self.stall_on_play {
            self.started_at = Some(self.clock.now());
            return Some(PlaybackEvent::Playing);
        }
        if let Some(at) = self.error_at {
            if !self.error_reported && self.started_at.is_some() && self.position() >= at {
                self.error_reported = true;
                return Some(PlaybackEvent::Error("corrupt frame".into()));
            }
        }
        if self.is_ended() && !self.ended_reported && !self.suppress_ended_event {
            self.ended_reported = true;
            return Some(PlaybackEvent::Ended);
        }
        None
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        self.started_at.map(|_| &self.frame)
    }

    fn release(&mut self) {
        self.calls.lock().released += 1;
    }
}

/// Calls observed on a `FakeEncoder`.
#[derive(Debug, Default)]
pub struct EncoderCalls {
    pub started: u32,
    pub stopped: u32,
    pub frames: u64,
    pub requests: u64,
    pub settings: Option<EncoderSettings>,
    pub audio: Option<AudioTrack>,
    pub timestamps: Vec<Duration>,
}

pub struct FakeEncoder {
    supported: Vec<String>,
    pub calls: Arc<Mutex<EncoderCalls>>,
    pub bytes_per_frame: usize,
    pub fail_start: Option<String>,
    /// Report an error through the sink when this many frames have been captured.
    pub fail_after_frames: Option<u64>,
    pub never_finalize: bool,
    sink: Option<Arc<dyn EncoderSink>>,
    recording: bool,
    pending: Vec<u8>,
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self::supporting(&["video/webm;codecs=vp9", "video/webm;codecs=vp8", "video/webm"])
    }

    pub fn supporting(types: &[&str]) -> Self {
        Self {
            supported: types.iter().map(|t| t.to_string()).collect(),
            calls: Arc::new(Mutex::new(EncoderCalls::default())),
            bytes_per_frame: 32,
            fail_start: None,
            fail_after_frames: None,
            never_finalize: false,
            sink: None,
            recording: false,
            pending: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if let Some(ref sink) = self.sink {
            sink.on_chunk(std::mem::take(&mut self.pending));
        }
    }
}

impl StreamEncoder for FakeEncoder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|t| t == mime_type)
    }

    fn start(
        &mut self,
        settings: &EncoderSettings,
        audio: Option<&AudioTrack>,
        sink: Arc<dyn EncoderSink>,
    ) -> Result<(), String> {
        if let Some(ref reason) = self.fail_start {
            return Err(reason.clone());
        }
        let mut calls = self.calls.lock();
        calls.started += 1;
        calls.settings = Some(settings.clone());
        calls.audio = audio.cloned();
        drop(calls);

        self.sink = Some(sink);
        self.recording = true;
        Ok(())
    }

    fn capture_frame(&mut self, surface: &FrameSurface, timestamp: Duration) -> Result<(), String> {
        if !self.recording {
            return Err("capture while not recording".into());
        }
        let frames = {
            let mut calls = self.calls.lock();
            calls.frames += 1;
            calls.timestamps.push(timestamp);
            calls.frames
        };
        let take = self.bytes_per_frame.min(surface.pixels().len());
        self.pending.extend_from_slice(&surface.pixels()[..take]);

        if self.fail_after_frames == Some(frames) {
            if let Some(ref sink) = self.sink {
                sink.on_error("encoder ran out of memory".into());
            }
        }
        Ok(())
    }

    fn request_data(&mut self) -> Result<(), String> {
        self.calls.lock().requests += 1;
        self.flush();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), String> {
        self.calls.lock().stopped += 1;
        self.recording = false;
        self.flush();
        if !self.never_finalize {
            if let Some(ref sink) = self.sink {
                sink.on_stopped();
            }
        }
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording
    }
}

/// Calls observed on a `FakeAudioRouter`.
#[derive(Debug, Default)]
pub struct AudioCalls {
    pub routed: u32,
    pub disconnected: u32,
}

pub struct FakeAudioRouter {
    result: Result<AudioTrack, String>,
    pub calls: Arc<Mutex<AudioCalls>>,
}

impl FakeAudioRouter {
    pub fn working() -> Self {
        Self {
            result: Ok(AudioTrack {
                id: "audio-0".into(),
                sample_rate: 48_000,
                channels: 2,
            }),
            calls: Arc::new(Mutex::new(AudioCalls::default())),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            calls: Arc::new(Mutex::new(AudioCalls::default())),
        }
    }
}

impl AudioRouter for FakeAudioRouter {
    fn route(&mut self, _decoder: &mut dyn MediaDecoder) -> Result<AudioTrack, String> {
        self.calls.lock().routed += 1;
        self.result.clone()
    }

    fn disconnect(&mut self) {
        self.calls.lock().disconnected += 1;
    }
}

/// Delegate that records everything it is told.
#[derive(Default)]
pub struct RecordingDelegate {
    pub states: Mutex<Vec<&'static str>>,
    pub progress: Mutex<Vec<ProgressEvent>>,
    pub errors: Mutex<Vec<TranscodeError>>,
    pub finished: Mutex<u32>,
}

impl TranscodeDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: &TranscodeState) {
        self.states.lock().push(state.name());
    }

    fn on_progress(&self, event: &ProgressEvent) {
        self.progress.lock().push(*event);
    }

    fn on_error(&self, error: &TranscodeError) {
        self.errors.lock().push(error.clone());
    }

    fn on_finished(&self, _result: &CompressionResult) {
        *self.finished.lock() += 1;
    }
}
