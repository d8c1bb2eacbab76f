use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::compression_result::{compression_ratio, CompressionResult};
use crate::models::config::TranscodeConfiguration;
use crate::models::error::TranscodeError;
use crate::models::media::{AudioTrack, MediaMetadata, PlaybackEvent, SourceMedia, TranscodeDiagnostics};
use crate::models::progress::ProgressStage;
use crate::models::state::TranscodeState;
use crate::processing::admission::{admit, passthrough_result, Admission};
use crate::processing::audio_bridge::bridge_audio;
use crate::processing::chunk_collector::{sha256_hex, ChunkCollector};
use crate::processing::codec_select::select_mime_type;
use crate::processing::format::format_bytes;
use crate::processing::frame_surface::FrameSurface;
use crate::processing::geometry::plan_geometry;
use crate::processing::progress_reporter::ProgressReporter;
use crate::processing::render_loop::{PumpAction, PumpEvent, PumpState, RenderLoop};
use crate::session::cancel::CancelHandle;
use crate::traits::audio_router::AudioRouter;
use crate::traits::frame_scheduler::FrameScheduler;
use crate::traits::media_decoder::MediaDecoder;
use crate::traits::stream_encoder::{EncoderSettings, EncoderSink, StreamEncoder};
use crate::traits::transcode_delegate::{ProgressCallback, TranscodeDelegate};

/// Progress reported when the encoder is asked to stop.
const FINALIZE_START_PROGRESS: f64 = 90.0;

/// Mutable session state, protected by `parking_lot::Mutex`.
struct SessionShared {
    state: TranscodeState,
    diagnostics: TranscodeDiagnostics,
}

/// State publication shared by `compress` and observers on other threads.
struct SessionObserver {
    shared: Arc<Mutex<SessionShared>>,
    delegate: Option<Arc<dyn TranscodeDelegate>>,
}

impl SessionObserver {
    fn set_state(&self, new_state: TranscodeState) {
        self.shared.lock().state = new_state.clone();
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&new_state);
        }
    }

    /// Playing progress updates are stored silently; entering `Playing` is announced.
    fn update_progress(&self, progress: f64) {
        {
            let mut s = self.shared.lock();
            if let TranscodeState::Playing { .. } = s.state {
                s.state = TranscodeState::Playing { progress };
                return;
            }
        }
        self.set_state(TranscodeState::Playing { progress });
    }

    fn update_diagnostics(&self, update: impl FnOnce(&mut TranscodeDiagnostics)) {
        update(&mut self.shared.lock().diagnostics);
    }

    fn finish(&self, result: &CompressionResult) {
        self.set_state(TranscodeState::Completed(Box::new(result.clone())));
        if let Some(ref delegate) = self.delegate {
            delegate.on_finished(result);
        }
    }

    fn fail(&self, error: &TranscodeError) {
        self.set_state(TranscodeState::Failed(error.clone()));
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }
}

/// Encoder output sink for one run.
///
/// Handed to the encoder as `Arc<dyn EncoderSink>`; the session polls it on
/// every tick for errors and the finalize signal.
struct SessionSink {
    collector: Mutex<ChunkCollector>,
    error: Mutex<Option<String>>,
    stopped: AtomicBool,
}

impl SessionSink {
    fn new() -> Self {
        Self {
            collector: Mutex::new(ChunkCollector::new()),
            error: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    fn take_error(&self) -> Option<String> {
        self.error.lock().take()
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Returns `(artifact, chunks emitted)`.
    fn finalize(&self) -> (Vec<u8>, u64) {
        let mut collector = self.collector.lock();
        let emitted = collector.emitted();
        (collector.finalize(), emitted)
    }

    fn discard(&self) {
        self.collector.lock().discard();
    }
}

impl EncoderSink for SessionSink {
    fn on_chunk(&self, data: Vec<u8>) {
        self.collector.lock().push(data);
    }

    fn on_error(&self, message: String) {
        let mut error = self.error.lock();
        // First failure wins; later ones are usually consequences of it.
        if error.is_none() {
            *error = Some(message);
        }
    }

    fn on_stopped(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Pauses and releases the decoder when the run ends, however it ends.
struct DecoderGuard<'a, D: MediaDecoder> {
    decoder: &'a mut D,
}

impl<D: MediaDecoder> Deref for DecoderGuard<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.decoder
    }
}

impl<D: MediaDecoder> DerefMut for DecoderGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.decoder
    }
}

impl<D: MediaDecoder> Drop for DecoderGuard<'_, D> {
    fn drop(&mut self) {
        self.decoder.pause();
        self.decoder.release();
        log::debug!("Decoder released");
    }
}

/// Disconnects the audio route if one was established.
struct AudioGuard<'a, A: AudioRouter> {
    router: &'a mut A,
    connected: bool,
}

impl<A: AudioRouter> Drop for AudioGuard<'_, A> {
    fn drop(&mut self) {
        if self.connected {
            self.router.disconnect();
        }
    }
}

/// Owns the encoder for the duration of a run.
///
/// Stop is sent at most once. If the run ends without `complete`, a still
/// recording encoder is stopped and buffered chunks are discarded.
struct RecordingGuard<'a, E: StreamEncoder> {
    encoder: &'a mut E,
    sink: Arc<SessionSink>,
    stop_sent: bool,
    completed: bool,
}

impl<'a, E: StreamEncoder> RecordingGuard<'a, E> {
    fn start(
        encoder: &'a mut E,
        sink: Arc<SessionSink>,
        settings: &EncoderSettings,
        audio: Option<&AudioTrack>,
    ) -> Result<Self, TranscodeError> {
        let dyn_sink: Arc<dyn EncoderSink> = Arc::clone(&sink) as Arc<dyn EncoderSink>;
        encoder.start(settings, audio, dyn_sink).map_err(TranscodeError::Encode)?;
        Ok(Self {
            encoder,
            sink,
            stop_sent: false,
            completed: false,
        })
    }

    fn capture(&mut self, surface: &FrameSurface, timestamp: Duration) -> Result<(), TranscodeError> {
        self.encoder
            .capture_frame(surface, timestamp)
            .map_err(TranscodeError::Encode)
    }

    fn request_data(&mut self) -> Result<(), TranscodeError> {
        self.encoder.request_data().map_err(TranscodeError::Encode)
    }

    fn stop(&mut self) -> Result<(), TranscodeError> {
        if self.stop_sent {
            return Ok(());
        }
        self.stop_sent = true;
        self.encoder.stop().map_err(TranscodeError::Encode)
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl<E: StreamEncoder> Drop for RecordingGuard<'_, E> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        if !self.stop_sent && self.encoder.is_recording() {
            self.stop_sent = true;
            if let Err(e) = self.encoder.stop() {
                log::warn!("Encoder stop during cleanup failed: {}", e);
            }
        }
        self.sink.discard();
    }
}

/// Host-agnostic compression orchestrator.
///
/// Generic over the host's decoder, encoder, audio router and frame clock.
/// Each `compress` call owns its own surface, sink and audio route and
/// releases all of them before returning.
///
/// ```text
/// [MediaDecoder] → [RenderLoop] → [FrameSurface] → [StreamEncoder] → [ChunkCollector] → artifact
///        └──────→ [AudioRouter] ─────────────────────────┘
/// ```
pub struct TranscodeSession<D, E, A, S>
where
    D: MediaDecoder,
    E: StreamEncoder,
    A: AudioRouter,
    S: FrameScheduler,
{
    decoder: D,
    encoder: E,
    audio: A,
    scheduler: S,
    config: TranscodeConfiguration,
    observer: SessionObserver,
    cancel: CancelHandle,
}

impl<D, E, A, S> TranscodeSession<D, E, A, S>
where
    D: MediaDecoder,
    E: StreamEncoder,
    A: AudioRouter,
    S: FrameScheduler,
{
    pub fn new(decoder: D, encoder: E, audio: A, scheduler: S) -> Self {
        Self {
            decoder,
            encoder,
            audio,
            scheduler,
            config: TranscodeConfiguration::default(),
            observer: SessionObserver {
                shared: Arc::new(Mutex::new(SessionShared {
                    state: TranscodeState::Idle,
                    diagnostics: TranscodeDiagnostics::default(),
                })),
                delegate: None,
            },
            cancel: CancelHandle::new(),
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn TranscodeDelegate>) {
        self.observer.delegate = Some(delegate);
    }

    /// Apply configuration. Only allowed while no run is in progress.
    pub fn configure(&mut self, config: TranscodeConfiguration) -> Result<(), TranscodeError> {
        {
            let state = &self.observer.shared.lock().state;
            if !state.is_idle() && !state.is_terminal() {
                return Err(TranscodeError::Configuration(format!(
                    "cannot configure while {}",
                    state.name()
                )));
            }
        }
        config.validate().map_err(TranscodeError::Configuration)?;
        self.config = config;
        Ok(())
    }

    pub fn configuration(&self) -> &TranscodeConfiguration {
        &self.config
    }

    pub fn state(&self) -> TranscodeState {
        self.observer.shared.lock().state.clone()
    }

    pub fn diagnostics(&self) -> TranscodeDiagnostics {
        self.observer.shared.lock().diagnostics.clone()
    }

    /// Handle for cancelling the current or next run from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Compress `source`, reporting progress through `on_progress`.
    ///
    /// Inputs at or below the size threshold are returned unchanged without
    /// touching any host primitive. Otherwise the full pipeline runs once;
    /// any fatal failure is returned as the single error of the call.
    pub fn compress(
        &mut self,
        source: &SourceMedia,
        on_progress: Option<ProgressCallback>,
    ) -> Result<CompressionResult, TranscodeError> {
        self.config.validate().map_err(TranscodeError::Configuration)?;
        self.observer
            .update_diagnostics(|d| *d = TranscodeDiagnostics::default());

        if admit(source.size(), self.config.size_threshold_bytes) == Admission::PassThrough {
            log::info!(
                "{} is {} (threshold {}), skipping compression",
                source.name,
                format_bytes(source.size()),
                format_bytes(self.config.size_threshold_bytes)
            );
            let result = passthrough_result(source);
            self.cancel.reset();
            self.observer.finish(&result);
            return Ok(result);
        }

        let mut reporter = ProgressReporter::new(
            on_progress,
            self.observer.delegate.clone(),
            self.config.progress_cap,
        );
        let outcome = self.run_pipeline(source, &mut reporter);
        self.cancel.reset();

        match outcome {
            Ok(result) => {
                self.observer.finish(&result);
                Ok(result)
            }
            Err(error) => {
                log::error!("Compression of {} failed: {}", source.name, error);
                self.observer.fail(&error);
                Err(error)
            }
        }
    }

    fn run_pipeline(
        &mut self,
        source: &SourceMedia,
        reporter: &mut ProgressReporter,
    ) -> Result<CompressionResult, TranscodeError> {
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let observer = &self.observer;
        let scheduler = &mut self.scheduler;

        observer.set_state(TranscodeState::Loading);
        reporter.report(ProgressStage::Loading, 0.0);

        // Load
        let mut decoder = DecoderGuard {
            decoder: &mut self.decoder,
        };
        decoder.open(source).map_err(TranscodeError::Load)?;
        let metadata = wait_for_metadata(&mut *decoder, &mut *scheduler, &cancel, config.metadata_timeout())?;
        log::info!(
            "Loaded {} ({}): {}x{}, {:.2}s",
            source.name,
            format_bytes(source.size()),
            metadata.width,
            metadata.height,
            metadata.duration_secs
        );
        reporter.report(ProgressStage::Loading, 100.0);

        // Plan and acquire the surface
        let geometry = plan_geometry(metadata.width, metadata.height, config.max_dimension);
        let mut surface = FrameSurface::allocate(geometry)?;
        let mime_type = select_mime_type(&self.encoder, &config.mime_preferences);
        log::info!(
            "Encoding {}x{} {} at {} bps",
            geometry.width,
            geometry.height,
            mime_type,
            config.video_bitrate_bps
        );

        // Audio (best effort)
        let bridge = bridge_audio(&mut self.audio, &mut *decoder);
        let _audio = AudioGuard {
            router: &mut self.audio,
            connected: bridge.is_bridged(),
        };
        let has_audio = bridge.is_bridged();
        observer.update_diagnostics(|d| d.audio_bridged = has_audio);

        // Encoder
        let sink = Arc::new(SessionSink::new());
        let settings = EncoderSettings {
            mime_type: mime_type.clone(),
            video_bitrate_bps: config.video_bitrate_bps,
            capture_fps: config.capture_fps,
            geometry,
        };
        let mut recording = RecordingGuard::start(&mut self.encoder, Arc::clone(&sink), &settings, bridge.track())?;

        // Frame pump
        decoder.play().map_err(TranscodeError::Load)?;
        let mut pump = RenderLoop::new(config.progress_cap, config.grace_delay());
        let play_requested = scheduler.now();
        let mut last_capture: Option<Duration> = None;
        let mut captured_generation = 0u64;
        let mut last_chunk_request = play_requested;
        let mut finalize_deadline: Option<Duration> = None;

        'pump: loop {
            if cancel.is_cancelled() {
                return Err(TranscodeError::Cancelled);
            }
            let now = scheduler.next_frame();
            observer.update_diagnostics(|d| d.ticks += 1);

            let mut actions = Vec::new();
            let mut stop_request: Option<Duration> = None;
            while let Some(event) = decoder.poll_event() {
                let event = match event {
                    PlaybackEvent::Playing => PumpEvent::PlaybackStarted,
                    PlaybackEvent::Ended => PumpEvent::PlaybackEnded,
                    PlaybackEvent::Error(message) => PumpEvent::Failure(TranscodeError::Load(message)),
                };
                actions.extend(pump.handle(event));
            }
            if let Some(message) = sink.take_error() {
                actions.extend(pump.handle(PumpEvent::Failure(TranscodeError::Encode(message))));
            }
            if sink.is_stopped() {
                actions.extend(pump.handle(PumpEvent::EncoderFinalized));
            }
            if pump.is_playing() {
                actions.extend(pump.handle(PumpEvent::Tick {
                    current_time: decoder.current_time(),
                    duration: metadata.duration_secs,
                    ended: decoder.is_ended(),
                    paused: decoder.is_paused(),
                }));
            }

            for action in actions {
                match action {
                    PumpAction::EmitProgress(progress) => {
                        reporter.report(ProgressStage::Compressing, progress);
                        observer.update_progress(reporter.last().map_or(progress, |e| e.progress));
                    }
                    PumpAction::PaintFrame => {
                        let Some(frame) = decoder.current_frame() else {
                            continue;
                        };
                        surface.draw(frame).map_err(TranscodeError::Load)?;
                        observer.update_diagnostics(|d| d.frames_painted += 1);

                        let due = last_capture.map_or(true, |t| now.saturating_sub(t) >= config.capture_interval());
                        if due {
                            let timestamp = playback_timestamp(decoder.current_time())?;
                            recording.capture(&surface, timestamp)?;
                            last_capture = Some(now);
                            captured_generation = surface.generation();
                            observer.update_diagnostics(|d| d.frames_captured += 1);
                        }
                    }
                    PumpAction::ScheduleStop(delay) => stop_request = Some(delay),
                    PumpAction::StopNow => stop_request = Some(Duration::ZERO),
                    PumpAction::Finish => break 'pump,
                    PumpAction::Fail(error) => return Err(error),
                }
            }

            if let Some(delay) = stop_request.filter(|_| finalize_deadline.is_none()) {
                observer.set_state(TranscodeState::Draining);
                if !delay.is_zero() {
                    scheduler.sleep(delay);
                    if cancel.is_cancelled() {
                        return Err(TranscodeError::Cancelled);
                    }
                }
                // Flush the last painted frame if the capture cadence skipped it.
                if surface.generation() > captured_generation {
                    let timestamp = playback_timestamp(decoder.current_time())?;
                    recording.capture(&surface, timestamp)?;
                    captured_generation = surface.generation();
                    observer.update_diagnostics(|d| d.frames_captured += 1);
                }
                recording.stop()?;
                finalize_deadline = Some(scheduler.now() + config.finalize_timeout());
                reporter.report(ProgressStage::Finalizing, FINALIZE_START_PROGRESS);
            }

            if pump.is_playing() && now.saturating_sub(last_chunk_request) >= config.chunk_interval() {
                recording.request_data()?;
                last_chunk_request = now;
            }

            if *pump.state() == PumpState::NotStarted
                && now.saturating_sub(play_requested) >= config.playback_start_timeout()
            {
                return Err(TranscodeError::Load(format!(
                    "playback did not start within {} ms",
                    config.playback_start_timeout_ms
                )));
            }

            if let Some(deadline) = finalize_deadline {
                if scheduler.now() >= deadline {
                    return Err(TranscodeError::Encode(format!(
                        "encoder did not finalize within {} ms",
                        config.finalize_timeout_ms
                    )));
                }
            }
        }

        // Assemble
        let (artifact, chunks) = sink.finalize();
        recording.complete();
        if artifact.is_empty() {
            return Err(TranscodeError::Encode("encoder produced no data".into()));
        }
        reporter.report(ProgressStage::Finalizing, 100.0);

        let original_size = source.size();
        let compressed_size = artifact.len() as u64;
        observer.update_diagnostics(|d| {
            d.chunks_emitted = chunks;
            d.bytes_emitted = compressed_size;
        });

        let result = CompressionResult {
            checksum: sha256_hex(&artifact),
            artifact,
            mime_type,
            original_size,
            compressed_size,
            compression_ratio: compression_ratio(original_size, compressed_size),
            geometry: Some(geometry),
            duration_secs: Some(metadata.duration_secs),
            has_audio,
        };
        log::info!(
            "Compressed {}: {} → {} ({:.2}x, {} chunks)",
            source.name,
            format_bytes(original_size),
            format_bytes(compressed_size),
            result.compression_ratio,
            chunks
        );
        Ok(result)
    }
}

/// Capture timestamp for a decoder position. Negative positions count as zero.
fn playback_timestamp(seconds: f64) -> Result<Duration, TranscodeError> {
    Duration::try_from_secs_f64(seconds.max(0.0))
        .map_err(|e| TranscodeError::Load(format!("decoder reported position {}: {}", seconds, e)))
}

/// Poll the decoder once per frame until metadata arrives, fails, or times out.
fn wait_for_metadata<D, S>(
    decoder: &mut D,
    scheduler: &mut S,
    cancel: &CancelHandle,
    timeout: Duration,
) -> Result<MediaMetadata, TranscodeError>
where
    D: MediaDecoder + ?Sized,
    S: FrameScheduler + ?Sized,
{
    let started = scheduler.now();
    loop {
        if cancel.is_cancelled() {
            return Err(TranscodeError::Cancelled);
        }
        if let Some(metadata) = decoder.metadata().map_err(TranscodeError::Load)? {
            return Ok(metadata);
        }
        if scheduler.now().saturating_sub(started) >= timeout {
            return Err(TranscodeError::Load(format!(
                "metadata not available after {} ms",
                timeout.as_millis()
            )));
        }
        scheduler.next_frame();
    }
}
