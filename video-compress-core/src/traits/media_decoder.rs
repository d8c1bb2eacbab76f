use crate::models::media::{MediaMetadata, PlaybackEvent, SourceMedia, VideoFrame};

/// Interface for host-provided decode/playback of a source file.
///
/// Implemented by whatever the host has: a browser media element behind a
/// wasm binding, a native player, or the fakes used in tests. Playback runs
/// in real time on the host side; the session only observes it.
pub trait MediaDecoder: Send {
    /// Start opening `source`. Metadata arrives later through `metadata()`.
    fn open(&mut self, source: &SourceMedia) -> Result<(), String>;

    /// `Ok(None)` while metadata is still pending.
    fn metadata(&mut self) -> Result<Option<MediaMetadata>, String>;

    /// Request playback. `PlaybackEvent::Playing` is reported once it actually starts.
    fn play(&mut self) -> Result<(), String>;

    fn pause(&mut self);

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    fn is_paused(&self) -> bool;

    fn is_ended(&self) -> bool;

    /// Next pending playback event, if any.
    fn poll_event(&mut self) -> Option<PlaybackEvent>;

    /// The frame at the current playback position.
    fn current_frame(&self) -> Option<&VideoFrame>;

    /// Release the decode/playback context. Called exactly once per `open`.
    fn release(&mut self);
}
