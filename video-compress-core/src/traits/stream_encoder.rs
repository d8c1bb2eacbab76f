use std::sync::Arc;
use std::time::Duration;

use crate::models::media::{AudioTrack, OutputGeometry};
use crate::processing::frame_surface::FrameSurface;

/// Parameters handed to the encoder when recording starts.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub mime_type: String,
    pub video_bitrate_bps: u32,
    pub capture_fps: f64,
    pub geometry: OutputGeometry,
}

/// Receiver for encoder output.
///
/// Mirrors a recorder's data-available / error / stop callbacks. The encoder
/// may call these from inside its own methods or from a host thread.
pub trait EncoderSink: Send + Sync {
    /// A compressed chunk, in emission order.
    fn on_chunk(&self, data: Vec<u8>);

    /// The encoder failed; no further chunks are expected.
    fn on_error(&self, message: String);

    /// All chunks have been delivered after `stop()`.
    fn on_stopped(&self);
}

/// Interface for a host-provided incremental encoder.
///
/// Consumes the frame surface as a live capture stream plus an optional
/// bridged audio track.
pub trait StreamEncoder: Send {
    /// Whether the encoder can produce the given container/codec string.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Begin recording, delivering output through `sink`.
    fn start(
        &mut self,
        settings: &EncoderSettings,
        audio: Option<&AudioTrack>,
        sink: Arc<dyn EncoderSink>,
    ) -> Result<(), String>;

    /// Capture the current surface contents at the given media timestamp.
    fn capture_frame(&mut self, surface: &FrameSurface, timestamp: Duration) -> Result<(), String>;

    /// Flush whatever has been encoded since the last request as a chunk.
    fn request_data(&mut self) -> Result<(), String>;

    /// Stop recording. Remaining data and `on_stopped` follow through the sink.
    fn stop(&mut self) -> Result<(), String>;

    fn is_recording(&self) -> bool;
}
