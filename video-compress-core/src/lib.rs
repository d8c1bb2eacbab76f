//! # video-compress-core
//!
//! Host-agnostic video compression core.
//!
//! Re-encodes oversized videos to a bounded resolution and bitrate by
//! orchestrating host-provided decode, playback, audio routing and encode
//! primitives. No codec logic lives here; the crate owns timing, sizing,
//! chunk collection, completion detection and progress.
//!
//! Hosts implement `MediaDecoder`, `StreamEncoder`, `AudioRouter` and
//! `FrameScheduler` and plug them into the generic `TranscodeSession`.
//!
//! ## Architecture
//!
//! ```text
//! video-compress-core (this crate)
//! ├── traits/       ← MediaDecoder, StreamEncoder, AudioRouter, FrameScheduler, TranscodeDelegate
//! ├── models/       ← TranscodeError, TranscodeState, TranscodeConfiguration, ProgressEvent, media types
//! ├── processing/   ← admission, geometry, FrameSurface, RenderLoop, ChunkCollector, progress, codecs
//! ├── session/      ← TranscodeSession (generic orchestrator), CancelHandle, RealtimeScheduler
//! └── storage/      ← artifact + metadata sidecar I/O
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use models::compression_result::{CompressionMetadata, CompressionResult};
pub use models::config::TranscodeConfiguration;
pub use models::error::TranscodeError;
pub use models::media::{
    AudioTrack, MediaMetadata, OutputGeometry, PlaybackEvent, SourceMedia, TranscodeDiagnostics, VideoFrame,
};
pub use models::progress::{ProgressEvent, ProgressStage};
pub use models::state::TranscodeState;
pub use processing::audio_bridge::AudioBridgeOutcome;
pub use processing::format::format_bytes;
pub use processing::frame_surface::FrameSurface;
pub use processing::geometry::plan_geometry;
pub use processing::render_loop::{PumpAction, PumpEvent, PumpState, RenderLoop};
pub use session::cancel::CancelHandle;
pub use session::realtime::RealtimeScheduler;
pub use session::transcode::TranscodeSession;
pub use traits::audio_router::AudioRouter;
pub use traits::frame_scheduler::FrameScheduler;
pub use traits::media_decoder::MediaDecoder;
pub use traits::stream_encoder::{EncoderSettings, EncoderSink, StreamEncoder};
pub use traits::transcode_delegate::{ProgressCallback, TranscodeDelegate};
