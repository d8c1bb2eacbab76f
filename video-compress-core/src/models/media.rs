use serde::{Deserialize, Serialize};

/// Raw input handed to the pipeline: the file bytes plus the declared MIME type.
///
/// Never mutated once accepted. The decoder receives a borrow; the bytes are
/// returned untouched by the admission no-op path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMedia {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl SourceMedia {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Size of the input in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Intrinsic properties of a decoded source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

/// Output frame size chosen by the geometry planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputGeometry {
    pub width: u32,
    pub height: u32,
}

impl OutputGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in one frame, or `None` on overflow.
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}

/// One decoded frame as delivered by the host decoder.
///
/// Pixels are tightly packed RGBA8, row-major, `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// A frame filled with a single RGBA color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self { width, height, data }
    }

    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * 4
    }
}

/// Handle to an audio track routed from the source into the encoded stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub id: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Events reported by the host decoder during playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback actually began.
    Playing,
    /// Playback reached the natural end of the source.
    Ended,
    /// The decoder failed mid-playback.
    Error(String),
}

/// Diagnostics for one compression run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeDiagnostics {
    pub ticks: u64,
    pub frames_painted: u64,
    pub frames_captured: u64,
    pub chunks_emitted: u64,
    pub bytes_emitted: u64,
    pub audio_bridged: bool,
}
