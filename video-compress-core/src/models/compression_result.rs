use serde::{Deserialize, Serialize};

use super::media::OutputGeometry;

/// Result returned when a compression run completes successfully.
///
/// For admission no-ops the artifact is the input, `geometry` is `None`
/// and `compression_ratio` is exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub artifact: Vec<u8>,
    pub mime_type: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub geometry: Option<OutputGeometry>,
    pub duration_secs: Option<f64>,
    pub has_audio: bool,
    pub checksum: String,
}

impl CompressionResult {
    /// Whether the pipeline actually re-encoded the input.
    pub fn was_transcoded(&self) -> bool {
        self.geometry.is_some()
    }

    /// Bytes saved relative to the input (zero if the output grew).
    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.compressed_size)
    }
}

/// Persisted description of a compressed artifact.
///
/// Serializable for the JSON sidecar written next to the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: String,
    pub mime_type: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub checksum: String,
    pub geometry: Option<OutputGeometry>,
    pub duration_secs: Option<f64>,
    pub has_audio: bool,
}

impl CompressionMetadata {
    pub fn from_result(result: &CompressionResult, file_path: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path: file_path.to_string(),
            mime_type: result.mime_type.clone(),
            original_size: result.original_size,
            compressed_size: result.compressed_size,
            compression_ratio: result.compression_ratio,
            checksum: result.checksum.clone(),
            geometry: result.geometry,
            duration_secs: result.duration_secs,
            has_audio: result.has_audio,
        }
    }
}

/// `original / compressed`, defined as 1 for an empty output so the ratio stays finite.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if compressed_size == 0 {
        return 1.0;
    }
    original_size as f64 / compressed_size as f64
}
