use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::TranscodeError;

/// Default admission threshold: inputs at or under 40 MiB are passed through.
pub const DEFAULT_SIZE_THRESHOLD_BYTES: u64 = 40 * 1024 * 1024;

/// Default cap for the longer output edge.
pub const DEFAULT_MAX_DIMENSION: u32 = 1280;

/// Default capture rate.
pub const DEFAULT_CAPTURE_FPS: f64 = 30.0;

/// Accepted range for `capture_fps`.
pub const CAPTURE_FPS_RANGE: std::ops::RangeInclusive<f64> = 1.0..=1000.0;

/// Configuration for a compression session.
///
/// Loadable from JSON; missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfiguration {
    /// Inputs with `size <= size_threshold_bytes` are returned unchanged.
    pub size_threshold_bytes: u64,

    /// Maximum output width or height in pixels (default: 1280).
    pub max_dimension: u32,

    /// Target video bitrate in bits per second (default: 1 Mbps).
    pub video_bitrate_bps: u32,

    /// Nominal surface capture rate (default: 30).
    pub capture_fps: f64,

    /// Interval between encoder chunk requests, in ms (default: 100).
    pub chunk_interval_ms: u64,

    /// Pause between the playback "ended" event and encoder stop, in ms (default: 100).
    pub grace_delay_ms: u64,

    /// Upper bound for progress reported during the compressing stage (default: 85).
    pub progress_cap: f64,

    /// How long to wait for source metadata before failing, in ms (default: 10 000).
    pub metadata_timeout_ms: u64,

    /// How long to wait for playback to begin after `play()`, in ms (default: 10 000).
    pub playback_start_timeout_ms: u64,

    /// How long to wait for the encoder finalize callback after stop, in ms (default: 10 000).
    pub finalize_timeout_ms: u64,

    /// Container/codec candidates, most preferred first.
    /// The last entry is used unconditionally when nothing else is supported.
    pub mime_preferences: Vec<String>,
}

impl TranscodeConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_dimension == 0 {
            return Err("max dimension must be positive".into());
        }
        if self.video_bitrate_bps == 0 {
            return Err("video bitrate must be positive".into());
        }
        if !CAPTURE_FPS_RANGE.contains(&self.capture_fps) {
            return Err(format!("unsupported capture rate: {}", self.capture_fps));
        }
        if self.chunk_interval_ms == 0 {
            return Err("chunk interval must be positive".into());
        }
        if !(0.0..=100.0).contains(&self.progress_cap) {
            return Err(format!("progress cap out of range: {}", self.progress_cap));
        }
        if self.mime_preferences.is_empty() {
            return Err("at least one MIME type is required".into());
        }
        Ok(())
    }

    pub fn chunk_interval(&self) -> Duration {
        Duration::from_millis(self.chunk_interval_ms)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    /// Interval between captures. Out-of-range rates are clamped to `CAPTURE_FPS_RANGE`.
    pub fn capture_interval(&self) -> Duration {
        let fps = if self.capture_fps.is_nan() {
            DEFAULT_CAPTURE_FPS
        } else {
            self.capture_fps
                .clamp(*CAPTURE_FPS_RANGE.start(), *CAPTURE_FPS_RANGE.end())
        };
        Duration::from_secs_f64(1.0 / fps)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn playback_start_timeout(&self) -> Duration {
        Duration::from_millis(self.playback_start_timeout_ms)
    }

    pub fn finalize_timeout(&self) -> Duration {
        Duration::from_millis(self.finalize_timeout_ms)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self, TranscodeError> {
        let json = fs::read_to_string(path).map_err(|e| {
            TranscodeError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, TranscodeError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TranscodeError::Configuration(format!("failed to parse configuration: {}", e)))?;
        config.validate().map_err(TranscodeError::Configuration)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<PathBuf, TranscodeError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TranscodeError::Storage(format!("failed to create directory: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TranscodeError::Storage(format!("failed to serialize configuration: {}", e)))?;
        fs::write(path, json)
            .map_err(|e| TranscodeError::Storage(format!("failed to write configuration: {}", e)))?;
        Ok(path.to_path_buf())
    }
}

impl Default for TranscodeConfiguration {
    fn default() -> Self {
        Self {
            size_threshold_bytes: DEFAULT_SIZE_THRESHOLD_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            video_bitrate_bps: 1_000_000,
            capture_fps: DEFAULT_CAPTURE_FPS,
            chunk_interval_ms: 100,
            grace_delay_ms: 100,
            progress_cap: 85.0,
            metadata_timeout_ms: 10_000,
            playback_start_timeout_ms: 10_000,
            finalize_timeout_ms: 10_000,
            mime_preferences: vec![
                "video/webm;codecs=vp9".into(),
                "video/webm;codecs=vp8".into(),
                "video/webm".into(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TranscodeConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size_threshold_bytes, 41_943_040);
        assert_eq!(config.chunk_interval(), Duration::from_millis(100));
    }

    #[test]
    fn rejects_capture_rates_outside_range() {
        for json in [r#"{"capture_fps":1e-20}"#, r#"{"capture_fps":0.5}"#, r#"{"capture_fps":5000}"#] {
            let err = TranscodeConfiguration::from_json(json).unwrap_err();
            assert!(matches!(err, TranscodeError::Configuration(ref m) if m.contains("capture rate")));
        }
        let config = TranscodeConfiguration::from_json(r#"{"capture_fps":1000}"#).unwrap();
        assert_eq!(config.capture_interval(), Duration::from_millis(1));
    }

    #[test]
    fn capture_interval_is_total_for_unvalidated_rates() {
        let tiny = TranscodeConfiguration {
            capture_fps: 1e-20,
            ..Default::default()
        };
        assert_eq!(tiny.capture_interval(), Duration::from_secs(1));

        let nan = TranscodeConfiguration {
            capture_fps: f64::NAN,
            ..Default::default()
        };
        assert_eq!(nan.capture_interval(), TranscodeConfiguration::default().capture_interval());
    }

    #[test]
    fn rejects_zero_dimension() {
        let config = TranscodeConfiguration {
            max_dimension: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_preferences() {
        let config = TranscodeConfiguration {
            mime_preferences: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = TranscodeConfiguration::from_json(r#"{ "max_dimension": 720 }"#).unwrap();
        assert_eq!(config.max_dimension, 720);
        assert_eq!(config.video_bitrate_bps, 1_000_000);
    }

    #[test]
    fn invalid_json_values_are_rejected() {
        let err = TranscodeConfiguration::from_json(r#"{ "progress_cap": 120.0 }"#).unwrap_err();
        assert!(matches!(err, TranscodeError::Configuration(_)));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join("video_compress_test_config/config.json");
        let config = TranscodeConfiguration {
            grace_delay_ms: 250,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = TranscodeConfiguration::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&path).ok();
    }
}
