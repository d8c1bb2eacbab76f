use crate::models::compression_result::CompressionResult;
use crate::models::media::SourceMedia;
use crate::processing::chunk_collector::sha256_hex;

/// Outcome of the size threshold test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Small enough already; return the input unchanged.
    PassThrough,
    /// Run the full decode → render → encode pipeline.
    Transcode,
}

pub fn admit(size_bytes: u64, threshold_bytes: u64) -> Admission {
    if size_bytes <= threshold_bytes {
        Admission::PassThrough
    } else {
        Admission::Transcode
    }
}

/// No-op result for inputs under the threshold: same bytes, ratio exactly 1.
pub fn passthrough_result(source: &SourceMedia) -> CompressionResult {
    CompressionResult {
        artifact: source.data.clone(),
        mime_type: source.mime_type.clone(),
        original_size: source.size(),
        compressed_size: source.size(),
        compression_ratio: 1.0,
        geometry: None,
        duration_secs: None,
        has_audio: false,
        checksum: sha256_hex(&source.data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u64 = 40 * 1024 * 1024;

    #[test]
    fn at_threshold_passes_through() {
        assert_eq!(admit(THRESHOLD, THRESHOLD), Admission::PassThrough);
        assert_eq!(admit(0, THRESHOLD), Admission::PassThrough);
    }

    #[test]
    fn above_threshold_transcodes() {
        assert_eq!(admit(THRESHOLD + 1, THRESHOLD), Admission::Transcode);
    }

    #[test]
    fn passthrough_keeps_bytes() {
        let source = SourceMedia::new("a.mp4", "video/mp4", vec![7; 10]);
        let result = passthrough_result(&source);
        assert_eq!(result.artifact, source.data);
        assert_eq!(result.compressed_size, 10);
        assert_eq!(result.compression_ratio, 1.0);
        assert!(!result.was_transcoded());
        assert_eq!(result, passthrough_result(&source));
    }
}
