use std::fs;
use std::path::{Path, PathBuf};

use crate::models::compression_result::{CompressionMetadata, CompressionResult};
use crate::models::error::TranscodeError;
use crate::processing::chunk_collector::sha256_hex;
use crate::processing::codec_select::extension_for_mime;

/// Write a compressed artifact plus its JSON metadata sidecar into `directory`.
///
/// Creates `compressed_<uuid>.<ext>` and `compressed_<uuid>.metadata.json`.
/// Returns the artifact path and the metadata that was written.
pub fn write_artifact(
    result: &CompressionResult,
    directory: &Path,
) -> Result<(PathBuf, CompressionMetadata), TranscodeError> {
    fs::create_dir_all(directory)
        .map_err(|e| TranscodeError::Storage(format!("failed to create directory: {}", e)))?;

    let file_name = format!(
        "compressed_{}.{}",
        uuid::Uuid::new_v4(),
        extension_for_mime(&result.mime_type)
    );
    let path = directory.join(file_name);
    fs::write(&path, &result.artifact)
        .map_err(|e| TranscodeError::Storage(format!("failed to write artifact: {}", e)))?;

    let metadata = CompressionMetadata::from_result(result, &path.to_string_lossy());
    write_metadata(&metadata, &path)?;
    log::info!("Wrote {} ({} bytes)", path.display(), result.compressed_size);
    Ok((path, metadata))
}

/// Sidecar location for an artifact: same stem, `.metadata.json` extension.
pub fn sidecar_path(artifact_path: &Path) -> PathBuf {
    artifact_path.with_extension("metadata.json")
}

/// Write the compression record next to its artifact.
pub fn write_metadata(metadata: &CompressionMetadata, artifact_path: &Path) -> Result<(), TranscodeError> {
    let sidecar = sidecar_path(artifact_path);
    let json = serde_json::to_string_pretty(metadata).map_err(|e| {
        TranscodeError::Storage(format!("failed to serialize record for {}: {}", artifact_path.display(), e))
    })?;
    fs::write(&sidecar, json)
        .map_err(|e| TranscodeError::Storage(format!("failed to write {}: {}", sidecar.display(), e)))
}

/// Read the compression record stored next to an artifact.
pub fn read_metadata(artifact_path: &Path) -> Result<CompressionMetadata, TranscodeError> {
    let sidecar = sidecar_path(artifact_path);
    let json = fs::read_to_string(&sidecar)
        .map_err(|e| TranscodeError::Storage(format!("no compression record at {}: {}", sidecar.display(), e)))?;
    serde_json::from_str(&json)
        .map_err(|e| TranscodeError::Storage(format!("malformed compression record {}: {}", sidecar.display(), e)))
}

/// Check an artifact on disk against the size and checksum in its record.
///
/// Returns the record when both match.
pub fn verify_artifact(artifact_path: &Path) -> Result<CompressionMetadata, TranscodeError> {
    let metadata = read_metadata(artifact_path)?;
    let artifact = fs::read(artifact_path)
        .map_err(|e| TranscodeError::Storage(format!("failed to read {}: {}", artifact_path.display(), e)))?;

    if artifact.len() as u64 != metadata.compressed_size {
        return Err(TranscodeError::Storage(format!(
            "{} is {} bytes, record says {}",
            artifact_path.display(),
            artifact.len(),
            metadata.compressed_size
        )));
    }
    let checksum = sha256_hex(&artifact);
    if checksum != metadata.checksum {
        log::warn!("Checksum mismatch for {}", artifact_path.display());
        return Err(TranscodeError::Storage(format!(
            "{} does not match its recorded checksum",
            artifact_path.display()
        )));
    }
    Ok(metadata)
}
