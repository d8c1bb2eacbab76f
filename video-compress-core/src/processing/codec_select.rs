use crate::traits::stream_encoder::StreamEncoder;

/// Generic container used when the preference list is empty.
pub const FALLBACK_MIME_TYPE: &str = "video/webm";

/// Pick the first MIME type the encoder supports.
///
/// When none is supported the last preference is returned anyway: it is
/// expected to be the bare container, which encoders accept with their
/// default codec.
pub fn select_mime_type<E: StreamEncoder + ?Sized>(encoder: &E, preferences: &[String]) -> String {
    if let Some(supported) = preferences.iter().find(|m| encoder.is_type_supported(m)) {
        return supported.clone();
    }
    preferences
        .last()
        .cloned()
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}

/// File extension for a container MIME type, ignoring codec parameters.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let container = mime_type.split(';').next().unwrap_or_default().trim();
    match container {
        "video/webm" => "webm",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "video/x-matroska" => "mkv",
        "video/ogg" => "ogv",
        _ => "bin",
    }
}
