//! Human-readable byte sizes for host UIs.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format `bytes` with base-1024 units and at most two decimals.
///
/// Trailing zeros are dropped: `1024 → "1 KB"`, `1536 → "1.5 KB"`.
/// Sizes beyond the gigabyte range stay in GB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut index = 0;
    let mut unit = 1u64;
    while index < UNITS.len() - 1 && bytes / unit >= 1024 {
        unit *= 1024;
        index += 1;
    }
    let scaled = bytes as f64 / unit as f64;
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[index])
}
