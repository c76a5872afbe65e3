//! File size formatting.

const KB: u64 = 1024;
const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count using the largest fitting unit up to GB.
///
/// At most two decimals are kept and trailing zeros are dropped.
///
/// # Examples
///
/// ```
/// use cutil::fs::pretty_bytes_size;
///
/// assert_eq!(pretty_bytes_size(0), "0 Bytes");
/// assert_eq!(pretty_bytes_size(1024), "1 KB");
/// assert_eq!(pretty_bytes_size(1536), "1.5 KB");
/// ```
pub fn pretty_bytes_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < UNITS.len() && bytes >= divisor * KB {
        divisor *= KB;
        unit += 1;
    }

    let value = format!("{:.2}", bytes as f64 / divisor as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');

    format!("{} {}", value, UNITS[unit])
}
