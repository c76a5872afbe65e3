//! Time utilities.

use chrono::Local;

/// Returns the current Unix timestamp in milliseconds.
///
/// # Examples
///
/// ```
/// use cutil::time::timestamp_millis;
///
/// let ts = timestamp_millis();
/// assert!(ts > 0);
/// ```
pub fn timestamp_millis() -> i64 {
    Local::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_millis() {
        let first = timestamp_millis();
        let second = timestamp_millis();

        assert!(second >= first);
        // 2020-01-01T00:00:00Z
        assert!(first > 1_577_836_800_000);
    }
}
