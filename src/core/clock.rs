// src/core/clock.rs

use chrono::{Local, Utc};

/// Seconds since the Unix epoch, for cache metadata.
pub fn now_utc_seconds() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Seconds since the Unix epoch with sub-second precision, for the drive
/// registry, stand-ins and backups.
pub fn now_utc_fractional() -> f64 {
    let now = Utc::now();
    let micros = now.timestamp_micros();
    // i64 microseconds are exact in f64 for any realistic date.
    #[allow(clippy::cast_precision_loss)]
    let seconds = micros as f64 / 1_000_000.0;
    seconds
}

/// Local time in ISO-8601 with microseconds, as written to run logs.
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Today's local date (`YYYY-MM-DD`), used to name dated backups.
pub fn local_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clocks_agree_to_the_second() {
        let whole = now_utc_seconds();
        let fractional = now_utc_fractional();
        assert!((fractional - whole as f64).abs() < 2.0);
    }

    #[test]
    fn test_local_timestamp_has_microseconds() {
        let stamp = local_timestamp();
        let (_, fraction) = stamp.rsplit_once('.').unwrap();
        assert_eq!(fraction.len(), 6);
        assert_eq!(local_date().len(), 10);
    }
}
