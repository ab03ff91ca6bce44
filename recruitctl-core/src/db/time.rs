//! Timestamp column encoding
//!
//! Instants are stored as BIGINT microseconds since the Unix epoch so both
//! engines compare and aggregate them the same way.

use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};

pub fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

pub fn from_micros(column: &'static str, value: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(value).ok_or(StoreError::InvalidTimestamp { column, value })
}

pub fn from_micros_opt(column: &'static str, value: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| from_micros(column, v)).transpose()
}

/// Current time truncated to what the columns can hold, so a value handed
/// back to the caller compares equal to the one read later.
pub fn now() -> DateTime<Utc> {
    let micros = to_micros(Utc::now());
    DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn micros_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(from_micros("t", to_micros(ts)).unwrap(), ts);
    }

    #[test]
    fn now_has_no_sub_micro_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let err = from_micros("registered_at", i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTimestamp {
                column: "registered_at",
                ..
            }
        ));
    }
}
