// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Day windows are always UTC so every server region agrees on "today".

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// UTC calendar day key ("YYYY-MM-DD") for a timestamp.
pub fn utc_day_key(at: DateTime<Utc>) -> String {
    at.date_naive().format("%Y-%m-%d").to_string()
}

/// Half-open `[start, end)` bounds of the UTC day containing `at`.
pub fn utc_day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_day_key_ignores_local_offset() {
        // 23:30 in UTC-8 is already the next day in UTC
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let local = pacific.with_ymd_and_hms(2026, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(utc_day_key(local.with_timezone(&Utc)), "2026-03-02");
    }

    #[test]
    fn test_day_bounds() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 17, 4, 5).unwrap();
        let (start, end) = utc_day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap());
        assert!(start <= at && at < end);
    }
}
