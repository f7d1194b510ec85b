//! Retry classification and backoff schedule.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngExt;

/// `Retry-After` values beyond this are clamped (seconds).
const RETRY_AFTER_CAP_SECONDS: u64 = 600;

/// Largest exponent applied to the backoff base.
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Upper bound (exclusive) of the random jitter added to each delay, in
/// milliseconds.
pub const JITTER_MS: u64 = 150;

/// HTTP statuses worth retrying; everything else is terminal.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 502 | 503 | 504 | 520 | 522 | 524 | 429)
}

/// Exponential backoff delay for the given attempt (1-based):
/// `base * 2^min(attempt - 1, 6)` plus up to [`JITTER_MS`] of jitter.
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
    let jitter = Duration::from_millis(rand::rng().random_range(0..JITTER_MS));
    base * 2u32.pow(exponent) + jitter
}

/// Parse a `Retry-After` header value into a positive second count.
///
/// Accepts a bare number of seconds or an HTTP-date; the result is clamped
/// to [`RETRY_AFTER_CAP_SECONDS`]. Zero, negative, and unparsable values
/// yield `None` (callers fall back to exponential backoff).
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<u64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return (seconds > 0).then(|| (seconds as u64).min(RETRY_AFTER_CAP_SECONDS));
    }
    if let Ok(when) = DateTime::parse_from_rfc2822(value) {
        let seconds = (when.with_timezone(&Utc) - now).num_seconds();
        return (seconds > 0).then(|| (seconds as u64).min(RETRY_AFTER_CAP_SECONDS));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_retryable_statuses() {
        for status in [502, 503, 504, 520, 522, 524, 429] {
            assert!(is_retryable_status(status), "{status} should retry");
        }
        for status in [400, 401, 403, 404, 409, 500, 501] {
            assert!(!is_retryable_status(status), "{status} is terminal");
        }
    }

    #[test]
    fn test_backoff_delay_doubles_then_caps() {
        let base = Duration::from_millis(100);
        for (attempt, factor) in [(1u32, 1u32), (2, 2), (3, 4), (7, 64), (12, 64)] {
            let delay = backoff_delay(attempt, base);
            let floor = base * factor;
            assert!(delay >= floor, "attempt {attempt}: {delay:?} < {floor:?}");
            assert!(
                delay < floor + Duration::from_millis(JITTER_MS),
                "attempt {attempt}: {delay:?} exceeds jitter bound"
            );
        }
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let now = Utc::now();
        assert_eq!(parse_retry_after("30", now), Some(30));
        assert_eq!(parse_retry_after(" 1 ", now), Some(1));
        assert_eq!(parse_retry_after("0", now), None);
        assert_eq!(parse_retry_after("-5", now), None);
        assert_eq!(parse_retry_after("9999", now), Some(600));
        assert_eq!(parse_retry_after("soon", now), None);
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            parse_retry_after("Fri, 01 Mar 2024 12:00:45 +0000", now),
            Some(45)
        );
        // A date in the past is not a positive wait.
        assert_eq!(
            parse_retry_after("Fri, 01 Mar 2024 11:59:00 +0000", now),
            None
        );
        // Far-future dates are clamped.
        assert_eq!(
            parse_retry_after("Sat, 02 Mar 2024 12:00:00 +0000", now),
            Some(600)
        );
    }
}
