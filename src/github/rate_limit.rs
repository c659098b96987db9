//! Rate limit hints extracted from GitHub GraphQL responses.
//!
//! GitHub throttles GraphQL traffic with a primary point budget and a
//! secondary per-minute mutation limit. Either way the response may carry a
//! `Retry-After` header, given as delay seconds or as an HTTP date. This module
//! turns that header into a [`RetryHint`] that callers can display or use to
//! schedule a resumed run.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Wait suggested when GitHub omits `Retry-After`.
const DEFAULT_SECONDARY_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// When the next request may be issued after a rate-limit response.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use boardsync::github::rate_limit::RetryHint;
///
/// let hint = RetryHint::from_header(Some("30"), chrono::Utc::now());
/// assert_eq!(hint.retry_after(), Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryHint {
    retry_after: Option<Duration>,
    observed_at: DateTime<Utc>,
}

impl RetryHint {
    /// Creates a hint from an already-parsed delay.
    #[must_use]
    pub const fn new(retry_after: Option<Duration>, observed_at: DateTime<Utc>) -> Self {
        Self {
            retry_after,
            observed_at,
        }
    }

    /// Parses a raw `Retry-After` header value observed at `now`.
    ///
    /// Unparseable values are treated as absent.
    #[must_use]
    pub fn from_header(raw: Option<&str>, now: DateTime<Utc>) -> Self {
        let retry_after = raw.and_then(|value| parse_retry_after(value, now));
        Self::new(retry_after, now)
    }

    /// Returns the delay GitHub asked for, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Returns the earliest time a retry is expected to succeed.
    ///
    /// Falls back to a one-minute wait when GitHub did not say, which is the
    /// window of the secondary mutation limit.
    #[must_use]
    pub fn retry_at(&self) -> DateTime<Utc> {
        let wait = self.retry_after.unwrap_or(DEFAULT_SECONDARY_LIMIT_WAIT);
        chrono::Duration::from_std(wait)
            .ok()
            .and_then(|delta| self.observed_at.checked_add_signed(delta))
            .unwrap_or(self.observed_at)
    }

    /// Human-readable advice for the operator.
    #[must_use]
    pub fn describe(&self) -> String {
        let retry_at = self.retry_at().format("%Y-%m-%d %H:%M:%S UTC");
        match self.retry_after {
            Some(delay) => format!(
                "retry after {seconds}s (at {retry_at})",
                seconds = delay.as_secs()
            ),
            None => format!("no Retry-After given; wait about a minute (until {retry_at})"),
        }
    }
}

/// Parses `Retry-After` as delay seconds or an RFC 2822 HTTP date.
#[must_use]
pub fn parse_retry_after(raw: &str, now: DateTime<Utc>) -> Option<Duration> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(trimmed).ok()?;
    let delta = at.with_timezone(&Utc).signed_duration_since(now);
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

/// Parses `X-RateLimit-Reset` (Unix epoch seconds) into the wait from `now`.
///
/// A reset already in the past yields a zero wait.
#[must_use]
pub fn parse_rate_limit_reset(raw: &str, now: DateTime<Utc>) -> Option<Duration> {
    let epoch = raw.trim().parse::<i64>().ok()?;
    let at = DateTime::<Utc>::from_timestamp(epoch, 0)?;
    Some(at.signed_duration_since(now).to_std().unwrap_or(Duration::ZERO))
}

/// Wait to report for a throttled response.
///
/// `Retry-After` wins when present. Otherwise the primary budget's
/// `X-RateLimit-Reset` is used, unless `X-RateLimit-Remaining` shows budget
/// left, in which case the limit hit was not the primary one.
#[must_use]
pub fn throttle_delay(
    retry_after: Option<&str>,
    remaining: Option<&str>,
    reset: Option<&str>,
    now: DateTime<Utc>,
) -> Option<Duration> {
    if let Some(delay) = retry_after.and_then(|raw| parse_retry_after(raw, now)) {
        return Some(delay);
    }
    let exhausted = remaining.is_none_or(|raw| raw.trim() == "0");
    if !exhausted {
        return None;
    }
    reset.and_then(|raw| parse_rate_limit_reset(raw, now))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::{RetryHint, parse_rate_limit_reset, parse_retry_after, throttle_delay};

    #[rstest]
    #[case::seconds("120", Some(Duration::from_secs(120)))]
    #[case::padded(" 5 ", Some(Duration::from_secs(5)))]
    #[case::http_date("Wed, 01 Jan 2025 00:01:00 GMT", Some(Duration::from_secs(60)))]
    #[case::past_date("Tue, 31 Dec 2024 23:00:00 GMT", Some(Duration::ZERO))]
    #[case::garbage("soon", None)]
    fn parses_retry_after_values(#[case] raw: &str, #[case] expected: Option<Duration>) {
        let now = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(parse_retry_after(raw, now), expected);
    }

    #[rstest]
    fn retry_at_defaults_to_one_minute_without_header() {
        let now = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        let hint = RetryHint::from_header(None, now);

        assert_eq!(hint.retry_after(), None);
        assert_eq!(hint.retry_at(), now + chrono::Duration::seconds(60));
        assert!(
            hint.describe().contains("no Retry-After"),
            "unexpected description: {}",
            hint.describe()
        );
    }

    #[rstest]
    fn describe_mentions_delay_when_present() {
        let now = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        let hint = RetryHint::from_header(Some("30"), now);

        assert_eq!(
            hint.describe(),
            "retry after 30s (at 2025-01-01 00:00:30 UTC)"
        );
    }

    #[rstest]
    #[case::future("1735691400", Some(Duration::from_secs(1800)))]
    #[case::past("1735689000", Some(Duration::ZERO))]
    #[case::garbage("later", None)]
    fn parses_rate_limit_reset_values(#[case] raw: &str, #[case] expected: Option<Duration>) {
        let now = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(parse_rate_limit_reset(raw, now), expected);
    }

    #[rstest]
    #[case::retry_after_wins(Some("30"), Some("0"), Some("1735691400"), Some(Duration::from_secs(30)))]
    #[case::exhausted_budget(None, Some("0"), Some("1735691400"), Some(Duration::from_secs(1800)))]
    #[case::remaining_unknown(None, None, Some("1735691400"), Some(Duration::from_secs(1800)))]
    #[case::budget_left(None, Some("4200"), Some("1735691400"), None)]
    #[case::no_headers(None, None, None, None)]
    fn throttle_delay_prefers_retry_after_then_reset(
        #[case] retry_after: Option<&str>,
        #[case] remaining: Option<&str>,
        #[case] reset: Option<&str>,
        #[case] expected: Option<Duration>,
    ) {
        let now = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(throttle_delay(retry_after, remaining, reset, now), expected);
    }
}
