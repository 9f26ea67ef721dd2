//! Daily sequence numbers of the form `{prefix}_{seq:06}_{unix}`.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tenor_core::error::TenorResult;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("{number:?} does not start with {prefix:?}")]
    Prefix { number: String, prefix: String },

    #[error("{0:?} has no numeric sequence")]
    Malformed(String),

    #[error("sequence exhausted")]
    Overflow,
}

/// Numbering scheme that restarts at 1 every UTC calendar day.
#[derive(Debug, Clone)]
pub struct DailySequence {
    prefix: String,
}

impl DailySequence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `[start, end)` of the UTC day containing `now`.
    pub fn day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        (start, start + Duration::days(1))
    }

    pub fn format(&self, seq: u32, now: DateTime<Utc>) -> String {
        format!("{}_{seq:06}_{}", self.prefix, now.timestamp())
    }

    pub fn parse(&self, number: &str) -> Result<u32, SequenceError> {
        let rest = number
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(|| SequenceError::Prefix {
                number: number.to_string(),
                prefix: self.prefix.clone(),
            })?;
        rest.split('_')
            .next()
            .and_then(|seq| seq.parse::<u32>().ok())
            .ok_or_else(|| SequenceError::Malformed(number.to_string()))
    }

    /// The number following `latest`, or sequence 1 when the day has none.
    pub fn next(&self, latest: Option<&str>, now: DateTime<Utc>) -> Result<String, SequenceError> {
        let seq = match latest {
            None => 1,
            Some(number) => self
                .parse(number)?
                .checked_add(1)
                .ok_or(SequenceError::Overflow)?,
        };
        Ok(self.format(seq, now))
    }

    /// Like [`next`](Self::next), but a failed lookup or an unreadable
    /// latest number restarts the day at sequence 1 instead of failing.
    pub fn next_or_first(&self, latest: TenorResult<Option<String>>, now: DateTime<Utc>) -> String {
        let latest = match latest {
            Ok(latest) => latest,
            Err(err) => {
                warn!(prefix = %self.prefix, error = %err, "Latest number lookup failed");
                None
            }
        };
        self.next(latest.as_deref(), now).unwrap_or_else(|err| {
            warn!(prefix = %self.prefix, error = %err, "Restarting sequence at 1");
            self.format(1, now)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tenor_core::error::TenorError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 13, 45, 10).unwrap()
    }

    #[test]
    fn formats_zero_padded_with_unix_suffix() {
        let seq = DailySequence::new("TX");
        assert_eq!(seq.format(7, now()), format!("TX_000007_{}", now().timestamp()));
    }

    #[test]
    fn next_increments_latest() {
        let seq = DailySequence::new("TX");
        assert_eq!(seq.next(None, now()).unwrap(), seq.format(1, now()));
        assert_eq!(
            seq.next(Some("TX_000041_1715900000"), now()).unwrap(),
            seq.format(42, now())
        );
    }

    #[test]
    fn parse_rejects_foreign_and_malformed_numbers() {
        let seq = DailySequence::new("CIF");
        assert!(matches!(seq.parse("TX_000001_1"), Err(SequenceError::Prefix { .. })));
        assert_eq!(
            seq.parse("CIF_abc_1"),
            Err(SequenceError::Malformed("CIF_abc_1".into()))
        );
        assert_eq!(seq.parse("CIF_000123_1"), Ok(123));
    }

    #[test]
    fn falls_back_to_first_on_errors() {
        let seq = DailySequence::new("TX");
        let failed = Err(TenorError::Database("connection reset".into()));
        assert_eq!(seq.next_or_first(failed, now()), seq.format(1, now()));
        assert_eq!(
            seq.next_or_first(Ok(Some("garbage".into())), now()),
            seq.format(1, now())
        );
    }

    #[test]
    fn day_window_spans_the_utc_day() {
        let (start, end) = DailySequence::day_window(now());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 17, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 5, 18, 0, 0, 0).unwrap());
    }
}
