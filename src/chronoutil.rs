//! Timestamp handling for request signing.
//!
//! A signature binds two renderings of the same instant: the full `x-date` timestamp and the short
//! date used to scope the signing key. Both must come from one captured instant, so they are only
//! ever produced together by [`TimeContext`].

use {
    crate::{constants::*, SigningError},
    chrono::{DateTime, NaiveDateTime, Timelike, Utc},
    std::{
        fmt::Debug,
        time::{SystemTime, UNIX_EPOCH},
    },
};

/// A single UTC instant, truncated to whole seconds, and its two signing renderings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeContext {
    instant: DateTime<Utc>,
    iso_date: String,
    date_short: String,
}

impl TimeContext {
    /// Capture the signing time from `instant`. Sub-second precision is discarded.
    pub fn new(instant: DateTime<Utc>) -> Self {
        let instant = instant.with_nanosecond(0).unwrap_or(instant);
        Self {
            instant,
            iso_date: instant.format(ISO8601_COMPACT_FORMAT).to_string(),
            date_short: instant.format(ISO8601_DATE_FORMAT).to_string(),
        }
    }

    /// The truncated instant.
    #[inline]
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// The timestamp in `YYYYMMDDTHHMMSSZ` form, as sent in `x-date` and the string to sign.
    #[inline]
    pub fn iso_date(&self) -> &str {
        &self.iso_date
    }

    /// The date in `YYYYMMDD` form, as used in the credential scope and `kDate`.
    #[inline]
    pub fn date_short(&self) -> &str {
        &self.date_short
    }
}

/// Parse an `x-date` header value (`YYYYMMDDTHHMMSSZ`) back into a [`TimeContext`].
pub fn parse_x_date(value: &str) -> Result<TimeContext, SigningError> {
    if value.len() != ISO8601_UTC_LENGTH {
        return Err(SigningError::MalformedHeader(format!(
            "X-Date must be in ISO-8601 'basic format'. Got '{}'.",
            value
        )));
    }

    let naive = NaiveDateTime::parse_from_str(value, ISO8601_COMPACT_FORMAT).map_err(|e| {
        SigningError::MalformedHeader(format!("X-Date must be in ISO-8601 'basic format'. Got '{}': {}", value, e))
    })?;

    Ok(TimeContext::new(DateTime::from_naive_utc_and_offset(naive, Utc)))
}

/// A source of the signing instant.
///
/// Signing reads the clock exactly once per call. Tests inject a [`FixedClock`] so signatures are
/// reproducible.
pub trait Clock: Debug {
    /// Return the current instant.
    fn now(&self) -> Result<DateTime<Utc>, SigningError>;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Utc>, SigningError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SigningError::ClockUnavailable(format!("System clock is before the Unix epoch: {}", e)))?;
        let secs = i64::try_from(elapsed.as_secs())
            .map_err(|_| SigningError::ClockUnavailable("System clock is out of range".to_string()))?;

        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| SigningError::ClockUnavailable("System clock is out of range".to_string()))
    }
}

/// A clock pinned to a single instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> Result<DateTime<Utc>, SigningError> {
        Ok(self.0)
    }
}
