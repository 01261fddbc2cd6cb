//! Wall-time durations as reported by the scheduler.
//!
//! A [`WallTime`] is a normalized, non-negative duration split into days,
//! hours, minutes and seconds. It is the value behind `TimeLimit` and
//! `TimeUsed` columns and the text shown next to a running job.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Error type for wall-time construction and parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Invalid duration string {input:?}: {reason}")]
    InvalidDurationString { input: String, reason: String },
}

impl TimeError {
    fn string(input: &str, reason: impl Into<String>) -> Self {
        TimeError::InvalidDurationString {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// A normalized duration in days, hours, minutes and seconds.
///
/// After construction `hours < 24`, `minutes < 60` and `seconds < 60` always
/// hold. Equality, hashing and ordering use the total number of seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallTime {
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: u64,
}

impl WallTime {
    /// The zero duration.
    pub const ZERO: WallTime = WallTime {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Create a wall time from possibly out-of-range components.
    ///
    /// Overflowing components are carried into the next larger unit
    /// (seconds into minutes, minutes into hours, hours into days).
    /// Negative components are rejected.
    pub fn new(days: i64, hours: i64, minutes: i64, seconds: i64) -> Result<Self, TimeError> {
        let parts = [("days", days), ("hours", hours), ("minutes", minutes), ("seconds", seconds)];
        if let Some((unit, value)) = parts.iter().find(|(_, v)| *v < 0) {
            return Err(TimeError::InvalidDuration(format!(
                "{} must not be negative, got {}",
                unit, value
            )));
        }

        Self::from_parts(days as u64, hours as u64, minutes as u64, seconds as u64)
    }

    /// Create a wall time from a number of seconds.
    pub fn from_secs(total: u64) -> Self {
        WallTime {
            days: total / SECS_PER_DAY,
            hours: (total % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (total % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: total % SECS_PER_MINUTE,
        }
    }

    fn from_parts(days: u64, hours: u64, minutes: u64, seconds: u64) -> Result<Self, TimeError> {
        days.checked_mul(SECS_PER_DAY)
            .and_then(|t| t.checked_add(hours.checked_mul(SECS_PER_HOUR)?))
            .and_then(|t| t.checked_add(minutes.checked_mul(SECS_PER_MINUTE)?))
            .and_then(|t| t.checked_add(seconds))
            .map(Self::from_secs)
            .ok_or_else(|| {
                TimeError::InvalidDuration(format!(
                    "{}-{}:{}:{} does not fit in a 64-bit second count",
                    days, hours, minutes, seconds
                ))
            })
    }

    pub fn days(&self) -> u64 {
        self.days
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Total number of seconds.
    pub fn to_seconds(&self) -> u64 {
        self.days * SECS_PER_DAY
            + self.hours * SECS_PER_HOUR
            + self.minutes * SECS_PER_MINUTE
            + self.seconds
    }

    /// Sum of two wall times, saturating at the largest representable value.
    pub fn add(&self, other: &WallTime) -> WallTime {
        Self::from_secs(self.to_seconds().saturating_add(other.to_seconds()))
    }

    pub fn add_seconds(&self, seconds: u64) -> WallTime {
        Self::from_secs(self.to_seconds().saturating_add(seconds))
    }

    /// Absolute difference between two wall times, in seconds.
    pub fn abs_diff_seconds(&self, other: &WallTime) -> u64 {
        self.to_seconds().abs_diff(other.to_seconds())
    }
}

/// Parse an unsigned decimal group of a duration string.
fn parse_group(input: &str, group: &str) -> Result<u64, TimeError> {
    let group = group.trim();
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::string(input, format!("{:?} is not a number", group)));
    }
    group
        .parse::<u64>()
        .map_err(|e| TimeError::string(input, e.to_string()))
}

impl FromStr for WallTime {
    type Err = TimeError;

    /// Parse `SS`, `MM:SS`, `HH:MM:SS` or `D-HH:MM:SS`.
    ///
    /// Missing leading groups are zero, so `"5"` is five seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut groups: Vec<&str> = s.split(':').collect();
        if groups.len() > 3 {
            return Err(TimeError::string(
                s,
                format!("expected at most 3 colon-separated groups, got {}", groups.len()),
            ));
        }

        // Day prefix only applies to the full D-HH:MM:SS form
        if groups.len() == 3
            && let Some((days, hours)) = groups[0].split_once('-')
        {
            groups = vec![days, hours, groups[1], groups[2]];
        }

        let mut values = groups
            .iter()
            .rev()
            .map(|g| parse_group(s, g))
            .collect::<Result<Vec<u64>, TimeError>>()?
            .into_iter();

        let seconds = values.next().unwrap_or(0);
        let minutes = values.next().unwrap_or(0);
        let hours = values.next().unwrap_or(0);
        let days = values.next().unwrap_or(0);

        WallTime::from_parts(days, hours, minutes, seconds)
            .map_err(|e| TimeError::string(s, e.to_string()))
    }
}

impl fmt::Display for WallTime {
    /// Most compact form: `D-HH:MM:SS`, `H:MM:SS`, `MM:SS` or `SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(
                f,
                "{}-{:02}:{:02}:{:02}",
                self.days, self.hours, self.minutes, self.seconds
            )
        } else if self.hours > 0 {
            write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
        } else if self.minutes > 0 {
            write!(f, "{:02}:{:02}", self.minutes, self.seconds)
        } else {
            write!(f, "{:02}", self.seconds)
        }
    }
}

impl PartialEq for WallTime {
    fn eq(&self, other: &Self) -> bool {
        self.to_seconds() == other.to_seconds()
    }
}

impl Eq for WallTime {}

impl Hash for WallTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_seconds().hash(state);
    }
}

impl PartialOrd for WallTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WallTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Scheduler placeholders that stand in for a duration.
const DURATION_PLACEHOLDERS: &[&str] = &["UNLIMITED", "INVALID", "NOT_SET", "N/A", "-"];

/// Parse a duration column from scheduler output.
///
/// Returns None for placeholders and malformed values, so one bad field
/// never drops the whole job record.
pub fn parse_wall_time_field(s: &str) -> Option<WallTime> {
    let s = s.trim();
    if s.is_empty() || DURATION_PLACEHOLDERS.contains(&s) {
        return None;
    }
    match s.parse() {
        Ok(wt) => Some(wt),
        Err(e) => {
            tracing::debug!("Ignoring unparsable duration field: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wt(d: i64, h: i64, m: i64, s: i64) -> WallTime {
        WallTime::new(d, h, m, s).unwrap()
    }

    fn fields(w: WallTime) -> (u64, u64, u64, u64) {
        (w.days(), w.hours(), w.minutes(), w.seconds())
    }

    #[test]
    fn test_new_rejects_negative() {
        assert!(matches!(
            WallTime::new(-1, 0, 0, 0),
            Err(TimeError::InvalidDuration(_))
        ));
        assert!(WallTime::new(0, -1, 0, 0).is_err());
        assert!(WallTime::new(0, 0, -1, 0).is_err());
        assert!(WallTime::new(0, 0, 0, -1).is_err());
        assert!(WallTime::new(0, 0, 0, 0).is_ok());
        assert!(WallTime::new(1, 1, 1, 1).is_ok());
    }

    #[test]
    fn test_new_rejects_overflow() {
        assert!(WallTime::new(i64::MAX, 0, 0, 0).is_err());
    }

    #[test]
    fn test_normalization_carries() {
        assert_eq!(fields(wt(1, 2, 3, 4)), (1, 2, 3, 4));
        assert_eq!(fields(wt(1, 1, 2, 60)), (1, 1, 3, 0));
        assert_eq!(fields(wt(1, 1, 125, 2)), (1, 3, 5, 2));
        assert_eq!(fields(wt(1, 23, 60, 0)), (2, 0, 0, 0));
        assert_eq!(fields(wt(0, 23, 60, 0)), (1, 0, 0, 0));
        assert_eq!(fields(wt(0, 0, 0, 125)), (0, 0, 2, 5));
    }

    #[test]
    fn test_from_str_rejects_malformed() {
        for bad in [
            "1:2:3:4",
            "1:2:3:4:5",
            "garbage",
            "a1:2:3",
            "20.00.15",
            "1-1-2:3",
            "1-1:2-3",
            "1-1-1:2:3",
            "",
            "1::2",
            "-5",
            "1.5",
        ] {
            assert!(
                matches!(
                    bad.parse::<WallTime>(),
                    Err(TimeError::InvalidDurationString { .. })
                ),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_from_str_accepts_all_forms() {
        assert_eq!(fields("0".parse().unwrap()), (0, 0, 0, 0));
        assert_eq!(fields("1".parse().unwrap()), (0, 0, 0, 1));
        assert_eq!(fields("1:2".parse().unwrap()), (0, 0, 1, 2));
        assert_eq!(fields("1:2:3".parse().unwrap()), (0, 1, 2, 3));
        assert_eq!(fields("1:2:60".parse().unwrap()), (0, 1, 3, 0));
        assert_eq!(fields("2-1:2:3".parse().unwrap()), (2, 1, 2, 3));
        assert_eq!(fields("10-11:12:13".parse().unwrap()), (10, 11, 12, 13));
        assert_eq!(fields("90".parse().unwrap()), (0, 0, 1, 30));
        assert_eq!(
            "2-1:2:3".parse::<WallTime>().unwrap().to_seconds(),
            2 * 86400 + 3600 + 2 * 60 + 3
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(wt(0, 0, 0, 0).to_string(), "00");
        assert_eq!(wt(0, 0, 0, 1).to_string(), "01");
        assert_eq!(wt(0, 0, 1, 0).to_string(), "01:00");
        assert_eq!(wt(0, 0, 1, 1).to_string(), "01:01");
        assert_eq!(wt(0, 1, 0, 0).to_string(), "1:00:00");
        assert_eq!(wt(0, 1, 1, 1).to_string(), "1:01:01");
        assert_eq!(wt(1, 0, 0, 0).to_string(), "1-00:00:00");
        assert_eq!(wt(10, 11, 12, 13).to_string(), "10-11:12:13");
    }

    #[test]
    fn test_to_seconds() {
        assert_eq!(wt(0, 0, 0, 0).to_seconds(), 0);
        assert_eq!(wt(0, 0, 1, 1).to_seconds(), 61);
        assert_eq!(wt(0, 1, 1, 1).to_seconds(), 3661);
        assert_eq!(wt(1, 0, 0, 0).to_seconds(), 86400);
        assert_eq!(wt(1, 1, 1, 1).to_seconds(), 90061);
    }

    #[test]
    fn test_add_and_add_seconds() {
        assert_eq!(fields(wt(0, 1, 2, 3).add(&wt(1, 4, 5, 6))), (1, 5, 7, 9));
        assert_eq!(fields(wt(0, 23, 59, 59).add(&wt(0, 0, 0, 1))), (1, 0, 0, 0));
        assert_eq!(fields(wt(0, 1, 2, 3).add_seconds(10)), (0, 1, 2, 13));
        assert_eq!(fields(wt(0, 23, 59, 59).add_seconds(1)), (1, 0, 0, 0));
    }

    #[test]
    fn test_add_returns_new_value() {
        let base = wt(0, 0, 15, 30);
        let later = base.add_seconds(10);
        assert_eq!(base.to_string(), "15:30");
        assert_eq!(later.to_string(), "15:40");
    }

    #[test]
    fn test_abs_diff_seconds() {
        assert_eq!(wt(0, 1, 2, 3).abs_diff_seconds(&wt(0, 4, 5, 6)), 10983);
        assert_eq!(wt(0, 23, 59, 59).abs_diff_seconds(&wt(0, 0, 0, 1)), 86398);
    }

    #[test]
    fn test_cmp_uses_total_seconds() {
        assert_eq!(wt(0, 1, 2, 3).cmp(&wt(0, 4, 5, 6)), Ordering::Less);
        assert_eq!(wt(0, 23, 59, 59).cmp(&wt(0, 0, 0, 1)), Ordering::Greater);
        assert_eq!(wt(0, 1, 2, 3).cmp(&wt(0, 1, 2, 3)), Ordering::Equal);
        assert_eq!(wt(1, 2, 3, 4).cmp(&wt(4, 3, 2, 1)), Ordering::Less);
        assert_eq!(wt(0, 0, 0, 3600), wt(0, 1, 0, 0));
    }

    #[test]
    fn test_parse_wall_time_field() {
        assert_eq!(parse_wall_time_field("30:00"), Some(wt(0, 0, 30, 0)));
        assert_eq!(parse_wall_time_field(" 1-00:00:00 "), Some(wt(1, 0, 0, 0)));
        assert_eq!(parse_wall_time_field("UNLIMITED"), None);
        assert_eq!(parse_wall_time_field("INVALID"), None);
        assert_eq!(parse_wall_time_field("garbage"), None);
        assert_eq!(parse_wall_time_field(""), None);
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&wt(0, 1, 2, 3)).unwrap();
        assert_eq!(json, "\"1:02:03\"");
        let back: WallTime = serde_json::from_str("\"2-00:00:05\"").unwrap();
        assert_eq!(back.to_seconds(), 2 * 86400 + 5);
        assert!(serde_json::from_str::<WallTime>("\"nope\"").is_err());
    }

    proptest! {
        #[test]
        fn normalized_fields_preserve_total(
            d in 0i64..10_000, h in 0i64..1_000, m in 0i64..10_000, s in 0i64..100_000
        ) {
            let w = WallTime::new(d, h, m, s).unwrap();
            let expected = (d * 86400 + h * 3600 + m * 60 + s) as u64;
            prop_assert_eq!(w.to_seconds(), expected);
            prop_assert!(w.hours() < 24 && w.minutes() < 60 && w.seconds() < 60);

            let rebuilt = WallTime::new(
                w.days() as i64, w.hours() as i64, w.minutes() as i64, w.seconds() as i64
            ).unwrap();
            prop_assert_eq!(rebuilt.to_seconds(), expected);
        }

        #[test]
        fn display_round_trips_through_parse(total in 0u64..100 * 86400) {
            let w = WallTime::from_secs(total);
            let parsed: WallTime = w.to_string().parse().unwrap();
            prop_assert_eq!(parsed.to_seconds(), total);
        }

        #[test]
        fn cmp_agrees_with_seconds(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let (wa, wb) = (WallTime::from_secs(a), WallTime::from_secs(b));
            prop_assert_eq!(wa.cmp(&wb), a.cmp(&b));
        }
    }
}
