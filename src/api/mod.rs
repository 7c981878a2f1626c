use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};

use crate::Error;

pub mod service_location;

/// A point in time as the API wants it: milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Already in epoch milliseconds, passed through as is
    EpochMillis(i64),
    CalendarTime(DateTime<Utc>),
}

impl Timestamp {
    /// Epoch milliseconds, sub-millisecond precision is truncated toward zero
    pub fn to_millis(&self) -> i64 {
        match self {
            Timestamp::EpochMillis(ms) => *ms,
            Timestamp::CalendarTime(dt) => {
                let nanos = i128::from(dt.timestamp()) * 1_000_000_000
                    + i128::from(dt.timestamp_subsec_nanos());
                // i128 division truncates, and the result always fits an i64
                (nanos / 1_000_000) as i64
            }
        }
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Timestamp::EpochMillis(ms)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::CalendarTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Timestamp::CalendarTime(dt.with_timezone(&Utc))
    }
}

/// Accepts an integer (epoch milliseconds) or an RFC 3339 date-time.
impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(ms) = s.trim().parse::<i64>() {
            return Ok(Timestamp::EpochMillis(ms));
        }
        DateTime::parse_from_rfc3339(s.trim())
            .map(Timestamp::from)
            .map_err(|_| Error::UnsupportedTimeFormat(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_millis())
    }
}

/// Bucket size of consumption values.
///
/// The value is sent untouched, the server decides what it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregation(pub u8);

impl Aggregation {
    /// 5 minute values, only available for the last 14 days
    pub const FIVE_MINUTES: Aggregation = Aggregation(1);
    pub const HOURLY: Aggregation = Aggregation(2);
    pub const DAILY: Aggregation = Aggregation(3);
    pub const MONTHLY: Aggregation = Aggregation(4);
    pub const QUARTERLY: Aggregation = Aggregation(5);
}

impl From<u8> for Aggregation {
    fn from(level: u8) -> Self {
        Aggregation(level)
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `from`/`to` query pair shared by the consumption and events calls
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    fn to_query_string(self) -> Vec<(String, String)> {
        vec![
            ("from".to_string(), self.start.to_string()),
            ("to".to_string(), self.end.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn epoch_millis_are_passed_through() {
        for ms in [0, 1, -1, 1_000, 1_709_294_400_123, i64::MIN, i64::MAX] {
            assert_eq!(Timestamp::EpochMillis(ms).to_millis(), ms);
        }
    }

    #[test]
    fn unix_epoch_is_zero() {
        assert_eq!(Timestamp::from(Utc.timestamp_opt(0, 0).unwrap()).to_millis(), 0);
    }

    #[test]
    fn sub_millisecond_precision_is_truncated() {
        let dt = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_999_999)
            .unwrap();
        assert_eq!(Timestamp::from(dt).to_millis(), 1_709_294_400_123);
    }

    #[test]
    fn pre_epoch_truncates_toward_zero() {
        // -0.5004 s
        let dt = Utc.timestamp_opt(-1, 499_600_000).unwrap();
        assert_eq!(Timestamp::from(dt).to_millis(), -500);

        let dt = Utc.timestamp_opt(-2, 0).unwrap();
        assert_eq!(Timestamp::from(dt).to_millis(), -2000);
    }

    #[test]
    fn offsets_are_normalized() {
        let dt = DateTime::parse_from_rfc3339("2024-03-01T13:00:00+01:00").unwrap();
        assert_eq!(Timestamp::from(dt).to_millis(), 1_709_294_400_000);
    }

    #[test]
    fn parses_integers_and_rfc3339() {
        assert_eq!(
            "1709294400000".parse::<Timestamp>().unwrap(),
            Timestamp::EpochMillis(1_709_294_400_000)
        );
        assert_eq!(
            "2024-03-01T12:00:00Z".parse::<Timestamp>().unwrap().to_millis(),
            1_709_294_400_000
        );
    }

    #[test]
    fn rejects_other_strings() {
        for input in ["yesterday", "", "2024-03-01", "12.5"] {
            match input.parse::<Timestamp>() {
                Err(Error::UnsupportedTimeFormat(s)) => assert_eq!(s, input),
                other => panic!("{input:?} parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn aggregation_is_sent_as_its_level() {
        assert_eq!(Aggregation::FIVE_MINUTES.to_string(), "1");
        assert_eq!(Aggregation::QUARTERLY.to_string(), "5");
        assert_eq!(Aggregation::from(9).to_string(), "9");
    }

    #[test]
    fn time_range_query_string() {
        let range = TimeRange {
            start: Timestamp::EpochMillis(1000),
            end: Timestamp::EpochMillis(2000),
        };
        assert_eq!(
            range.to_query_string(),
            vec![
                ("from".to_string(), "1000".to_string()),
                ("to".to_string(), "2000".to_string()),
            ]
        );
    }
}
