//! Datestamp and harvesting granularity types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The finest datestamp resolution a backend supports for selective harvesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// `YYYY-MM-DD`
    Date,
    /// `YYYY-MM-DDThh:mm:ssZ`
    #[serde(alias = "date_time")]
    DateTime,
}

impl Granularity {
    /// Render an instant at this granularity.
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        match self {
            Granularity::Date => instant.format(DATE_FORMAT).to_string(),
            Granularity::DateTime => instant.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Returns the protocol's textual pattern for this granularity.
    pub fn pattern(&self) -> &'static str {
        match self {
            Granularity::Date => "YYYY-MM-DD",
            Granularity::DateTime => "YYYY-MM-DDThh:mm:ssZ",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

/// A UTC datestamp together with the granularity it was expressed in.
///
/// Day-granularity stamps cover the whole day when used as a range bound:
/// `until = 2024-03-01` admits everything up to `2024-03-01T23:59:59Z`.
///
/// # Example
///
/// ```
/// use oai_core::{Datestamp, Granularity};
///
/// let day = Datestamp::parse("2024-03-01").unwrap();
/// assert_eq!(day.granularity(), Granularity::Date);
///
/// let second = Datestamp::parse("2024-03-01T12:30:00Z").unwrap();
/// assert_eq!(second.to_string(), "2024-03-01T12:30:00Z");
/// assert!(day.start() < second.start());
/// assert!(second.start() < day.end_exclusive());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Datestamp {
    instant: DateTime<Utc>,
    granularity: Granularity,
}

impl Datestamp {
    /// Parse a datestamp in either protocol granularity.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is neither `YYYY-MM-DD` nor
    /// `YYYY-MM-DDThh:mm:ssZ`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let invalid = |reason: String| InvalidInputError::Datestamp {
            value: s.to_string(),
            reason,
        };

        // chrono also accepts signed and extended years; the protocol does not.
        let year_ok = s.len() >= 4 && s.as_bytes()[..4].iter().all(u8::is_ascii_digit);

        if s.len() == 10 && year_ok {
            let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|e| invalid(e.to_string()))?;
            return Ok(Self::from_date(date));
        }

        let expected = || {
            invalid(format!(
                "expected {} or {}",
                Granularity::Date.pattern(),
                Granularity::DateTime.pattern()
            ))
        };
        if s.len() != 20 || !year_ok {
            return Err(expected().into());
        }

        let naive = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map_err(|_| expected())?;

        Ok(Self {
            instant: naive.and_utc(),
            granularity: Granularity::DateTime,
        })
    }

    /// Create a datestamp from an instant, truncated to the given granularity.
    pub fn from_instant(instant: DateTime<Utc>, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Date => Self::from_date(instant.date_naive()),
            Granularity::DateTime => Self {
                instant: instant.trunc_subsecs(0),
                granularity,
            },
        }
    }

    fn from_date(date: NaiveDate) -> Self {
        Self {
            instant: date.and_time(chrono::NaiveTime::MIN).and_utc(),
            granularity: Granularity::Date,
        }
    }

    /// Returns the granularity this datestamp was expressed in.
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Returns the first instant covered by this datestamp.
    pub fn start(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Returns the first instant after the period covered by this datestamp.
    ///
    /// Saturates at the latest representable instant.
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        let span = match self.granularity {
            Granularity::Date => TimeDelta::days(1),
            Granularity::DateTime => TimeDelta::seconds(1),
        };
        self.instant
            .checked_add_signed(span)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl PartialOrd for Datestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Datestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then(self.granularity.cmp(&other.granularity))
    }
}

impl fmt::Display for Datestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.granularity.format(&self.instant))
    }
}

impl FromStr for Datestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Datestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Datestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Datestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}
