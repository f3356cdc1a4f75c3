use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{UtcDateTime, ValidationError};

/// IANA timezone the session is read in.
///
/// Hour buckets are truncated in this zone, so it is always an explicit input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionTimezone(Tz);

impl SessionTimezone {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        input
            .trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidTimezone {
                value: input.to_owned(),
            })
    }

    pub const fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn name(self) -> &'static str {
        self.0.name()
    }

    pub const fn tz(self) -> Tz {
        self.0
    }

    /// Session-local wall-clock view of a UTC instant.
    pub fn localize(self, ts: UtcDateTime) -> DateTime<Tz> {
        self.0.timestamp_nanos(ts.unix_nanos())
    }
}

impl Display for SessionTimezone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SessionTimezone {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for SessionTimezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SessionTimezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Calendar date of a trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionDate(NaiveDate);

impl SessionDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub const fn naive(self) -> NaiveDate {
        self.0
    }

    /// `[local midnight, next local midnight)` for this date in `tz`, as UTC instants.
    pub fn bounds(self, tz: SessionTimezone) -> Result<(UtcDateTime, UtcDateTime), ValidationError> {
        let next = self.0.succ_opt().ok_or_else(|| ValidationError::InvalidDate {
            value: self.to_string(),
        })?;

        Ok((local_midnight(self.0, tz)?, local_midnight(next, tz)?))
    }
}

/// First instant of `date` in `tz`; zones that skip midnight start at the first valid local time.
fn local_midnight(date: NaiveDate, tz: SessionTimezone) -> Result<UtcDateTime, ValidationError> {
    let midnight = date.and_time(NaiveTime::MIN);
    let start = tz
        .tz()
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.tz()
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .and_then(|local| local.timestamp_nanos_opt())
        .ok_or_else(|| ValidationError::InvalidDate {
            value: date.to_string(),
        })?;

    UtcDateTime::from_unix_nanos(start)
}

impl Display for SessionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for SessionDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for SessionDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionDate> for String {
    fn from(value: SessionDate) -> Self {
        value.to_string()
    }
}

/// Local-time trading window, start inclusive and end exclusive.
///
/// Used by callers as the session filter predicate; the bucketing engine
/// itself has no notion of trading hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidSessionWindow {
                value: format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
            });
        }
        Ok(Self { start, end })
    }

    const REGULAR: Self = Self {
        start: wall_clock(9, 30),
        end: wall_clock(16, 0),
    };

    const EXTENDED: Self = Self {
        start: wall_clock(4, 0),
        end: wall_clock(20, 0),
    };

    /// US equities regular trading hours, 09:30-16:00.
    pub const fn regular() -> Self {
        Self::REGULAR
    }

    /// US equities pre-market through after-hours, 04:00-20:00.
    pub const fn extended() -> Self {
        Self::EXTENDED
    }

    /// Parse `regular`, `extended`, `all` (no window) or `HH:MM-HH:MM`.
    pub fn parse(input: &str) -> Result<Option<Self>, ValidationError> {
        let invalid = || ValidationError::InvalidSessionWindow {
            value: input.to_owned(),
        };

        match input.trim().to_ascii_lowercase().as_str() {
            "regular" | "rth" => Ok(Some(Self::regular())),
            "extended" | "eth" => Ok(Some(Self::extended())),
            "all" | "" => Ok(None),
            custom => {
                let (start, end) = custom.split_once('-').ok_or_else(invalid)?;
                let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
                let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
                Self::new(start, end).map(Some).map_err(|_| invalid())
            }
        }
    }

    pub const fn start(self) -> NaiveTime {
        self.start
    }

    pub const fn end(self) -> NaiveTime {
        self.end
    }

    pub fn contains(self, local: NaiveTime) -> bool {
        local >= self.start && local < self.end
    }

    /// Whether a UTC instant falls inside the window once read in `tz`.
    pub fn contains_instant(self, tz: SessionTimezone, ts: UtcDateTime) -> bool {
        self.contains(tz.localize(ts).time())
    }
}

/// Only evaluated in constant initializers, so a bad literal fails the build.
const fn wall_clock(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("session boundary must be a valid wall-clock time"),
    }
}

impl Display for SessionWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl Serialize for SessionWindow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
