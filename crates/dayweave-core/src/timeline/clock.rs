//! Wall-clock time of day.
//!
//! Gaps and blocks travel as `HH:MM` strings; internally everything is
//! minutes since midnight so arithmetic never touches strings.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minutes in one day. `24:00` is the only value equal to it.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A time of day in minutes since midnight, `00:00..=24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY);

    /// Build from minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self, ValidationError> {
        if minutes > MINUTES_PER_DAY {
            return Err(ValidationError::InvalidClockTime(format!("{minutes} minutes")));
        }
        Ok(Self(minutes))
    }

    /// Build from minutes, saturating at `24:00`.
    pub fn saturating_from_minutes(minutes: u32) -> Self {
        Self(minutes.min(MINUTES_PER_DAY as u32) as u16)
    }

    /// Parse an `HH:MM` string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed == "24:00" {
            return Ok(Self::END_OF_DAY);
        }
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map_err(|_| ValidationError::InvalidClockTime(s.to_string()))?;
        Ok(Self((time.hour() * 60 + time.minute()) as u16))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Move forward by `minutes`, saturating at `24:00`.
    pub fn plus_minutes(&self, minutes: u32) -> Self {
        Self::saturating_from_minutes(self.0 as u32 + minutes)
    }

    /// Minutes from `earlier` to `self`, zero when `earlier` is later.
    pub fn minutes_since(&self, earlier: ClockTime) -> u32 {
        self.0.saturating_sub(earlier.0) as u32
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}
