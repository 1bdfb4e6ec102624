//! Fixed events of a day, as handed over by the calendar layer.

use serde::{Deserialize, Serialize};

use super::clock::ClockTime;

/// Where an event came from. Determines which location span it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Personal calendar entries (appointments, errands)
    Calendar,
    /// Work or school timetable entries
    Timetable,
}

/// A busy interval of the viewed day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub start: ClockTime,
    pub end: ClockTime,
    pub source: EventSource,
}

impl DayEvent {
    pub fn new(
        id: impl Into<String>,
        start: ClockTime,
        end: ClockTime,
        source: EventSource,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            start,
            end,
            source,
        }
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes_since(self.start)
    }

    /// An event whose end is not after its start covers nothing.
    pub fn is_empty(&self) -> bool {
        self.duration_minutes() == 0
    }
}
