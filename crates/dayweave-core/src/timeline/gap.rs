//! Free time gaps of a day.
//!
//! Gaps are derived data: they are rebuilt from the day's events every time
//! those change and are never persisted. The id is a function of the
//! interval so an unchanged gap keeps its id across recomputation.

use serde::{Deserialize, Serialize};

use super::clock::ClockTime;
use super::event::DayEvent;
use crate::error::ValidationError;
use crate::location::Location;

/// A contiguous free interval of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub gap_id: String,
    pub start: ClockTime,
    pub end: ClockTime,
    /// Minutes between `start` and `end`
    pub duration: u32,
    /// Probable location, set by gap enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_label: Option<Location>,
}

impl Gap {
    /// Create a gap with an id derived from its interval.
    ///
    /// An inverted interval collapses to a zero-length gap at `start`.
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        let end = end.max(start);
        Self {
            gap_id: Self::interval_id(start, end),
            start,
            end,
            duration: end.minutes_since(start),
            location_label: None,
        }
    }

    /// Create a gap with a caller-chosen id.
    pub fn with_id(gap_id: impl Into<String>, start: ClockTime, end: ClockTime) -> Self {
        Self {
            gap_id: gap_id.into(),
            ..Self::new(start, end)
        }
    }

    /// Parse a gap from `HH:MM` boundaries.
    pub fn from_clock_strings(
        gap_id: impl Into<String>,
        start: &str,
        end: &str,
    ) -> Result<Self, ValidationError> {
        let start_time = ClockTime::parse(start)?;
        let end_time = ClockTime::parse(end)?;
        if end_time < start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self::with_id(gap_id, start_time, end_time))
    }

    /// Stable id for an interval, e.g. `gap-0900-1030`.
    pub fn interval_id(start: ClockTime, end: ClockTime) -> String {
        format!(
            "gap-{:02}{:02}-{:02}{:02}",
            start.minutes() / 60,
            start.minutes() % 60,
            end.minutes() / 60,
            end.minutes() % 60
        )
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location_label = Some(location);
        self
    }

    /// Duration implied by the boundaries, ignoring the stored field
    pub fn span_minutes(&self) -> u32 {
        self.end.minutes_since(self.start)
    }

    /// Check if this gap can fit a task of given duration
    pub fn can_fit(&self, minutes: u32) -> bool {
        self.span_minutes() >= minutes
    }
}

/// Detector for finding free gaps between the events of a day
pub struct GapDetector {
    /// Minimum gap duration to report (in minutes)
    min_gap_minutes: u32,
}

impl GapDetector {
    /// Create a new detector with default settings (15 min minimum)
    pub fn new() -> Self {
        Self {
            min_gap_minutes: 15,
        }
    }

    /// Set the minimum gap duration
    pub fn with_min_gap(mut self, minutes: u32) -> Self {
        self.min_gap_minutes = minutes;
        self
    }

    /// Find gaps between events inside `[day_start, day_end]`.
    ///
    /// Events of every source block time; overlapping events are absorbed.
    /// Returns gaps sorted by start time.
    pub fn find_gaps(
        &self,
        events: &[DayEvent],
        day_start: ClockTime,
        day_end: ClockTime,
    ) -> Vec<Gap> {
        let mut gaps = Vec::new();
        if day_end <= day_start {
            return gaps;
        }

        let mut sorted: Vec<&DayEvent> = events.iter().filter(|e| !e.is_empty()).collect();
        sorted.sort_by_key(|e| (e.start, e.end));

        let mut cursor = day_start;
        for event in sorted {
            if event.end <= cursor {
                continue;
            }
            if event.start >= day_end {
                break;
            }
            if event.start > cursor {
                self.push_gap(&mut gaps, cursor, event.start.min(day_end));
            }
            cursor = event.end.min(day_end);
        }

        if cursor < day_end {
            self.push_gap(&mut gaps, cursor, day_end);
        }

        gaps
    }

    fn push_gap(&self, gaps: &mut Vec<Gap>, start: ClockTime, end: ClockTime) {
        if end.minutes_since(start) >= self.min_gap_minutes {
            gaps.push(Gap::new(start, end));
        }
    }
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to find gaps with default settings
pub fn detect_gaps(events: &[DayEvent], day_start: ClockTime, day_end: ClockTime) -> Vec<Gap> {
    GapDetector::new().find_gaps(events, day_start, day_end)
}
