use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timeline::{DayEvent, EventSource, MINUTES_PER_DAY};

/// Probable whereabouts during an interval of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Home,
    Workplace,
    Other,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Home => "home",
            Location::Workplace => "workplace",
            Location::Other => "other",
        }
    }

    /// Rank used when two overlapping spans have the same length.
    /// Lower is more specific.
    fn specificity(&self) -> u8 {
        match self {
            Location::Other => 0,
            Location::Workplace => 1,
            Location::Home => 2,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A merged interval of the day attributed to one location.
///
/// Boundaries are minutes from midnight. `duration` is `None` for the
/// unbounded baseline home span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSpan {
    pub location: Location,
    pub start: u16,
    pub end: u16,
    pub duration: Option<u32>,
}

impl LocationSpan {
    /// The baseline span: home, all day, unbounded.
    pub fn home_baseline() -> Self {
        Self {
            location: Location::Home,
            start: 0,
            end: MINUTES_PER_DAY,
            duration: None,
        }
    }

    fn bounded(location: Location, start: u16, end: u16) -> Self {
        Self {
            location,
            start,
            end,
            duration: Some((end - start) as u32),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.duration.is_none()
    }

    /// Ordering key for "shortest span wins"
    pub(crate) fn specificity_key(&self) -> (u32, u8) {
        (
            self.duration.unwrap_or(u32::MAX),
            self.location.specificity(),
        )
    }
}

/// Build the layered location spans for one day's events.
///
/// Always starts with the home baseline. Timetable events become
/// workplace spans and calendar events become other spans; events of the
/// same kind that overlap or touch are merged into one span.
pub fn build_location_spans(events: &[DayEvent]) -> Vec<LocationSpan> {
    let mut spans = vec![LocationSpan::home_baseline()];
    spans.extend(merge_events(events, EventSource::Timetable, Location::Workplace));
    spans.extend(merge_events(events, EventSource::Calendar, Location::Other));
    spans
}

fn merge_events(events: &[DayEvent], source: EventSource, location: Location) -> Vec<LocationSpan> {
    let mut intervals: Vec<(u16, u16)> = events
        .iter()
        .filter(|e| e.source == source)
        .filter(|e| {
            if e.is_empty() {
                tracing::warn!(event_id = %e.id, "skipping event with non-positive length");
                false
            } else {
                true
            }
        })
        .map(|e| (e.start.minutes(), e.end.minutes()))
        .collect();
    intervals.sort_unstable();

    let mut merged: Vec<(u16, u16)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    merged
        .into_iter()
        .map(|(start, end)| LocationSpan::bounded(location, start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::ClockTime;

    fn ev(id: &str, start: &str, end: &str, source: EventSource) -> DayEvent {
        DayEvent::new(
            id,
            ClockTime::parse(start).unwrap(),
            ClockTime::parse(end).unwrap(),
            source,
        )
    }

    #[test]
    fn empty_day_is_all_home() {
        let spans = build_location_spans(&[]);
        assert_eq!(spans, vec![LocationSpan::home_baseline()]);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[0].end, 1440);
        assert!(spans[0].is_unbounded());
    }

    #[test]
    fn overlapping_timetable_events_merge() {
        let spans = build_location_spans(&[
            ev("a", "09:00", "11:00", EventSource::Timetable),
            ev("b", "10:30", "12:00", EventSource::Timetable),
            ev("c", "14:00", "15:00", EventSource::Timetable),
        ]);
        let work: Vec<_> = spans.iter().filter(|s| s.location == Location::Workplace).collect();
        assert_eq!(work.len(), 2);
        assert_eq!((work[0].start, work[0].end, work[0].duration), (540, 720, Some(180)));
        assert_eq!((work[1].start, work[1].end, work[1].duration), (840, 900, Some(60)));
    }

    #[test]
    fn adjacent_events_merge() {
        let spans = build_location_spans(&[
            ev("a", "13:00", "14:00", EventSource::Calendar),
            ev("b", "14:00", "14:30", EventSource::Calendar),
        ]);
        let other: Vec<_> = spans.iter().filter(|s| s.location == Location::Other).collect();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].duration, Some(90));
    }

    #[test]
    fn sources_do_not_merge_across_kinds() {
        let spans = build_location_spans(&[
            ev("a", "09:00", "12:00", EventSource::Timetable),
            ev("b", "10:30", "11:30", EventSource::Calendar),
        ]);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].location, Location::Workplace);
        assert_eq!(spans[2].location, Location::Other);
    }

    #[test]
    fn empty_events_are_ignored() {
        let spans = build_location_spans(&[ev("a", "10:00", "10:00", EventSource::Calendar)]);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn location_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Location::Workplace).unwrap(), "\"workplace\"");
        let span = serde_json::to_value(LocationSpan::home_baseline()).unwrap();
        assert_eq!(span["duration"], serde_json::Value::Null);
    }
}
