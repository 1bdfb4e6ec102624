//! Day timeline primitives.
//!
//! This module provides:
//! - Wall-clock times of a single day
//! - Fixed events supplied by the calendar and timetable layers
//! - Free time gap detection between those events

mod clock;
mod event;
mod gap;

pub use clock::{ClockTime, MINUTES_PER_DAY};
pub use event::{DayEvent, EventSource};
pub use gap::{detect_gaps, Gap, GapDetector};
