//! Location labeling for gaps.
//!
//! Every day starts from a baseline "home" span covering the whole day.
//! Timetable events layer "workplace" spans on top of it and calendar
//! events layer "other" spans. A gap takes the label of the most specific
//! (shortest) span it overlaps.

mod enrich;
mod span;

pub use enrich::{enrich_gaps_with_location, location_for_gap};
pub use span::{build_location_spans, Location, LocationSpan};
