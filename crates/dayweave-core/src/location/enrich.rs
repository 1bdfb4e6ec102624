use super::span::{build_location_spans, Location, LocationSpan};
use crate::timeline::{DayEvent, Gap};

/// Label a gap with the location of the shortest non-home span it overlaps.
///
/// Partial overlap counts; a zero-width touch at a boundary does not.
/// Equal-length spans resolve to `Other` before `Workplace`.
pub fn location_for_gap(gap: &Gap, spans: &[LocationSpan]) -> Location {
    let start = gap.start.minutes();
    let end = gap.end.minutes();

    spans
        .iter()
        .filter(|span| span.location != Location::Home)
        .filter(|span| start < span.end && end > span.start)
        .min_by_key(|span| span.specificity_key())
        .map(|span| span.location)
        .unwrap_or(Location::Home)
}

/// Attach a `location_label` to every gap, leaving all other fields intact.
pub fn enrich_gaps_with_location(gaps: &[Gap], events: &[DayEvent]) -> Vec<Gap> {
    let spans = build_location_spans(events);
    gaps.iter()
        .map(|gap| {
            let label = location_for_gap(gap, &spans);
            gap.clone().with_location(label)
        })
        .collect()
}
