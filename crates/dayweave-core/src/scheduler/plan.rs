//! Working state shared by both placement strategies: sanitized inputs,
//! per-gap ledgers and the final block layout.

use std::cmp::Reverse;

use tracing::{debug, warn};

use super::duration::DurationBounds;
use super::priority::{PriorityCalculator, PriorityScore};
use super::{LocationMatching, ScheduledBlock, SchedulerConfig};
use crate::location::Location;
use crate::suggestion::{LocationAffinity, Suggestion, Tier};
use crate::timeline::{ClockTime, Gap};

/// A suggestion that passed sanitizing, with its rank data.
#[derive(Debug)]
pub(crate) struct Candidate<'a> {
    pub suggestion: &'a Suggestion,
    pub bounds: DurationBounds,
    pub score: PriorityScore,
    pub tier: Tier,
}

impl Candidate<'_> {
    pub fn affinity(&self, label: Option<Location>) -> LocationAffinity {
        self.suggestion.location_preference.affinity(label)
    }
}

/// Usable part of an input gap.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub gap_id: String,
    pub start: ClockTime,
    pub capacity: u32,
    pub location: Option<Location>,
}

/// Candidates split by tier, each list in priority order, plus the
/// records that could not be used at all.
pub(crate) struct Prepared<'a> {
    pub mandatory: Vec<Candidate<'a>>,
    pub optional: Vec<Candidate<'a>>,
    pub rejected: Vec<(&'a Suggestion, Tier)>,
}

pub(crate) fn prepare_suggestions<'a>(
    suggestions: &'a [Suggestion],
    config: &SchedulerConfig,
) -> Prepared<'a> {
    let calculator = PriorityCalculator::new();
    let mut prepared = Prepared {
        mandatory: Vec::new(),
        optional: Vec::new(),
        rejected: Vec::new(),
    };

    for index in calculator.rank(suggestions) {
        let suggestion = &suggestions[index];
        if suggestion.is_hidden {
            continue;
        }
        let tier = suggestion.tier(config.mandatory_need_threshold);

        if suggestion.need.is_nan()
            || !(0.0..=1.0).contains(&suggestion.need)
            || suggestion.importance.is_nan()
            || !(0.0..=1.0).contains(&suggestion.importance)
        {
            warn!(
                suggestion = %suggestion.id,
                need = suggestion.need,
                importance = suggestion.importance,
                "scores outside [0, 1], clamping"
            );
        }

        let Some(bounds) = DurationBounds::from_suggestion(suggestion) else {
            warn!(
                suggestion = %suggestion.id,
                duration = suggestion.duration,
                "non-positive ask duration, dropping suggestion"
            );
            prepared.rejected.push((suggestion, tier));
            continue;
        };
        if suggestion.duration as i64 != bounds.ask as i64 {
            warn!(
                suggestion = %suggestion.id,
                duration = suggestion.duration,
                capped = bounds.ask,
                "ask duration longer than a day, capping"
            );
        }
        if suggestion.base_duration as i64 != bounds.base as i64 {
            warn!(
                suggestion = %suggestion.id,
                base = suggestion.base_duration,
                clamped = bounds.base,
                "base duration outside 1..=ask, clamping"
            );
        }

        let candidate = Candidate {
            suggestion,
            bounds,
            score: calculator.priority(suggestion),
            tier,
        };
        match tier {
            Tier::Mandatory => prepared.mandatory.push(candidate),
            Tier::Optional => prepared.optional.push(candidate),
        }
    }

    debug!(
        mandatory = prepared.mandatory.len(),
        optional = prepared.optional.len(),
        rejected = prepared.rejected.len(),
        "prepared suggestions"
    );
    prepared
}

/// Turn input gaps into non-overlapping slots in chronological order.
///
/// Stored durations are ignored in favour of the boundaries. A gap that
/// overlaps an earlier one keeps only its free remainder.
pub(crate) fn prepare_slots(gaps: &[Gap]) -> Vec<Slot> {
    let mut sorted: Vec<&Gap> = gaps.iter().collect();
    sorted.sort_by_key(|g| (g.start, Reverse(g.end)));

    let mut slots = Vec::with_capacity(sorted.len());
    let mut cursor = ClockTime::MIDNIGHT;
    for gap in sorted {
        if gap.end < gap.start {
            warn!(gap = %gap.gap_id, "gap ends before it starts, skipping");
            continue;
        }
        if gap.duration != gap.span_minutes() {
            warn!(
                gap = %gap.gap_id,
                stored = gap.duration,
                actual = gap.span_minutes(),
                "gap duration disagrees with its boundaries"
            );
        }

        let start = gap.start.max(cursor);
        if start > gap.start {
            if gap.end <= start {
                warn!(gap = %gap.gap_id, "gap lies inside an earlier gap, skipping");
                continue;
            }
            warn!(gap = %gap.gap_id, "gap overlaps an earlier gap, trimming");
        }

        slots.push(Slot {
            gap_id: gap.gap_id.clone(),
            start,
            capacity: gap.end.minutes_since(start),
            location: gap.location_label,
        });
        cursor = cursor.max(gap.end);
    }
    slots
}

/// Allocation inside one slot, in layout order.
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotLedger {
    pub entries: Vec<Allocation>,
    pub used: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Allocation {
    pub candidate: usize,
    pub tier: Tier,
    pub minutes: u32,
}

impl SlotLedger {
    pub fn push(&mut self, allocation: Allocation) {
        self.used += allocation.minutes;
        self.entries.push(allocation);
    }

    pub fn free(&self, slot: &Slot) -> u32 {
        slot.capacity.saturating_sub(self.used)
    }
}

/// Outcome of a placement strategy, before layout.
///
/// Candidate indices refer to `Prepared::mandatory` / `Prepared::optional`.
#[derive(Debug, Default)]
pub(crate) struct Placement {
    pub ledgers: Vec<SlotLedger>,
    pub unplaced_mandatory: Vec<usize>,
    pub unplaced_optional: Vec<usize>,
}

/// Whether the matching mode lets `candidate` use `slot` at all.
pub(crate) fn slot_allowed(candidate: &Candidate<'_>, slot: &Slot, matching: LocationMatching) -> bool {
    matching != LocationMatching::Require
        || candidate.affinity(slot.location) != LocationAffinity::Mismatch
}

/// Affinity used for ordering, flattened to neutral when matching is off.
pub(crate) fn ranked_affinity(
    candidate: &Candidate<'_>,
    slot: &Slot,
    matching: LocationMatching,
) -> LocationAffinity {
    match matching {
        LocationMatching::Off => LocationAffinity::Neutral,
        LocationMatching::Prefer | LocationMatching::Require => candidate.affinity(slot.location),
    }
}

/// Lay allocations out back to back from each slot's start.
///
/// `lookup` resolves an allocation's candidate index to its suggestion.
pub(crate) fn layout<'a>(
    slots: &[Slot],
    ledgers: &[SlotLedger],
    lookup: impl Fn(Tier, usize) -> &'a Suggestion,
) -> Vec<ScheduledBlock> {
    let mut blocks = Vec::new();
    for (slot, ledger) in slots.iter().zip(ledgers) {
        let mut cursor = slot.start;
        for allocation in &ledger.entries {
            let suggestion = lookup(allocation.tier, allocation.candidate);
            let end = cursor.plus_minutes(allocation.minutes);
            blocks.push(ScheduledBlock {
                suggestion_id: suggestion.id.clone(),
                memo_id: suggestion.memo_id.clone(),
                gap_id: slot.gap_id.clone(),
                start_time: cursor,
                end_time: end,
                duration: allocation.minutes,
                tier: allocation.tier,
            });
            cursor = end;
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gap(start: &str, end: &str) -> Gap {
        Gap::from_clock_strings(format!("{start}-{end}"), start, end).unwrap()
    }

    #[test]
    fn slots_are_chronological() {
        let slots = prepare_slots(&[gap("13:00", "14:00"), gap("08:00", "09:30")]);
        assert_eq!(slots[0].gap_id, "08:00-09:30");
        assert_eq!(slots[0].capacity, 90);
        assert_eq!(slots[1].capacity, 60);
    }

    #[test]
    fn overlapping_gaps_are_trimmed() {
        let slots = prepare_slots(&[gap("08:00", "10:00"), gap("09:00", "11:00")]);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].start, ClockTime::parse("10:00").unwrap());
        assert_eq!(slots[1].capacity, 60);
    }

    #[test]
    fn swallowed_gaps_are_skipped() {
        let slots = prepare_slots(&[gap("08:00", "12:00"), gap("09:00", "10:00")]);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn stored_duration_is_not_trusted() {
        let mut g = gap("08:00", "09:00");
        g.duration = 500;
        assert_eq!(prepare_slots(&[g])[0].capacity, 60);
    }

    #[test]
    fn zero_length_gaps_survive_as_empty_slots() {
        let slots = prepare_slots(&[gap("08:00", "08:00")]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].capacity, 0);
    }

    #[test]
    fn hidden_and_malformed_suggestions_are_separated() {
        let suggestions = vec![
            Suggestion::new("hidden", 1.0, 0.0, 30, 15).hidden(),
            Suggestion::new("empty", 1.0, 0.0, 0, 0),
            Suggestion::new("ok", 0.4, 0.0, 30, 15),
        ];
        let prepared = prepare_suggestions(&suggestions, &SchedulerConfig::default());
        assert!(prepared.mandatory.is_empty());
        assert_eq!(prepared.optional.len(), 1);
        assert_eq!(prepared.rejected.len(), 1);
        assert_eq!(prepared.rejected[0].0.id, "empty");
        assert_eq!(prepared.rejected[0].1, Tier::Mandatory);
    }
}
