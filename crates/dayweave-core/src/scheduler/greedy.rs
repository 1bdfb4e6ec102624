//! Legacy greedy placement.
//!
//! Walks every candidate in priority order and drops it into the first
//! gap, chronologically, that still has room for at least its base
//! duration. No tier handling beyond reporting, no look-ahead. Kept as a
//! fallback and for comparison with the search.

use super::plan::{slot_allowed, Allocation, Candidate, Placement, Prepared, Slot, SlotLedger};
use super::SchedulerConfig;
use crate::suggestion::Tier;

pub(crate) fn place(prepared: &Prepared<'_>, slots: &[Slot], config: &SchedulerConfig) -> Placement {
    let mut queue: Vec<(&Candidate<'_>, usize)> = prepared
        .mandatory
        .iter()
        .enumerate()
        .chain(prepared.optional.iter().enumerate())
        .map(|(index, candidate)| (candidate, index))
        .collect();
    queue.sort_by(|a, b| b.0.score.cmp(&a.0.score));

    let mut placement = Placement {
        ledgers: vec![SlotLedger::default(); slots.len()],
        ..Default::default()
    };

    for (candidate, index) in queue {
        let choice = slots.iter().enumerate().find_map(|(s, slot)| {
            if !slot_allowed(candidate, slot, config.location_matching) {
                return None;
            }
            candidate
                .bounds
                .fit(placement.ledgers[s].free(slot))
                .map(|minutes| (s, minutes))
        });

        match (choice, candidate.tier) {
            (Some((s, minutes)), tier) => placement.ledgers[s].push(Allocation {
                candidate: index,
                tier,
                minutes,
            }),
            (None, Tier::Mandatory) => placement.unplaced_mandatory.push(index),
            (None, Tier::Optional) => placement.unplaced_optional.push(index),
        }
    }

    placement.unplaced_mandatory.sort_unstable();
    placement.unplaced_optional.sort_unstable();
    placement
}
