//! State-space search placement.
//!
//! The mandatory pass is a bounded depth-first search over assignments of
//! mandatory candidates to slots. A slot accepts a candidate while the base
//! durations of everything assigned to it still fit; actual durations are
//! decided afterwards by sharing the slot's capacity. Branches are explored
//! in the order a greedy placer would choose, so the first complete
//! assignment is the greedy one and the search can only improve on it.
//! Branches that cannot beat the best assignment are cut, both on the
//! number of candidates left and on the base minutes the free capacity can
//! still hold. A best-fit-decreasing packing is kept as a fallback for when
//! the node budget runs out before the search recovers from a fragmenting
//! early choice.
//!
//! The fill pass places optional candidates one by one into the remaining
//! space and never moves a mandatory block.

use std::cmp::Reverse;

use tracing::debug;

use super::duration::{share_capacity, DurationBounds};
use super::plan::{
    ranked_affinity, slot_allowed, Allocation, Candidate, Placement, Prepared, Slot, SlotLedger,
};
use super::{LocationMatching, SchedulerConfig};
use crate::suggestion::{LocationAffinity, Tier};

pub(crate) fn place(prepared: &Prepared<'_>, slots: &[Slot], config: &SchedulerConfig) -> Placement {
    let mandatory = &prepared.mandatory;
    let assignment = MandatorySearch::new(mandatory, slots, config).run();

    let mut ledgers = vec![SlotLedger::default(); slots.len()];
    let mut unplaced_mandatory = Vec::new();

    for (slot_index, slot) in slots.iter().enumerate() {
        let members: Vec<usize> = (0..mandatory.len())
            .filter(|&i| assignment[i] == Some(slot_index))
            .collect();
        if members.is_empty() {
            continue;
        }
        let bounds: Vec<DurationBounds> = members.iter().map(|&i| mandatory[i].bounds).collect();
        match share_capacity(&bounds, slot.capacity) {
            Some(durations) => {
                for (&candidate, minutes) in members.iter().zip(durations) {
                    ledgers[slot_index].push(Allocation {
                        candidate,
                        tier: Tier::Mandatory,
                        minutes,
                    });
                }
            }
            None => unplaced_mandatory.extend(members),
        }
    }
    unplaced_mandatory.extend((0..mandatory.len()).filter(|&i| assignment[i].is_none()));
    unplaced_mandatory.sort_unstable();

    let unplaced_optional = fill_optional(&prepared.optional, slots, &mut ledgers, config.location_matching);

    Placement {
        ledgers,
        unplaced_mandatory,
        unplaced_optional,
    }
}

/// Place optional candidates into free space, highest priority first.
///
/// Each candidate goes to the slot where it gets its full ask if there is
/// one, then by location affinity, then by the most minutes, then the
/// earliest slot. Returns the indices that found no room.
pub(crate) fn fill_optional(
    optional: &[Candidate<'_>],
    slots: &[Slot],
    ledgers: &mut [SlotLedger],
    matching: LocationMatching,
) -> Vec<usize> {
    let mut unplaced = Vec::new();

    for (index, candidate) in optional.iter().enumerate() {
        let choice = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot_allowed(candidate, slot, matching))
            .filter_map(|(s, slot)| {
                candidate
                    .bounds
                    .fit(ledgers[s].free(slot))
                    .map(|minutes| (s, minutes))
            })
            .min_by_key(|&(s, minutes)| {
                (
                    minutes < candidate.bounds.ask,
                    ranked_affinity(candidate, &slots[s], matching),
                    Reverse(minutes),
                    s,
                )
            });

        match choice {
            Some((s, minutes)) => ledgers[s].push(Allocation {
                candidate: index,
                tier: Tier::Optional,
                minutes,
            }),
            None => unplaced.push(index),
        }
    }

    unplaced
}

/// Quality of a complete mandatory assignment. Field order is priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SearchScore {
    placed: usize,
    weight: u64,
    spread: usize,
    matches: usize,
    minutes: u64,
}

struct MandatorySearch<'s, 'a> {
    candidates: &'s [Candidate<'a>],
    slots: &'s [Slot],
    matching: LocationMatching,
    budget: usize,
    nodes: usize,
    assignment: Vec<Option<usize>>,
    base_load: Vec<u32>,
    ask_load: Vec<u32>,
    members: Vec<usize>,
    /// Sum of weights of candidates `i..`
    suffix_weight: Vec<u64>,
    /// Bases of candidates `i..`, ascending
    suffix_bases: Vec<Vec<u32>>,
    /// Unassigned base minutes across all slots
    free_capacity: u64,
    best: Option<(SearchScore, Vec<Option<usize>>)>,
}

impl<'s, 'a> MandatorySearch<'s, 'a> {
    fn new(candidates: &'s [Candidate<'a>], slots: &'s [Slot], config: &SchedulerConfig) -> Self {
        let mut suffix_weight = vec![0u64; candidates.len() + 1];
        for i in (0..candidates.len()).rev() {
            suffix_weight[i] = suffix_weight[i + 1] + candidates[i].score.weight();
        }
        let suffix_bases = (0..=candidates.len())
            .map(|i| {
                let mut bases: Vec<u32> = candidates[i..].iter().map(|c| c.bounds.base).collect();
                bases.sort_unstable();
                bases
            })
            .collect();
        Self {
            candidates,
            slots,
            matching: config.location_matching,
            budget: config.search_node_budget.max(1),
            nodes: 0,
            assignment: vec![None; candidates.len()],
            base_load: vec![0; slots.len()],
            ask_load: vec![0; slots.len()],
            members: vec![0; slots.len()],
            suffix_weight,
            suffix_bases,
            free_capacity: slots.iter().map(|s| s.capacity as u64).sum(),
            best: None,
        }
    }

    fn run(mut self) -> Vec<Option<usize>> {
        if self.candidates.is_empty() {
            return Vec::new();
        }
        self.descend(0, 0, 0);
        let exhausted = self.nodes > self.budget;

        let (seed_score, seed) = self.best_fit_seed();
        let seed_wins = self.best.as_ref().map_or(true, |(best, _)| seed_score > *best);
        debug!(
            nodes = self.nodes,
            budget = self.budget,
            exhausted,
            seed_wins,
            "mandatory search finished"
        );
        if seed_wins {
            return seed;
        }
        self.best
            .map(|(_, assignment)| assignment)
            .unwrap_or_else(|| vec![None; self.candidates.len()])
    }

    /// Pack candidates largest base first, each into the slot it leaves
    /// with the least spare room.
    fn best_fit_seed(&mut self) -> (SearchScore, Vec<Option<usize>>) {
        let candidates = self.candidates;
        let slots = self.slots;
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&i| (Reverse(candidates[i].bounds.base), i));

        let mut load = vec![0u32; slots.len()];
        for i in order {
            let candidate = &candidates[i];
            let base = candidate.bounds.base;
            let choice = (0..slots.len())
                .filter(|&s| slot_allowed(candidate, &slots[s], self.matching))
                .filter(|&s| load[s] + base <= slots[s].capacity)
                .min_by_key(|&s| {
                    (
                        slots[s].capacity - load[s] - base,
                        ranked_affinity(candidate, &slots[s], self.matching),
                        s,
                    )
                });
            if let Some(s) = choice {
                load[s] += base;
                self.assignment[i] = Some(s);
            }
        }

        let score = self.evaluate();
        let seed = std::mem::replace(&mut self.assignment, vec![None; candidates.len()]);
        (score, seed)
    }

    /// How many of candidates `depth..` could still fit at base, counting
    /// only total free minutes.
    fn placeable_bound(&self, depth: usize) -> usize {
        let mut room = self.free_capacity;
        let mut count = 0;
        for &base in &self.suffix_bases[depth] {
            if base as u64 > room {
                break;
            }
            room -= base as u64;
            count += 1;
        }
        count
    }

    fn descend(&mut self, depth: usize, placed: usize, weight: u64) {
        self.nodes += 1;

        if depth == self.candidates.len() {
            let score = self.evaluate();
            if self.best.as_ref().map_or(true, |(best, _)| score > *best) {
                self.best = Some((score, self.assignment.clone()));
            }
            return;
        }

        if let Some((best, _)) = &self.best {
            if self.nodes > self.budget {
                return;
            }
            let bound = (
                placed + self.placeable_bound(depth),
                weight + self.suffix_weight[depth],
            );
            if bound < (best.placed, best.weight) {
                return;
            }
        }

        let bounds = self.candidates[depth].bounds;
        let candidate_weight = self.candidates[depth].score.weight();
        for slot in self.branch_order(depth) {
            self.assignment[depth] = Some(slot);
            self.base_load[slot] += bounds.base;
            self.ask_load[slot] += bounds.ask;
            self.members[slot] += 1;
            self.free_capacity -= bounds.base as u64;

            self.descend(depth + 1, placed + 1, weight + candidate_weight);

            self.free_capacity += bounds.base as u64;
            self.members[slot] -= 1;
            self.ask_load[slot] -= bounds.ask;
            self.base_load[slot] -= bounds.base;
            self.assignment[depth] = None;
        }

        self.descend(depth + 1, placed, weight);
    }

    /// Slots that can still take candidate `depth` at its base, best first:
    /// unoccupied slots, then location affinity, then slots where its ask
    /// fits as well, then the most spare room, then chronological.
    fn branch_order(&self, depth: usize) -> Vec<usize> {
        let candidate = &self.candidates[depth];
        let mut options: Vec<usize> = (0..self.slots.len())
            .filter(|&s| slot_allowed(candidate, &self.slots[s], self.matching))
            .filter(|&s| self.base_load[s] + candidate.bounds.base <= self.slots[s].capacity)
            .collect();

        options.sort_by_key(|&s| {
            let slot = &self.slots[s];
            (
                self.members[s] > 0,
                ranked_affinity(candidate, slot, self.matching),
                self.ask_load[s] + candidate.bounds.ask > slot.capacity,
                Reverse(slot.capacity - self.base_load[s]),
                s,
            )
        });
        options
    }

    fn evaluate(&self) -> SearchScore {
        let mut per_slot: Vec<Vec<DurationBounds>> = vec![Vec::new(); self.slots.len()];
        let mut score = SearchScore {
            placed: 0,
            weight: 0,
            spread: 0,
            matches: 0,
            minutes: 0,
        };

        for (i, assigned) in self.assignment.iter().enumerate() {
            let Some(s) = *assigned else { continue };
            let candidate = &self.candidates[i];
            score.placed += 1;
            score.weight += candidate.score.weight();
            if ranked_affinity(candidate, &self.slots[s], self.matching) == LocationAffinity::Match {
                score.matches += 1;
            }
            per_slot[s].push(candidate.bounds);
        }

        for (slot, bounds) in self.slots.iter().zip(&per_slot) {
            if bounds.is_empty() {
                continue;
            }
            score.spread += 1;
            if let Some(durations) = share_capacity(bounds, slot.capacity) {
                score.minutes += durations.iter().map(|&d| d as u64).sum::<u64>();
            }
        }
        score
    }
}
