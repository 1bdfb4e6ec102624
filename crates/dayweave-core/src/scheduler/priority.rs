//! Suggestion ranking.
//!
//! The score is lexicographic: `need + importance` first, then the ask
//! duration. The duration key only separates suggestions whose primary
//! scores are equal, so a longer task never outranks a more urgent one.

use std::cmp::Ordering;

use serde::Serialize;

use crate::suggestion::Suggestion;

/// Ranking score of one suggestion
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PriorityScore {
    /// `need + importance`, both clamped to [0, 1]
    pub base: f64,
    /// Ask duration in minutes, the tie-break key
    pub ask_minutes: u32,
}

impl PriorityScore {
    /// The primary scalar
    pub fn value(&self) -> f64 {
        self.base
    }

    /// Primary scalar in integer thousandths, used as search weight
    pub fn weight(&self) -> u64 {
        (self.base * 1000.0).round() as u64
    }
}

impl PartialEq for PriorityScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityScore {}

impl PartialOrd for PriorityScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.base
            .total_cmp(&other.base)
            .then(self.ask_minutes.cmp(&other.ask_minutes))
    }
}

/// Priority calculator for suggestions
#[derive(Debug, Clone, Default)]
pub struct PriorityCalculator;

impl PriorityCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Score a single suggestion. Pure.
    pub fn priority(&self, suggestion: &Suggestion) -> PriorityScore {
        PriorityScore {
            base: suggestion.clamped_need() + suggestion.clamped_importance(),
            ask_minutes: suggestion.duration.max(0) as u32,
        }
    }

    /// Indices of `suggestions`, highest priority first.
    ///
    /// Equal scores keep their input order.
    pub fn rank(&self, suggestions: &[Suggestion]) -> Vec<usize> {
        let scores: Vec<PriorityScore> = suggestions.iter().map(|s| self.priority(s)).collect();
        let mut order: Vec<usize> = (0..suggestions.len()).collect();
        order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
        order
    }

    /// Sort suggestions by priority in place (highest first, stable)
    pub fn sort_by_priority(&self, suggestions: &mut [Suggestion]) {
        suggestions.sort_by(|a, b| self.priority(b).cmp(&self.priority(a)));
    }
}

/// Convenience function to score a single suggestion
pub fn priority(suggestion: &Suggestion) -> PriorityScore {
    PriorityCalculator::new().priority(suggestion)
}
