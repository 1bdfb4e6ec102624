//! Gap-aware suggestion scheduler.
//!
//! Places prioritized suggestions into the free gaps of a day:
//! - Mandatory suggestions (need at or above a threshold) go first, spread
//!   across gaps and shrunk together toward their base durations so that
//!   as many as possible fit
//! - Optional suggestions then fill what is left in priority order
//! - Blocks are laid out back to back from each gap's start
//!
//! Scheduling never fails. Whatever cannot be placed is reported in
//! [`SchedulerResult::dropped`], and mandatory casualties additionally in
//! [`SchedulerResult::mandatory_dropped`] so the caller can warn the user.

mod duration;
mod greedy;
mod plan;
mod priority;
mod search;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::suggestion::{Suggestion, Tier};
use crate::timeline::{ClockTime, Gap};

pub use duration::{fit_duration, share_capacity, DurationBounds};
pub use priority::{priority, PriorityCalculator, PriorityScore};

use plan::{layout, prepare_slots, prepare_suggestions, Placement};

/// A placed suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledBlock {
    pub suggestion_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_id: Option<String>,
    pub gap_id: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub duration: u32,
    pub tier: Tier,
}

/// Output of one scheduling run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerResult {
    /// Blocks in chronological order
    pub scheduled: Vec<ScheduledBlock>,
    /// Suggestions that could not be placed, any tier
    pub dropped: Vec<Suggestion>,
    /// The mandatory subset of `dropped`
    pub mandatory_dropped: Vec<Suggestion>,
}

impl SchedulerResult {
    /// True when the placement guarantee for mandatory work was broken
    pub fn has_mandatory_drops(&self) -> bool {
        !self.mandatory_dropped.is_empty()
    }

    pub fn blocks_in_gap<'a>(&'a self, gap_id: &'a str) -> impl Iterator<Item = &'a ScheduledBlock> + 'a {
        self.scheduled.iter().filter(move |b| b.gap_id == gap_id)
    }

    pub fn total_scheduled_minutes(&self) -> u32 {
        self.scheduled.iter().map(|b| b.duration).sum()
    }
}

/// How gap location labels influence placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMatching {
    /// Labels are ignored
    Off,
    /// Matching gaps are tried first
    #[default]
    Prefer,
    /// Gaps labeled with another location are never used
    Require,
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// `need` at or above this makes a suggestion mandatory
    #[serde(default = "default_mandatory_need_threshold")]
    pub mandatory_need_threshold: f64,
    /// Use the state-space search; `false` selects the legacy greedy placer
    #[serde(default = "default_true")]
    pub use_state_search: bool,
    /// Upper bound on search nodes for the mandatory pass
    #[serde(default = "default_search_node_budget")]
    pub search_node_budget: usize,
    #[serde(default)]
    pub location_matching: LocationMatching,
}

fn default_mandatory_need_threshold() -> f64 {
    0.9
}
fn default_true() -> bool {
    true
}
fn default_search_node_budget() -> usize {
    20_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mandatory_need_threshold: default_mandatory_need_threshold(),
            use_state_search: true,
            search_node_budget: default_search_node_budget(),
            location_matching: LocationMatching::default(),
        }
    }
}

impl SchedulerConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.mandatory_need_threshold) {
            return Err(ValidationError::InvalidValue {
                field: "mandatory_need_threshold".into(),
                message: format!("{} is outside [0, 1]", self.mandatory_need_threshold),
            });
        }
        if self.search_node_budget == 0 {
            return Err(ValidationError::InvalidValue {
                field: "search_node_budget".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Scheduler for suggestions
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Place `suggestions` into `gaps`.
    ///
    /// Hidden suggestions are ignored. The inputs are not modified and the
    /// output depends on nothing but them and the config.
    pub fn schedule(&self, suggestions: &[Suggestion], gaps: &[Gap]) -> SchedulerResult {
        let prepared = prepare_suggestions(suggestions, &self.config);
        let slots = prepare_slots(gaps);

        let placement: Placement = if self.config.use_state_search {
            search::place(&prepared, &slots, &self.config)
        } else {
            greedy::place(&prepared, &slots, &self.config)
        };

        let scheduled = layout(&slots, &placement.ledgers, |tier, index| match tier {
            Tier::Mandatory => prepared.mandatory[index].suggestion,
            Tier::Optional => prepared.optional[index].suggestion,
        });

        let mut dropped = Vec::new();
        let mut mandatory_dropped = Vec::new();
        for &index in &placement.unplaced_mandatory {
            let suggestion = prepared.mandatory[index].suggestion;
            dropped.push(suggestion.clone());
            mandatory_dropped.push(suggestion.clone());
        }
        for &index in &placement.unplaced_optional {
            dropped.push(prepared.optional[index].suggestion.clone());
        }
        for &(suggestion, tier) in &prepared.rejected {
            dropped.push(suggestion.clone());
            if tier == Tier::Mandatory {
                mandatory_dropped.push(suggestion.clone());
            }
        }

        if !mandatory_dropped.is_empty() {
            info!(
                count = mandatory_dropped.len(),
                ids = ?mandatory_dropped.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
                "mandatory suggestions could not be placed"
            );
        }
        debug!(
            scheduled = scheduled.len(),
            dropped = dropped.len(),
            state_search = self.config.use_state_search,
            "scheduling finished"
        );

        SchedulerResult {
            scheduled,
            dropped,
            mandatory_dropped,
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to schedule with an explicit config
pub fn schedule(suggestions: &[Suggestion], gaps: &[Gap], config: &SchedulerConfig) -> SchedulerResult {
    Scheduler::with_config(config.clone()).schedule(suggestions, gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::suggestion::{LocationPreference, TaskType};

    fn gap(id: &str, start: &str, end: &str) -> Gap {
        Gap::from_clock_strings(id, start, end).unwrap()
    }

    fn ids(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn mandatory_items_share_one_gap_at_base() {
        let suggestions = vec![
            Suggestion::new("a", 1.0, 0.1, 45, 30),
            Suggestion::new("b", 1.0, 0.1, 40, 30),
        ];
        let result = Scheduler::new().schedule(&suggestions, &[gap("g", "09:00", "10:00")]);

        assert_eq!(result.scheduled.len(), 2);
        assert!(result.scheduled.iter().all(|b| b.duration == 30));
        assert_eq!(result.scheduled[0].start_time.to_string(), "09:00");
        assert_eq!(result.scheduled[1].start_time.to_string(), "09:30");
        assert!(!result.has_mandatory_drops());
    }

    #[test]
    fn ask_is_not_stretched_to_the_gap() {
        let suggestions = vec![Suggestion::new("a", 1.0, 0.0, 120, 60)];
        let result = Scheduler::new().schedule(&suggestions, &[gap("g", "08:00", "11:00")]);
        assert_eq!(result.scheduled[0].duration, 120);
        assert_eq!(result.scheduled[0].end_time.to_string(), "10:00");
    }

    #[test]
    fn mandatory_items_spread_before_doubling_up() {
        let suggestions = vec![
            Suggestion::new("a", 1.0, 0.0, 60, 30),
            Suggestion::new("b", 0.95, 0.0, 60, 30),
        ];
        let gaps = vec![gap("morning", "08:00", "10:00"), gap("noon", "12:00", "13:00")];
        let result = Scheduler::new().schedule(&suggestions, &gaps);

        let used: Vec<_> = result.scheduled.iter().map(|b| b.gap_id.as_str()).collect();
        assert_eq!(used, vec!["morning", "noon"]);
    }

    #[test]
    fn search_finds_assignments_greedy_misses() {
        // Placing "a" in the only gap that fits its ask would strand "b".
        let suggestions = vec![
            Suggestion::new("a", 1.0, 0.0, 45, 30),
            Suggestion::new("b", 0.95, 0.0, 60, 60),
        ];
        let gaps = vec![gap("large", "08:00", "09:00"), gap("small", "09:30", "10:00")];

        let result = Scheduler::new().schedule(&suggestions, &gaps);
        assert!(result.mandatory_dropped.is_empty());
        let a = result.scheduled.iter().find(|b| b.suggestion_id == "a").unwrap();
        let b = result.scheduled.iter().find(|b| b.suggestion_id == "b").unwrap();
        assert_eq!((a.gap_id.as_str(), a.duration), ("small", 30));
        assert_eq!((b.gap_id.as_str(), b.duration), ("large", 60));

        let legacy = Scheduler::with_config(SchedulerConfig {
            use_state_search: false,
            ..Default::default()
        })
        .schedule(&suggestions, &gaps);
        assert_eq!(ids(&legacy.mandatory_dropped), vec!["b"]);
    }

    #[test]
    fn optional_fill_uses_remaining_space() {
        let suggestions = vec![
            Suggestion::new("must", 1.0, 0.0, 60, 30),
            Suggestion::new("nice", 0.5, 0.0, 60, 20),
        ];
        let result = Scheduler::new().schedule(&suggestions, &[gap("g", "09:00", "10:30")]);
        let durations: Vec<_> = result.scheduled.iter().map(|b| (b.suggestion_id.as_str(), b.duration)).collect();
        assert_eq!(durations, vec![("must", 60), ("nice", 30)]);
    }

    #[test]
    fn hidden_suggestions_vanish() {
        let suggestions = vec![Suggestion::new("h", 1.0, 0.0, 30, 15).hidden()];
        let result = Scheduler::new().schedule(&suggestions, &[gap("g", "09:00", "10:00")]);
        assert!(result.scheduled.is_empty());
        assert!(result.dropped.is_empty());
        assert!(result.mandatory_dropped.is_empty());
    }

    #[test]
    fn malformed_mandatory_suggestion_is_reported() {
        let suggestions = vec![Suggestion::new("broken", 1.0, 0.0, 0, 0)];
        let result = Scheduler::new().schedule(&suggestions, &[gap("g", "09:00", "10:00")]);
        assert_eq!(ids(&result.dropped), vec!["broken"]);
        assert_eq!(ids(&result.mandatory_dropped), vec!["broken"]);
    }

    #[test]
    fn no_gaps_drops_everything() {
        let suggestions = vec![
            Suggestion::new("m", 1.0, 0.0, 30, 15),
            Suggestion::new("o", 0.2, 0.0, 30, 15),
        ];
        let result = Scheduler::new().schedule(&suggestions, &[]);
        assert_eq!(ids(&result.dropped), vec!["m", "o"]);
        assert_eq!(ids(&result.mandatory_dropped), vec!["m"]);
    }

    #[test]
    fn threshold_is_configurable() {
        let suggestions = vec![Suggestion::new("a", 0.85, 0.0, 300, 200)];
        let gaps = vec![gap("g", "09:00", "10:00")];

        let strict = Scheduler::new().schedule(&suggestions, &gaps);
        assert!(strict.mandatory_dropped.is_empty());
        assert_eq!(strict.dropped.len(), 1);

        let lenient = Scheduler::with_config(SchedulerConfig {
            mandatory_need_threshold: 0.8,
            ..Default::default()
        })
        .schedule(&suggestions, &gaps);
        assert_eq!(lenient.mandatory_dropped.len(), 1);
    }

    #[test]
    fn location_preference_steers_placement() {
        let suggestions = vec![Suggestion::new("a", 0.5, 0.0, 30, 30)
            .with_location_preference(LocationPreference::Workplace)];
        let gaps = vec![
            gap("home", "07:00", "08:00").with_location(Location::Home),
            gap("work", "12:00", "13:00").with_location(Location::Workplace),
        ];

        let preferred = Scheduler::new().schedule(&suggestions, &gaps);
        assert_eq!(preferred.scheduled[0].gap_id, "work");

        let ignored = Scheduler::with_config(SchedulerConfig {
            location_matching: LocationMatching::Off,
            ..Default::default()
        })
        .schedule(&suggestions, &gaps);
        assert_eq!(ignored.scheduled[0].gap_id, "home");
    }

    #[test]
    fn required_location_excludes_other_gaps() {
        let suggestions = vec![Suggestion::new("a", 1.0, 0.0, 30, 30)
            .with_location_preference(LocationPreference::Home)];
        let gaps = vec![gap("work", "12:00", "13:00").with_location(Location::Workplace)];
        let result = Scheduler::with_config(SchedulerConfig {
            location_matching: LocationMatching::Require,
            ..Default::default()
        })
        .schedule(&suggestions, &gaps);
        assert!(result.scheduled.is_empty());
        assert_eq!(ids(&result.mandatory_dropped), vec!["a"]);
    }

    #[test]
    fn routines_keep_their_ask_while_others_shrink() {
        let suggestions = vec![
            Suggestion::new("task", 1.0, 0.0, 60, 30).with_type(TaskType::Deadline),
            Suggestion::new("routine", 1.0, 0.0, 60, 30).with_type(TaskType::Routine),
        ];
        let result = Scheduler::new().schedule(&suggestions, &[gap("g", "09:00", "10:40")]);
        let durations: Vec<_> = result.scheduled.iter().map(|b| (b.suggestion_id.as_str(), b.duration)).collect();
        assert_eq!(durations, vec![("task", 40), ("routine", 60)]);
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let config = SchedulerConfig {
            mandatory_need_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn result_helpers() {
        let suggestions = vec![
            Suggestion::new("a", 0.5, 0.0, 30, 30),
            Suggestion::new("b", 0.4, 0.0, 20, 20),
        ];
        let result = Scheduler::new().schedule(&suggestions, &[gap("g", "09:00", "10:00")]);
        assert_eq!(result.blocks_in_gap("g").count(), 2);
        assert_eq!(result.total_scheduled_minutes(), 50);
    }
}
