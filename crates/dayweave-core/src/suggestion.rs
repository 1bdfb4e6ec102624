//! Candidate task placements.
//!
//! A suggestion is produced upstream by the scoring service from task
//! state (deadline proximity, neglect time, routine adherence). The
//! scheduler only reads it.

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Kind of task behind a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Has a due date
    Deadline,
    /// Recurring goal
    Routine,
    /// No deadline
    Backlog,
}

/// How a task gives up minutes when a gap is tight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkPolicy {
    /// Shrinks evenly with its neighbours, down to its base duration
    Flexible,
    /// Keeps its full ask while others still have room to give; can be
    /// truncated to its base duration when forced
    PreferFull,
}

impl TaskType {
    pub fn shrink_policy(&self) -> ShrinkPolicy {
        match self {
            TaskType::Deadline | TaskType::Backlog => ShrinkPolicy::Flexible,
            TaskType::Routine => ShrinkPolicy::PreferFull,
        }
    }
}

impl Default for TaskType {
    fn default() -> Self {
        Self::Backlog
    }
}

/// Where the user would rather do a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPreference {
    Home,
    Workplace,
    #[default]
    NoPreference,
}

/// How well a gap's location suits a suggestion. Orders best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LocationAffinity {
    Match,
    Neutral,
    Mismatch,
}

impl LocationPreference {
    pub fn affinity(&self, label: Option<Location>) -> LocationAffinity {
        match (self, label) {
            (LocationPreference::NoPreference, _) | (_, None) => LocationAffinity::Neutral,
            (LocationPreference::Home, Some(Location::Home))
            | (LocationPreference::Workplace, Some(Location::Workplace)) => LocationAffinity::Match,
            _ => LocationAffinity::Mismatch,
        }
    }
}

/// Scheduling tier derived from `need`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Mandatory,
    Optional,
}

/// A candidate task placement.
///
/// Durations are signed so malformed upstream records still deserialize;
/// the scheduler clamps them before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_id: Option<String>,
    /// Urgency in [0, 1]
    pub need: f64,
    /// User-set or inferred importance in [0, 1]
    #[serde(default)]
    pub importance: f64,
    /// Ideal ("ask") session length in minutes
    pub duration: i32,
    /// Minimum viable session length in minutes
    pub base_duration: i32,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub location_preference: LocationPreference,
    #[serde(default)]
    pub is_hidden: bool,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, need: f64, importance: f64, duration: i32, base_duration: i32) -> Self {
        Self {
            id: id.into(),
            memo_id: None,
            need,
            importance,
            duration,
            base_duration,
            task_type: TaskType::default(),
            location_preference: LocationPreference::default(),
            is_hidden: false,
        }
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_memo(mut self, memo_id: impl Into<String>) -> Self {
        self.memo_id = Some(memo_id.into());
        self
    }

    pub fn with_location_preference(mut self, preference: LocationPreference) -> Self {
        self.location_preference = preference;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    /// `need` clamped into [0, 1], NaN read as 0
    pub fn clamped_need(&self) -> f64 {
        unit_interval(self.need)
    }

    /// `importance` clamped into [0, 1], NaN read as 0
    pub fn clamped_importance(&self) -> f64 {
        unit_interval(self.importance)
    }

    /// Tier under the given mandatory threshold.
    pub fn tier(&self, mandatory_need_threshold: f64) -> Tier {
        if self.clamped_need() >= mandatory_need_threshold {
            Tier::Mandatory
        } else {
            Tier::Optional
        }
    }
}

fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
