//! # Dayweave Core Library
//!
//! This library provides the scheduling logic behind the Dayweave personal
//! assistant: deciding which suggested tasks go into which free gaps of a
//! day, and labeling those gaps with where the user probably is. The CLI
//! binary and any GUI are thin layers over the same functions.
//!
//! ## Architecture
//!
//! - **Timeline**: wall-clock times, day events and free gap detection
//! - **Location**: layered location spans and gap labeling
//! - **Scheduler**: priority ranking, duration fitting and the two-pass
//!   mandatory-first placement search
//! - **Storage**: TOML-based configuration
//!
//! Everything except configuration persistence is pure and synchronous:
//! each call takes its own snapshot of the inputs and returns fresh output.
//!
//! ## Key Components
//!
//! - [`Scheduler`]: places [`Suggestion`]s into [`Gap`]s
//! - [`enrich_gaps_with_location`]: labels gaps as home, workplace or other
//! - [`Config`]: Application configuration management

pub mod error;
pub mod location;
pub mod scheduler;
pub mod storage;
pub mod suggestion;
pub mod timeline;

pub use error::{ConfigError, CoreError, ValidationError};
pub use location::{
    build_location_spans, enrich_gaps_with_location, location_for_gap, Location, LocationSpan,
};
pub use scheduler::{
    fit_duration, priority, schedule, LocationMatching, PriorityCalculator, PriorityScore,
    ScheduledBlock, Scheduler, SchedulerConfig, SchedulerResult,
};
pub use storage::{Config, GapsConfig};
pub use suggestion::{LocationPreference, Suggestion, TaskType, Tier};
pub use timeline::{detect_gaps, ClockTime, DayEvent, EventSource, Gap, GapDetector};
