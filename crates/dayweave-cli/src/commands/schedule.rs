use std::path::PathBuf;

use clap::Args;
use dayweave_core::{
    enrich_gaps_with_location, Config, DayEvent, Gap, LocationMatching, Scheduler, Suggestion,
};

use tracing::debug;

use super::{print_json, read_json};

#[derive(Args)]
pub struct ScheduleArgs {
    /// JSON array of suggestions ("-" for stdin)
    #[arg(long)]
    suggestions: PathBuf,
    /// JSON array of gaps
    #[arg(long)]
    gaps: PathBuf,
    /// JSON array of day events; labels the gaps with locations first
    #[arg(long)]
    events: Option<PathBuf>,
    /// Use the legacy greedy placer instead of the search
    #[arg(long)]
    legacy: bool,
    /// Override the mandatory need threshold
    #[arg(long)]
    threshold: Option<f64>,
    /// Override location matching (off, prefer, require)
    #[arg(long, value_parser = parse_matching)]
    location_matching: Option<LocationMatching>,
}

fn parse_matching(s: &str) -> Result<LocationMatching, String> {
    match s {
        "off" => Ok(LocationMatching::Off),
        "prefer" => Ok(LocationMatching::Prefer),
        "require" => Ok(LocationMatching::Require),
        other => Err(format!("unknown location matching '{other}'")),
    }
}

pub fn run(args: ScheduleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let suggestions: Vec<Suggestion> = read_json(&args.suggestions)?;
    let mut gaps: Vec<Gap> = read_json(&args.gaps)?;
    if let Some(path) = &args.events {
        let events: Vec<DayEvent> = read_json(path)?;
        gaps = enrich_gaps_with_location(&gaps, &events);
    }
    debug!(suggestions = suggestions.len(), gaps = gaps.len(), "loaded inputs");

    let mut config = Config::load()?.scheduler_config();
    if args.legacy {
        config.use_state_search = false;
    }
    if let Some(threshold) = args.threshold {
        config.mandatory_need_threshold = threshold;
    }
    if let Some(matching) = args.location_matching {
        config.location_matching = matching;
    }
    config.validate()?;

    let result = Scheduler::with_config(config).schedule(&suggestions, &gaps);
    if result.has_mandatory_drops() {
        eprintln!(
            "warning: {} mandatory suggestion(s) did not fit",
            result.mandatory_dropped.len()
        );
    }
    print_json(&result)
}
