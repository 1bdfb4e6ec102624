use std::path::PathBuf;

use clap::Args;
use dayweave_core::{enrich_gaps_with_location, ClockTime, Config, DayEvent};

use super::{print_json, read_json};

#[derive(Args)]
pub struct GapsArgs {
    /// JSON array of day events ("-" for stdin)
    #[arg(long)]
    events: PathBuf,
    /// Start of the day window (HH:MM), defaults to the config
    #[arg(long)]
    day_start: Option<ClockTime>,
    /// End of the day window (HH:MM), defaults to the config
    #[arg(long)]
    day_end: Option<ClockTime>,
    /// Shortest gap worth reporting, in minutes
    #[arg(long)]
    min_gap: Option<u32>,
    /// Label the detected gaps with locations
    #[arg(long)]
    enrich: bool,
}

pub fn run(args: GapsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let events: Vec<DayEvent> = read_json(&args.events)?;

    let mut gaps_config = Config::load()?.gaps;
    if let Some(start) = args.day_start {
        gaps_config.day_start = start;
    }
    if let Some(end) = args.day_end {
        gaps_config.day_end = end;
    }
    if let Some(min_gap) = args.min_gap {
        gaps_config.min_gap_minutes = min_gap;
    }
    if gaps_config.day_end < gaps_config.day_start {
        return Err(format!(
            "day end {} is before day start {}",
            gaps_config.day_end, gaps_config.day_start
        )
        .into());
    }

    let gaps = gaps_config
        .detector()
        .find_gaps(&events, gaps_config.day_start, gaps_config.day_end);
    if args.enrich {
        print_json(&enrich_gaps_with_location(&gaps, &events))
    } else {
        print_json(&gaps)
    }
}
