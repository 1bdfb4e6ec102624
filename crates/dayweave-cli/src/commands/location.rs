use std::path::PathBuf;

use clap::Args;
use dayweave_core::{build_location_spans, enrich_gaps_with_location, DayEvent, Gap};

use super::{print_json, read_json};

#[derive(Args)]
pub struct SpansArgs {
    /// JSON array of day events ("-" for stdin)
    #[arg(long)]
    events: PathBuf,
}

#[derive(Args)]
pub struct EnrichArgs {
    /// JSON array of gaps
    #[arg(long)]
    gaps: PathBuf,
    /// JSON array of day events
    #[arg(long)]
    events: PathBuf,
}

pub fn run_spans(args: SpansArgs) -> Result<(), Box<dyn std::error::Error>> {
    let events: Vec<DayEvent> = read_json(&args.events)?;
    print_json(&build_location_spans(&events))
}

pub fn run_enrich(args: EnrichArgs) -> Result<(), Box<dyn std::error::Error>> {
    let gaps: Vec<Gap> = read_json(&args.gaps)?;
    let events: Vec<DayEvent> = read_json(&args.events)?;
    print_json(&enrich_gaps_with_location(&gaps, &events))
}
