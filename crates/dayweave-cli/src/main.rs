use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dayweave", version, about = "Dayweave suggestion scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place suggestions into free gaps
    Schedule(commands::schedule::ScheduleArgs),
    /// Detect free gaps between day events
    Gaps(commands::gaps::GapsArgs),
    /// Show the location spans built from day events
    Spans(commands::location::SpansArgs),
    /// Label gaps with a likely location
    Enrich(commands::location::EnrichArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DAYWEAVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Schedule(args) => commands::schedule::run(args),
        Commands::Gaps(args) => commands::gaps::run(args),
        Commands::Spans(args) => commands::location::run_spans(args),
        Commands::Enrich(args) => commands::location::run_enrich(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
