//! trigeff CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod run;

#[derive(Parser)]
#[command(name = "trigeff")]
#[command(about = "trigeff - trigger turn-on efficiencies against offline objects")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure efficiencies and write plot artifacts
    Run {
        /// Run configuration (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Offline events (JSON lines)
        #[arg(short, long)]
        events: PathBuf,

        /// Output directory for plot artifacts and the run report
        #[arg(short, long, default_value = "Plot")]
        output_dir: PathBuf,

        /// Threads for curve building (0 = auto).
        #[arg(long, default_value = "1")]
        threads: usize,

        /// Process at most this many offline events.
        #[arg(long)]
        max_events: Option<usize>,
    },

    /// Validate a run configuration and print the counter layout (JSON)
    Validate {
        /// Run configuration (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { config, events, output_dir, threads, max_events } => {
            run::cmd_run(&config, &events, &output_dir, threads, max_events)
        }
        Commands::Validate { config, output } => run::cmd_validate(&config, output.as_ref()),
        Commands::Version => {
            println!("trigeff {}", te_core::VERSION);
            Ok(())
        }
    }
}
