//! Duet CLI - offline renderer and inspection tools for the duet synth.

mod commands;
mod player;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet")]
#[command(author, version, about = "Duet two-voice synth CLI", long_about = None)]
struct Cli {
    /// Show debug logging from the synth engine
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a score to a WAV file
    Render(commands::render::RenderArgs),

    /// List the front-panel pots and their ranges
    Pots(commands::pots::PotsArgs),

    /// Inspect or erase the persisted MIDI channel settings
    Store(commands::store::StoreArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Pots(args) => commands::pots::run(&args),
        Commands::Store(args) => commands::store::run(args),
    }
}
