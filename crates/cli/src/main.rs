//! Driftmind CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config, studio, and memory directories
//! - `run`     — Start the autonomous loop (Ctrl-C to stop)
//! - `status`  — Show memory and studio state

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "driftmind",
    about = "Driftmind — an autonomous creative agent runtime",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration, studio, and memory directories
    Onboard,

    /// Start the autonomous loop
    Run,

    /// Show memory and studio state
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run => commands::run::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
