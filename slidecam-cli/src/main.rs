//! Slidecam CLI
//!
//! Plays slide decks against a simulated camera, to check which slides
//! show the speaker video and how the camera stream behaves.
//!
//! # Usage
//!
//! ```bash
//! # Play a deck's scripted events
//! slidecam run talk.toml --latency-ms 200
//!
//! # Show the resolved video class of every slide
//! slidecam resolve talk.toml
//!
//! # List the cameras a deck provides
//! slidecam devices talk.toml
//! ```

mod commands;
mod deck;
mod sim;

use anyhow::Result;
use clap::{Parser, Subcommand};
use slidecam_core::SlidecamError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Slidecam - live webcam overlay for slide presentations
#[derive(Parser)]
#[command(name = "slidecam")]
#[command(author = "GhostKellz")]
#[command(version)]
#[command(about = "Live webcam overlay for slide presentations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a deck's events against the simulated camera
    Run(commands::RunArgs),

    /// Show which slides display the camera
    Resolve(commands::ResolveArgs),

    /// List media devices
    #[command(alias = "ls")]
    Devices(commands::DevicesArgs),

    /// Manage the configuration file
    Config(commands::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("slidecam={}", level).parse()?)
                .add_directive(format!("slidecam_core={}", level).parse()?),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => commands::run(args).await,
        Commands::Resolve(args) => commands::resolve(args).await,
        Commands::Devices(args) => commands::devices(args).await,
        Commands::Config(args) => commands::config(args).await,
    };

    if let Err(e) = &result {
        if let Some(hint) = e.downcast_ref::<SlidecamError>().and_then(|e| e.user_hint()) {
            eprintln!("Hint: {}", hint);
        }
    }

    result
}
