//! Config command - inspect and create the user configuration

use anyhow::Result;
use clap::{Args, Subcommand};
use slidecam_core::config::{ConfigFile, EmbedVideoOptions, sample_config};
use std::fmt::Write;
use std::path::PathBuf;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,

    /// Use this file instead of the default location
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the path to the config file
    Path,

    /// Show the options a deck without its own settings would get
    Show,

    /// Write the sample config file
    Init {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the sample configuration to stdout
    Sample,
}

/// Run config subcommand
pub async fn config(args: ConfigArgs) -> Result<()> {
    let path = args.file.unwrap_or_else(ConfigFile::default_path);

    match args.command {
        ConfigCommand::Path => {
            let state = if path.exists() { "exists" } else { "not created yet" };
            println!("{} ({})", path.display(), state);
        }
        ConfigCommand::Show => {
            let config = ConfigFile::load_from(&path)?;
            if path.exists() {
                println!("Configuration file: {}\n", path.display());
            } else {
                println!("No configuration file at {}, showing defaults.\n", path.display());
            }
            print!("{}", render(&config));
        }
        ConfigCommand::Init { force } => {
            if ConfigFile::init_at(&path, force)? {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists; pass --force to replace it.", path.display());
            }
        }
        ConfigCommand::Sample => print!("{}", sample_config()),
    }

    Ok(())
}

/// Effective plugin options and simulator settings for a config file
fn render(config: &ConfigFile) -> String {
    let file = &config.embed_video;
    let options = EmbedVideoOptions::default().merged_over(file).resolve(None);
    let origin = |set: bool| if set { "file" } else { "default" };

    let mut out = String::new();
    let _ = writeln!(out, "Camera:");
    let _ = writeln!(
        out,
        "  Enabled:      {:<28} ({})",
        options.enabled,
        origin(file.enabled.is_some())
    );
    let _ = writeln!(
        out,
        "  Persistent:   {:<28} ({})",
        options.persistent,
        origin(file.persistent.is_some())
    );
    let _ = writeln!(
        out,
        "  Path:         {:<28} ({})",
        options.path,
        origin(file.path.is_some())
    );
    let _ = writeln!(out, "  Stylesheet:   {}", options.stylesheet_href());
    let _ = writeln!(
        out,
        "  Shortcut:     {:<28} ({})",
        options.shortcut().to_string(),
        origin(file.key.is_some())
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Simulator:");
    let _ = writeln!(out, "  Latency:      {} ms", config.simulator.latency_ms);
    let _ = writeln!(out, "  Settle limit: {} ms", config.simulator.settle_timeout_ms);
    let _ = writeln!(out);
    let _ = writeln!(out, "Options in a deck's [embed-video] table override these.");
    out
}
