//! Resolve command - show which slides display the camera

use anyhow::Result;
use clap::Args;
use slidecam_core::config::ConfigFile;
use slidecam_core::plugin;
use slidecam_core::presentation::Presentation;
use slidecam_core::types::SlideId;
use slidecam_core::visibility::{ClassCache, VIDEO_ATTRIBUTE};
use std::path::PathBuf;

use crate::deck::Deck;
use crate::sim::SimPresentation;

/// Arguments for the resolve command
#[derive(Args)]
pub struct ResolveArgs {
    /// Deck file to inspect
    deck: PathBuf,
}

/// Print the resolved video class of every slide
pub async fn resolve(args: ResolveArgs) -> Result<()> {
    let deck = Deck::load(&args.deck)?;
    let config = ConfigFile::load_or_default();
    let host = SimPresentation::from_deck(&deck);
    let options = plugin::resolve_options(&*host, &config.embed_video);

    println!("Slidecam - {}\n", args.deck.display());
    println!("Plugin options:");
    println!("  Enabled:     {}", options.enabled);
    println!("  Persistent:  {}", options.persistent);
    println!("  Path:        {}", options.path);
    println!("  Stylesheet:  {}", options.stylesheet_href());
    println!();

    println!(
        "{:<8} {:<8} {:<16} {:<20} {}",
        "Slide", "Parent", VIDEO_ATTRIBUTE, "Class", "Shown"
    );
    println!("{}", "-".repeat(62));

    let mut classes = ClassCache::new();
    for entry in &deck.slides {
        let slide = SlideId::new(entry.id);
        let class = classes.resolve(&*host, slide);
        let parent = host
            .parent(slide)
            .map(|p| p.as_u64().to_string())
            .unwrap_or_else(|| "-".to_string());
        let shown = host.shown_slides().contains(&slide);

        println!(
            "{:<8} {:<8} {:<16} {:<20} {}",
            entry.id,
            parent,
            entry.video.as_deref().unwrap_or("-"),
            class.to_string(),
            if shown { "yes" } else { "section" }
        );
    }

    Ok(())
}
