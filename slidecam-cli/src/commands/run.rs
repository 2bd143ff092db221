//! Run command - play a deck's events against the simulated camera

use anyhow::Result;
use clap::Args;
use slidecam_core::config::ConfigFile;
use slidecam_core::output::VideoElement;
use slidecam_core::plugin;
use slidecam_core::presentation::Presentation;
use slidecam_core::types::SessionStatus;
use slidecam_core::visibility::VisibilityController;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::deck::{Deck, DeckEvent};
use crate::sim::{SimMedia, SimPresentation};

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Deck file to play
    deck: PathBuf,

    /// Camera request latency in milliseconds (overrides the config file)
    #[arg(short, long)]
    latency_ms: Option<u64>,

    /// Fail every camera request with this platform error (e.g. NotAllowedError)
    #[arg(long)]
    fail: Option<String>,
}

/// Play a deck
pub async fn run(args: RunArgs) -> Result<()> {
    let config = ConfigFile::load_or_default();
    let deck = Deck::load(&args.deck)?;
    let events = deck.validate()?;

    let latency = Duration::from_millis(args.latency_ms.unwrap_or(config.simulator.latency_ms));
    let settle_timeout = Duration::from_millis(config.simulator.settle_timeout_ms);

    let host = SimPresentation::from_deck(&deck);
    let media = SimMedia::new(deck.devices.clone(), latency, args.fail.or(deck.fail.clone()));
    let mut controller =
        plugin::install_with_defaults(host.clone(), media.clone(), &config.embed_video)?;

    println!("Slidecam - {}\n", args.deck.display());
    for href in host.stylesheets() {
        println!("  Stylesheet: {}", href);
    }
    println!("  Cameras:    {}", deck.devices.iter().filter(|d| d.is_video_input()).count());
    println!("  Persistent: {}", controller.stream().is_persistent());
    println!();

    println!(
        "{:<5} {:<10} {:<7} {:<8} {:<28} {:<9} {}",
        "Step", "Event", "Slide", "Camera", "Class", "Status", "Device"
    );
    println!("{}", "-".repeat(84));
    print_row(0, "init", &host, &controller);

    for (index, event) in events.iter().enumerate() {
        match host.apply(event) {
            Some(host_event) => controller.handle_event(host_event),
            None => info!(%event, "Event had no effect on the host"),
        }

        if host.is_ready() {
            if tokio::time::timeout(settle_timeout, controller.stream().settled())
                .await
                .is_err()
            {
                warn!(
                    timeout_ms = settle_timeout.as_millis() as u64,
                    "Camera request still pending"
                );
            }
        }

        print_row(index + 1, &event_label(event), &host, &controller);
    }

    println!();
    println!("Camera requests:  {}", controller.stream().acquisition_count());
    println!("Streams opened:   {}", media.issued_count());
    println!("Streams running:  {}", media.live_streams());
    if let Some(shortcut) = host.shortcuts().first() {
        println!("Shortcut:         [{}] {}", shortcut.0, shortcut.1);
    }
    if let Some(error) = controller.stream().last_error() {
        println!("Last error:       {}", error);
    }

    Ok(())
}

fn event_label(event: &DeckEvent) -> String {
    match event {
        DeckEvent::Key(code) => match char::from_u32(*code).filter(char::is_ascii_alphanumeric) {
            Some(c) => format!("key {}", c),
            None => event.to_string(),
        },
        other => other.to_string(),
    }
}

fn print_row(
    step: usize,
    event: &str,
    host: &SimPresentation,
    controller: &VisibilityController,
) {
    let stream = controller.stream();
    let slide = host
        .current_slide()
        .map(|s| s.as_u64().to_string())
        .unwrap_or_else(|| "-".to_string());
    let camera = if controller.is_enabled() { "on" } else { "off" };
    let device = match stream.status() {
        SessionStatus::Active => stream
            .current_device()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    let video = host.video();
    let class = if video.is_enabled() {
        video.class()
    } else {
        format!("{} (idle)", video.class())
    };

    println!(
        "{:<5} {:<10} {:<7} {:<8} {:<28} {:<9} {}",
        step,
        event,
        slide,
        camera,
        class,
        stream.status().to_string(),
        device
    );
}
