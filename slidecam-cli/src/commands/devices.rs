//! Devices command - list the media devices a deck provides

use anyhow::Result;
use clap::Args;
use slidecam_core::media::MediaDevices;
use std::path::PathBuf;
use std::time::Duration;

use crate::deck::Deck;
use crate::sim::SimMedia;

/// Arguments for the devices command
#[derive(Args)]
pub struct DevicesArgs {
    /// Deck file; the built-in simulated camera is listed when omitted
    deck: Option<PathBuf>,
}

/// List media devices
pub async fn devices(args: DevicesArgs) -> Result<()> {
    println!("Slidecam - Media Devices\n");

    let deck = match &args.deck {
        Some(path) => Deck::load(path)?,
        None => "".parse()?,
    };
    let media = SimMedia::new(deck.devices.clone(), Duration::ZERO, None);
    let devices = media.enumerate_devices().await?;

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(());
    }

    println!("{:<24} {:<32} {:<12}", "ID", "Label", "Kind");
    println!("{}", "-".repeat(70));

    for device in &devices {
        println!(
            "{:<24} {:<32} {:<12}",
            truncate(device.id.as_str(), 22),
            truncate(&device.label, 30),
            device.kind.to_string()
        );
    }

    let cameras = devices.iter().filter(|d| d.is_video_input()).count();
    println!();
    match cameras {
        0 => println!("No cameras: every camera request will fail."),
        1 => println!("1 camera. Clicking the video has no effect."),
        n => println!("{} cameras. Click the video to cycle through them in this order.", n),
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    }
}
