//! Deck files - a slide tree, cameras and a scripted event list
//!
//! ```toml
//! events = ["ready", "key C", "next", "click", "goto 4"]
//!
//! [embed-video]
//! persistent = true
//!
//! [[devices]]
//! id = "front"
//! kind = "videoinput"
//! label = "Built-in camera"
//!
//! [[slides]]
//! id = 1
//! video = "corner"
//!
//! [[slides]]
//! id = 2
//! parent = 1
//! ```
//!
//! A slide that other slides name as their parent is a section: it
//! carries attributes for its children but is never shown itself.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use slidecam_core::config::CONFIG_KEY;
use slidecam_core::shortcut;
use slidecam_core::types::{DeviceInfo, DeviceKind};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A parsed deck file
#[derive(Debug, Clone, Deserialize)]
pub struct Deck {
    /// Scripted host events, applied in order
    #[serde(default)]
    pub events: Vec<String>,

    /// Host configuration section for the plugin
    #[serde(default, rename = "embed-video")]
    pub embed_video: Option<serde_json::Value>,

    /// URL the plugin script was loaded from
    #[serde(default)]
    pub script_src: Option<String>,

    /// Platform error name every camera request fails with
    #[serde(default)]
    pub fail: Option<String>,

    /// Media devices known to the simulated platform
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceInfo>,

    /// Slide elements, in document order
    #[serde(default)]
    pub slides: Vec<SlideEntry>,
}

/// One slide element
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlideEntry {
    pub id: u64,
    #[serde(default)]
    pub parent: Option<u64>,
    /// Value of the `data-video` attribute
    #[serde(default)]
    pub video: Option<String>,
}

fn default_devices() -> Vec<DeviceInfo> {
    vec![DeviceInfo::new("default", DeviceKind::VideoInput).with_label("Simulated camera")]
}

/// A scripted host event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckEvent {
    /// The host finished loading
    Ready,
    /// Advance to the next shown slide
    Next,
    /// Go back to the previous shown slide
    Prev,
    /// Jump to a slide by id
    Goto(u64),
    /// A key press, as a key code
    Key(u32),
    /// A click on the video element
    Click,
}

impl std::str::FromStr for DeckEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();
        if parts.next().is_some() {
            bail!("Too many arguments in event '{}'", s);
        }

        let event = match (name.as_str(), arg) {
            ("ready", None) => Self::Ready,
            ("next", None) => Self::Next,
            ("prev", None) => Self::Prev,
            ("click", None) => Self::Click,
            ("goto", Some(id)) => Self::Goto(
                id.parse()
                    .with_context(|| format!("Invalid slide id in event '{}'", s))?,
            ),
            ("key", Some(key)) => Self::Key(shortcut::key_code(key)?),
            _ => bail!(
                "Unknown event '{}'. Valid events: ready, next, prev, goto <id>, key <name>, click",
                s
            ),
        };
        Ok(event)
    }
}

impl std::fmt::Display for DeckEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Next => write!(f, "next"),
            Self::Prev => write!(f, "prev"),
            Self::Goto(id) => write!(f, "goto {}", id),
            Self::Key(code) => write!(f, "key {}", code),
            Self::Click => write!(f, "click"),
        }
    }
}

impl Deck {
    /// Load and validate a deck file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read deck file {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Invalid deck file {}", path.display()))
    }

    /// Check the slide tree and parse the event list
    pub fn validate(&self) -> Result<Vec<DeckEvent>> {
        let mut parents = HashMap::new();
        for slide in &self.slides {
            if parents.insert(slide.id, slide.parent).is_some() {
                bail!("Duplicate slide id {}", slide.id);
            }
        }

        for slide in &self.slides {
            let mut seen = HashSet::from([slide.id]);
            let mut node = slide.parent;
            while let Some(id) = node {
                let Some(parent) = parents.get(&id) else {
                    bail!("Slide {} has unknown parent {}", slide.id, id);
                };
                if !seen.insert(id) {
                    bail!("Slide {} is part of a parent cycle", slide.id);
                }
                node = *parent;
            }
        }

        let events = self
            .events
            .iter()
            .map(|event| event.parse::<DeckEvent>())
            .collect::<Result<Vec<_>>>()?;

        for event in &events {
            if let DeckEvent::Goto(id) = event {
                if !self.shown_slides().contains(id) {
                    bail!("Event '{}' targets slide {} which is never shown", event, id);
                }
            }
        }

        Ok(events)
    }

    /// Ids of the slides that can be shown, in document order
    pub fn shown_slides(&self) -> Vec<u64> {
        let sections: HashSet<u64> = self.slides.iter().filter_map(|s| s.parent).collect();
        self.slides
            .iter()
            .map(|s| s.id)
            .filter(|id| !sections.contains(id))
            .collect()
    }

    /// Host configuration mapping as the plugin reads it
    pub fn host_config(&self) -> serde_json::Value {
        let mut config = serde_json::Map::new();
        if let Some(section) = &self.embed_video {
            config.insert(CONFIG_KEY.to_string(), section.clone());
        }
        serde_json::Value::Object(config)
    }
}

impl std::str::FromStr for Deck {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let deck: Deck = toml::from_str(s)?;
        deck.validate()?;
        Ok(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
events = ["ready", "key C", "next", "goto 3", "click"]

[embed-video]
persistent = true

[[slides]]
id = 1
video = "corner"

[[slides]]
id = 2
parent = 1

[[slides]]
id = 3
video = "blank"
"#;

    #[test]
    fn test_parse_deck() {
        let deck: Deck = SAMPLE.parse().unwrap();
        assert_eq!(deck.slides.len(), 3);
        assert_eq!(deck.shown_slides(), vec![2, 3]);
        assert_eq!(deck.devices.len(), 1);
        assert_eq!(
            deck.host_config()["embed-video"]["persistent"],
            serde_json::json!(true)
        );
        assert_eq!(
            deck.validate().unwrap(),
            vec![
                DeckEvent::Ready,
                DeckEvent::Key(67),
                DeckEvent::Next,
                DeckEvent::Goto(3),
                DeckEvent::Click,
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_parent() {
        let result = "[[slides]]\nid = 1\nparent = 9\n".parse::<Deck>();
        assert!(result.unwrap_err().to_string().contains("unknown parent"));
    }

    #[test]
    fn test_rejects_parent_cycle() {
        let deck = "[[slides]]\nid = 1\nparent = 2\n\n[[slides]]\nid = 2\nparent = 1\n";
        assert!(deck.parse::<Deck>().unwrap_err().to_string().contains("cycle"));
    }

    #[test]
    fn test_rejects_goto_section() {
        let deck = "events = [\"goto 1\"]\n\n[[slides]]\nid = 1\n\n[[slides]]\nid = 2\nparent = 1\n";
        assert!(deck.parse::<Deck>().is_err());
    }

    #[test]
    fn test_event_parsing() {
        assert_eq!("Ready".parse::<DeckEvent>().unwrap(), DeckEvent::Ready);
        assert_eq!("key space".parse::<DeckEvent>().unwrap(), DeckEvent::Key(32));
        assert!("goto".parse::<DeckEvent>().is_err());
        assert!("jump 3".parse::<DeckEvent>().is_err());
        assert!("key C D".parse::<DeckEvent>().is_err());
    }
}
