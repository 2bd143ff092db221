//! Presentation host interface
//!
//! Everything the plugin consumes from the slide framework is reached
//! through [`Presentation`], handed to the controller at construction.
//! Host events are delivered as [`PresentationEvent`]s.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use crate::output::VideoElement;
use crate::types::SlideId;

/// Events the host delivers to the plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationEvent {
    /// The presentation finished initializing
    Ready,
    /// Navigation moved to another slide
    SlideChanged,
    /// A key bound through [`Presentation::bind_key`] was pressed
    KeyPressed(u32),
    /// The video element was clicked
    VideoClicked,
}

/// Sending half of the host readiness flag
#[derive(Debug)]
pub struct ReadinessHandle {
    tx: watch::Sender<bool>,
}

impl ReadinessHandle {
    /// Flag the presentation as ready, waking every pending subscriber
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    /// Number of live receivers, including tasks waiting for readiness
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get a receiving half
    pub fn readiness(&self) -> Readiness {
        Readiness {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving half of the host readiness flag
#[derive(Debug, Clone)]
pub struct Readiness {
    rx: watch::Receiver<bool>,
}

impl Readiness {
    /// A flag that is already set
    pub fn ready() -> Self {
        let (handle, readiness) = readiness();
        handle.mark_ready();
        readiness
    }

    /// Whether the host is ready
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the host is ready.
    ///
    /// Returns `false` if the host went away before becoming ready.
    pub async fn wait(&self) -> bool {
        let mut rx = self.rx.clone();
        rx.wait_for(|ready| *ready).await.is_ok()
    }
}

/// Create a readiness flag, initially not ready
pub fn readiness() -> (ReadinessHandle, Readiness) {
    let (tx, rx) = watch::channel(false);
    (ReadinessHandle { tx }, Readiness { rx })
}

/// The slide framework, as seen by the plugin
pub trait Presentation: Send + Sync {
    /// Host readiness flag
    fn readiness(&self) -> Readiness;

    /// Slide currently shown
    fn current_slide(&self) -> Option<SlideId>;

    /// Read an attribute of a slide element
    fn slide_attribute(&self, slide: SlideId, name: &str) -> Option<String>;

    /// Structural parent of a slide element
    fn parent(&self, slide: SlideId) -> Option<SlideId>;

    /// Add a key description to the help overlay
    fn register_keyboard_shortcut(&self, key: &str, description: &str);

    /// Route presses of `key_code` to the plugin as [`PresentationEvent::KeyPressed`]
    fn bind_key(&self, key_code: u32);

    /// The host configuration mapping
    fn config(&self) -> Value;

    /// URL of the script that loaded the plugin, if the host knows it
    fn script_src(&self) -> Option<String> {
        None
    }

    /// Append a stylesheet link to the document head
    fn add_stylesheet(&self, href: &str);

    /// Append a video element to the presentation root
    fn create_video_element(&self) -> Arc<dyn VideoElement>;
}
