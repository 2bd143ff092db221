//! Slide visibility controller
//!
//! Decides, on every navigation or toggle, whether the current slide
//! shows the camera and with which class, then drives the stream.
//!
//! A slide opts in with a `data-video` attribute, on itself or on any
//! ancestor. The nearest non-empty value wins. `blank` opts a slide out
//! under an opted-in ancestor. Resolved values are memoized per slide
//! for the life of the presentation.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::output::{BASE_CLASS, VideoElement, class_for};
use crate::presentation::{Presentation, PresentationEvent};
use crate::shortcut::Shortcut;
use crate::stream::LiveStream;
use crate::types::SlideId;

/// Slide attribute selecting the video class
pub const VIDEO_ATTRIBUTE: &str = "data-video";

/// Cached value for slides that resolved to nothing
const UNRESOLVED: &str = "false";

/// Opt-out value
const BLANK: &str = "blank";

/// Resolved visibility of a slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoClass {
    /// No camera on this slide
    Hidden,
    /// Camera shown, styled by this class
    Visible(String),
}

impl VideoClass {
    /// Interpret a resolved attribute value
    pub fn from_resolved(value: &str) -> Self {
        match value {
            "" | UNRESOLVED | BLANK => Self::Hidden,
            class => Self::Visible(class.to_string()),
        }
    }

    /// The class name, if visible
    pub fn as_class(&self) -> Option<&str> {
        match self {
            Self::Hidden => None,
            Self::Visible(class) => Some(class),
        }
    }

    /// Whether the camera shows
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }
}

impl std::fmt::Display for VideoClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hidden => write!(f, "(hidden)"),
            Self::Visible(class) => write!(f, "{}", class),
        }
    }
}

/// Memoized `data-video` resolution keyed by slide
#[derive(Debug, Default)]
pub struct ClassCache {
    resolved: HashMap<SlideId, String>,
}

impl ClassCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a slide's video class, walking ancestors on first visit
    pub fn resolve(&mut self, presentation: &dyn Presentation, slide: SlideId) -> VideoClass {
        if let Some(value) = self.resolved.get(&slide) {
            trace!(%slide, value = %value, "Video class cache hit");
            return VideoClass::from_resolved(value);
        }

        let value = lookup(presentation, slide).unwrap_or_else(|| UNRESOLVED.to_string());
        debug!(%slide, value = %value, "Resolved video class");
        let class = VideoClass::from_resolved(&value);
        self.resolved.insert(slide, value);
        class
    }

    /// Cached raw value for a slide (`"false"` when nothing was found)
    pub fn cached(&self, slide: SlideId) -> Option<&str> {
        self.resolved.get(&slide).map(String::as_str)
    }

    /// Number of slides resolved so far
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Whether nothing has been resolved yet
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Nearest non-empty `data-video` value, starting at `slide`
fn lookup(presentation: &dyn Presentation, slide: SlideId) -> Option<String> {
    let mut node = Some(slide);
    while let Some(id) = node {
        let value = presentation
            .slide_attribute(id, VIDEO_ATTRIBUTE)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if value.is_some() {
            return value;
        }
        node = presentation.parent(id);
    }
    None
}

/// Couples slide navigation to the camera stream
pub struct VisibilityController {
    presentation: Arc<dyn Presentation>,
    video: Arc<dyn VideoElement>,
    stream: LiveStream,
    shortcut: Shortcut,
    enabled: bool,
    registered: bool,
    classes: ClassCache,
}

impl VisibilityController {
    /// Create a controller; tags the video element with the base class
    pub fn new(
        presentation: Arc<dyn Presentation>,
        video: Arc<dyn VideoElement>,
        stream: LiveStream,
        enabled: bool,
    ) -> Self {
        video.set_class(BASE_CLASS);

        Self {
            presentation,
            video,
            stream,
            shortcut: Shortcut::toggle_camera(),
            enabled,
            registered: false,
            classes: ClassCache::new(),
        }
    }

    /// Use a different toggle key; takes effect if set before the first update
    pub fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = shortcut;
        self
    }

    /// Dispatch a host event
    pub fn handle_event(&mut self, event: PresentationEvent) {
        match event {
            PresentationEvent::Ready | PresentationEvent::SlideChanged => self.update(),
            PresentationEvent::KeyPressed(code) if code == self.shortcut.key_code => {
                self.toggle();
            }
            PresentationEvent::KeyPressed(code) => trace!(code, "Ignoring unbound key"),
            PresentationEvent::VideoClicked => self.stream.next(),
        }
    }

    /// Flip the enabled flag and re-evaluate; returns the new flag.
    ///
    /// Turning the camera on also clears a previous acquisition error,
    /// so the toggle key doubles as a retry.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!(enabled = self.enabled, "Camera toggled");
        if self.enabled && self.stream.reset() {
            debug!("Retrying camera after error");
        }
        self.update();
        self.enabled
    }

    /// Re-evaluate visibility for the current slide
    pub fn update(&mut self) {
        self.register_shortcut();

        let class = match self.presentation.current_slide() {
            Some(slide) => self.classes.resolve(self.presentation.as_ref(), slide),
            None => VideoClass::Hidden,
        };

        match class.as_class().filter(|_| self.enabled) {
            Some(name) => {
                self.video.set_class(&class_for(Some(name)));
                self.stream.start();
            }
            None => {
                self.video.set_class(BASE_CLASS);
                if self.stream.is_active() || self.stream.is_pending() {
                    self.stream.stop();
                }
            }
        }
    }

    /// Register the toggle key with the host, once
    fn register_shortcut(&mut self) {
        if self.registered {
            return;
        }
        self.registered = true;
        self.presentation
            .register_keyboard_shortcut(&self.shortcut.key, &self.shortcut.description);
        self.presentation.bind_key(self.shortcut.key_code);
        debug!(shortcut = %self.shortcut, "Registered keyboard shortcut");
    }

    /// Resolve a slide's class without touching the stream
    pub fn video_class(&mut self, slide: SlideId) -> VideoClass {
        self.classes.resolve(self.presentation.as_ref(), slide)
    }

    /// Whether the user has the camera turned on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the shortcut was registered with the host
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// The toggle shortcut
    pub fn shortcut(&self) -> &Shortcut {
        &self.shortcut
    }

    /// The managed stream
    pub fn stream(&self) -> &LiveStream {
        &self.stream
    }

    /// The video element
    pub fn video(&self) -> &Arc<dyn VideoElement> {
        &self.video
    }

    /// Resolution cache
    pub fn classes(&self) -> &ClassCache {
        &self.classes
    }
}
