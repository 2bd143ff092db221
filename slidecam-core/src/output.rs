//! Video output element
//!
//! The single `<video>` element the plugin appends to the presentation
//! root. The stream manager drives playback on it, the visibility
//! controller drives its class list. Both hold the same shared handle,
//! so every method takes `&self`.

use std::sync::Arc;

use crate::media::MediaStream;

/// Base class on the video element; slide classes are appended to it
pub const BASE_CLASS: &str = "live-video";

/// The video output sink
pub trait VideoElement: Send + Sync {
    /// Id of the stream currently bound as source
    fn source_id(&self) -> Option<String>;

    /// Bind (or clear, with `None`) the source stream
    fn set_source(&self, stream: Option<Arc<dyn MediaStream>>);

    /// Pause playback
    fn pause(&self);

    /// Start playback
    fn play(&self);

    /// Whether playback is running
    fn is_playing(&self) -> bool;

    /// Set or clear the `data-enabled` marker the stylesheet keys on
    fn set_enabled(&self, enabled: bool);

    /// Reset the element so it shows no stale frame
    fn reload(&self);

    /// Replace the class attribute
    fn set_class(&self, class: &str);

    /// Current class attribute
    fn class(&self) -> String;
}

/// Class attribute for a slide-scoped video class
pub fn class_for(video_class: Option<&str>) -> String {
    match video_class {
        Some(class) => format!("{} {}", BASE_CLASS, class),
        None => BASE_CLASS.to_string(),
    }
}
