//! Simulated presentation host and camera platform
//!
//! Drives the plugin from a [`Deck`] without a browser. Camera requests
//! complete after a configurable latency and can be made to fail with a
//! named platform error.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use slidecam_core::error::{Result, SlidecamError};
use slidecam_core::media::{MediaDevices, MediaStream, MediaTrack, TrackKind, TrackSettings};
use slidecam_core::output::VideoElement;
use slidecam_core::presentation::{
    Presentation, PresentationEvent, Readiness, ReadinessHandle, readiness,
};
use slidecam_core::types::{DeviceId, DeviceInfo, MediaConstraints, SlideId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

use crate::deck::{Deck, DeckEvent};

/// Host side of a deck
pub struct SimPresentation {
    ready: ReadinessHandle,
    config: Value,
    script_src: Option<String>,
    parents: HashMap<SlideId, SlideId>,
    videos: HashMap<SlideId, String>,
    shown: Vec<SlideId>,
    current: Mutex<Option<SlideId>>,
    shortcuts: Mutex<Vec<(String, String)>>,
    bound_keys: Mutex<Vec<u32>>,
    stylesheets: Mutex<Vec<String>>,
    video: Arc<SimVideo>,
}

impl SimPresentation {
    /// Build the host for a deck, positioned on its first shown slide
    pub fn from_deck(deck: &Deck) -> Arc<Self> {
        let parents = deck
            .slides
            .iter()
            .filter_map(|s| s.parent.map(|p| (SlideId::new(s.id), SlideId::new(p))))
            .collect();
        let videos = deck
            .slides
            .iter()
            .filter_map(|s| s.video.clone().map(|v| (SlideId::new(s.id), v)))
            .collect();
        let shown: Vec<SlideId> = deck.shown_slides().into_iter().map(SlideId::new).collect();
        let (ready, _) = readiness();

        Arc::new(Self {
            ready,
            config: deck.host_config(),
            script_src: deck.script_src.clone(),
            parents,
            videos,
            current: Mutex::new(shown.first().copied()),
            shown,
            shortcuts: Mutex::new(Vec::new()),
            bound_keys: Mutex::new(Vec::new()),
            stylesheets: Mutex::new(Vec::new()),
            video: Arc::new(SimVideo::default()),
        })
    }

    /// Apply a scripted event, returning what the host would report
    pub fn apply(&self, event: &DeckEvent) -> Option<PresentationEvent> {
        match event {
            DeckEvent::Ready => {
                self.ready.mark_ready();
                Some(PresentationEvent::Ready)
            }
            DeckEvent::Next => self.navigate(|index| index + 1),
            DeckEvent::Prev => self.navigate(|index| index.saturating_sub(1)),
            DeckEvent::Goto(id) => {
                let target = SlideId::new(*id);
                let index = self.shown.iter().position(|s| *s == target)?;
                self.navigate(|_| index)
            }
            DeckEvent::Key(code) => {
                if self.bound_keys.lock().contains(code) {
                    Some(PresentationEvent::KeyPressed(*code))
                } else {
                    trace!(code, "Key not bound by any plugin");
                    None
                }
            }
            DeckEvent::Click => Some(PresentationEvent::VideoClicked),
        }
    }

    fn navigate(&self, to: impl FnOnce(usize) -> usize) -> Option<PresentationEvent> {
        let mut current = self.current.lock();
        let index = current
            .and_then(|slide| self.shown.iter().position(|s| *s == slide))
            .unwrap_or(0);
        let target = self.shown.get(to(index).min(self.shown.len().checked_sub(1)?))?;
        if *current == Some(*target) {
            return None;
        }
        *current = Some(*target);
        debug!(slide = %target, "Slide changed");
        Some(PresentationEvent::SlideChanged)
    }

    /// Whether the `ready` event has been applied
    pub fn is_ready(&self) -> bool {
        self.ready.readiness().is_ready()
    }

    /// Shown slides, in order
    pub fn shown_slides(&self) -> &[SlideId] {
        &self.shown
    }

    /// Shortcuts registered with the help overlay
    pub fn shortcuts(&self) -> Vec<(String, String)> {
        self.shortcuts.lock().clone()
    }

    /// Stylesheets added to the document
    pub fn stylesheets(&self) -> Vec<String> {
        self.stylesheets.lock().clone()
    }

    /// The video element the plugin created
    pub fn video(&self) -> &Arc<SimVideo> {
        &self.video
    }
}

impl Presentation for SimPresentation {
    fn readiness(&self) -> Readiness {
        self.ready.readiness()
    }

    fn current_slide(&self) -> Option<SlideId> {
        *self.current.lock()
    }

    fn slide_attribute(&self, slide: SlideId, name: &str) -> Option<String> {
        match name {
            slidecam_core::visibility::VIDEO_ATTRIBUTE => self.videos.get(&slide).cloned(),
            _ => None,
        }
    }

    fn parent(&self, slide: SlideId) -> Option<SlideId> {
        self.parents.get(&slide).copied()
    }

    fn register_keyboard_shortcut(&self, key: &str, description: &str) {
        self.shortcuts
            .lock()
            .push((key.to_string(), description.to_string()));
    }

    fn bind_key(&self, key_code: u32) {
        self.bound_keys.lock().push(key_code);
    }

    fn config(&self) -> Value {
        self.config.clone()
    }

    fn script_src(&self) -> Option<String> {
        self.script_src.clone()
    }

    fn add_stylesheet(&self, href: &str) {
        self.stylesheets.lock().push(href.to_string());
    }

    fn create_video_element(&self) -> Arc<dyn VideoElement> {
        self.video.clone()
    }
}

#[derive(Default)]
struct VideoState {
    source: Option<Arc<dyn MediaStream>>,
    playing: bool,
    enabled: bool,
    class: String,
}

/// In-memory video element
#[derive(Default)]
pub struct SimVideo {
    state: Mutex<VideoState>,
}

impl SimVideo {
    /// Whether the element is enabled
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }
}

impl VideoElement for SimVideo {
    fn source_id(&self) -> Option<String> {
        self.state.lock().source.as_ref().map(|s| s.id().to_string())
    }

    fn set_source(&self, stream: Option<Arc<dyn MediaStream>>) {
        self.state.lock().source = stream;
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn play(&self) {
        let mut state = self.state.lock();
        state.playing = state.source.is_some();
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    fn reload(&self) {
        let mut state = self.state.lock();
        state.playing = false;
    }

    fn set_class(&self, class: &str) {
        self.state.lock().class = class.to_string();
    }

    fn class(&self) -> String {
        self.state.lock().class.clone()
    }
}

/// Camera track of a simulated stream
pub struct SimTrack {
    device: DeviceId,
    stopped: AtomicBool,
}

impl MediaTrack for SimTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn settings(&self) -> TrackSettings {
        TrackSettings {
            device_id: Some(self.device.clone()),
            width: Some(1280),
            height: Some(720),
        }
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            debug!(device = %self.device, "Camera track stopped");
        }
    }
}

/// A simulated camera stream
pub struct SimStream {
    id: String,
    track: Arc<SimTrack>,
}

impl SimStream {
    /// Whether the camera track was stopped
    pub fn is_stopped(&self) -> bool {
        self.track.stopped.load(Ordering::SeqCst)
    }
}

impl MediaStream for SimStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        vec![self.track.clone()]
    }
}

/// Simulated camera platform
pub struct SimMedia {
    devices: Vec<DeviceInfo>,
    latency: Duration,
    fail: Option<String>,
    next_id: AtomicU64,
    issued: Mutex<Vec<Arc<SimStream>>>,
}

impl SimMedia {
    /// Create a platform with the given devices
    pub fn new(devices: Vec<DeviceInfo>, latency: Duration, fail: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            devices,
            latency,
            fail,
            next_id: AtomicU64::new(1),
            issued: Mutex::new(Vec::new()),
        })
    }

    /// Number of camera requests that succeeded
    pub fn issued_count(&self) -> usize {
        self.issued.lock().len()
    }

    /// Streams whose camera is still running
    pub fn live_streams(&self) -> usize {
        self.issued.lock().iter().filter(|s| !s.is_stopped()).count()
    }
}

#[async_trait]
impl MediaDevices for SimMedia {
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>> {
        Ok(self.devices.clone())
    }

    async fn get_user_media(&self, constraints: &MediaConstraints) -> Result<Arc<dyn MediaStream>> {
        debug!(%constraints, "Camera requested");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(name) = &self.fail {
            return Err(SlidecamError::from_platform(name, "Simulated failure"));
        }

        let mut cameras = self.devices.iter().filter(|d| d.is_video_input());
        let device = match constraints.device() {
            Some(wanted) => cameras.find(|d| &d.id == wanted).ok_or_else(|| {
                SlidecamError::from_platform("OverconstrainedError", format!("No camera {}", wanted))
            })?,
            None => cameras
                .next()
                .ok_or_else(|| SlidecamError::from_platform("NotFoundError", "No camera attached"))?,
        };

        let stream = Arc::new(SimStream {
            id: format!("sim-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            track: Arc::new(SimTrack {
                device: device.id.clone(),
                stopped: AtomicBool::new(false),
            }),
        });
        self.issued.lock().push(stream.clone());
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidecam_core::types::DeviceKind;

    fn deck() -> Deck {
        r#"
[[slides]]
id = 1
video = "corner"

[[slides]]
id = 2
parent = 1

[[slides]]
id = 3
"#
        .parse()
        .unwrap()
    }

    #[test]
    fn test_navigation_skips_sections() {
        let host = SimPresentation::from_deck(&deck());
        assert_eq!(host.current_slide(), Some(SlideId::new(2)));
        assert_eq!(host.parent(SlideId::new(2)), Some(SlideId::new(1)));

        assert_eq!(host.apply(&DeckEvent::Prev), None);
        assert_eq!(
            host.apply(&DeckEvent::Next),
            Some(PresentationEvent::SlideChanged)
        );
        assert_eq!(host.current_slide(), Some(SlideId::new(3)));
        assert_eq!(host.apply(&DeckEvent::Next), None);

        host.apply(&DeckEvent::Goto(2));
        assert_eq!(host.current_slide(), Some(SlideId::new(2)));
    }

    #[test]
    fn test_unbound_keys_are_swallowed() {
        let host = SimPresentation::from_deck(&deck());
        assert_eq!(host.apply(&DeckEvent::Key(67)), None);
        host.bind_key(67);
        assert_eq!(
            host.apply(&DeckEvent::Key(67)),
            Some(PresentationEvent::KeyPressed(67))
        );
    }

    #[test]
    fn test_ready_event_sets_flag() {
        let host = SimPresentation::from_deck(&deck());
        assert!(!host.is_ready());
        assert_eq!(host.apply(&DeckEvent::Ready), Some(PresentationEvent::Ready));
        assert!(host.readiness().is_ready());
    }

    #[tokio::test]
    async fn test_media_honours_device_constraint() {
        let media = SimMedia::new(
            vec![
                DeviceInfo::new("mic", DeviceKind::AudioInput),
                DeviceInfo::new("front", DeviceKind::VideoInput),
                DeviceInfo::new("back", DeviceKind::VideoInput),
            ],
            Duration::ZERO,
            None,
        );

        let stream = media.get_user_media(&MediaConstraints::any_camera()).await.unwrap();
        assert_eq!(stream.video_device_id(), Some(DeviceId::new("front")));

        let back = DeviceId::new("back");
        let stream = media
            .get_user_media(&MediaConstraints::for_device(Some(&back)))
            .await
            .unwrap();
        assert_eq!(stream.video_device_id(), Some(back));

        let missing = DeviceId::new("side");
        let err = media
            .get_user_media(&MediaConstraints::for_device(Some(&missing)))
            .await
            .unwrap_err();
        assert!(matches!(err, SlidecamError::NoDevice(_)));
    }

    #[tokio::test]
    async fn test_media_failure() {
        let media = SimMedia::new(
            vec![DeviceInfo::new("front", DeviceKind::VideoInput)],
            Duration::ZERO,
            Some("NotAllowedError".to_string()),
        );
        let err = media
            .get_user_media(&MediaConstraints::any_camera())
            .await
            .unwrap_err();
        assert!(matches!(err, SlidecamError::PermissionDenied(_)));
        assert_eq!(media.issued_count(), 0);
    }
}
