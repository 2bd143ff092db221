//! Mock infrastructure for testing
//!
//! Provides an in-memory presentation, a recording video element and a
//! media layer whose acquisitions can be held open or made to fail.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use slidecam_core::error::{Result, SlidecamError};
use slidecam_core::media::{MediaDevices, MediaStream, MediaTrack, TrackKind, TrackSettings};
use slidecam_core::output::VideoElement;
use slidecam_core::presentation::{Presentation, Readiness, ReadinessHandle, readiness};
use slidecam_core::types::{DeviceId, DeviceInfo, DeviceKind, MediaConstraints, SlideId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Let spawned tasks on the current-thread runtime run to completion
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// A track that remembers whether it was stopped
pub struct MockTrack {
    device: DeviceId,
    stopped: AtomicBool,
}

impl MediaTrack for MockTrack {
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
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// A single-track camera stream
pub struct MockStream {
    id: String,
    track: Arc<MockTrack>,
}

impl MockStream {
    /// Whether the stream's track was stopped
    pub fn is_stopped(&self) -> bool {
        self.track.stopped.load(Ordering::SeqCst)
    }

    /// Device backing the stream
    pub fn device(&self) -> &DeviceId {
        &self.track.device
    }
}

impl MediaStream for MockStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        vec![self.track.clone() as Arc<dyn MediaTrack>]
    }
}

/// Scriptable media layer
pub struct MockMedia {
    devices: Mutex<Vec<DeviceInfo>>,
    requests: Mutex<Vec<MediaConstraints>>,
    issued: Mutex<Vec<Arc<MockStream>>>,
    failure: Mutex<Option<(String, String)>>,
    held: AtomicBool,
    gate: Notify,
    enumerations: AtomicUsize,
    next_id: AtomicU64,
}

impl MockMedia {
    /// Media layer exposing the given cameras
    pub fn with_cameras(ids: &[&str]) -> Arc<Self> {
        let devices = ids
            .iter()
            .map(|id| DeviceInfo::new(*id, DeviceKind::VideoInput))
            .collect();
        Self::with_devices(devices)
    }

    /// Media layer exposing arbitrary devices
    pub fn with_devices(devices: Vec<DeviceInfo>) -> Arc<Self> {
        Arc::new(Self {
            devices: Mutex::new(devices),
            requests: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            held: AtomicBool::new(false),
            gate: Notify::new(),
            enumerations: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        })
    }

    /// Make acquisitions wait until [`MockMedia::release_one`]
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Let one held acquisition complete
    pub fn release_one(&self) {
        self.gate.notify_one();
    }

    /// Fail acquisitions with a platform error name
    pub fn fail_with(&self, name: &str, message: &str) {
        *self.failure.lock() = Some((name.to_string(), message.to_string()));
    }

    /// Stop failing acquisitions
    pub fn succeed(&self) {
        *self.failure.lock() = None;
    }

    /// Add a device after the fact
    pub fn plug(&self, device: DeviceInfo) {
        self.devices.lock().push(device);
    }

    /// Acquisition requests seen so far
    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.requests.lock().clone()
    }

    /// Number of acquisition requests seen so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of enumeration calls
    pub fn enumeration_count(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    /// Streams handed out so far
    pub fn issued(&self) -> Vec<Arc<MockStream>> {
        self.issued.lock().clone()
    }

    /// Streams handed out and not yet stopped
    pub fn live_streams(&self) -> usize {
        self.issued.lock().iter().filter(|s| !s.is_stopped()).count()
    }
}

#[async_trait]
impl MediaDevices for MockMedia {
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(self.devices.lock().clone())
    }

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>> {
        self.requests.lock().push(constraints.clone());

        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }

        if let Some((name, message)) = self.failure.lock().clone() {
            return Err(SlidecamError::from_platform(&name, message));
        }

        let device = match constraints.device() {
            Some(id) => id.clone(),
            None => self
                .devices
                .lock()
                .iter()
                .find(|d| d.is_video_input())
                .map(|d| d.id.clone())
                .ok_or_else(|| SlidecamError::no_device("no camera connected"))?,
        };

        let id = format!("stream-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let stream = Arc::new(MockStream {
            id,
            track: Arc::new(MockTrack {
                device,
                stopped: AtomicBool::new(false),
            }),
        });
        self.issued.lock().push(stream.clone());
        Ok(stream)
    }
}

#[derive(Debug, Default, Clone)]
struct VideoState {
    source: Option<String>,
    playing: bool,
    enabled: bool,
    class: String,
    reloads: usize,
    plays: usize,
}

/// A video element that records what was done to it
#[derive(Default)]
pub struct MockVideo {
    state: Mutex<VideoState>,
}

impl MockVideo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn reloads(&self) -> usize {
        self.state.lock().reloads
    }

    pub fn plays(&self) -> usize {
        self.state.lock().plays
    }
}

impl VideoElement for MockVideo {
    fn source_id(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    fn set_source(&self, stream: Option<Arc<dyn MediaStream>>) {
        self.state.lock().source = stream.map(|s| s.id().to_string());
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn play(&self) {
        let mut state = self.state.lock();
        state.playing = true;
        state.plays += 1;
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
        state.reloads += 1;
    }

    fn set_class(&self, class: &str) {
        self.state.lock().class = class.to_string();
    }

    fn class(&self) -> String {
        self.state.lock().class.clone()
    }
}

struct MockSlide {
    parent: Option<SlideId>,
    video: Option<String>,
}

/// In-memory presentation host
pub struct MockPresentation {
    slides: Mutex<HashMap<SlideId, MockSlide>>,
    current: Mutex<Option<SlideId>>,
    ready: ReadinessHandle,
    config: Value,
    script_src: Option<String>,
    shortcuts: Mutex<Vec<(String, String)>>,
    bound_keys: Mutex<Vec<u32>>,
    stylesheets: Mutex<Vec<String>>,
    attribute_reads: AtomicUsize,
    pub video: Arc<MockVideo>,
}

impl MockPresentation {
    /// Presentation with `options` under the `embed-video` key
    pub fn new(options: Value) -> Arc<Self> {
        Self::build(json!({ "embed-video": options }), None)
    }

    /// Presentation with a raw host configuration and script URL
    pub fn build(config: Value, script_src: Option<&str>) -> Arc<Self> {
        let (ready, _) = readiness();
        Arc::new(Self {
            slides: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            ready,
            config,
            script_src: script_src.map(str::to_string),
            shortcuts: Mutex::new(Vec::new()),
            bound_keys: Mutex::new(Vec::new()),
            stylesheets: Mutex::new(Vec::new()),
            attribute_reads: AtomicUsize::new(0),
            video: MockVideo::new(),
        })
    }

    /// Add a slide element
    pub fn add_slide(&self, id: u64, parent: Option<u64>, video: Option<&str>) -> SlideId {
        let slide = SlideId::new(id);
        self.slides.lock().insert(
            slide,
            MockSlide {
                parent: parent.map(SlideId::new),
                video: video.map(str::to_string),
            },
        );
        slide
    }

    /// Navigate to a slide
    pub fn goto(&self, id: u64) {
        *self.current.lock() = Some(SlideId::new(id));
    }

    pub fn mark_ready(&self) {
        self.ready.mark_ready();
    }

    pub fn shortcuts(&self) -> Vec<(String, String)> {
        self.shortcuts.lock().clone()
    }

    pub fn bound_keys(&self) -> Vec<u32> {
        self.bound_keys.lock().clone()
    }

    pub fn stylesheets(&self) -> Vec<String> {
        self.stylesheets.lock().clone()
    }

    pub fn attribute_reads(&self) -> usize {
        self.attribute_reads.load(Ordering::SeqCst)
    }
}

impl Presentation for MockPresentation {
    fn readiness(&self) -> Readiness {
        self.ready.readiness()
    }

    fn current_slide(&self) -> Option<SlideId> {
        *self.current.lock()
    }

    fn slide_attribute(&self, slide: SlideId, name: &str) -> Option<String> {
        self.attribute_reads.fetch_add(1, Ordering::SeqCst);
        if name != "data-video" {
            return None;
        }
        self.slides.lock().get(&slide).and_then(|s| s.video.clone())
    }

    fn parent(&self, slide: SlideId) -> Option<SlideId> {
        self.slides.lock().get(&slide).and_then(|s| s.parent)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_media_picks_first_camera() {
        let media = MockMedia::with_cameras(&["front", "back"]);
        let stream = media
            .get_user_media(&MediaConstraints::any_camera())
            .await
            .expect("Should acquire");
        assert_eq!(stream.video_device_id(), Some(DeviceId::new("front")));
        assert_eq!(media.live_streams(), 1);

        stream.stop_tracks();
        assert_eq!(media.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_mock_media_failure() {
        let media = MockMedia::with_cameras(&["front"]);
        media.fail_with("NotAllowedError", "Permission denied");
        let result = media.get_user_media(&MediaConstraints::any_camera()).await;
        assert!(matches!(result, Err(SlidecamError::PermissionDenied(_))));
    }

    #[test]
    fn test_mock_presentation_tree() {
        let deck = MockPresentation::new(json!({}));
        let section = deck.add_slide(1, None, Some("topic-a"));
        let child = deck.add_slide(2, Some(1), None);
        assert_eq!(deck.parent(child), Some(section));
        assert_eq!(deck.slide_attribute(section, "data-video").as_deref(), Some("topic-a"));
        assert_eq!(deck.slide_attribute(child, "data-video"), None);
    }
}
