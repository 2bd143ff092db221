//! Platform media layer
//!
//! The browser's `navigator.mediaDevices` surface, reduced to the two
//! calls the stream manager needs: device enumeration and camera
//! acquisition. Implementations must be cheap to share across tasks.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{DeviceId, DeviceInfo, MediaConstraints};

/// Kind of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Video track
    Video,
    /// Audio track
    Audio,
}

/// Settings the platform actually applied to a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSettings {
    /// Device backing the track
    pub device_id: Option<DeviceId>,
    /// Frame width, if known
    pub width: Option<u32>,
    /// Frame height, if known
    pub height: Option<u32>,
}

/// One track of an acquired stream
pub trait MediaTrack: Send + Sync {
    /// Track kind
    fn kind(&self) -> TrackKind;

    /// Applied settings
    fn settings(&self) -> TrackSettings;

    /// Stop the track, releasing the underlying device
    fn stop(&self);
}

/// An acquired camera stream (the device handle)
pub trait MediaStream: Send + Sync {
    /// Stable identity, used to compare against the video element's source
    fn id(&self) -> &str;

    /// All constituent tracks
    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    /// Video tracks only
    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks()
            .into_iter()
            .filter(|track| track.kind() == TrackKind::Video)
            .collect()
    }

    /// Device the platform picked for the first video track
    fn video_device_id(&self) -> Option<DeviceId> {
        self.video_tracks()
            .first()
            .and_then(|track| track.settings().device_id)
    }

    /// Stop every track
    fn stop_tracks(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }
}

impl std::fmt::Debug for dyn MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream").field("id", &self.id()).finish()
    }
}

/// Device enumeration and camera acquisition
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// List every media device the platform exposes
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Acquire a stream matching `constraints`
    async fn get_user_media(&self, constraints: &MediaConstraints)
    -> Result<Arc<dyn MediaStream>>;
}
