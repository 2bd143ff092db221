//! Core types for Slidecam
//!
//! Identifiers and descriptors shared by the stream manager, the
//! visibility controller and the platform seams.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Identifier of a capture device as reported by the media layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of media device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Camera
    VideoInput,
    /// Microphone
    AudioInput,
    /// Speaker or headset
    AudioOutput,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VideoInput => write!(f, "videoinput"),
            Self::AudioInput => write!(f, "audioinput"),
            Self::AudioOutput => write!(f, "audiooutput"),
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "videoinput" => Ok(Self::VideoInput),
            "audioinput" => Ok(Self::AudioInput),
            "audiooutput" => Ok(Self::AudioOutput),
            _ => Err(format!("Unknown device kind: {}", s)),
        }
    }
}

/// A device returned by enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device identifier
    pub id: DeviceId,
    /// What kind of device this is
    pub kind: DeviceKind,
    /// Human-readable label (may be empty before permission is granted)
    #[serde(default)]
    pub label: String,
}

impl DeviceInfo {
    /// Create a device descriptor
    pub fn new(id: impl Into<DeviceId>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: String::new(),
        }
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Whether this is a camera
    pub fn is_video_input(&self) -> bool {
        self.kind == DeviceKind::VideoInput
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.label.is_empty() {
            write!(f, "{} ({})", self.id, self.kind)
        } else {
            write!(f, "{} - {} ({})", self.id, self.label, self.kind)
        }
    }
}

/// Video part of an acquisition request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VideoConstraint {
    /// Let the platform pick a camera
    #[default]
    Any,
    /// Require a specific camera
    Device(DeviceId),
}

/// Constraint descriptor passed to media acquisition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaConstraints {
    /// Request audio as well (always false for the camera overlay)
    pub audio: bool,
    /// Video request
    pub video: VideoConstraint,
}

impl MediaConstraints {
    /// Video only, any camera
    pub fn any_camera() -> Self {
        Self::default()
    }

    /// Video only, constrained to `device` when known
    pub fn for_device(device: Option<&DeviceId>) -> Self {
        Self {
            audio: false,
            video: device
                .map(|id| VideoConstraint::Device(id.clone()))
                .unwrap_or_default(),
        }
    }

    /// The requested device, if any
    pub fn device(&self) -> Option<&DeviceId> {
        match &self.video {
            VideoConstraint::Any => None,
            VideoConstraint::Device(id) => Some(id),
        }
    }

    /// Render in the platform's descriptor shape:
    /// `{audio: false, video: true}` or `{audio: false, video: {deviceId: ...}}`
    pub fn to_json(&self) -> Value {
        let video = match &self.video {
            VideoConstraint::Any => json!(true),
            VideoConstraint::Device(id) => json!({ "deviceId": id.as_str() }),
        };
        json!({ "audio": self.audio, "video": video })
    }
}

impl std::fmt::Display for MediaConstraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Identity of a slide element, assigned by the presentation host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlideId(u64);

impl SlideId {
    /// Wrap a host-assigned id
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SlideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slide({})", self.0)
    }
}

/// Capture session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No stream shown
    #[default]
    Disabled,
    /// Acquisition or bind in flight
    Pending,
    /// Stream bound to the video element and playing
    Active,
    /// Last acquisition failed
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Error => write!(f, "error"),
        }
    }
}
