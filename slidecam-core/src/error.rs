//! Error types for Slidecam

use thiserror::Error;

/// Result type alias using SlidecamError
pub type Result<T> = std::result::Result<T, SlidecamError>;

/// Main error type for Slidecam operations
#[derive(Debug, Error)]
pub enum SlidecamError {
    /// The user or browser refused camera access
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    /// No capture device satisfies the request
    #[error("No camera device: {0}")]
    NoDevice(String),

    /// The device exists but another process holds it
    #[error("Camera device busy: {0}")]
    DeviceBusy(String),

    /// Any other failure reported by the media layer
    #[error("Media error: {0}")]
    Media(String),

    /// Device enumeration failed
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Presentation host error
    #[error("Presentation error: {0}")]
    Presentation(String),

    /// Manager constructed outside of an async runtime
    #[error("No async runtime available")]
    NoRuntime,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SlidecamError>,
    },
}

impl SlidecamError {
    /// Create a permission error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a missing device error
    pub fn no_device(msg: impl Into<String>) -> Self {
        Self::NoDevice(msg.into())
    }

    /// Create a busy device error
    pub fn device_busy(msg: impl Into<String>) -> Self {
        Self::DeviceBusy(msg.into())
    }

    /// Create a generic media error
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a presentation error
    pub fn presentation(msg: impl Into<String>) -> Self {
        Self::Presentation(msg.into())
    }

    /// Map a platform error name (`NotAllowedError`, `NotFoundError`, ...)
    /// onto the matching variant.
    pub fn from_platform(name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => {
                Self::PermissionDenied(message)
            }
            "NotFoundError" | "OverconstrainedError" | "DevicesNotFoundError" => {
                Self::NoDevice(message)
            }
            "NotReadableError" | "TrackStartError" | "AbortError" => Self::DeviceBusy(message),
            _ => Self::Media(format!("{}: {}", name, message)),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context wrappers
    pub fn root(&self) -> &SlidecamError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Suggestion shown next to the error in the CLI
    pub fn user_hint(&self) -> Option<&'static str> {
        match self.root() {
            Self::PermissionDenied(_) => {
                Some("Allow camera access for this page, then toggle the camera again")
            }
            Self::NoDevice(_) => Some("Connect a camera or run 'slidecam devices' to list them"),
            Self::DeviceBusy(_) => Some("Close other applications that are using the camera"),
            Self::Config(_) => {
                Some("Check ~/.config/slidecam/config.toml or run 'slidecam config show'")
            }
            Self::NoRuntime => Some("Create the camera stream from inside a Tokio runtime"),
            _ => None,
        }
    }

    /// Whether the user can fix this without changing code
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self.root(),
            Self::PermissionDenied(_)
                | Self::NoDevice(_)
                | Self::DeviceBusy(_)
                | Self::Config(_)
                | Self::Io(_)
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl From<toml::de::Error> for SlidecamError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("Failed to parse config file: {}", err))
    }
}

impl From<serde_json::Error> for SlidecamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("Invalid options: {}", err))
    }
}
