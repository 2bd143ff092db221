//! Slidecam Core Library
//!
//! Live webcam overlay for slide presentations.
//!
//! This library provides:
//! - A camera stream lifecycle manager that acquires, binds, suspends and
//!   releases a single camera stream
//! - A visibility controller that shows the camera only on slides that
//!   opt in through a `data-video` attribute, toggled by a key
//! - Option resolution and plugin wiring for a presentation host
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  update/toggle  ┌────────────────┐  acquire  ┌──────────────┐
//! │ Presentation     │────────────────▶│ Visibility     │──────────▶│ LiveStream   │
//! │ (events, slides) │                 │ Controller     │ start/stop│ (media seam) │
//! └──────────────────┘                 └────────────────┘           └──────────────┘
//!                                              │ class                     │ source/play
//!                                              └──────────▶ VideoElement ◀─┘
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod output;
pub mod plugin;
pub mod presentation;
pub mod shortcut;
pub mod stream;
pub mod types;
pub mod visibility;

pub use config::{EmbedVideoOptions, PluginOptions};
pub use error::{Result, SlidecamError};
pub use output::VideoElement;
pub use presentation::{Presentation, PresentationEvent, Readiness, ReadinessHandle};
pub use stream::LiveStream;
pub use types::{DeviceId, DeviceInfo, DeviceKind, MediaConstraints, SessionStatus, SlideId};
pub use visibility::{VideoClass, VisibilityController};
