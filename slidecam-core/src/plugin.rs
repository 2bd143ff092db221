//! Plugin installation
//!
//! Wires the controller into a presentation: reads options, injects the
//! stylesheet, creates the video element and the stream session.

use std::sync::Arc;
use tracing::info;

use crate::config::{EmbedVideoOptions, PluginOptions};
use crate::error::{Result, ResultExt};
use crate::media::MediaDevices;
use crate::presentation::Presentation;
use crate::stream::LiveStream;
use crate::visibility::VisibilityController;

/// Install the plugin using only the host's options
pub fn install(
    presentation: Arc<dyn Presentation>,
    media: Arc<dyn MediaDevices>,
) -> Result<VisibilityController> {
    install_with_defaults(presentation, media, &EmbedVideoOptions::default())
}

/// Install the plugin, filling options the host leaves out from `defaults`
pub fn install_with_defaults(
    presentation: Arc<dyn Presentation>,
    media: Arc<dyn MediaDevices>,
    defaults: &EmbedVideoOptions,
) -> Result<VisibilityController> {
    let options = resolve_options(presentation.as_ref(), defaults);

    presentation.add_stylesheet(&options.stylesheet_href());
    let video = presentation.create_video_element();

    let stream = LiveStream::new(
        media,
        Arc::clone(&video),
        presentation.readiness(),
        options.persistent,
    )
    .context("Creating camera stream")?;

    info!(
        enabled = options.enabled,
        persistent = options.persistent,
        path = %options.path,
        key = %options.key,
        "Embed video plugin installed"
    );

    Ok(
        VisibilityController::new(presentation, video, stream, options.enabled)
            .with_shortcut(options.shortcut()),
    )
}

/// Effective options for a presentation
pub fn resolve_options(
    presentation: &dyn Presentation,
    defaults: &EmbedVideoOptions,
) -> PluginOptions {
    EmbedVideoOptions::from_host_config(&presentation.config())
        .merged_over(defaults)
        .resolve(presentation.script_src().as_deref())
}
