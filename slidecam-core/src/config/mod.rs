//! Plugin options
//!
//! Options arrive from two places: the host configuration mapping (under
//! the `embed-video` key) and the user's config file. Host values win;
//! file values fill in what the host leaves out.

mod file;

pub use file::{ConfigFile, SimulatorSettings, sample_config};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::shortcut::{Shortcut, TOGGLE_DESCRIPTION, TOGGLE_KEY};

/// Key of the plugin's section in the host configuration
pub const CONFIG_KEY: &str = "embed-video";

/// File name of the plugin script
pub const SCRIPT_NAME: &str = "reveal-embed-video.js";

/// File name of the plugin stylesheet
pub const STYLESHEET_NAME: &str = "reveal-embed-video.css";

/// Plugin path used when neither the options nor the script location give one
pub const DEFAULT_PATH: &str = "plugin/reveal-embed-video";

/// Options as supplied; absent fields are `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedVideoOptions {
    /// Show the camera from the start (toggle with [C])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Keep the camera stream while the video is hidden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,

    /// Base URL of the plugin's assets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Key that toggles the camera, `C` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl EmbedVideoOptions {
    /// Read the `embed-video` section of a host configuration mapping.
    ///
    /// Flags are coerced by truthiness, so `1` or `"yes"` enable and
    /// `0`, `""` or `null` disable. A non-string or empty `path` or `key`
    /// is ignored.
    pub fn from_host_config(config: &Value) -> Self {
        let Some(section) = config.get(CONFIG_KEY).and_then(Value::as_object) else {
            return Self::default();
        };

        Self {
            enabled: section.get("enabled").map(truthy),
            persistent: section.get("persistent").map(truthy),
            path: non_empty_str(section.get("path")),
            key: non_empty_str(section.get("key")),
        }
    }

    /// Fill fields missing here from `defaults`
    pub fn merged_over(self, defaults: &EmbedVideoOptions) -> Self {
        Self {
            enabled: self.enabled.or(defaults.enabled),
            persistent: self.persistent.or(defaults.persistent),
            path: self.path.or_else(|| defaults.path.clone()),
            key: self.key.or_else(|| defaults.key.clone()),
        }
    }

    /// Apply defaults and derive the plugin path
    pub fn resolve(&self, script_src: Option<&str>) -> PluginOptions {
        let path = self
            .path
            .clone()
            .or_else(|| script_src.and_then(script_path))
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        PluginOptions {
            enabled: self.enabled.unwrap_or(false),
            persistent: self.persistent.unwrap_or(false),
            path,
            key: self.key.clone().unwrap_or_else(|| TOGGLE_KEY.to_string()),
        }
    }
}

/// Options with every default applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginOptions {
    /// Camera initially on
    pub enabled: bool,
    /// Keep the stream across hides
    pub persistent: bool,
    /// Base URL of the plugin's assets
    pub path: String,
    /// Toggle key name
    pub key: String,
}

impl PluginOptions {
    /// URL of the plugin stylesheet
    pub fn stylesheet_href(&self) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), STYLESHEET_NAME)
    }

    /// The toggle shortcut, falling back to `C` when the key is unknown
    pub fn shortcut(&self) -> Shortcut {
        Shortcut::parse(&self.key, TOGGLE_DESCRIPTION).unwrap_or_else(|err| {
            warn!(key = %self.key, error = %err, "Unusable toggle key, using C");
            Shortcut::toggle_camera()
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Directory URL of the plugin script, from the script's own URL
pub fn script_path(script_src: &str) -> Option<String> {
    let src = script_src
        .split(['?', '#'])
        .next()
        .unwrap_or(script_src);
    src.strip_suffix(SCRIPT_NAME)
        .and_then(|dir| dir.strip_suffix('/'))
        .filter(|dir| !dir.is_empty())
        .map(str::to_string)
}

/// JavaScript-style truthiness
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
