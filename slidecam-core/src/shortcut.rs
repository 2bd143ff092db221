//! Keyboard shortcut model
//!
//! The host binds shortcuts by DOM key code and lists them in its help
//! overlay by key name, so a shortcut carries both.

use crate::error::{Result, SlidecamError};

/// Key that toggles the camera
pub const TOGGLE_KEY: &str = "C";

/// Help overlay text for the toggle key
pub const TOGGLE_DESCRIPTION: &str = "Toggle speaker camera";

/// A single-key shortcut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Key name shown in the help overlay
    pub key: String,
    /// DOM key code the host dispatches on
    pub key_code: u32,
    /// Help overlay description
    pub description: String,
}

impl Shortcut {
    /// The camera toggle shortcut: `C`, key code 67
    pub fn toggle_camera() -> Self {
        Self {
            key: TOGGLE_KEY.to_string(),
            key_code: 67,
            description: TOGGLE_DESCRIPTION.to_string(),
        }
    }

    /// Parse a key name like "c", "F9" or "space"
    pub fn parse(name: &str, description: impl Into<String>) -> Result<Self> {
        let name = name.trim();
        let key_code = key_code(name)?;
        let key = if name.chars().count() == 1 {
            name.to_uppercase()
        } else {
            name.to_lowercase()
        };

        Ok(Self {
            key,
            key_code,
            description: description.into(),
        })
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.key, self.description)
    }
}

/// Map a key name to its DOM key code
pub fn key_code(name: &str) -> Result<u32> {
    let lowercase = name.to_lowercase();

    let mut chars = lowercase.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Ok(c.to_ascii_uppercase() as u32);
        }
    }

    let code = match lowercase.as_str() {
        "space" => 32,
        "enter" | "return" => 13,
        "escape" | "esc" => 27,
        "tab" => 9,
        "backspace" => 8,
        "pageup" | "pgup" => 33,
        "pagedown" | "pgdn" => 34,
        "end" => 35,
        "home" => 36,
        "left" => 37,
        "up" => 38,
        "right" => 39,
        "down" => 40,
        _ => match lowercase.strip_prefix('f').and_then(|n| n.parse::<u32>().ok()) {
            Some(n @ 1..=12) => 111 + n,
            _ => return Err(SlidecamError::config(format!("Unknown key: {}", name))),
        },
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_shortcut() {
        let shortcut = Shortcut::toggle_camera();
        assert_eq!(shortcut.key, "C");
        assert_eq!(shortcut.key_code, 67);
        assert_eq!(shortcut.to_string(), "[C] Toggle speaker camera");
    }

    #[test]
    fn test_parse_letter_matches_toggle() {
        let parsed = Shortcut::parse("c", TOGGLE_DESCRIPTION).unwrap();
        assert_eq!(parsed, Shortcut::toggle_camera());
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(key_code("a").unwrap(), 65);
        assert_eq!(key_code("7").unwrap(), 55);
        assert_eq!(key_code("space").unwrap(), 32);
        assert_eq!(key_code("F1").unwrap(), 112);
        assert_eq!(key_code("f12").unwrap(), 123);
        assert!(key_code("f13").is_err());
        assert!(key_code("hyper").is_err());
        assert!(key_code("").is_err());
    }
}
