//! Keyboard shortcuts for inline tools.
//!
//! Tools advertise shortcuts as strings in `CMD+SHIFT+M` notation. The string
//! is kept verbatim as a [`Shortcut`] and parsed on demand into a
//! [`KeyCombo`] that platform code matches against keydown events.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ToggleError;

/// Key values for keyboard input.
///
/// Platform-agnostic key representation. Platform-specific code converts
/// from native key events to this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    Insert,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
        )
    }

    /// Named key for a shortcut token, if the token names one.
    fn named(token: &str) -> Option<Self> {
        let key = match token.to_ascii_uppercase().as_str() {
            "ENTER" => Self::Enter,
            "BACKSPACE" => Self::Backspace,
            "DELETE" => Self::Delete,
            "ESC" | "ESCAPE" => Self::Escape,
            "TAB" => Self::Tab,
            "SPACE" => Self::Space,
            "INSERT" => Self::Insert,
            "UP" => Self::ArrowUp,
            "DOWN" => Self::ArrowDown,
            "LEFT" => Self::ArrowLeft,
            "RIGHT" => Self::ArrowRight,
            "HOME" => Self::Home,
            "END" => Self::End,
            _ => return None,
        };
        Some(key)
    }

    /// Whether two keys are the same, ignoring case for character keys.
    pub fn same_key(&self, other: &Key) -> bool {
        match (self, other) {
            (Self::Character(a), Self::Character(b)) => a.to_lowercase() == b.to_lowercase(),
            (Self::Space, Self::Character(c)) | (Self::Character(c), Self::Space) => c.as_str() == " ",
            _ => self == other,
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Get the primary modifier for the platform (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(is_mac: bool) -> Self {
        if is_mac { Self::META } else { Self::CTRL }
    }

    fn union(self, other: Self) -> Self {
        Self {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            meta: self.meta || other.meta,
        }
    }
}

/// A key combination for triggering an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Whether a keydown with `key` and `modifiers` triggers this combo.
    ///
    /// Modifiers must match exactly, so `CMD+B` does not fire on `CMD+SHIFT+B`.
    pub fn matches(&self, key: &Key, modifiers: Modifiers) -> bool {
        self.modifiers == modifiers && self.key.same_key(key)
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not a keybinding, let platform handle it.
    NotHandled,
    /// Event should be passed through (navigation, etc.).
    PassThrough,
}

/// A shortcut string as configured, such as `CMD+SHIFT+M`.
///
/// Stored verbatim so hosts that interpret shortcuts themselves see exactly
/// what was configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shortcut(SmolStr);

impl Shortcut {
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a key combination for the given platform.
    ///
    /// Tokens are separated by `+` and case-insensitive. `CMD` is the
    /// platform's primary modifier; the last token is the key.
    pub fn parse(&self, is_mac: bool) -> Result<KeyCombo, ToggleError> {
        let invalid = |reason: &'static str| ToggleError::InvalidShortcut {
            shortcut: self.0.to_string(),
            reason,
        };

        let tokens: Vec<&str> = self.0.split('+').map(str::trim).collect();
        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(invalid("shortcut is empty"));
        };

        let mut modifiers = Modifiers::NONE;
        for token in modifier_tokens {
            let modifier = match token.to_ascii_uppercase().as_str() {
                "CMD" => Modifiers::primary(is_mac),
                "CTRL" | "CONTROL" => Modifiers::CTRL,
                "ALT" | "OPTION" => Modifiers::ALT,
                "SHIFT" => Modifiers::SHIFT,
                "META" => Modifiers::META,
                "" => return Err(invalid("empty token")),
                _ => return Err(invalid("unknown modifier")),
            };
            modifiers = modifiers.union(modifier);
        }

        let key = if let Some(named) = Key::named(key_token) {
            named
        } else {
            let mut chars = key_token.chars();
            match (chars.next(), chars.next()) {
                (None, _) => return Err(invalid("missing key")),
                (Some(c), None) => Key::character(c.to_lowercase().collect::<String>()),
                (Some(_), Some(_)) => return Err(invalid("unknown key name")),
            }
        };

        Ok(KeyCombo::with_modifiers(key, modifiers))
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Shortcut {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primary_modifier() {
        let shortcut = Shortcut::new("CMD+SHIFT+M");
        let mac = shortcut.parse(true).unwrap();
        assert_eq!(mac.key, Key::character("m"));
        assert_eq!(
            mac.modifiers,
            Modifiers {
                meta: true,
                shift: true,
                ..Modifiers::NONE
            }
        );
        let other = shortcut.parse(false).unwrap();
        assert!(other.modifiers.ctrl && other.modifiers.shift && !other.modifiers.meta);
    }

    #[test]
    fn test_parse_named_keys_and_case() {
        let combo = Shortcut::new("ctrl+alt+enter").parse(false).unwrap();
        assert_eq!(combo.key, Key::Enter);
        assert_eq!(
            combo.modifiers,
            Modifiers {
                ctrl: true,
                alt: true,
                ..Modifiers::NONE
            }
        );
        assert_eq!(Shortcut::new("Esc").parse(false).unwrap(), KeyCombo::new(Key::Escape));
        assert_eq!(
            Shortcut::new("OPTION + up").parse(true).unwrap(),
            KeyCombo::with_modifiers(Key::ArrowUp, Modifiers::ALT)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "CMD+", "HYPER+B", "CMD+BB", "CMD++B"] {
            let err = Shortcut::new(bad).parse(false).unwrap_err();
            assert!(
                matches!(err, ToggleError::InvalidShortcut { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_matches_exact_modifiers() {
        let combo = Shortcut::new("CMD+B").parse(false).unwrap();
        assert!(combo.matches(&Key::character("b"), Modifiers::CTRL));
        assert!(combo.matches(&Key::character("B"), Modifiers::CTRL));
        assert!(!combo.matches(&Key::character("b"), Modifiers::META));
        assert!(!combo.matches(
            &Key::character("b"),
            Modifiers::CTRL.union(Modifiers::SHIFT)
        ));
        assert!(!combo.matches(&Key::character("i"), Modifiers::CTRL));
    }

    #[test]
    fn test_space_matches_character() {
        let combo = Shortcut::new("CTRL+SPACE").parse(false).unwrap();
        assert!(combo.matches(&Key::character(" "), Modifiers::CTRL));
        assert!(combo.matches(&Key::Space, Modifiers::CTRL));
    }

    #[test]
    fn test_shortcut_is_opaque_in_serde() {
        let shortcut: Shortcut = serde_json::from_str("\"cmd+shift+M\"").unwrap();
        assert_eq!(shortcut.as_str(), "cmd+shift+M");
        assert_eq!(serde_json::to_string(&shortcut).unwrap(), "\"cmd+shift+M\"");
    }
}
