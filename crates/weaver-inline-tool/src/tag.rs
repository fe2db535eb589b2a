//! Markup tag names.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ToggleError;

/// A validated element tag name such as `mark` or `b`.
///
/// Tags are stored ASCII-lowercased and compared case-insensitively against
/// element names reported by the host, so `<B>` and `<b>` both match `b`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarkupTag(SmolStr);

impl MarkupTag {
    /// Validate and normalize a tag name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ToggleError> {
        let name = name.as_ref();
        if let Some(reason) = invalid_reason(name) {
            return Err(ToggleError::InvalidTag {
                tag: name.to_string(),
                reason,
            });
        }
        Ok(Self(SmolStr::new(name.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an element name reported by the host names this tag.
    pub fn matches(&self, element_name: &str) -> bool {
        self.0.eq_ignore_ascii_case(element_name)
    }
}

/// Check a name against the element name grammar we accept.
///
/// Returns the reason for rejection, or `None` if the name is usable.
pub(crate) fn invalid_reason(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Some("tag name is empty"),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Some("tag name must start with an ASCII letter");
        }
        Some(_) => {}
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '-')) {
        return Some("tag name may only contain ASCII letters, digits and '-'");
    }
    None
}

impl fmt::Display for MarkupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MarkupTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MarkupTag {
    type Error = ToggleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MarkupTag {
    type Error = ToggleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MarkupTag> for String {
    fn from(tag: MarkupTag) -> Self {
        tag.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case() {
        let tag = MarkupTag::new("MARK").unwrap();
        assert_eq!(tag.as_str(), "mark");
        assert!(tag.matches("Mark"));
        assert!(tag.matches("mark"));
        assert!(!tag.matches("b"));
    }

    #[test]
    fn test_custom_element_names() {
        assert!(MarkupTag::new("x-highlight").is_ok());
        assert!(MarkupTag::new("h1").is_ok());
    }

    #[test]
    fn test_rejects_invalid_names() {
        for bad in ["", "1b", "-x", "b r", "<b>", "ma rk", "é"] {
            match MarkupTag::new(bad) {
                Err(ToggleError::InvalidTag { tag, .. }) => assert_eq!(tag, bad),
                other => panic!("expected InvalidTag for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let tag: MarkupTag = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(tag.as_str(), "b");
        assert!(serde_json::from_str::<MarkupTag>("\"\"").is_err());
    }
}
