//! Validated primitive types shared by the portal crates.
//!
//! - [`NonEmptyText`] for free-text fields that must carry content
//! - [`EntityId`] for record and option identifiers, which the backend hands out
//!   either as numbers or as opaque strings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a record or a selectable option.
///
/// The portal backend uses numeric keys for most resources and opaque string keys for
/// a few (facilities, audit events). Both forms are unique within one list and are
/// compared by value, never by position.
///
/// Serialises untagged, so `7` and `"F1"` are both valid on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Numeric identifier.
    Num(u64),
    /// Opaque textual identifier.
    Text(String),
}

impl EntityId {
    /// Parses a command-line style value: all-digit input becomes [`EntityId::Num`],
    /// anything else non-blank becomes [`EntityId::Text`].
    pub fn parse(input: &str) -> Result<Self, TextError> {
        let trimmed = NonEmptyText::new(input)?;
        match trimmed.as_str().parse::<u64>() {
            Ok(n) => Ok(EntityId::Num(n)),
            Err(_) => Ok(EntityId::Text(trimmed.into_inner())),
        }
    }

    /// Returns the numeric value, if this is a numeric identifier.
    pub fn as_num(&self) -> Option<u64> {
        match self {
            EntityId::Num(n) => Some(*n),
            EntityId::Text(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Num(n) => write!(f, "{n}"),
            EntityId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        EntityId::Num(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Ward 3  ").expect("should accept padded text");
        assert_eq!(text.as_str(), "Ward 3");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        let err = NonEmptyText::new(" \t ").expect_err("blank text should be rejected");
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn test_entity_id_parse_prefers_numbers() {
        assert_eq!(EntityId::parse("42").unwrap(), EntityId::Num(42));
        assert_eq!(
            EntityId::parse(" F1 ").unwrap(),
            EntityId::Text("F1".into())
        );
        assert!(EntityId::parse("").is_err());
    }

    #[test]
    fn test_entity_id_serialises_untagged() {
        let ids = vec![EntityId::Num(7), EntityId::from("F1")];
        let json = serde_json::to_string(&ids).expect("should serialise");
        assert_eq!(json, r#"[7,"F1"]"#);

        let back: Vec<EntityId> = serde_json::from_str(&json).expect("should deserialise");
        assert_eq!(back, ids);
    }

    #[test]
    fn test_entity_id_display_is_bare_value() {
        assert_eq!(EntityId::Num(3).to_string(), "3");
        assert_eq!(EntityId::from("dept-9").to_string(), "dept-9");
    }
}
