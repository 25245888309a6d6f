//! Input validation utilities.
//!
//! This module contains functions for validating user inputs (search boxes, free-text
//! booking fields, page-size pickers) before they reach the filter engine, a selector
//! payload or a collaborator call.

use crate::constants::{MAX_PAGE_SIZE, MAX_SEARCH_QUERY_LEN};
use crate::{PortalError, PortalResult};
use chrono::Duration;
use portal_types::EntityId;
use std::num::NonZeroUsize;

/// Parses a record or option id typed by a user.
///
/// Digit-only input becomes a numeric id; anything else is kept as text.
///
/// # Errors
///
/// Returns `PortalError::Text` if the input is blank.
pub fn parse_id(raw: &str) -> PortalResult<EntityId> {
    Ok(EntityId::parse(raw)?)
}

/// Normalises a free-text search query.
///
/// Leading and trailing whitespace is removed and the query is lower-cased for
/// case-insensitive matching. A blank query means "no search" and yields `None`.
///
/// # Errors
///
/// Returns `PortalError::InvalidInput` if the query exceeds the maximum length.
pub fn normalise_search_query(query: &str) -> PortalResult<Option<String>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(PortalError::InvalidInput(format!(
            "search query exceeds maximum length of {} characters",
            MAX_SEARCH_QUERY_LEN
        )));
    }

    Ok(Some(trimmed.to_lowercase()))
}

/// Validates a free-text form field and returns its trimmed value.
///
/// Line breaks and tabs are allowed; other control characters are not.
///
/// # Arguments
///
/// * `field` - Field name, used in the error message.
/// * `value` - Raw user input.
/// * `max_len` - Maximum length in characters after trimming.
///
/// # Errors
///
/// Returns `PortalError::InvalidInput` if the value is too long or contains control
/// characters.
pub fn validate_free_text(field: &str, value: &str, max_len: usize) -> PortalResult<String> {
    let trimmed = value.trim();

    if trimmed.chars().count() > max_len {
        return Err(PortalError::InvalidInput(format!(
            "{field} exceeds maximum length of {max_len} characters"
        )));
    }

    if trimmed
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
    {
        return Err(PortalError::InvalidInput(format!(
            "{field} contains control characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Validates a requested page size.
///
/// # Errors
///
/// Returns `PortalError::InvalidInput` if the size is zero or above the supported maximum.
pub fn validate_page_size(size: usize) -> PortalResult<NonZeroUsize> {
    if size > MAX_PAGE_SIZE {
        return Err(PortalError::InvalidInput(format!(
            "page size exceeds maximum of {}",
            MAX_PAGE_SIZE
        )));
    }
    NonZeroUsize::new(size)
        .ok_or_else(|| PortalError::InvalidInput("page size must be greater than zero".into()))
}

/// Converts a day count typed by a user into a time window.
///
/// # Errors
///
/// Returns `PortalError::InvalidInput` if the count is negative or too large to
/// represent as a duration.
pub fn window_from_days(days: i64) -> PortalResult<Duration> {
    if days < 0 {
        return Err(PortalError::InvalidInput(format!(
            "day count must not be negative, got {days}"
        )));
    }
    Duration::try_days(days)
        .ok_or_else(|| PortalError::InvalidInput(format!("day count {days} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_is_trimmed_and_lowercased() {
        assert_eq!(
            normalise_search_query("  Ana SILVA ").unwrap(),
            Some("ana silva".to_string())
        );
        assert_eq!(normalise_search_query("   ").unwrap(), None);
    }

    #[test]
    fn test_search_query_length_is_bounded() {
        let long = "x".repeat(MAX_SEARCH_QUERY_LEN + 1);
        assert!(matches!(
            normalise_search_query(&long),
            Err(PortalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_free_text_rejects_control_characters() {
        assert_eq!(
            validate_free_text("reason", " Chest pain\nsince Monday ", 100).unwrap(),
            "Chest pain\nsince Monday"
        );
        assert!(validate_free_text("reason", "bad\u{0007}bell", 100).is_err());
        assert!(validate_free_text("reason", "abcdef", 5).is_err());
    }

    #[test]
    fn test_parse_id_distinguishes_numeric_and_text() {
        assert_eq!(parse_id(" 42 ").unwrap(), EntityId::Num(42));
        assert_eq!(parse_id("F1").unwrap(), EntityId::from("F1"));
        assert!(matches!(parse_id("  "), Err(PortalError::Text(_))));
    }

    #[test]
    fn test_window_from_days_rejects_unrepresentable_counts() {
        assert_eq!(window_from_days(30).unwrap(), Duration::days(30));
        assert_eq!(window_from_days(0).unwrap(), Duration::zero());
        assert!(matches!(window_from_days(-1), Err(PortalError::InvalidInput(_))));
        assert!(matches!(
            window_from_days(i64::MAX),
            Err(PortalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_page_size_bounds() {
        assert_eq!(validate_page_size(20).unwrap().get(), 20);
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(MAX_PAGE_SIZE + 1).is_err());
    }
}
