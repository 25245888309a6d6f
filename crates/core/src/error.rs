//! Error types for the portal core.
//!
//! Three failure families reach a list view or booking form, and none of them is
//! fatal:
//! - **load failures** ([`PortalError::Load`], [`PortalError::Options`]): the affected
//!   collection is left empty and a message is shown
//! - **validation failures** ([`PortalError::Validation`]): caught before any call to a
//!   collaborator
//! - **mutation failures** ([`PortalError::Mutation`]): the in-memory list is untouched
//!
//! Collaborators report failures as [`SourceError`] values.

use crate::entity::ResourceKind;
use portal_types::EntityId;
use std::fmt;

// ============================================================================
// COLLABORATOR ERRORS
// ============================================================================

/// Broad category of a collaborator failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The request conflicts with current server state (e.g. slot already taken).
    Conflict,
    /// The addressed record does not exist.
    NotFound,
    /// The server rejected the request body.
    InvalidInput,
    /// The service could not be reached or failed internally.
    Unavailable,
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SourceErrorKind::Conflict => "conflict",
            SourceErrorKind::NotFound => "not found",
            SourceErrorKind::InvalidInput => "invalid input",
            SourceErrorKind::Unavailable => "unavailable",
        };
        f.write_str(text)
    }
}

/// A recoverable failure reported by a data source or mutation sink.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: SourceErrorKind,
    /// Message from the error payload, if the collaborator sent one.
    pub message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Conflict, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidInput, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    /// Text suitable for the view's message banner.
    ///
    /// Uses the payload message when present, otherwise a generic sentence for the kind.
    pub fn user_message(&self) -> String {
        let message = self.message.trim();
        if !message.is_empty() {
            return message.to_string();
        }
        match self.kind {
            SourceErrorKind::Conflict => "The request conflicts with existing data.".into(),
            SourceErrorKind::NotFound => "The requested record no longer exists.".into(),
            SourceErrorKind::InvalidInput => "The request was rejected as invalid.".into(),
            SourceErrorKind::Unavailable => {
                "The service is unavailable. Please try again.".into()
            }
        }
    }
}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// One field-level (or form-level, when `field` is `None`) validation problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldProblem {
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A form submission rejected before anything was sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationError {
    problems: Vec<FieldProblem>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem with a named field.
    pub fn field(&mut self, field: &str, message: impl Into<String>) {
        self.problems.push(FieldProblem {
            field: Some(field.to_string()),
            message: message.into(),
        });
    }

    /// Records a problem with the form as a whole.
    pub fn form(&mut self, message: impl Into<String>) {
        self.problems.push(FieldProblem {
            field: None,
            message: message.into(),
        });
    }

    pub fn problems(&self) -> &[FieldProblem] {
        &self.problems
    }

    /// Whether `field` has at least one recorded problem.
    pub fn has_field(&self, field: &str) -> bool {
        self.problems
            .iter()
            .any(|p| p.field.as_deref() == Some(field))
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.problems.is_empty() {
            return f.write_str("validation failed");
        }
        let parts: Vec<String> = self.problems.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// PORTAL ERRORS
// ============================================================================

/// The remote action a mutation failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationAction {
    Create,
    Update,
    Remove,
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Remove => "remove",
        };
        f.write_str(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to load {resource}")]
    Load {
        resource: ResourceKind,
        #[source]
        source: SourceError,
    },

    #[error("failed to load options for {slot}")]
    Options {
        slot: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to {action} record")]
    Mutation {
        action: MutationAction,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown slot: {0}")]
    UnknownSlot(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("{id} is not an available option for {slot}")]
    UnknownOption { slot: String, id: EntityId },

    #[error(transparent)]
    Text(#[from] portal_types::TextError),

    #[error(transparent)]
    Fixtures(#[from] portal_models::ModelError),

    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
}

impl PortalError {
    /// Text suitable for the view's message banner.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Load { source, .. }
            | PortalError::Options { source, .. }
            | PortalError::Mutation { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_payload_text() {
        let err = SourceError::conflict("Slot 09:00 was booked by someone else");
        assert_eq!(err.user_message(), "Slot 09:00 was booked by someone else");

        let bare = SourceError::unavailable("  ");
        assert_eq!(
            bare.user_message(),
            "The service is unavailable. Please try again."
        );
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let mut err = ValidationError::new();
        err.field("doctor", "is required");
        err.form("select a time slot before submitting");

        assert!(err.has_field("doctor"));
        assert!(!err.has_field("reason"));
        assert_eq!(
            err.to_string(),
            "doctor: is required; select a time slot before submitting"
        );
        assert!(err.into_result().is_err());
        assert!(ValidationError::new().into_result().is_ok());
    }

    #[test]
    fn test_portal_error_user_message_uses_collaborator_text() {
        let err = PortalError::Mutation {
            action: MutationAction::Update,
            source: SourceError::conflict("Consent already revoked"),
        };
        assert_eq!(err.user_message(), "Consent already revoked");
        assert_eq!(err.to_string(), "failed to update record");
        let cause = std::error::Error::source(&err).expect("mutation carries its cause");
        assert_eq!(cause.to_string(), "conflict: Consent already revoked");
    }

    #[test]
    fn test_validation_failure_reports_problems_once() {
        let mut problems = ValidationError::new();
        problems.field("doctor", "is required");
        let err = PortalError::from(problems);

        assert_eq!(err.to_string(), "doctor: is required");
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(err.user_message(), "doctor: is required");
    }
}
