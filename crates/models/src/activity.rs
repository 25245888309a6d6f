//! Audit trail entries and user notifications.
//!
//! Both are read-mostly lists: the admin audit screen pages and filters events by
//! action and age, and the notification centre marks entries read or archived.

use chrono::{DateTime, Utc};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};

// ============================================================================
// Audit
// ============================================================================

wire_enum! {
    pub enum AuditAction {
        Create => "CREATE",
        Read => "READ",
        Update => "UPDATE",
        Delete => "DELETE",
        Login => "LOGIN",
        Export => "EXPORT",
    }
}

wire_enum! {
    /// Whether the audited operation succeeded.
    pub enum AuditOutcome {
        Success => "SUCCESS",
        Failure => "FAILURE",
    }
}

/// One entry of the access audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditEvent {
    pub id: EntityId,
    /// User or service that performed the action.
    pub actor: String,
    pub action: AuditAction,
    /// Resource path the action touched, e.g. `admissions/42`.
    pub resource: String,
    pub outcome: AuditOutcome,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub detail: String,
}

// ============================================================================
// Notifications
// ============================================================================

wire_enum! {
    pub enum NotificationStatus {
        Unread => "UNREAD",
        Read => "READ",
        Archived => "ARCHIVED",
    }
}

wire_enum! {
    /// Delivery channel of a notification.
    pub enum NotificationChannel {
        InApp => "IN_APP",
        Email => "EMAIL",
        Sms => "SMS",
    }
}

/// A message delivered to a portal user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notification {
    pub id: EntityId,
    pub recipient: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub channel: NotificationChannel,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}
