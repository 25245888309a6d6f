//! Prescriptions issued to patients.

use crate::Reference;
use chrono::{DateTime, Utc};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum PrescriptionStatus {
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
        Expired => "EXPIRED",
    }
}

/// A medication order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Prescription {
    pub id: EntityId,
    pub patient: Reference,
    pub prescriber: Reference,
    pub medication: String,
    pub dosage: String,
    pub status: PrescriptionStatus,
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Prescription {
    /// Whether the prescription is past its expiry at `now`, regardless of its status.
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
