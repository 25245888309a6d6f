//! Patient consent records.

use crate::Reference;
use chrono::{DateTime, Utc};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum ConsentStatus {
        Pending => "PENDING",
        Granted => "GRANTED",
        Revoked => "REVOKED",
        Expired => "EXPIRED",
    }
}

wire_enum! {
    /// What the consent covers.
    pub enum ConsentType {
        Treatment => "TREATMENT",
        DataSharing => "DATA_SHARING",
        Research => "RESEARCH",
        Telehealth => "TELEHEALTH",
    }
}

/// A consent given (or requested) by a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Consent {
    pub id: EntityId,
    pub patient: Reference,
    pub consent_type: ConsentType,
    /// Organisation or clinician receiving the consent.
    pub granted_to: String,
    #[serde(default)]
    pub purpose: String,
    pub status: ConsentStatus,
    pub recorded_at: DateTime<Utc>,
}
