//! Outpatient visits and televisits.

use crate::Reference;
use chrono::{DateTime, Utc};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};

// ============================================================================
// In-person visits
// ============================================================================

wire_enum! {
    /// Lifecycle state of a booked visit.
    pub enum AppointmentStatus {
        Scheduled => "SCHEDULED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
        NoShow => "NO_SHOW",
    }
}

wire_enum! {
    /// Kind of in-person visit.
    pub enum VisitType {
        InPerson => "IN_PERSON",
        FollowUp => "FOLLOW_UP",
        Consultation => "CONSULTATION",
    }
}

/// A booked in-person visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Appointment {
    pub id: EntityId,
    pub patient: Reference,
    pub doctor: Reference,
    pub department: Reference,
    pub visit_type: VisitType,
    pub status: AppointmentStatus,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub reason: String,
}

impl Appointment {
    /// Builds the record the appointments service returns for an accepted request.
    pub fn from_request(id: EntityId, request: AppointmentRequest) -> Self {
        Self {
            id,
            patient: request.patient,
            doctor: request.doctor,
            department: request.department,
            visit_type: request.visit_type,
            status: AppointmentStatus::Scheduled,
            scheduled_at: request.scheduled_at,
            reason: request.reason,
        }
    }
}

/// Body of a "book visit" call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient: Reference,
    pub facility: Reference,
    pub department: Reference,
    pub doctor: Reference,
    pub slot: EntityId,
    pub scheduled_at: DateTime<Utc>,
    pub visit_type: VisitType,
    pub reason: String,
}

// ============================================================================
// Televisits
// ============================================================================

wire_enum! {
    /// Lifecycle state of a remote consultation.
    pub enum TelevisitStatus {
        Requested => "REQUESTED",
        Scheduled => "SCHEDULED",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

/// A remote consultation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Televisit {
    pub id: EntityId,
    pub patient: Reference,
    pub doctor: Reference,
    pub status: TelevisitStatus,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub reason: String,
}

impl Televisit {
    /// Builds a freshly requested televisit; the meeting link is issued later by the
    /// video service.
    pub fn from_request(id: EntityId, request: TelevisitRequest) -> Self {
        Self {
            id,
            patient: request.patient,
            doctor: request.doctor,
            status: TelevisitStatus::Requested,
            scheduled_at: request.scheduled_at,
            meeting_url: None,
            reason: request.reason,
        }
    }
}

/// Body of a "request televisit" call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelevisitRequest {
    pub patient: Reference,
    pub department: Reference,
    pub doctor: Reference,
    pub slot: EntityId,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_requested_televisit_has_no_meeting_link() {
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 14, 30, 0).unwrap();
        let visit = Televisit::from_request(
            EntityId::Num(9),
            TelevisitRequest {
                patient: Reference::new(101u64, "Ana Silva"),
                department: Reference::new("D2", "Dermatology"),
                doctor: Reference::new(12u64, "Dr. Brandt"),
                slot: EntityId::from("S9"),
                scheduled_at: at,
                reason: "Rash follow-up".into(),
            },
        );

        assert_eq!(visit.status, TelevisitStatus::Requested);
        assert_eq!(visit.meeting_url, None);
        assert_eq!(visit.scheduled_at, at);
    }

    #[test]
    fn test_visit_type_wire_names() {
        assert_eq!(VisitType::FollowUp.as_str(), "FOLLOW_UP");
        assert_eq!(
            "no_show".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::NoShow
        );
    }
}
