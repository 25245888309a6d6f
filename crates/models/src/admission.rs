//! Inpatient admission records.
//!
//! Admissions are listed on the admin and doctor dashboards and created through the
//! facility → department → doctor → patient → slot booking chain.

use crate::Reference;
use chrono::{DateTime, Utc};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Lifecycle state of an admission.
    pub enum AdmissionStatus {
        /// Patient currently admitted.
        Active => "ACTIVE",
        /// Patient discharged.
        Discharged => "DISCHARGED",
        /// Patient moved to another facility.
        Transferred => "TRANSFERRED",
        /// Admission cancelled before the patient arrived.
        Cancelled => "CANCELLED",
    }
}

wire_enum! {
    /// How the admission came about.
    pub enum AdmissionType {
        Emergency => "EMERGENCY",
        Elective => "ELECTIVE",
        Transfer => "TRANSFER",
    }
}

/// An inpatient admission as returned by the admissions service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Admission {
    pub id: EntityId,
    pub patient: Reference,
    pub facility: Reference,
    pub department: Reference,
    pub doctor: Reference,
    pub admission_type: AdmissionType,
    pub status: AdmissionStatus,
    pub admitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Admission {
    /// Builds the record the admissions service returns for an accepted request.
    ///
    /// The patient is admitted at the booked slot's start time.
    pub fn from_request(id: EntityId, request: AdmissionRequest) -> Self {
        Self {
            id,
            patient: request.patient,
            facility: request.facility,
            department: request.department,
            doctor: request.doctor,
            admission_type: request.admission_type,
            status: AdmissionStatus::Active,
            admitted_at: request.admit_at,
            discharged_at: None,
            reason: request.reason,
            notes: request.notes,
        }
    }

    /// Length of stay, if the patient has been discharged.
    pub fn length_of_stay(&self) -> Option<chrono::Duration> {
        self.discharged_at.map(|d| d - self.admitted_at)
    }
}

/// Body of a "create admission" call, built from a completed booking chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    pub facility: Reference,
    pub department: Reference,
    pub doctor: Reference,
    pub patient: Reference,
    pub slot: EntityId,
    pub admit_at: DateTime<Utc>,
    pub admission_type: AdmissionType,
    pub reason: String,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_parses_wire_form_case_insensitively() {
        assert_eq!(
            "discharged".parse::<AdmissionStatus>().unwrap(),
            AdmissionStatus::Discharged
        );
        assert_eq!(AdmissionStatus::Active.to_string(), "ACTIVE");
        assert!("ADMITTED".parse::<AdmissionStatus>().is_err());
    }

    #[test]
    fn test_length_of_stay_only_after_discharge() {
        let admitted = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let mut admission = Admission::from_request(
            EntityId::Num(1),
            AdmissionRequest {
                facility: Reference::new("F1", "North General"),
                department: Reference::new("D1", "Cardiology"),
                doctor: Reference::new(11u64, "Dr. Okafor"),
                patient: Reference::new(101u64, "Ana Silva"),
                slot: EntityId::from("S1"),
                admit_at: admitted,
                admission_type: AdmissionType::Elective,
                reason: "Observation".into(),
                notes: None,
            },
        );

        assert_eq!(admission.status, AdmissionStatus::Active);
        assert_eq!(admission.length_of_stay(), None);

        admission.discharged_at = Some(admitted + chrono::Duration::days(3));
        assert_eq!(admission.length_of_stay(), Some(chrono::Duration::days(3)));
    }
}
