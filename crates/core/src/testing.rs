//! Record builders shared by the unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use portal_models::{
    Admission, AdmissionRequest, AdmissionStatus, AdmissionType, Catalogue, Payment,
    PaymentMethod, PaymentStatus, Reference, SelectOption,
};
use portal_types::EntityId;

/// Fixed "now" so time-based criteria are deterministic.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

pub fn admission(id: u64, status: AdmissionStatus, patient: &str, days_ago: i64) -> Admission {
    Admission {
        id: EntityId::Num(id),
        patient: Reference::new(100 + id, patient),
        facility: Reference::new("F1", "North General"),
        department: Reference::new("D1", "Cardiology"),
        doctor: Reference::new(11u64, "Dr. Okafor"),
        admission_type: AdmissionType::Elective,
        status,
        admitted_at: now() - Duration::days(days_ago),
        discharged_at: None,
        reason: String::new(),
        notes: None,
    }
}

pub fn admission_request(patient: &str) -> AdmissionRequest {
    AdmissionRequest {
        facility: Reference::new("F1", "North General"),
        department: Reference::new("D1", "Cardiology"),
        doctor: Reference::new(11u64, "Dr. Okafor"),
        patient: Reference::new(199u64, patient),
        slot: EntityId::from("S1"),
        admit_at: now(),
        admission_type: AdmissionType::Emergency,
        reason: "Chest pain".into(),
        notes: None,
    }
}

/// Admissions with ids `1..=count`, all active, admitted one day apart.
pub fn admissions(count: u64) -> Vec<Admission> {
    (1..=count)
        .map(|id| admission(id, AdmissionStatus::Active, &format!("Patient {id}"), id as i64))
        .collect()
}

pub fn payment(id: u64, status: PaymentStatus, amount_cents: i64) -> Payment {
    Payment {
        id: EntityId::Num(id),
        patient: Reference::new(101u64, "Ana Silva"),
        description: format!("Invoice {id}"),
        amount_cents,
        currency: "EUR".into(),
        method: PaymentMethod::Card,
        status,
        created_at: now() - Duration::days(id as i64),
        reference: format!("INV-{id:04}"),
    }
}

pub fn ids<E: crate::Entity>(list: &[E]) -> Vec<EntityId> {
    list.iter().map(|e| e.id().clone()).collect()
}

pub fn nums(values: &[u64]) -> Vec<EntityId> {
    values.iter().copied().map(EntityId::Num).collect()
}

/// Two facilities with departments, doctors, patients and slots, plus the telehealth lists.
pub fn catalogue() -> Catalogue {
    let at = now() + Duration::days(2);
    Catalogue::new()
        .with(
            "patient_directory",
            [
                SelectOption::new(101u64, "Ana Silva"),
                SelectOption::new(103u64, "Lena Fischer"),
            ],
        )
        .with(
            "telehealth_department",
            [
                SelectOption::new("D2", "Dermatology"),
                SelectOption::new("D3", "Paediatrics"),
            ],
        )
        .with(
            "telehealth_slot",
            [
                SelectOption::new("T1", "14:00").under(12u64).starting(at),
                SelectOption::new("T2", "15:00").under(13u64).starting(at),
            ],
        )
        .with(
            "facility",
            [
                SelectOption::new("F1", "North General"),
                SelectOption::new("F2", "Harbour Clinic"),
            ],
        )
        .with(
            "department",
            [
                SelectOption::new("D1", "Cardiology").under("F1"),
                SelectOption::new("D2", "Dermatology").under("F1"),
                SelectOption::new("D3", "Paediatrics").under("F2"),
            ],
        )
        .with(
            "doctor",
            [
                SelectOption::new(11u64, "Dr. Okafor").under("D1"),
                SelectOption::new(12u64, "Dr. Brandt").under("D2"),
                SelectOption::new(13u64, "Dr. Haddad").under("D3"),
            ],
        )
        .with(
            "patient",
            [
                SelectOption::new(101u64, "Ana Silva").under(11u64),
                SelectOption::new(102u64, "Tomas Berg").under(11u64),
                SelectOption::new(103u64, "Lena Fischer").under(12u64),
                SelectOption::new(104u64, "Omar Said").under(13u64),
            ],
        )
        .with(
            "slot",
            [
                SelectOption::new("S1", "09:00").under(11u64).starting(at),
                SelectOption::new("S2", "10:00")
                    .under(11u64)
                    .starting(at + Duration::hours(1)),
                SelectOption::new("S3", "09:30").under(12u64).starting(at),
                SelectOption::new("S4", "11:00").under(13u64),
            ],
        )
}
