//! Constants used throughout the portal core crate.
//!
//! Slot names, paging defaults and guardrail limits live here so the booking chains,
//! the in-memory source and the shell agree on them.

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound accepted for a configured page size.
pub const MAX_PAGE_SIZE: usize = 500;

/// Default age, in days, after which audit events count as "older than retention".
pub const DEFAULT_AUDIT_RETENTION_DAYS: u32 = 90;

/// Longest free-text search query accepted by the filter engine.
pub const MAX_SEARCH_QUERY_LEN: usize = 200;

/// Default length limit for free-text booking fields.
pub const MAX_FREE_TEXT_LEN: usize = 1_000;

/// Fixture document looked up relative to the working directory.
pub const FIXTURES_FILE: &str = "fixtures/portal.yaml";

/// Largest fixture document the shell will load.
pub const MAX_FIXTURES_BYTES: u64 = 5 * 1024 * 1024; // 5 MiB

/// Slot name: care facility.
pub const SLOT_FACILITY: &str = "facility";

/// Slot name: department within a facility.
pub const SLOT_DEPARTMENT: &str = "department";

/// Slot name: treating doctor.
pub const SLOT_DOCTOR: &str = "doctor";

/// Slot name: patient.
pub const SLOT_PATIENT: &str = "patient";

/// Slot name: bookable time slot.
pub const SLOT_TIME: &str = "slot";

/// Free-text field: reason for the booking.
pub const FIELD_REASON: &str = "reason";

/// Free-text field: additional notes.
pub const FIELD_NOTES: &str = "notes";

/// Catalogue list: patients a telehealth request can be raised for.
pub const LIST_PATIENT_DIRECTORY: &str = "patient_directory";

/// Catalogue list: departments offering telehealth.
pub const LIST_TELEHEALTH_DEPARTMENT: &str = "telehealth_department";

/// Catalogue list: telehealth time slots, keyed by doctor.
pub const LIST_TELEHEALTH_SLOT: &str = "telehealth_slot";
