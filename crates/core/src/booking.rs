//! Stock booking chains and the requests they produce.
//!
//! Three forms share the selector: admitting a patient, booking an in-person visit and
//! requesting a televisit. Each form's [`BookingPayload`] converts into the create body
//! its record kind expects.

use crate::constants::{
    FIELD_NOTES, FIELD_REASON, LIST_PATIENT_DIRECTORY, LIST_TELEHEALTH_DEPARTMENT,
    LIST_TELEHEALTH_SLOT, SLOT_DEPARTMENT, SLOT_DOCTOR, SLOT_FACILITY, SLOT_PATIENT, SLOT_TIME,
};
use crate::error::ValidationError;
use crate::selector::{BookingPayload, ChainSpec, SlotSpec, TextFieldSpec};
use crate::{PortalError, PortalResult};
use chrono::{DateTime, Utc};
use portal_models::{
    AdmissionRequest, AdmissionType, AppointmentRequest, Reference, TelevisitRequest, VisitType,
};
use portal_types::EntityId;
use std::fmt;
use std::str::FromStr;

/// The booking forms the portal offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingKind {
    Admission,
    Visit,
    Televisit,
}

impl BookingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingKind::Admission => "admission",
            BookingKind::Visit => "visit",
            BookingKind::Televisit => "televisit",
        }
    }

    pub fn chain(self) -> PortalResult<ChainSpec> {
        match self {
            BookingKind::Admission => admission_chain(),
            BookingKind::Visit => visit_chain(),
            BookingKind::Televisit => televisit_chain(),
        }
    }
}

impl fmt::Display for BookingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingKind {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admission" => Ok(BookingKind::Admission),
            "visit" | "appointment" => Ok(BookingKind::Visit),
            "televisit" => Ok(BookingKind::Televisit),
            other => Err(PortalError::InvalidInput(format!(
                "unknown booking form: '{other}'"
            ))),
        }
    }
}

// ============================================================================
// CHAINS
// ============================================================================

/// facility → department → doctor → patient, with the time slot also keyed by doctor.
pub fn admission_chain() -> PortalResult<ChainSpec> {
    ChainSpec::builder(BookingKind::Admission.as_str())
        .slot(SlotSpec::new(SLOT_FACILITY))
        .slot(SlotSpec::new(SLOT_DEPARTMENT).after(SLOT_FACILITY))
        .slot(SlotSpec::new(SLOT_DOCTOR).after(SLOT_DEPARTMENT))
        .slot(SlotSpec::new(SLOT_PATIENT).after(SLOT_DOCTOR))
        .slot(SlotSpec::new(SLOT_TIME).after(SLOT_DOCTOR))
        .text(TextFieldSpec::required(FIELD_REASON))
        .text(TextFieldSpec::optional(FIELD_NOTES))
        .build()
}

pub fn visit_chain() -> PortalResult<ChainSpec> {
    ChainSpec::builder(BookingKind::Visit.as_str())
        .slot(SlotSpec::new(SLOT_FACILITY))
        .slot(SlotSpec::new(SLOT_DEPARTMENT).after(SLOT_FACILITY))
        .slot(SlotSpec::new(SLOT_DOCTOR).after(SLOT_DEPARTMENT))
        .slot(SlotSpec::new(SLOT_TIME).after(SLOT_DOCTOR))
        .text(TextFieldSpec::required(FIELD_REASON))
        .build()
}

/// Patient and department are picked independently; doctor and slot cascade from the
/// department.
pub fn televisit_chain() -> PortalResult<ChainSpec> {
    ChainSpec::builder(BookingKind::Televisit.as_str())
        .slot(SlotSpec::new(SLOT_PATIENT).from_list(LIST_PATIENT_DIRECTORY))
        .slot(SlotSpec::new(SLOT_DEPARTMENT).from_list(LIST_TELEHEALTH_DEPARTMENT))
        .slot(SlotSpec::new(SLOT_DOCTOR).after(SLOT_DEPARTMENT))
        .slot(
            SlotSpec::new(SLOT_TIME)
                .from_list(LIST_TELEHEALTH_SLOT)
                .after(SLOT_DOCTOR),
        )
        .text(TextFieldSpec::required(FIELD_REASON))
        .build()
}

// ============================================================================
// REQUESTS
// ============================================================================

/// Pulls typed values out of a payload, collecting every problem before failing.
struct Extract<'a> {
    payload: &'a BookingPayload,
    problems: ValidationError,
}

impl<'a> Extract<'a> {
    fn new(payload: &'a BookingPayload, expected: BookingKind) -> Self {
        let mut problems = ValidationError::new();
        if payload.chain() != expected.as_str() {
            problems.form(format!(
                "a {} form cannot create a {expected} booking",
                payload.chain()
            ));
        }
        Self { payload, problems }
    }

    fn reference(&mut self, slot: &str) -> Reference {
        match self.payload.reference(slot) {
            Some(reference) => reference,
            None => {
                self.problems.field(slot, "is required");
                Reference::new(EntityId::Num(0), "")
            }
        }
    }

    /// The chosen slot id and its start time.
    fn time_slot(&mut self) -> (EntityId, DateTime<Utc>) {
        match self.payload.selection(SLOT_TIME) {
            Some(option) => match option.starts_at {
                Some(at) => (option.id.clone(), at),
                None => {
                    self.problems
                        .field(SLOT_TIME, "the chosen slot has no start time");
                    (option.id.clone(), DateTime::<Utc>::MIN_UTC)
                }
            },
            None => {
                self.problems.field(SLOT_TIME, "is required");
                (EntityId::Num(0), DateTime::<Utc>::MIN_UTC)
            }
        }
    }

    fn required_text(&mut self, field: &str) -> String {
        match self.payload.text(field) {
            Some(text) => text.to_string(),
            None => {
                self.problems.field(field, "is required");
                String::new()
            }
        }
    }

    fn optional_text(&self, field: &str) -> Option<String> {
        self.payload.text(field).map(str::to_string)
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        self.problems.into_result()?;
        Ok(value)
    }
}

/// Builds the create body for an admission.
///
/// # Errors
///
/// Returns a `ValidationError` if the payload came from another form, a selection is
/// missing, or the chosen slot has no start time.
pub fn admission_request(
    payload: &BookingPayload,
    admission_type: AdmissionType,
) -> Result<AdmissionRequest, ValidationError> {
    let mut fields = Extract::new(payload, BookingKind::Admission);
    let (slot, admit_at) = fields.time_slot();
    let request = AdmissionRequest {
        facility: fields.reference(SLOT_FACILITY),
        department: fields.reference(SLOT_DEPARTMENT),
        doctor: fields.reference(SLOT_DOCTOR),
        patient: fields.reference(SLOT_PATIENT),
        slot,
        admit_at,
        admission_type,
        reason: fields.required_text(FIELD_REASON),
        notes: fields.optional_text(FIELD_NOTES),
    };
    fields.finish(request)
}

/// Builds the create body for an in-person visit.
///
/// The patient is not part of the visit chain; the caller supplies the signed-in
/// patient.
///
/// # Errors
///
/// Same conditions as [`admission_request`].
pub fn appointment_request(
    payload: &BookingPayload,
    patient: Reference,
    visit_type: VisitType,
) -> Result<AppointmentRequest, ValidationError> {
    let mut fields = Extract::new(payload, BookingKind::Visit);
    let (slot, scheduled_at) = fields.time_slot();
    let request = AppointmentRequest {
        patient,
        facility: fields.reference(SLOT_FACILITY),
        department: fields.reference(SLOT_DEPARTMENT),
        doctor: fields.reference(SLOT_DOCTOR),
        slot,
        scheduled_at,
        visit_type,
        reason: fields.required_text(FIELD_REASON),
    };
    fields.finish(request)
}

/// Builds the create body for a televisit request.
///
/// # Errors
///
/// Same conditions as [`admission_request`].
pub fn televisit_request(payload: &BookingPayload) -> Result<TelevisitRequest, ValidationError> {
    let mut fields = Extract::new(payload, BookingKind::Televisit);
    let (slot, scheduled_at) = fields.time_slot();
    let request = TelevisitRequest {
        patient: fields.reference(SLOT_PATIENT),
        department: fields.reference(SLOT_DEPARTMENT),
        doctor: fields.reference(SLOT_DOCTOR),
        slot,
        scheduled_at,
        reason: fields.required_text(FIELD_REASON),
    };
    fields.finish(request)
}
