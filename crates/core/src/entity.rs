//! Record traits and the bindings of the portal's record kinds to them.
//!
//! The filter engine, pager, reducer and list view are generic over these traits, so
//! each dashboard section is one `ListView<E>` instead of bespoke state per screen.

use chrono::{DateTime, Utc};
use portal_models::{
    Admission, AdmissionStatus, AdmissionType, Appointment, AppointmentStatus, AuditAction,
    AuditEvent, AuditOutcome, Consent, ConsentStatus, ConsentType, Notification,
    NotificationChannel, NotificationStatus, Payment, PaymentMethod, PaymentStatus, Prescription,
    PrescriptionStatus, Televisit, TelevisitStatus, VisitType,
};
use portal_models::{AdmissionRequest, AppointmentRequest, TelevisitRequest};
use portal_types::EntityId;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RESOURCE KINDS
// ============================================================================

/// The collections the portal backend serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Admissions,
    Appointments,
    Televisits,
    Payments,
    Prescriptions,
    Consents,
    AuditEvents,
    Notifications,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Admissions,
        ResourceKind::Appointments,
        ResourceKind::Televisits,
        ResourceKind::Payments,
        ResourceKind::Prescriptions,
        ResourceKind::Consents,
        ResourceKind::AuditEvents,
        ResourceKind::Notifications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Admissions => "admissions",
            ResourceKind::Appointments => "appointments",
            ResourceKind::Televisits => "televisits",
            ResourceKind::Payments => "payments",
            ResourceKind::Prescriptions => "prescriptions",
            ResourceKind::Consents => "consents",
            ResourceKind::AuditEvents => "audit-events",
            ResourceKind::Notifications => "notifications",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = crate::PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted || k.as_str().trim_end_matches('s') == wanted)
            .ok_or_else(|| crate::PortalError::InvalidInput(format!("unknown resource: '{s}'")))
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// A record with a stable identifier, unique within its list.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Collection this record kind is served from.
    const KIND: ResourceKind;

    fn id(&self) -> &EntityId;
}

/// A record the filter engine can evaluate criteria against.
pub trait Filterable: Entity {
    /// Lifecycle status, matched by the `status` criterion.
    type Status: Copy + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Secondary category, matched by the `kind` criterion. Records without one use
    /// [`Infallible`].
    type Kind: Copy + PartialEq + fmt::Debug + Send + Sync + 'static;

    fn status(&self) -> Self::Status;

    fn kind(&self) -> Option<Self::Kind>;

    /// Timestamp used by date-range and age criteria.
    fn timestamp(&self) -> Option<DateTime<Utc>>;

    /// Fields searched by free-text queries; fixed per record kind.
    fn search_fields(&self) -> Vec<&str>;

    /// Patient the record belongs to, for patient-scoped dashboards.
    fn subject(&self) -> Option<&EntityId> {
        None
    }
}

/// A record the mutation sink can create and patch.
pub trait Mutable: Filterable {
    /// Body of a create call.
    type Draft: Send + 'static;

    /// Builds the stored record from an accepted draft and its assigned id.
    fn materialize(id: EntityId, draft: Self::Draft) -> Self;

    /// Applies a status change (cancel, discharge, mark read, ...).
    fn set_status(&mut self, status: Self::Status);
}

// ============================================================================
// RECORD BINDINGS
// ============================================================================

impl Entity for Admission {
    const KIND: ResourceKind = ResourceKind::Admissions;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for Admission {
    type Status = AdmissionStatus;
    type Kind = AdmissionType;

    fn status(&self) -> AdmissionStatus {
        self.status
    }

    fn kind(&self) -> Option<AdmissionType> {
        Some(self.admission_type)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.admitted_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.patient.display.as_str(),
            self.doctor.display.as_str(),
            self.department.display.as_str(),
            self.facility.display.as_str(),
            self.reason.as_str(),
        ]
    }

    fn subject(&self) -> Option<&EntityId> {
        Some(&self.patient.id)
    }
}

impl Mutable for Admission {
    type Draft = AdmissionRequest;

    fn materialize(id: EntityId, draft: AdmissionRequest) -> Self {
        Admission::from_request(id, draft)
    }

    fn set_status(&mut self, status: AdmissionStatus) {
        if status == AdmissionStatus::Discharged && self.discharged_at.is_none() {
            self.discharged_at = Some(Utc::now());
        }
        self.status = status;
    }
}

impl Entity for Appointment {
    const KIND: ResourceKind = ResourceKind::Appointments;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for Appointment {
    type Status = AppointmentStatus;
    type Kind = VisitType;

    fn status(&self) -> AppointmentStatus {
        self.status
    }

    fn kind(&self) -> Option<VisitType> {
        Some(self.visit_type)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.scheduled_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.patient.display.as_str(),
            self.doctor.display.as_str(),
            self.department.display.as_str(),
            self.reason.as_str(),
        ]
    }

    fn subject(&self) -> Option<&EntityId> {
        Some(&self.patient.id)
    }
}

impl Mutable for Appointment {
    type Draft = AppointmentRequest;

    fn materialize(id: EntityId, draft: AppointmentRequest) -> Self {
        Appointment::from_request(id, draft)
    }

    fn set_status(&mut self, status: AppointmentStatus) {
        self.status = status;
    }
}

impl Entity for Televisit {
    const KIND: ResourceKind = ResourceKind::Televisits;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for Televisit {
    type Status = TelevisitStatus;
    type Kind = Infallible;

    fn status(&self) -> TelevisitStatus {
        self.status
    }

    fn kind(&self) -> Option<Infallible> {
        None
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.scheduled_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.patient.display.as_str(), self.doctor.display.as_str(), self.reason.as_str()]
    }

    fn subject(&self) -> Option<&EntityId> {
        Some(&self.patient.id)
    }
}

impl Mutable for Televisit {
    type Draft = TelevisitRequest;

    fn materialize(id: EntityId, draft: TelevisitRequest) -> Self {
        Televisit::from_request(id, draft)
    }

    fn set_status(&mut self, status: TelevisitStatus) {
        self.status = status;
    }
}

impl Entity for Payment {
    const KIND: ResourceKind = ResourceKind::Payments;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for Payment {
    type Status = PaymentStatus;
    type Kind = PaymentMethod;

    fn status(&self) -> PaymentStatus {
        self.status
    }

    fn kind(&self) -> Option<PaymentMethod> {
        Some(self.method)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.patient.display.as_str(), self.description.as_str(), self.reference.as_str()]
    }

    fn subject(&self) -> Option<&EntityId> {
        Some(&self.patient.id)
    }
}

impl Entity for Prescription {
    const KIND: ResourceKind = ResourceKind::Prescriptions;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for Prescription {
    type Status = PrescriptionStatus;
    type Kind = Infallible;

    fn status(&self) -> PrescriptionStatus {
        self.status
    }

    fn kind(&self) -> Option<Infallible> {
        None
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.issued_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.patient.display.as_str(),
            self.prescriber.display.as_str(),
            self.medication.as_str(),
        ]
    }

    fn subject(&self) -> Option<&EntityId> {
        Some(&self.patient.id)
    }
}

impl Entity for Consent {
    const KIND: ResourceKind = ResourceKind::Consents;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for Consent {
    type Status = ConsentStatus;
    type Kind = ConsentType;

    fn status(&self) -> ConsentStatus {
        self.status
    }

    fn kind(&self) -> Option<ConsentType> {
        Some(self.consent_type)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.recorded_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.patient.display.as_str(), self.granted_to.as_str(), self.purpose.as_str()]
    }

    fn subject(&self) -> Option<&EntityId> {
        Some(&self.patient.id)
    }
}

impl Entity for AuditEvent {
    const KIND: ResourceKind = ResourceKind::AuditEvents;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for AuditEvent {
    type Status = AuditOutcome;
    type Kind = AuditAction;

    fn status(&self) -> AuditOutcome {
        self.outcome
    }

    fn kind(&self) -> Option<AuditAction> {
        Some(self.action)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.occurred_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.actor.as_str(), self.resource.as_str(), self.detail.as_str()]
    }
}

impl Entity for Notification {
    const KIND: ResourceKind = ResourceKind::Notifications;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Filterable for Notification {
    type Status = NotificationStatus;
    type Kind = NotificationChannel;

    fn status(&self) -> NotificationStatus {
        self.status
    }

    fn kind(&self) -> Option<NotificationChannel> {
        Some(self.channel)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.recipient.as_str(), self.title.as_str(), self.body.as_str()]
    }
}

/// Records whose create body is the record itself; the sink only assigns the id.
macro_rules! self_drafted {
    ($($record:ty => $status:ident),+ $(,)?) => {
        $(
            impl Mutable for $record {
                type Draft = $record;

                fn materialize(id: EntityId, mut draft: $record) -> Self {
                    draft.id = id;
                    draft
                }

                fn set_status(&mut self, status: Self::Status) {
                    self.$status = status;
                }
            }
        )+
    };
}

self_drafted! {
    Payment => status,
    Prescription => status,
    Consent => status,
    AuditEvent => outcome,
    Notification => status,
}
