//! Portal domain records and fixture support.
//!
//! This crate provides the **record shapes** the portal's dashboards list, filter and
//! mutate, plus the option catalogue behind the booking dropdowns:
//! - admissions, visits (appointments) and televisits
//! - payments, prescriptions and consents
//! - audit events and notifications
//!
//! It also parses and renders the YAML fixture documents used to seed the in-memory
//! data source. It knows nothing about filtering, paging or selection; that lives in
//! `portal-core`.

use portal_types::EntityId;
use serde::{Deserialize, Serialize};

/// Declares a closed enum with a fixed wire spelling per variant.
///
/// Generates serde renames, `as_str`, `ALL`, `Display` and a case-insensitive `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire spelling of this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| crate::ModelError::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }
    };
}

pub mod activity;
pub mod admission;
pub mod billing;
pub mod catalogue;
pub mod consent;
pub mod fixtures;
pub mod prescription;
pub mod visits;

pub use activity::{
    AuditAction, AuditEvent, AuditOutcome, Notification, NotificationChannel, NotificationStatus,
};
pub use admission::{Admission, AdmissionRequest, AdmissionStatus, AdmissionType};
pub use billing::{Payment, PaymentMethod, PaymentStatus};
pub use catalogue::{Catalogue, SelectOption};
pub use consent::{Consent, ConsentStatus, ConsentType};
pub use fixtures::{Fixtures, PortalFixtures};
pub use prescription::{Prescription, PrescriptionStatus};
pub use visits::{
    Appointment, AppointmentRequest, AppointmentStatus, Televisit, TelevisitRequest,
    TelevisitStatus, VisitType,
};

/// A pointer to another party or resource, with the text shown for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    /// Identifier of the referenced record.
    pub id: EntityId,
    /// Human-readable label, e.g. a patient's full name.
    pub display: String,
}

impl Reference {
    pub fn new(id: impl Into<EntityId>, display: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
        }
    }
}

impl From<&SelectOption> for Reference {
    fn from(option: &SelectOption) -> Self {
        Self {
            id: option.id.clone(),
            display: option.label.clone(),
        }
    }
}

/// Errors returned by the `portal-models` crate.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fixture schema mismatch at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("unknown {kind} value: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Type alias for Results that can fail with a [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;
