//! YAML fixture documents.
//!
//! A fixture document seeds the in-memory data source with one list per record kind
//! plus the booking option catalogue:
//!
//! ```yaml
//! admissions:
//!   - id: 1
//!     patient: { id: 101, display: Ana Silva }
//!     ...
//! payments: []
//! catalogue:
//!   facility:
//!     - { id: F1, label: North General }
//!   department:
//!     - { id: D1, label: Cardiology, parent: F1 }
//! ```
//!
//! Every list is optional. Unknown keys are rejected, and ids must be unique within
//! each list.

use crate::{
    Admission, Appointment, AuditEvent, Catalogue, Consent, ModelError, ModelResult,
    Notification, Payment, Prescription, Televisit,
};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Everything a fixture document can hold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalFixtures {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admissions: Vec<Admission>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub appointments: Vec<Appointment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub televisits: Vec<Televisit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<Payment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prescriptions: Vec<Prescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consents: Vec<Consent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_events: Vec<AuditEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<Notification>,
    #[serde(default, skip_serializing_if = "Catalogue::is_empty")]
    pub catalogue: Catalogue,
}

// ============================================================================
// Public Fixtures operations
// ============================================================================

/// Fixture document operations.
///
/// This is a zero-sized type used for namespacing fixture-related operations.
/// All methods are associated functions.
pub struct Fixtures;

impl Fixtures {
    /// Parse a fixture document from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface the path of the failing field
    /// (e.g. `payments[2].status`) when the YAML does not match the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if:
    /// - the YAML does not match the fixture schema ([`ModelError::Schema`]),
    /// - a list contains the same id twice ([`ModelError::InvalidInput`]).
    pub fn parse(yaml_text: &str) -> ModelResult<PortalFixtures> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let fixtures = match serde_path_to_error::deserialize::<_, PortalFixtures>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(ModelError::Schema {
                    path,
                    message: source.to_string(),
                });
            }
        };

        validate_unique_ids(&fixtures)?;
        Ok(fixtures)
    }

    /// Read and parse a fixture document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] if the file cannot be read, otherwise as [`Fixtures::parse`].
    pub fn load(path: &Path) -> ModelResult<PortalFixtures> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Render fixtures as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidYaml`] if serialisation fails.
    pub fn render(fixtures: &PortalFixtures) -> ModelResult<String> {
        Ok(serde_yaml::to_string(fixtures)?)
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn validate_unique_ids(fixtures: &PortalFixtures) -> ModelResult<()> {
    fn check<'a>(list: &str, ids: impl Iterator<Item = &'a EntityId>) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                return Err(ModelError::InvalidInput(format!(
                    "duplicate id {id} in {list}"
                )));
            }
        }
        Ok(())
    }

    check("admissions", fixtures.admissions.iter().map(|r| &r.id))?;
    check("appointments", fixtures.appointments.iter().map(|r| &r.id))?;
    check("televisits", fixtures.televisits.iter().map(|r| &r.id))?;
    check("payments", fixtures.payments.iter().map(|r| &r.id))?;
    check("prescriptions", fixtures.prescriptions.iter().map(|r| &r.id))?;
    check("consents", fixtures.consents.iter().map(|r| &r.id))?;
    check("audit_events", fixtures.audit_events.iter().map(|r| &r.id))?;
    check("notifications", fixtures.notifications.iter().map(|r| &r.id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AdmissionStatus, PaymentStatus};

    const SAMPLE: &str = r#"
admissions:
  - id: 1
    patient: { id: 101, display: Ana Silva }
    facility: { id: F1, display: North General }
    department: { id: D1, display: Cardiology }
    doctor: { id: 11, display: Dr. Okafor }
    admission_type: ELECTIVE
    status: ACTIVE
    admitted_at: 2026-03-01T08:00:00Z
    reason: Chest pain observation
payments:
  - id: 7
    patient: { id: 101, display: Ana Silva }
    description: Ward stay
    amount_cents: 125000
    currency: EUR
    method: INSURANCE
    status: PENDING
    created_at: 2026-03-04T10:00:00Z
catalogue:
  facility:
    - { id: F1, label: North General }
  department:
    - { id: D1, label: Cardiology, parent: F1 }
"#;

    #[test]
    fn test_parses_sample_document() {
        let fixtures = Fixtures::parse(SAMPLE).expect("sample should parse");

        assert_eq!(fixtures.admissions.len(), 1);
        assert_eq!(fixtures.admissions[0].status, AdmissionStatus::Active);
        assert_eq!(fixtures.admissions[0].id, EntityId::Num(1));
        assert_eq!(fixtures.payments[0].status, PaymentStatus::Pending);
        assert!(fixtures.televisits.is_empty());
        assert_eq!(
            fixtures.catalogue.options_for("department", Some(&EntityId::from("F1")))[0].label,
            "Cardiology"
        );
    }

    #[test]
    fn test_render_then_parse_preserves_content() {
        let fixtures = Fixtures::parse(SAMPLE).expect("sample should parse");
        let yaml = Fixtures::render(&fixtures).expect("should render");
        let reparsed = Fixtures::parse(&yaml).expect("rendered yaml should parse");
        assert_eq!(reparsed, fixtures);
    }

    #[test]
    fn test_schema_errors_report_field_path() {
        let input = r#"
payments:
  - id: 7
    patient: { id: 101, display: Ana Silva }
    description: Ward stay
    amount_cents: 125000
    currency: EUR
    method: INSURANCE
    status: OVERDUE
    created_at: 2026-03-04T10:00:00Z
"#;
        let err = Fixtures::parse(input).expect_err("unknown status should fail");
        match err {
            ModelError::Schema { path, .. } => {
                assert!(path.contains("payments"), "unexpected path: {path}");
                assert!(path.contains("status"), "unexpected path: {path}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_top_level_key() {
        let err = Fixtures::parse("wards: []\n").expect_err("unknown key should fail");
        assert!(matches!(err, ModelError::Schema { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let input = r#"
notifications:
  - { id: 3, recipient: ana, title: A, channel: EMAIL, status: UNREAD, created_at: 2026-01-01T00:00:00Z }
  - { id: 3, recipient: ana, title: B, channel: EMAIL, status: READ, created_at: 2026-01-02T00:00:00Z }
"#;
        let err = Fixtures::parse(input).expect_err("duplicate ids should fail");
        match err {
            ModelError::InvalidInput(msg) => assert!(msg.contains("notifications")),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn test_shipped_fixture_document_parses() {
        let text = include_str!("../../../fixtures/portal.yaml");
        let fixtures = Fixtures::parse(text).expect("shipped fixtures should parse");

        assert!(!fixtures.admissions.is_empty());
        assert!(!fixtures.audit_events.is_empty());
        assert_eq!(
            fixtures
                .catalogue
                .options_for("slot", Some(&EntityId::Num(11)))
                .len(),
            2
        );
    }

    #[test]
    fn test_empty_document_is_valid() {
        let fixtures = Fixtures::parse("{}").expect("empty mapping should parse");
        assert_eq!(fixtures, PortalFixtures::default());
    }
}
