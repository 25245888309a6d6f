//! In-memory collaborators seeded from fixtures.
//!
//! [`InMemoryStore`] stands in for one backend collection and [`CatalogueSource`] for
//! the option endpoints. Both can be told to fail their next calls, which is how the
//! recoverable-error paths of list views and selectors are exercised.

use crate::config::validate_fixtures_file;
use crate::entity::{Mutable, ResourceKind};
use crate::error::SourceError;
use crate::source::{DataSource, FilterParams, MutationSink, OptionsRequest, OptionsSource};
use crate::PortalResult;
use async_trait::async_trait;
use portal_models::{
    Admission, Appointment, AuditEvent, Catalogue, Consent, Fixtures, Notification, Payment,
    PortalFixtures, Prescription, SelectOption, Televisit,
};
use portal_types::EntityId;
use std::collections::VecDeque;
use std::path::Path;
use tokio::sync::Mutex;

// ============================================================================
// RECORD STORE
// ============================================================================

#[derive(Debug)]
struct StoreState<E> {
    records: Vec<E>,
    /// Next numeric id; `None` once the store hands out UUIDs.
    next_num: Option<u64>,
    failures: VecDeque<SourceError>,
}

impl<E> StoreState<E> {
    fn take_failure(&mut self) -> Result<(), SourceError> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Fresh id, never handed out twice by this store.
    fn allocate_id(&mut self) -> EntityId {
        match self.next_num {
            Some(n) => {
                self.next_num = n.checked_add(1);
                EntityId::Num(n)
            }
            None => EntityId::Text(uuid::Uuid::new_v4().simple().to_string()),
        }
    }
}

/// One backend collection held in memory.
#[derive(Debug)]
pub struct InMemoryStore<E> {
    state: Mutex<StoreState<E>>,
}

impl<E: Mutable> InMemoryStore<E> {
    /// Seeds the store.
    ///
    /// Numeric ids continue above the largest seeded id. If any seeded id is textual,
    /// or the numeric range is used up, created records get UUID ids instead.
    pub fn new(records: Vec<E>) -> Self {
        let textual_ids = records.iter().any(|r| r.id().as_num().is_none());
        let next_num = if textual_ids {
            None
        } else {
            records
                .iter()
                .filter_map(|r| r.id().as_num())
                .max()
                .map_or(Some(1), |max| max.checked_add(1))
        };

        Self {
            state: Mutex::new(StoreState {
                records,
                next_num,
                failures: VecDeque::new(),
            }),
        }
    }

    /// Makes the next call on this store fail with `error`.
    ///
    /// Calls queue up: scripting two failures fails the next two calls.
    pub async fn fail_next(&self, error: SourceError) {
        self.state.lock().await.failures.push_back(error);
    }

    /// Current contents, in stored order.
    pub async fn snapshot(&self) -> Vec<E> {
        self.state.lock().await.records.clone()
    }
}

impl<E: Mutable> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl<E: Mutable> DataSource<E> for InMemoryStore<E> {
    async fn fetch_list(
        &self,
        kind: ResourceKind,
        params: &FilterParams,
    ) -> Result<Vec<E>, SourceError> {
        let mut state = self.state.lock().await;
        state.take_failure()?;

        if kind != E::KIND {
            return Err(SourceError::not_found(format!(
                "this store serves {}, not {kind}",
                E::KIND
            )));
        }

        if !params.extra.is_empty() {
            tracing::debug!(extra = ?params.extra, "ignoring extra list parameters");
        }

        let records = match &params.subject {
            Some(subject) => state
                .records
                .iter()
                .filter(|r| r.subject() == Some(subject))
                .cloned()
                .collect(),
            None => state.records.clone(),
        };
        Ok(records)
    }
}

#[async_trait]
impl<E: Mutable> MutationSink<E> for InMemoryStore<E> {
    type Patch = E::Status;

    async fn create(&self, draft: E::Draft) -> Result<E, SourceError> {
        let mut state = self.state.lock().await;
        state.take_failure()?;

        let id = state.allocate_id();
        let record = E::materialize(id, draft);
        state.records.push(record.clone());
        tracing::debug!(kind = %E::KIND, id = %record.id(), "created record");
        Ok(record)
    }

    async fn update(&self, id: &EntityId, patch: E::Status) -> Result<E, SourceError> {
        let mut state = self.state.lock().await;
        state.take_failure()?;

        let record = state
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| SourceError::not_found(format!("{} {id} does not exist", E::KIND)))?;
        record.set_status(patch);
        Ok(record.clone())
    }

    async fn remove(&self, id: &EntityId) -> Result<EntityId, SourceError> {
        let mut state = self.state.lock().await;
        state.take_failure()?;

        let index = state
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| SourceError::not_found(format!("{} {id} does not exist", E::KIND)))?;
        state.records.remove(index);
        Ok(id.clone())
    }
}

// ============================================================================
// OPTION SOURCE
// ============================================================================

/// Serves selector options from a [`Catalogue`].
#[derive(Debug)]
pub struct CatalogueSource {
    catalogue: Catalogue,
    failures: Mutex<VecDeque<SourceError>>,
}

impl CatalogueSource {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Makes the next option fetch fail with `error`.
    pub async fn fail_next(&self, error: SourceError) {
        self.failures.lock().await.push_back(error);
    }
}

#[async_trait]
impl OptionsSource for CatalogueSource {
    async fn fetch_options(
        &self,
        request: &OptionsRequest,
    ) -> Result<Vec<SelectOption>, SourceError> {
        if let Some(err) = self.failures.lock().await.pop_front() {
            return Err(err);
        }
        Ok(self
            .catalogue
            .options_for(&request.list, request.parent.as_ref()))
    }
}

// ============================================================================
// FIXTURE WIRING
// ============================================================================

/// One in-memory collaborator per record kind, plus the option source.
#[derive(Debug)]
pub struct PortalStores {
    pub admissions: InMemoryStore<Admission>,
    pub appointments: InMemoryStore<Appointment>,
    pub televisits: InMemoryStore<Televisit>,
    pub payments: InMemoryStore<Payment>,
    pub prescriptions: InMemoryStore<Prescription>,
    pub consents: InMemoryStore<Consent>,
    pub audit_events: InMemoryStore<AuditEvent>,
    pub notifications: InMemoryStore<Notification>,
    pub options: CatalogueSource,
}

impl PortalStores {
    pub fn from_fixtures(fixtures: PortalFixtures) -> Self {
        Self {
            admissions: InMemoryStore::new(fixtures.admissions),
            appointments: InMemoryStore::new(fixtures.appointments),
            televisits: InMemoryStore::new(fixtures.televisits),
            payments: InMemoryStore::new(fixtures.payments),
            prescriptions: InMemoryStore::new(fixtures.prescriptions),
            consents: InMemoryStore::new(fixtures.consents),
            audit_events: InMemoryStore::new(fixtures.audit_events),
            notifications: InMemoryStore::new(fixtures.notifications),
            options: CatalogueSource::new(fixtures.catalogue),
        }
    }

    /// Reads a fixture document from disk and seeds every collaborator from it.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` if the path is not a safe regular file and
    /// `PortalError::Fixtures` if the document cannot be read or parsed.
    pub fn load(path: &Path) -> PortalResult<Self> {
        validate_fixtures_file(path)?;
        let fixtures = Fixtures::load(path)?;
        tracing::debug!(path = %path.display(), "fixtures loaded");
        Ok(Self::from_fixtures(fixtures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admission, admissions, catalogue, ids, nums, payment};
    use crate::PortalError;
    use portal_models::{AdmissionStatus, PaymentStatus};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_list_honours_subject() {
        let store = InMemoryStore::new(admissions(4));
        let params = FilterParams::for_subject(103u64);

        let list = store
            .fetch_list(ResourceKind::Admissions, &params)
            .await
            .expect("fetch should succeed");

        assert_eq!(ids(&list), nums(&[3]));
    }

    #[tokio::test]
    async fn test_fetch_list_rejects_other_collections() {
        let store = InMemoryStore::new(admissions(2));
        let err = store
            .fetch_list(ResourceKind::Payments, &FilterParams::new())
            .await
            .expect_err("wrong collection should fail");
        assert_eq!(err.kind, crate::error::SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_created_ids_are_never_reused() {
        let store = InMemoryStore::new(vec![
            payment(4, PaymentStatus::Paid, 100),
            payment(9, PaymentStatus::Paid, 100),
        ]);

        let first = store
            .create(payment(0, PaymentStatus::Pending, 500))
            .await
            .expect("create should succeed");
        assert_eq!(first.id, EntityId::Num(10));

        store.remove(&first.id).await.expect("remove should succeed");

        let second = store
            .create(payment(0, PaymentStatus::Pending, 700))
            .await
            .expect("create should succeed");
        assert_eq!(second.id, EntityId::Num(11));
    }

    #[tokio::test]
    async fn test_textual_ids_get_uuids() {
        let mut seeded = payment(1, PaymentStatus::Paid, 100);
        seeded.id = EntityId::from("INV-A");
        let store = InMemoryStore::new(vec![seeded]);

        let created = store
            .create(payment(0, PaymentStatus::Pending, 500))
            .await
            .expect("create should succeed");
        match created.id {
            EntityId::Text(text) => assert_eq!(text.len(), 32),
            other => panic!("expected a textual id, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_exhausted_numeric_ids_fall_back_to_uuids() {
        let store = InMemoryStore::new(vec![payment(u64::MAX - 1, PaymentStatus::Paid, 100)]);

        let last_numeric = store
            .create(payment(0, PaymentStatus::Pending, 200))
            .await
            .expect("create should succeed");
        assert_eq!(last_numeric.id, EntityId::Num(u64::MAX));

        let next = store
            .create(payment(0, PaymentStatus::Pending, 300))
            .await
            .expect("create should succeed");
        assert!(next.id.as_num().is_none(), "got {}", next.id);

        let seeded_at_max = InMemoryStore::new(vec![payment(u64::MAX, PaymentStatus::Paid, 100)]);
        let created = seeded_at_max
            .create(payment(0, PaymentStatus::Pending, 200))
            .await
            .expect("create should succeed");
        assert!(created.id.as_num().is_none(), "got {}", created.id);
    }

    #[tokio::test]
    async fn test_update_applies_status_and_reports_missing_records() {
        let store = InMemoryStore::new(vec![admission(1, AdmissionStatus::Active, "Ana", 3)]);

        let updated = store
            .update(&EntityId::Num(1), AdmissionStatus::Discharged)
            .await
            .expect("update should succeed");
        assert_eq!(updated.status, AdmissionStatus::Discharged);
        assert!(updated.discharged_at.is_some());

        let err = store
            .update(&EntityId::Num(2), AdmissionStatus::Discharged)
            .await
            .expect_err("missing record should fail");
        assert!(err.message.contains("admissions 2"));
    }

    #[tokio::test]
    async fn test_scripted_failure_applies_once() {
        let store = InMemoryStore::new(admissions(2));
        store.fail_next(SourceError::unavailable("backend down")).await;

        assert!(store
            .fetch_list(ResourceKind::Admissions, &FilterParams::new())
            .await
            .is_err());
        assert_eq!(
            store
                .fetch_list(ResourceKind::Admissions, &FilterParams::new())
                .await
                .expect("second call should succeed")
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_stores_load_from_fixture_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("portal.yaml");
        std::fs::write(
            &file,
            "payments:\n  - { id: 5, patient: { id: 101, display: Ana }, description: Visit, \
             amount_cents: 900, currency: EUR, method: CARD, status: PAID, \
             created_at: 2026-01-01T00:00:00Z }\n",
        )
        .expect("should write fixture");

        let stores = PortalStores::load(&file).expect("fixtures should load");
        assert_eq!(ids(&stores.payments.snapshot().await), nums(&[5]));
        assert!(stores.admissions.snapshot().await.is_empty());

        std::fs::write(&file, "payments: [ { id: 5 } ]\n").expect("should write fixture");
        assert!(matches!(
            PortalStores::load(&file),
            Err(PortalError::Fixtures(_))
        ));
    }

    #[tokio::test]
    async fn test_catalogue_source_filters_by_parent() {
        let source = CatalogueSource::new(catalogue());
        let request = OptionsRequest {
            list: "department".into(),
            slot: "department".into(),
            parent: Some(EntityId::from("F1")),
            context: Default::default(),
        };

        let options = source
            .fetch_options(&request)
            .await
            .expect("fetch should succeed");
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Cardiology", "Dermatology"]);

        source.fail_next(SourceError::unavailable("")).await;
        assert!(source.fetch_options(&request).await.is_err());
    }
}
