//! Per-view list state.
//!
//! A `ListView<E>` owns the authoritative entity list of one dashboard section together
//! with its filter criteria and page cursor. The visible page is re-derived from the
//! list on every read, so a load or a merged mutation result shows up immediately.
//!
//! Loads replace the list wholesale. Mutations go to the sink first and only a
//! successful result is merged back, by id. Every failure is recoverable: the view keeps
//! working and carries a message for the user.

use crate::config::ViewConfig;
use crate::entity::{Filterable, Mutable};
use crate::error::{MutationAction, SourceError};
use crate::filter::{filter_at, Criteria};
use crate::pager::{page, PageCursor};
use crate::reducer::{apply_insertion, apply_removal, apply_result, Position};
use crate::source::{DataSource, FilterParams, MutationSink};
use crate::validation::validate_page_size;
use crate::{PortalError, PortalResult};
use chrono::{DateTime, Utc};
use portal_types::EntityId;
use std::sync::Arc;

/// The page a view currently shows, with the counts its pager control needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ListPage<E> {
    pub items: Vec<E>,
    pub page_index: usize,
    pub total_pages: usize,
    /// Records matching the criteria, across all pages.
    pub total_items: usize,
}

#[derive(Clone, Debug)]
pub struct ListView<E: Filterable> {
    config: Arc<ViewConfig>,
    entities: Vec<E>,
    criteria: Criteria<E>,
    cursor: PageCursor,
    params: FilterParams,
    is_loading: bool,
    error_message: Option<String>,
}

impl<E: Filterable> ListView<E> {
    pub fn new(config: Arc<ViewConfig>) -> Self {
        let cursor = PageCursor::new(config.default_page_size());
        Self {
            config,
            entities: Vec::new(),
            criteria: Criteria::default(),
            cursor,
            params: FilterParams::default(),
            is_loading: false,
            error_message: None,
        }
    }

    /// Sets the server-side parameters used by subsequent loads.
    pub fn with_params(mut self, params: FilterParams) -> Self {
        self.params = params;
        self
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn criteria(&self) -> &Criteria<E> {
        &self.criteria
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Replaces the list with a fresh fetch.
    ///
    /// On failure the list is left empty and [`Self::error_message`] is set.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Load` if the source fails.
    pub async fn load<S>(&mut self, source: &S) -> PortalResult<()>
    where
        S: DataSource<E> + ?Sized,
    {
        self.is_loading = true;
        self.error_message = None;
        tracing::debug!(resource = %E::KIND, "loading list");

        let outcome = source.fetch_list(E::KIND, &self.params).await;
        self.is_loading = false;

        match outcome {
            Ok(entities) => {
                tracing::debug!(resource = %E::KIND, count = entities.len(), "list loaded");
                self.entities = entities;
                self.clamp_cursor(Utc::now());
                Ok(())
            }
            Err(cause) => {
                let err = PortalError::Load {
                    resource: E::KIND,
                    source: cause,
                };
                tracing::warn!(error = %err, "list load failed");
                self.entities.clear();
                self.cursor.clamp(0);
                self.error_message = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Replaces the filter criteria and pulls the page back into range.
    pub fn set_criteria(&mut self, criteria: Criteria<E>) {
        self.criteria = criteria;
        self.clamp_cursor(Utc::now());
    }

    /// Moves to page `index`, clamped into range.
    pub fn set_page(&mut self, index: i64) {
        let len = self.filtered_at(Utc::now()).len();
        self.cursor.go_to(index, len);
    }

    /// Changes the page size and returns to the first page.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` if the size is zero or too large.
    pub fn set_page_size(&mut self, size: usize) -> PortalResult<()> {
        let size = validate_page_size(size)?;
        self.cursor.set_size(size);
        Ok(())
    }

    /// Records matching the criteria as of `now`, in list order.
    pub fn filtered_at(&self, now: DateTime<Utc>) -> Vec<E> {
        filter_at(&self.entities, &self.criteria, now)
    }

    /// The current page, with time criteria evaluated now.
    pub fn visible(&self) -> ListPage<E> {
        self.visible_at(Utc::now())
    }

    pub fn visible_at(&self, now: DateTime<Utc>) -> ListPage<E> {
        let filtered = self.filtered_at(now);
        let current = page(&filtered, self.cursor.index() as i64, self.cursor.size());
        ListPage {
            items: current.items.to_vec(),
            page_index: current.page_index,
            total_pages: current.total_pages,
            total_items: current.total_items,
        }
    }

    fn clamp_cursor(&mut self, now: DateTime<Utc>) {
        let len = self.filtered_at(now).len();
        self.cursor.clamp(len);
    }

    fn mutation_failed(&mut self, action: MutationAction, source: SourceError) -> PortalError {
        let err = PortalError::Mutation { action, source };
        tracing::warn!(resource = %E::KIND, error = %err, "mutation failed");
        self.error_message = Some(err.user_message());
        err
    }
}

impl<E: Mutable> ListView<E> {
    /// Creates a record through `sink` and adds the result at `position`.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Mutation` if the sink rejects the draft; the list is
    /// unchanged.
    pub async fn create<S>(&mut self, sink: &S, draft: E::Draft, position: Position) -> PortalResult<E>
    where
        S: MutationSink<E> + ?Sized,
    {
        match sink.create(draft).await {
            Ok(created) => {
                tracing::info!(resource = %E::KIND, id = %created.id(), "record created");
                self.entities = apply_insertion(&self.entities, created.clone(), position);
                self.error_message = None;
                self.clamp_cursor(Utc::now());
                Ok(created)
            }
            Err(source) => Err(self.mutation_failed(MutationAction::Create, source)),
        }
    }

    /// [`Self::create`] at the configured insertion position.
    pub async fn create_default<S>(&mut self, sink: &S, draft: E::Draft) -> PortalResult<E>
    where
        S: MutationSink<E> + ?Sized,
    {
        let position = self.config.insert_position();
        self.create(sink, draft, position).await
    }

    /// Patches a record through `sink` and merges the returned record by id.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Mutation` if the sink rejects the change; the list is
    /// unchanged.
    pub async fn update<S>(&mut self, sink: &S, id: &EntityId, patch: S::Patch) -> PortalResult<E>
    where
        S: MutationSink<E> + ?Sized,
    {
        match sink.update(id, patch).await {
            Ok(updated) => {
                tracing::info!(resource = %E::KIND, %id, "record updated");
                self.entities = apply_result(&self.entities, &updated);
                self.error_message = None;
                self.clamp_cursor(Utc::now());
                Ok(updated)
            }
            Err(source) => Err(self.mutation_failed(MutationAction::Update, source)),
        }
    }

    /// Removes a record through `sink` and drops it from the list.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Mutation` if the sink refuses; the list is unchanged.
    pub async fn remove<S>(&mut self, sink: &S, id: &EntityId) -> PortalResult<()>
    where
        S: MutationSink<E> + ?Sized,
    {
        match sink.remove(id).await {
            Ok(removed) => {
                tracing::info!(resource = %E::KIND, id = %removed, "record removed");
                self.entities = apply_removal(&self.entities, &removed);
                self.error_message = None;
                self.clamp_cursor(Utc::now());
                Ok(())
            }
            Err(source) => Err(self.mutation_failed(MutationAction::Remove, source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::testing::{admission_request, admissions, ids, nums, payment};
    use portal_models::{Admission, AdmissionStatus, Payment, PaymentStatus};

    fn config(page_size: usize) -> Arc<ViewConfig> {
        Arc::new(ViewConfig::new(page_size, Position::Head, 90).expect("valid config"))
    }

    async fn loaded(count: u64, page_size: usize) -> (ListView<Admission>, InMemoryStore<Admission>) {
        let store = InMemoryStore::new(admissions(count));
        let mut view = ListView::new(config(page_size));
        view.load(&store).await.expect("load should succeed");
        (view, store)
    }

    #[tokio::test]
    async fn test_page_past_the_end_shows_last_page() {
        let (mut view, _store) = loaded(12, 5).await;

        view.set_page(10);
        let visible = view.visible();

        assert_eq!(visible.page_index, 3);
        assert_eq!(visible.total_pages, 3);
        assert_eq!(ids(&visible.items), nums(&[11, 12]));
    }

    #[tokio::test]
    async fn test_failed_load_leaves_view_empty_and_usable() {
        let (mut view, store) = loaded(3, 5).await;
        store
            .fail_next(SourceError::unavailable("Admissions service unavailable"))
            .await;

        let err = view.load(&store).await.expect_err("load should fail");
        assert!(matches!(err, PortalError::Load { .. }));
        assert!(view.entities().is_empty());
        assert!(!view.is_loading());
        assert_eq!(view.error_message(), Some("Admissions service unavailable"));
        assert_eq!(view.visible().page_index, 1);

        view.load(&store).await.expect("retry should succeed");
        assert_eq!(view.entities().len(), 3);
        assert_eq!(view.error_message(), None);
    }

    #[tokio::test]
    async fn test_narrowing_criteria_clamps_the_page() {
        let mut list = admissions(12);
        list[0].status = AdmissionStatus::Discharged;
        list[1].status = AdmissionStatus::Discharged;
        let store = InMemoryStore::new(list);

        let mut view = ListView::new(config(5));
        view.load(&store).await.unwrap();
        view.set_page(3);
        assert_eq!(view.cursor().index(), 3);

        view.set_criteria(Criteria::new().with_status(AdmissionStatus::Discharged));
        assert_eq!(view.cursor().index(), 1);
        assert_eq!(ids(&view.visible().items), nums(&[1, 2]));
    }

    #[tokio::test]
    async fn test_page_size_change_resets_to_first_page() {
        let (mut view, _store) = loaded(30, 5).await;
        view.set_page(4);

        view.set_page_size(20).expect("valid size");
        assert_eq!(view.cursor().index(), 1);
        assert_eq!(view.visible().items.len(), 20);

        assert!(view.set_page_size(0).is_err());
    }

    #[tokio::test]
    async fn test_update_merges_by_id() {
        let (mut view, store) = loaded(5, 10).await;

        let updated = view
            .update(&store, &EntityId::Num(3), AdmissionStatus::Discharged)
            .await
            .expect("update should succeed");

        assert_eq!(updated.status, AdmissionStatus::Discharged);
        assert_eq!(ids(view.entities()), nums(&[1, 2, 3, 4, 5]));
        assert_eq!(view.entities()[2].status, AdmissionStatus::Discharged);
        assert!(view.entities()[3..]
            .iter()
            .all(|a| a.status == AdmissionStatus::Active));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_list_untouched() {
        let (mut view, store) = loaded(4, 10).await;
        let before = view.entities().to_vec();
        store
            .fail_next(SourceError::conflict("Patient was already discharged"))
            .await;

        let err = view
            .update(&store, &EntityId::Num(2), AdmissionStatus::Discharged)
            .await
            .expect_err("update should fail");

        assert!(matches!(
            err,
            PortalError::Mutation {
                action: MutationAction::Update,
                ..
            }
        ));
        assert_eq!(view.entities(), before.as_slice());
        assert_eq!(view.error_message(), Some("Patient was already discharged"));
    }

    #[tokio::test]
    async fn test_create_and_remove_round_trip_through_sink() {
        let (mut view, store) = loaded(2, 10).await;

        let created = view
            .create_default(&store, admission_request("Walk-in"))
            .await
            .expect("create should succeed");
        assert_eq!(created.id, EntityId::Num(3));
        assert_eq!(ids(view.entities()), nums(&[3, 1, 2]));

        view.remove(&store, &EntityId::Num(1)).await.expect("remove should succeed");
        assert_eq!(ids(view.entities()), nums(&[3, 2]));
        assert_eq!(ids(&store.snapshot().await), nums(&[2, 3]));
    }

    #[tokio::test]
    async fn test_subject_params_scope_the_load() {
        let mut list = vec![
            payment(1, PaymentStatus::Paid, 100),
            payment(2, PaymentStatus::Pending, 200),
        ];
        list[1].patient.id = EntityId::Num(202);
        let store = InMemoryStore::new(list);

        let mut view: ListView<Payment> =
            ListView::new(config(10)).with_params(FilterParams::for_subject(202u64));
        view.load(&store).await.unwrap();

        assert_eq!(ids(view.entities()), nums(&[2]));
    }
}
