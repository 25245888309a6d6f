//! Collaborator contracts.
//!
//! The portal backend owns every record; list views and selectors reach it only
//! through these traits. Implementations decide transport, timeouts and cancellation.
//! A failed call is reported as a [`SourceError`] and is always recoverable.

use crate::entity::{Mutable, ResourceKind};
use crate::error::SourceError;
use async_trait::async_trait;
use portal_models::SelectOption;
use portal_types::EntityId;
use std::collections::BTreeMap;

/// Server-side list parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Restricts the list to one patient's records (patient dashboards).
    pub subject: Option<EntityId>,
    /// Additional query pairs forwarded to the backend.
    pub extra: BTreeMap<String, String>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_subject(subject: impl Into<EntityId>) -> Self {
        Self {
            subject: Some(subject.into()),
            extra: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A request for one slot's option list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionsRequest {
    /// Catalogue list the options come from.
    pub list: String,
    /// Slot being populated.
    pub slot: String,
    /// Selection of the slot this one depends on; `None` for root slots.
    pub parent: Option<EntityId>,
    /// Every upstream selection at the time of the request, keyed by slot name.
    pub context: BTreeMap<String, EntityId>,
}

/// Fetches a full entity list.
#[async_trait]
pub trait DataSource<E>: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the list cannot be fetched.
    async fn fetch_list(&self, kind: ResourceKind, params: &FilterParams)
        -> Result<Vec<E>, SourceError>;
}

/// Fetches the choices for one selector slot.
#[async_trait]
pub trait OptionsSource: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the option list cannot be fetched.
    async fn fetch_options(&self, request: &OptionsRequest)
        -> Result<Vec<SelectOption>, SourceError>;
}

/// Performs remote create, update and remove actions.
///
/// Each call returns the authoritative record (or removed id) the backend reports,
/// which the list view then merges by id.
#[async_trait]
pub trait MutationSink<E: Mutable>: Send + Sync {
    /// Status change applied by `update`.
    type Patch: Send + Sync + 'static;

    async fn create(&self, draft: E::Draft) -> Result<E, SourceError>;

    async fn update(&self, id: &EntityId, patch: Self::Patch) -> Result<E, SourceError>;

    async fn remove(&self, id: &EntityId) -> Result<EntityId, SourceError>;
}
