//! # Portal Core
//!
//! List and booking logic for the care portal's dashboards.
//!
//! Every dashboard section (admissions, visits, televisits, payments, prescriptions,
//! consents, audit, notifications) is the same pattern:
//! - an entity list loaded from a [`DataSource`]
//! - a derived view: [`filter`] by criteria, then [`pager`] into pages
//! - remote actions through a [`MutationSink`], merged back by id via [`reducer`]
//!
//! Booking forms are chains of dependent dropdowns driven by the [`selector`] state
//! machine, with option lists served by an [`OptionsSource`].
//!
//! **No transport concerns**: HTTP clients, authentication and rendering live outside
//! this crate. The [`memory`] module provides in-memory collaborators seeded from
//! fixtures.

pub mod booking;
pub mod config;
pub mod constants;
pub mod entity;
pub mod error;
pub mod filter;
pub mod list_view;
pub mod memory;
pub mod pager;
pub mod reducer;
pub mod selector;
pub mod source;
pub mod stats;
pub mod validation;

#[cfg(test)]
mod testing;

pub use config::ViewConfig;
pub use entity::{Entity, Filterable, Mutable, ResourceKind};
pub use error::{
    FieldProblem, MutationAction, PortalError, PortalResult, SourceError, SourceErrorKind,
    ValidationError,
};
pub use filter::{Criteria, DateRange};
pub use list_view::{ListPage, ListView};
pub use memory::{CatalogueSource, InMemoryStore, PortalStores};
pub use pager::{Page, PageCursor};
pub use reducer::Position;
pub use selector::{BookingPayload, CascadeSelector, ChainSpec, FetchTicket, SlotSpec, SlotState};
pub use source::{DataSource, FilterParams, MutationSink, OptionsRequest, OptionsSource};

pub use portal_models::{Reference, SelectOption};
pub use portal_types::EntityId;
