//! Derived-list filter engine.
//!
//! Turns an entity list and a set of criteria into the filtered list a view shows.
//! Filtering is pure and order-preserving: the input is never mutated, and the same
//! criteria applied to the same list at the same instant always yield the same
//! sequence. Criteria compose with logical AND; an absent criterion places no
//! constraint.
//!
//! Age and date criteria are evaluated against a clock reading taken at call time, so
//! results must be re-derived rather than cached across calls.

use crate::entity::Filterable;
use crate::validation::normalise_search_query;
use crate::PortalResult;
use chrono::{DateTime, Duration, Utc};

/// Inclusive absolute time window; either bound may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

/// Filter criteria for one record kind.
///
/// Every field is independently optional. Time-based criteria reject records that have
/// no timestamp.
#[derive(Clone, Debug)]
pub struct Criteria<E: Filterable> {
    status: Option<E::Status>,
    kind: Option<E::Kind>,
    date_range: Option<DateRange>,
    within: Option<Duration>,
    older_than: Option<Duration>,
    search: Option<String>,
}

impl<E: Filterable> Default for Criteria<E> {
    fn default() -> Self {
        Self {
            status: None,
            kind: None,
            date_range: None,
            within: None,
            older_than: None,
            search: None,
        }
    }
}

impl<E: Filterable> Criteria<E> {
    /// Criteria with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: E::Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_kind(mut self, kind: E::Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Keep records stamped no earlier than `now - window`.
    pub fn within(mut self, window: Duration) -> Self {
        self.within = Some(window);
        self
    }

    /// Keep records stamped at or before `now - age`.
    pub fn older_than(mut self, age: Duration) -> Self {
        self.older_than = Some(age);
        self
    }

    /// Sets the free-text query. A blank query clears the search.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` if the query is too long.
    pub fn with_search(mut self, query: &str) -> PortalResult<Self> {
        self.search = normalise_search_query(query)?;
        Ok(self)
    }

    pub fn set_status(&mut self, status: Option<E::Status>) {
        self.status = status;
    }

    pub fn set_kind(&mut self, kind: Option<E::Kind>) {
        self.kind = kind;
    }

    pub fn status(&self) -> Option<E::Status> {
        self.status
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.kind.is_none()
            && self.date_range.is_none()
            && self.within.is_none()
            && self.older_than.is_none()
            && self.search.is_none()
    }

    fn has_time_criteria(&self) -> bool {
        self.date_range.is_some() || self.within.is_some() || self.older_than.is_some()
    }

    /// Tests a single record against every present criterion.
    pub fn matches(&self, record: &E, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.status {
            if record.status() != status {
                return false;
            }
        }

        if let Some(kind) = self.kind {
            if record.kind() != Some(kind) {
                return false;
            }
        }

        if self.has_time_criteria() {
            let Some(at) = record.timestamp() else {
                return false;
            };

            if let Some(range) = &self.date_range {
                if !range.contains(at) {
                    return false;
                }
            }

            // A window reaching past the earliest representable time is unbounded.
            if let Some(window) = self.within {
                if let Some(start) = now.checked_sub_signed(window) {
                    if at < start {
                        return false;
                    }
                }
            }

            if let Some(age) = self.older_than {
                match now.checked_sub_signed(age) {
                    Some(cutoff) if at <= cutoff => {}
                    _ => return false,
                }
            }
        }

        if let Some(query) = &self.search {
            let hit = record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(query.as_str()));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Filters `entities` by `criteria`, evaluating time criteria against the current clock.
pub fn filter<E: Filterable>(entities: &[E], criteria: &Criteria<E>) -> Vec<E> {
    filter_at(entities, criteria, Utc::now())
}

/// Filters `entities` by `criteria` as of `now`.
///
/// With no criterion set the result is a copy of the input in the same order.
pub fn filter_at<E: Filterable>(entities: &[E], criteria: &Criteria<E>, now: DateTime<Utc>) -> Vec<E> {
    if criteria.is_empty() {
        return entities.to_vec();
    }

    entities
        .iter()
        .filter(|record| criteria.matches(record, now))
        .cloned()
        .collect()
}
