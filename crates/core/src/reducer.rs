//! Applies the outcome of a successful remote action to an entity list.
//!
//! Every function returns a new list and leaves its input untouched. Records are
//! matched by id, never by position, and untouched records keep their relative order.

use crate::entity::Entity;
use portal_types::EntityId;
use serde::{Deserialize, Serialize};

/// Where a created record is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Newest first.
    #[default]
    Head,
    Tail,
}

/// Replaces the record whose id matches `result`.
///
/// If no record matches, the list is returned unchanged.
pub fn apply_result<E: Entity>(list: &[E], result: &E) -> Vec<E> {
    list.iter()
        .map(|record| {
            if record.id() == result.id() {
                result.clone()
            } else {
                record.clone()
            }
        })
        .collect()
}

/// Drops the record with `id`.
pub fn apply_removal<E: Entity>(list: &[E], id: &EntityId) -> Vec<E> {
    list.iter().filter(|record| record.id() != id).cloned().collect()
}

/// Adds a newly created record at `position`.
///
/// A record whose id is already present replaces the existing entry in place, so ids
/// stay unique within the list.
pub fn apply_insertion<E: Entity>(list: &[E], result: E, position: Position) -> Vec<E> {
    if list.iter().any(|record| record.id() == result.id()) {
        return apply_result(list, &result);
    }

    let mut next = Vec::with_capacity(list.len() + 1);
    match position {
        Position::Head => {
            next.push(result);
            next.extend_from_slice(list);
        }
        Position::Tail => {
            next.extend_from_slice(list);
            next.push(result);
        }
    }
    next
}
