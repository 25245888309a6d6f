//! Option lists behind the booking dropdowns.
//!
//! Each slot of a booking chain (facility, department, doctor, patient, slot) draws
//! its choices from a named option list. An option either stands alone (`parent` is
//! `None`) or belongs to one option of the upstream slot.

use chrono::{DateTime, Utc};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One choice in a dropdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectOption {
    pub id: EntityId,
    pub label: String,
    /// Id of the upstream option this choice belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    /// Start time, for appointment slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
}

impl SelectOption {
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent: None,
            starts_at: None,
        }
    }

    /// Attaches this option to an upstream option.
    pub fn under(mut self, parent: impl Into<EntityId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the start time (appointment slots).
    pub fn starting(mut self, at: DateTime<Utc>) -> Self {
        self.starts_at = Some(at);
        self
    }
}

/// Named option lists, keyed by slot name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue(BTreeMap<String, Vec<SelectOption>>);

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds options to a slot's list, keeping insertion order.
    pub fn extend(&mut self, slot: &str, options: impl IntoIterator<Item = SelectOption>) {
        self.0.entry(slot.to_string()).or_default().extend(options);
    }

    /// Builder form of [`Catalogue::extend`].
    pub fn with(mut self, slot: &str, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.extend(slot, options);
        self
    }

    /// Returns the options of `slot` that belong to `parent`.
    ///
    /// With `parent == None` only standalone options are returned. Unknown slots yield an
    /// empty list.
    pub fn options_for(&self, slot: &str, parent: Option<&EntityId>) -> Vec<SelectOption> {
        self.0
            .get(slot)
            .map(|options| {
                options
                    .iter()
                    .filter(|o| o.parent.as_ref() == parent)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Looks up a single option by slot and id.
    pub fn find(&self, slot: &str, id: &EntityId) -> Option<&SelectOption> {
        self.0.get(slot)?.iter().find(|o| &o.id == id)
    }

    /// Slot names with at least one list entry.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with(
                "facility",
                [
                    SelectOption::new("F1", "North General"),
                    SelectOption::new("F2", "Harbour Clinic"),
                ],
            )
            .with(
                "department",
                [
                    SelectOption::new("D1", "Cardiology").under("F1"),
                    SelectOption::new("D2", "Dermatology").under("F1"),
                    SelectOption::new("D3", "Paediatrics").under("F2"),
                ],
            )
    }

    #[test]
    fn test_options_for_filters_by_parent() {
        let cat = catalogue();

        let roots = cat.options_for("facility", None);
        assert_eq!(roots.len(), 2);

        let f1 = cat.options_for("department", Some(&EntityId::from("F1")));
        let ids: Vec<_> = f1.iter().map(|o| o.id.to_string()).collect();
        assert_eq!(ids, vec!["D1", "D2"]);

        assert!(cat.options_for("department", None).is_empty());
        assert!(cat.options_for("ward", None).is_empty());
    }

    #[test]
    fn test_find_returns_matching_option() {
        let cat = catalogue();
        let d3 = cat
            .find("department", &EntityId::from("D3"))
            .expect("D3 should exist");
        assert_eq!(d3.label, "Paediatrics");
        assert!(cat.find("department", &EntityId::from("D9")).is_none());
    }
}
