//! Cascading selector state machine.
//!
//! A booking form is a chain of dependent dropdowns (facility → department → doctor →
//! patient → slot) plus free-text fields. Choosing a value in one slot invalidates every
//! later slot and every option list derived from the changed value, then asks the
//! options source for the lists that depend on it.
//!
//! The selector never talks to a source on its own. [`CascadeSelector::select`] returns
//! [`FetchTicket`]s and the caller feeds each outcome back through
//! [`CascadeSelector::complete`]; [`CascadeSelector::choose`] and
//! [`CascadeSelector::load_roots`] run that cycle against an [`OptionsSource`].
//!
//! Concurrent fetches for one slot are not de-duplicated. Whichever completion arrives
//! last populates the slot, even if it was issued for an older upstream value.

use crate::constants::MAX_FREE_TEXT_LEN;
use crate::error::{SourceError, ValidationError};
use crate::source::{OptionsRequest, OptionsSource};
use crate::validation::validate_free_text;
use crate::{PortalError, PortalResult};
use portal_models::{Reference, SelectOption};
use portal_types::{EntityId, NonEmptyText};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// CHAIN DECLARATION
// ============================================================================

/// One dropdown in a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSpec {
    name: String,
    list: String,
    required: bool,
    depends_on: Option<String>,
}

impl SlotSpec {
    /// A required slot whose options come from the catalogue list of the same name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            list: name.to_string(),
            required: true,
            depends_on: None,
        }
    }

    /// Draws options from `list` instead of the slot's own name.
    pub fn from_list(mut self, list: &str) -> Self {
        self.list = list.to_string();
        self
    }

    /// Makes this slot's options depend on the selection in `slot`.
    pub fn after(mut self, slot: &str) -> Self {
        self.depends_on = Some(slot.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn list(&self) -> &str {
        &self.list
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A free-text field submitted with the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFieldSpec {
    name: String,
    required: bool,
    max_len: usize,
}

impl TextFieldSpec {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            max_len: MAX_FREE_TEXT_LEN,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A validated chain declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainSpec {
    name: String,
    slots: Vec<SlotSpec>,
    /// Index of the slot each slot depends on.
    parents: Vec<Option<usize>>,
    texts: Vec<TextFieldSpec>,
}

impl ChainSpec {
    pub fn builder(name: &str) -> ChainBuilder {
        ChainBuilder {
            name: name.to_string(),
            slots: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    pub fn texts(&self) -> &[TextFieldSpec] {
        &self.texts
    }

    /// Position of `slot` in the chain.
    pub fn index_of(&self, slot: &str) -> PortalResult<usize> {
        self.slots
            .iter()
            .position(|s| s.name == slot)
            .ok_or_else(|| PortalError::UnknownSlot(slot.to_string()))
    }

    fn text_spec(&self, field: &str) -> PortalResult<&TextFieldSpec> {
        self.texts
            .iter()
            .find(|t| t.name == field)
            .ok_or_else(|| PortalError::UnknownField(field.to_string()))
    }
}

/// Collects slots and text fields in chain order.
#[derive(Clone, Debug)]
pub struct ChainBuilder {
    name: String,
    slots: Vec<SlotSpec>,
    texts: Vec<TextFieldSpec>,
}

impl ChainBuilder {
    pub fn slot(mut self, slot: SlotSpec) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn text(mut self, field: TextFieldSpec) -> Self {
        self.texts.push(field);
        self
    }

    /// Validates and freezes the chain.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` if the chain has no slots, a name is used
    /// twice, or a slot depends on a slot that does not come before it.
    pub fn build(self) -> PortalResult<ChainSpec> {
        if self.slots.is_empty() {
            return Err(PortalError::InvalidInput(format!(
                "chain '{}' has no slots",
                self.name
            )));
        }

        let mut seen = BTreeSet::new();
        for name in self
            .slots
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.texts.iter().map(|t| t.name.as_str()))
        {
            if !seen.insert(name) {
                return Err(PortalError::InvalidInput(format!(
                    "chain '{}' declares '{name}' twice",
                    self.name
                )));
            }
        }

        let mut parents = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let parent = match &slot.depends_on {
                None => None,
                Some(upstream) => {
                    let found = self.slots[..index].iter().position(|s| &s.name == upstream);
                    if found.is_none() {
                        return Err(PortalError::InvalidInput(format!(
                            "slot '{}' must depend on an earlier slot, not '{upstream}'",
                            slot.name
                        )));
                    }
                    found
                }
            };
            parents.push(parent);
        }

        Ok(ChainSpec {
            name: self.name,
            slots: self.slots,
            parents,
            texts: self.texts,
        })
    }
}

// ============================================================================
// SELECTOR STATE
// ============================================================================

/// Observable state of one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    Unselected,
    /// Selected, with option lists that depend on it still loading.
    Selecting(EntityId),
    Selected(EntityId),
}

/// An option fetch the caller must run and report back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    slot_index: usize,
    seq: u64,
    request: OptionsRequest,
}

impl FetchTicket {
    pub fn slot(&self) -> &str {
        &self.request.slot
    }

    pub fn request(&self) -> &OptionsRequest {
        &self.request
    }
}

#[derive(Clone, Debug, Default)]
struct SlotEntry {
    selection: Option<EntityId>,
    options: Vec<SelectOption>,
    in_flight: BTreeSet<u64>,
    latest: Option<u64>,
    error: Option<String>,
}

impl SlotEntry {
    fn clear_options(&mut self) {
        self.options.clear();
        self.in_flight.clear();
        self.error = None;
    }
}

/// The composite value a completed chain submits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingPayload {
    chain: String,
    selections: BTreeMap<String, SelectOption>,
    texts: BTreeMap<String, NonEmptyText>,
}

impl BookingPayload {
    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn selection(&self, slot: &str) -> Option<&SelectOption> {
        self.selections.get(slot)
    }

    /// The selected option of `slot` as a record reference.
    pub fn reference(&self, slot: &str) -> Option<Reference> {
        self.selection(slot).map(Reference::from)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.texts.get(field).map(NonEmptyText::as_str)
    }
}

/// Selection state for one chain.
#[derive(Clone, Debug)]
pub struct CascadeSelector {
    chain: ChainSpec,
    slots: Vec<SlotEntry>,
    texts: BTreeMap<String, NonEmptyText>,
    next_seq: u64,
}

impl CascadeSelector {
    pub fn new(chain: ChainSpec) -> Self {
        let slots = vec![SlotEntry::default(); chain.slots.len()];
        Self {
            chain,
            slots,
            texts: BTreeMap::new(),
            next_seq: 1,
        }
    }

    pub fn chain(&self) -> &ChainSpec {
        &self.chain
    }

    /// Tickets for every slot that does not depend on another slot.
    pub fn root_tickets(&mut self) -> Vec<FetchTicket> {
        let roots: Vec<usize> = (0..self.slots.len())
            .filter(|&i| self.chain.parents[i].is_none())
            .collect();
        roots.into_iter().map(|i| self.issue(i)).collect()
    }

    /// Sets (or clears, with `None`) the selection of `slot`.
    ///
    /// Every later slot loses its selection. Option lists that depend on `slot`,
    /// directly or through a cleared slot, are emptied. Re-selecting the current value
    /// counts as a change, which is how a failed option load is retried.
    ///
    /// # Returns
    ///
    /// One ticket per slot whose options depend directly on `slot`; none when clearing.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::UnknownSlot` for a slot outside the chain and
    /// `PortalError::UnknownOption` if `id` is not among the slot's loaded options.
    pub fn select(&mut self, slot: &str, id: Option<EntityId>) -> PortalResult<Vec<FetchTicket>> {
        let k = self.chain.index_of(slot)?;

        if let Some(id) = &id {
            if !self.slots[k].options.iter().any(|o| &o.id == id) {
                return Err(PortalError::UnknownOption {
                    slot: slot.to_string(),
                    id: id.clone(),
                });
            }
        }

        tracing::debug!(chain = %self.chain.name, slot, selection = ?id, "slot changed");
        self.slots[k].selection = id;

        for j in (k + 1)..self.slots.len() {
            self.slots[j].selection = None;
            if self.chain.parents[j].is_some_and(|p| p >= k) {
                self.slots[j].clear_options();
            }
        }

        if self.slots[k].selection.is_none() {
            return Ok(Vec::new());
        }

        let dependents: Vec<usize> = (k + 1..self.slots.len())
            .filter(|&j| self.chain.parents[j] == Some(k))
            .collect();
        Ok(dependents.into_iter().map(|j| self.issue(j)).collect())
    }

    /// Applies the outcome of a ticket's fetch.
    ///
    /// Success replaces the slot's options; failure empties them and records a message.
    /// Upstream selections are never rolled back. Tickets for slots this selector does
    /// not have are ignored.
    pub fn complete(&mut self, ticket: FetchTicket, outcome: Result<Vec<SelectOption>, SourceError>) {
        let Some(entry) = self.slots.get_mut(ticket.slot_index) else {
            tracing::warn!(slot = %ticket.request.slot, "ignoring ticket for unknown slot");
            return;
        };

        entry.in_flight.remove(&ticket.seq);
        if entry.latest != Some(ticket.seq) {
            tracing::debug!(
                slot = %ticket.request.slot,
                seq = ticket.seq,
                "applying out-of-order option response"
            );
        }

        match outcome {
            Ok(options) => {
                tracing::debug!(slot = %ticket.request.slot, count = options.len(), "options loaded");
                entry.options = options;
                entry.error = None;
            }
            Err(source) => {
                let err = PortalError::Options {
                    slot: ticket.request.slot.clone(),
                    source,
                };
                tracing::warn!(error = %err, "option load failed");
                entry.options.clear();
                entry.error = Some(err.user_message());
            }
        }
    }

    /// Selects `id` in `slot` and loads every dependent option list from `source`.
    ///
    /// A failed load does not fail the call; it shows up in [`Self::error_message`].
    pub async fn choose<S>(&mut self, source: &S, slot: &str, id: Option<EntityId>) -> PortalResult<()>
    where
        S: OptionsSource + ?Sized,
    {
        let tickets = self.select(slot, id)?;
        self.run(source, tickets).await;
        Ok(())
    }

    /// Loads the option lists of every root slot from `source`.
    pub async fn load_roots<S>(&mut self, source: &S)
    where
        S: OptionsSource + ?Sized,
    {
        let tickets = self.root_tickets();
        self.run(source, tickets).await;
    }

    async fn run<S>(&mut self, source: &S, tickets: Vec<FetchTicket>)
    where
        S: OptionsSource + ?Sized,
    {
        for ticket in tickets {
            let outcome = source.fetch_options(ticket.request()).await;
            self.complete(ticket, outcome);
        }
    }

    /// Stores a free-text field. Blank input clears it.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::UnknownField` for a field outside the chain and
    /// `PortalError::InvalidInput` if the text is too long or has control characters.
    pub fn set_text(&mut self, field: &str, value: &str) -> PortalResult<()> {
        let spec = self.chain.text_spec(field)?;
        let value = validate_free_text(field, value, spec.max_len)?;
        match NonEmptyText::new(&value) {
            Ok(text) => {
                self.texts.insert(field.to_string(), text);
            }
            Err(_) => {
                self.texts.remove(field);
            }
        }
        Ok(())
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.texts.get(field).map(NonEmptyText::as_str)
    }

    pub fn state(&self, slot: &str) -> PortalResult<SlotState> {
        let k = self.chain.index_of(slot)?;
        Ok(self.state_at(k))
    }

    fn state_at(&self, k: usize) -> SlotState {
        let Some(id) = self.slots[k].selection.clone() else {
            return SlotState::Unselected;
        };
        let loading = (0..self.slots.len())
            .any(|j| self.chain.parents[j] == Some(k) && !self.slots[j].in_flight.is_empty());
        if loading {
            SlotState::Selecting(id)
        } else {
            SlotState::Selected(id)
        }
    }

    pub fn selection(&self, slot: &str) -> PortalResult<Option<&EntityId>> {
        let k = self.chain.index_of(slot)?;
        Ok(self.slots[k].selection.as_ref())
    }

    pub fn options(&self, slot: &str) -> PortalResult<&[SelectOption]> {
        let k = self.chain.index_of(slot)?;
        Ok(&self.slots[k].options)
    }

    /// Message left by the slot's last failed option load.
    pub fn error_message(&self, slot: &str) -> PortalResult<Option<&str>> {
        let k = self.chain.index_of(slot)?;
        Ok(self.slots[k].error.as_deref())
    }

    /// Every required slot is settled and every required text field is filled.
    pub fn is_ready(&self) -> bool {
        let slots_ready = self.chain.slots.iter().enumerate().all(|(k, spec)| {
            !spec.required || matches!(self.state_at(k), SlotState::Selected(_))
        });
        let texts_ready = self
            .chain
            .texts
            .iter()
            .all(|t| !t.required || self.texts.contains_key(&t.name));
        slots_ready && texts_ready
    }

    /// Builds the submission for the current state.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming every missing or unsettled field.
    pub fn payload(&self) -> Result<BookingPayload, ValidationError> {
        let mut problems = ValidationError::new();
        let mut selections = BTreeMap::new();

        for (k, spec) in self.chain.slots.iter().enumerate() {
            match self.state_at(k) {
                SlotState::Unselected => {
                    if spec.required {
                        problems.field(&spec.name, "is required");
                    }
                }
                SlotState::Selecting(_) => {
                    problems.field(&spec.name, "dependent options are still loading");
                }
                SlotState::Selected(id) => {
                    match self.slots[k].options.iter().find(|o| o.id == id) {
                        Some(option) => {
                            selections.insert(spec.name.clone(), option.clone());
                        }
                        None => problems.field(&spec.name, "selection is no longer available"),
                    }
                }
            }
        }

        for text in &self.chain.texts {
            if text.required && !self.texts.contains_key(&text.name) {
                problems.field(&text.name, "is required");
            }
        }

        problems.into_result()?;
        Ok(BookingPayload {
            chain: self.chain.name.clone(),
            selections,
            texts: self.texts.clone(),
        })
    }

    fn issue(&mut self, slot_index: usize) -> FetchTicket {
        let seq = self.next_seq;
        self.next_seq += 1;

        let spec = &self.chain.slots[slot_index];
        let parent = self.chain.parents[slot_index]
            .and_then(|p| self.slots[p].selection.clone());
        let context = self.chain.slots[..slot_index]
            .iter()
            .zip(&self.slots)
            .filter_map(|(s, entry)| entry.selection.clone().map(|id| (s.name.clone(), id)))
            .collect();

        let request = OptionsRequest {
            list: spec.list.clone(),
            slot: spec.name.clone(),
            parent,
            context,
        };

        let entry = &mut self.slots[slot_index];
        entry.in_flight.insert(seq);
        entry.latest = Some(seq);

        FetchTicket {
            slot_index,
            seq,
            request,
        }
    }
}
