//! Selection state and the selection-changed broadcast.
//!
//! Selection uses string IDs so it stays stable as pages stream in and rows
//! are reordered. Row-level [`SelectionInput`]s subscribe to a
//! [`SelectionBroadcast`] and resolve their own checked state by membership,
//! so a grid-level change costs O(1) per row.

use std::collections::HashSet;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::item::{RowItem, identifier_of};

/// Selection mode for the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Single row selection (radio style)
    #[default]
    Single,
    /// Multiple rows can be selected (checkbox style)
    Multiple,
}

/// Payload broadcast to row-level selection inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Every row is checked (`true`) or unchecked (`false`).
    AllSelected(bool),
    /// Every row is unchecked.
    ClearSelection,
    /// Exactly these identifiers are checked.
    Selected(HashSet<String>),
}

/// ID-based selection state.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    mode: SelectionMode,
    selected: HashSet<String>,
    /// Set by select-all; stays set while pages stream in.
    all_selected: bool,
}

impl SelectionState {
    /// Create an empty selection.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Get the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, identifier: &str) -> bool {
        self.selected.contains(identifier)
    }

    /// Get the selected IDs.
    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Get the number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether select-all is in effect.
    pub fn all_selected(&self) -> bool {
        self.all_selected
    }

    /// Set the checked state of one row.
    ///
    /// In single mode every other row is deselected first.
    pub fn set_row(&mut self, identifier: &str, selected: bool, loaded_count: usize) {
        if self.mode == SelectionMode::Single {
            self.selected.clear();
        }
        if selected {
            self.selected.insert(identifier.to_string());
        } else {
            self.selected.remove(identifier);
        }
        self.all_selected = self.covers_all(loaded_count);
        trace!(
            "Row {} selected={} ({} of {})",
            identifier,
            selected,
            self.selected.len(),
            loaded_count
        );
    }

    /// Toggle one row. Returns the new checked state.
    pub fn toggle_row(&mut self, identifier: &str, loaded_count: usize) -> bool {
        let selected = !self.is_selected(identifier);
        self.set_row(identifier, selected, loaded_count);
        selected
    }

    /// Select or deselect every loaded row.
    pub fn toggle_all<'a>(&mut self, value: bool, identifiers: impl IntoIterator<Item = &'a String>) {
        self.selected.clear();
        if value {
            self.selected.extend(identifiers.into_iter().cloned());
        }
        self.all_selected = value;
        debug!("Select all: {} ({} rows)", value, self.selected.len());
    }

    /// Add rows that arrived while select-all is in effect.
    pub fn extend_all<'a>(&mut self, identifiers: impl IntoIterator<Item = &'a String>) {
        if self.all_selected {
            self.selected.extend(identifiers.into_iter().cloned());
        }
    }

    /// Replace the selection with host-supplied identifiers.
    ///
    /// Select-all survives only if the host echoed back every loaded row.
    pub fn replace(&mut self, identifiers: impl IntoIterator<Item = String>, loaded_count: usize) {
        let identifiers = identifiers.into_iter();
        self.selected = match self.mode {
            SelectionMode::Single => identifiers.last().into_iter().collect(),
            SelectionMode::Multiple => identifiers.collect(),
        };
        self.all_selected =
            self.all_selected && loaded_count > 0 && self.selected.len() == loaded_count;
    }

    /// Drop identifiers of rows that are no longer loaded.
    ///
    /// Returns `true` if any identifier was dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool, loaded_count: usize) -> bool {
        let before = self.selected.len();
        self.selected.retain(|identifier| keep(identifier));
        if !self.all_selected {
            self.all_selected = self.covers_all(loaded_count);
        }
        let dropped = self.selected.len() != before;
        if dropped {
            debug!(
                "Dropped {} selected rows that are no longer loaded",
                before - self.selected.len()
            );
        }
        dropped
    }

    /// Select-all only exists in multiple mode.
    fn covers_all(&self, loaded_count: usize) -> bool {
        self.mode == SelectionMode::Multiple
            && loaded_count > 0
            && self.selected.len() == loaded_count
    }

    /// Drop everything, including select-all.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.all_selected = false;
    }

    /// Notification describing the current state.
    pub fn notification(&self) -> SelectionChange {
        if self.all_selected {
            SelectionChange::AllSelected(true)
        } else if self.selected.is_empty() {
            SelectionChange::ClearSelection
        } else {
            SelectionChange::Selected(self.selected.clone())
        }
    }
}

/// Handle returned by [`SelectionBroadcast::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked for each selection change.
pub type SelectionListener = Box<dyn FnMut(&SelectionChange)>;

/// Explicit pub/sub channel between the grid and row selection inputs.
pub struct SelectionBroadcast {
    identifier_property: Option<String>,
    listeners: Vec<(SubscriptionId, SelectionListener)>,
    next_id: u64,
}

impl std::fmt::Debug for SelectionBroadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionBroadcast")
            .field("identifier_property", &self.identifier_property)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for SelectionBroadcast {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SelectionBroadcast {
    /// Create a broadcast. The identifier property is needed to emit whole items.
    pub fn new(identifier_property: Option<String>) -> Self {
        Self {
            identifier_property,
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Set the identifier property used by [`emit_items`](Self::emit_items).
    pub fn set_identifier_property(&mut self, property: impl Into<String>) {
        let property = property.into();
        self.identifier_property = (!property.is_empty()).then_some(property);
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver a change to every listener.
    pub fn emit(&mut self, change: &SelectionChange) {
        trace!("Broadcasting {:?} to {} listeners", change, self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }

    /// Deliver a change described by whole items.
    ///
    /// Items are mapped to identifiers through the identifier property; items
    /// without an identifier value are skipped.
    pub fn emit_items<T: RowItem>(&mut self, items: &[T]) -> Result<(), GridError> {
        let property = self
            .identifier_property
            .as_deref()
            .ok_or(GridError::MissingIdentifierProperty)?;
        let selected = items
            .iter()
            .filter_map(|item| identifier_of(item, property).ok())
            .collect();
        self.emit(&SelectionChange::Selected(selected));
        Ok(())
    }
}

/// Checked state of one row's selection input (or the header's select-all).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionInput {
    identifier: Option<String>,
    checked: bool,
    display_as_radio: bool,
}

impl SelectionInput {
    /// Create an input bound to a row identifier.
    pub fn new(identifier: Option<String>, initialize_selected: bool, display_as_radio: bool) -> Self {
        Self {
            identifier,
            checked: initialize_selected,
            display_as_radio,
        }
    }

    /// Whether the input is checked.
    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Whether the input renders as a radio button.
    pub fn display_as_radio(&self) -> bool {
        self.display_as_radio
    }

    /// The bound row identifier.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Flip the checked state (user click). Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.checked = !self.checked;
        self.checked
    }

    /// Resolve the checked state from a broadcast.
    pub fn apply(&mut self, change: &SelectionChange) {
        self.checked = match change {
            SelectionChange::ClearSelection => false,
            SelectionChange::AllSelected(value) => *value,
            SelectionChange::Selected(selected) => self
                .identifier
                .as_ref()
                .is_some_and(|id| selected.contains(id)),
        };
    }
}
