//! Keyed, order-preserving row store.
//!
//! The registry pairs an ordered identifier lookup with a map from identifier
//! to [`RowRecord`]. Iteration always follows the lookup order, which is the
//! display order before windowing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::{trace, warn};

use crate::error::GridError;

/// Grid-side state for one loaded item.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord<T> {
    /// Stable identifier read from the configured identifier property.
    pub identifier: String,
    /// The host item.
    pub data: T,
    /// Whether the row is selected.
    pub selected: bool,
    /// Whether the row's expansion area is open.
    pub expanded: bool,
    /// Measured height in pixels.
    pub row_height: Option<f64>,
    /// Cumulative distance from the top of the list to the row's top edge.
    pub height_offset: Option<f64>,
    /// Position in the logical order.
    pub row_index: usize,
    /// Highlighted after a drag-and-drop move.
    pub relocated: bool,
}

impl<T> RowRecord<T> {
    /// Create an unmeasured record.
    pub fn new(identifier: impl Into<String>, data: T, row_index: usize, selected: bool) -> Self {
        Self {
            identifier: identifier.into(),
            data,
            selected,
            expanded: false,
            row_height: None,
            height_offset: None,
            row_index,
            relocated: false,
        }
    }

    /// Measured height, or `estimated` if the row has not been measured.
    pub fn height_or(&self, estimated: f64) -> f64 {
        self.row_height.unwrap_or(estimated)
    }
}

/// Ordered identifier lookup plus keyed record storage.
#[derive(Debug, Clone)]
pub struct RowRegistry<T> {
    order: Vec<String>,
    rows: HashMap<String, RowRecord<T>>,
}

impl<T> Default for RowRegistry<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }
}

impl<T> RowRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from records in display order.
    ///
    /// Row indices are re-assigned to match their position. Records whose
    /// identifier was already seen are dropped.
    pub fn from_records(records: Vec<RowRecord<T>>) -> Self {
        let mut registry = Self::new();
        for mut record in records {
            if registry.rows.contains_key(&record.identifier) {
                warn!("Dropping duplicate row identifier {}", record.identifier);
                continue;
            }
            record.row_index = registry.order.len();
            registry.order.push(record.identifier.clone());
            registry.rows.insert(record.identifier.clone(), record);
        }
        registry
    }

    /// Number of loaded rows.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no rows are loaded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert a new row or update the data of an existing one.
    ///
    /// Existing rows keep their selection, height, offset and index. New rows
    /// are appended with `selected` set to `selected_default`.
    pub fn upsert(
        &mut self,
        identifier: &str,
        item: T,
        selected_default: bool,
    ) -> &RowRecord<T> {
        let next_index = self.order.len();
        match self.rows.entry(identifier.to_string()) {
            Entry::Occupied(entry) => {
                trace!("Updating row {} in place", identifier);
                let record = entry.into_mut();
                record.data = item;
                record
            }
            Entry::Vacant(entry) => {
                self.order.push(identifier.to_string());
                entry.insert(RowRecord::new(identifier, item, next_index, selected_default))
            }
        }
    }

    /// Get a row by identifier.
    pub fn get(&self, identifier: &str) -> Result<&RowRecord<T>, GridError> {
        self.rows
            .get(identifier)
            .ok_or_else(|| GridError::row_not_found(identifier))
    }

    /// Get a mutable row by identifier.
    pub fn get_mut(&mut self, identifier: &str) -> Result<&mut RowRecord<T>, GridError> {
        self.rows
            .get_mut(identifier)
            .ok_or_else(|| GridError::row_not_found(identifier))
    }

    /// Check if a row is loaded.
    pub fn has(&self, identifier: &str) -> bool {
        self.rows.contains_key(identifier)
    }

    /// Get the row at a position in the logical order.
    pub fn at(&self, index: usize) -> Option<&RowRecord<T>> {
        self.order.get(index).and_then(|id| self.rows.get(id))
    }

    /// The row with the highest index.
    pub fn last(&self) -> Option<&RowRecord<T>> {
        self.order.last().and_then(|id| self.rows.get(id))
    }

    /// Identifiers in display order.
    pub fn identifiers(&self) -> &[String] {
        &self.order
    }

    /// Rows in display order.
    pub fn values_in_order(&self) -> impl Iterator<Item = &RowRecord<T>> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    /// Mutable rows, in no particular order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut RowRecord<T>> {
        self.rows.values_mut()
    }

    /// Consume the registry, yielding records in display order.
    pub fn into_records(mut self) -> Vec<RowRecord<T>> {
        self.order
            .iter()
            .filter_map(|id| self.rows.remove(id))
            .collect()
    }

    /// Re-key the registry against a refreshed dataset.
    ///
    /// Identifiers present in both keep their record (data replaced, index
    /// moved to the new position). New identifiers get fresh records with
    /// `selected_default`. Identifiers absent from `items` are dropped.
    pub fn sync(&mut self, items: Vec<(String, T)>, selected_default: bool) {
        let mut previous = std::mem::take(&mut self.rows);
        self.order.clear();

        for (identifier, item) in items {
            if self.rows.contains_key(&identifier) {
                warn!("Dropping duplicate row identifier {}", identifier);
                continue;
            }
            let row_index = self.order.len();
            let record = match previous.remove(&identifier) {
                Some(mut record) => {
                    record.data = item;
                    record.row_index = row_index;
                    record
                }
                None => RowRecord::new(identifier.clone(), item, row_index, selected_default),
            };
            self.order.push(identifier.clone());
            self.rows.insert(identifier, record);
        }
    }

    /// Recompute cumulative offsets from `from` to the end.
    ///
    /// Unmeasured rows contribute `estimated`. If the row before `from` has
    /// no offset yet, recomputation starts at the top.
    pub fn set_height_offsets(&mut self, from: usize, estimated: f64) {
        let mut start = from.min(self.order.len());
        let mut running = 0.0;
        if start > 0 {
            let previous_bottom = self.at(start - 1).and_then(|previous| {
                previous
                    .height_offset
                    .map(|offset| offset + previous.height_or(estimated))
            });
            match previous_bottom {
                Some(bottom) => running = bottom,
                None => start = 0,
            }
        }

        for identifier in &self.order[start..] {
            if let Some(record) = self.rows.get_mut(identifier) {
                record.height_offset = Some(running);
                running += record.height_or(estimated);
            }
        }
    }

    /// Sum of measured-or-estimated heights of every row.
    pub fn total_height(&self, estimated: f64) -> f64 {
        self.values_in_order().map(|r| r.height_or(estimated)).sum()
    }
}
