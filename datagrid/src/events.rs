//! Host-bound events and renderer callback payloads.
//!
//! The grid pushes [`GridEvent`]s onto a queue while handling callbacks. The
//! host drains the queue after each interaction with
//! [`DataGrid::drain_events`](crate::grid::DataGrid::drain_events).

use serde::{Deserialize, Serialize};

use crate::pagination::LoadNextPage;
use crate::sort::SortChanged;

/// An event for the host application.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent<T> {
    /// The selected items changed.
    SelectionChanged(Vec<T>),
    /// The select-all input was toggled.
    AllSelected(bool),
    /// A sortable header was clicked.
    SortChanged(SortChanged),
    /// The container reached its bottom edge and more records exist.
    LoadNextPage(LoadNextPage),
    /// A row's expansion area was opened or closed.
    RowExpanded {
        /// Row identifier.
        identifier: String,
        /// Whether the area is now open.
        expanded: bool,
    },
}

/// Reported by the renderer after a row's layout height changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowHeightChanged {
    /// Row identifier.
    pub identifier: String,
    /// Height the renderer saw before, if any.
    #[serde(default)]
    pub previous_value: Option<f64>,
    /// Newly measured height.
    pub current_value: f64,
}

impl RowHeightChanged {
    /// Create a height report.
    pub fn new(identifier: impl Into<String>, previous_value: Option<f64>, current_value: f64) -> Self {
        Self {
            identifier: identifier.into(),
            previous_value,
            current_value,
        }
    }
}

/// Reported by the renderer when a dragged row is dropped on another row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDragEnded {
    /// Index the row was dragged from.
    pub current_index: usize,
    /// Index of the row it was dropped on.
    pub next_index: usize,
}
