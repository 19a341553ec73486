//! Drag-and-drop row reordering.
//!
//! [`RowDragEvents`] is the capability the renderer drives from its native
//! drag events. [`move_row`] applies the resulting index move to the registry
//! and the raw data mirror together.

use log::{debug, warn};

use crate::events::RowDragEnded;
use crate::registry::RowRegistry;

/// Drag events a row forwards to the grid.
pub trait RowDragEvents {
    /// A drag started on the row at `row_index`.
    fn on_drag_start(&mut self, row_index: usize);

    /// A drag entered or moved over the row at `row_index`.
    fn on_drag_over(&mut self, row_index: usize);

    /// A drag left the row at `row_index`.
    fn on_drag_leave(&mut self, row_index: usize);

    /// The drag was dropped on the row at `row_index`.
    ///
    /// Returns the move to apply, if a drag was in progress.
    fn on_drop(&mut self, row_index: usize) -> Option<RowDragEnded>;
}

/// Tracks one drag gesture across rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragTracker {
    source: Option<usize>,
    over: Option<usize>,
}

impl DragTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Row the drag started on.
    pub fn source(&self) -> Option<usize> {
        self.source
    }

    /// Row currently highlighted as the drop target.
    pub fn dragging_over(&self) -> Option<usize> {
        self.over
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.source.is_some()
    }

    /// Abandon the drag (e.g. dropped outside the grid).
    pub fn cancel(&mut self) {
        self.source = None;
        self.over = None;
    }
}

impl RowDragEvents for DragTracker {
    fn on_drag_start(&mut self, row_index: usize) {
        self.source = Some(row_index);
        self.over = None;
    }

    fn on_drag_over(&mut self, row_index: usize) {
        if self.source.is_some() {
            self.over = Some(row_index);
        }
    }

    fn on_drag_leave(&mut self, row_index: usize) {
        if self.over == Some(row_index) {
            self.over = None;
        }
    }

    fn on_drop(&mut self, row_index: usize) -> Option<RowDragEnded> {
        let current_index = self.source.take()?;
        self.over = None;
        Some(RowDragEnded {
            current_index,
            next_index: row_index,
        })
    }
}

/// Move the row at `current_index` to `next_index`.
///
/// Rows in between shift by one toward the vacated slot. The moved row is the
/// only one flagged `relocated`. Indices and offsets are rebuilt from the new
/// order and `data` is rewritten to match.
///
/// Returns `false` (and changes nothing) when the indices are equal or out of
/// range.
pub fn move_row<T: Clone>(
    registry: &mut RowRegistry<T>,
    data: &mut Vec<T>,
    current_index: usize,
    next_index: usize,
    estimated_height: f64,
) -> bool {
    if current_index == next_index {
        return false;
    }
    let len = registry.len();
    if current_index >= len || next_index >= len {
        warn!(
            "Ignoring move {} -> {} outside of {} rows",
            current_index, next_index, len
        );
        return false;
    }

    let mut records = std::mem::take(registry).into_records();
    let mut moved = records.remove(current_index);
    moved.relocated = true;
    records.insert(next_index, moved);
    for (index, record) in records.iter_mut().enumerate() {
        if index != next_index {
            record.relocated = false;
        }
    }

    *data = records.iter().map(|record| record.data.clone()).collect();
    *registry = RowRegistry::from_records(records);
    registry.set_height_offsets(current_index.min(next_index), estimated_height);

    debug!("Moved row {} -> {}", current_index, next_index);
    true
}
