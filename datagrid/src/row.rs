//! Per-row payload handed to the rendering layer.

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::selection::SelectionMode;

/// Default border color for row marks.
pub const DEFAULT_MARK_COLOR: &str = "#98db53";

/// Colored marker shown at the start of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMark {
    /// Border color (CSS color string).
    #[serde(default)]
    pub color: Option<String>,
    /// Single letter shown inside the mark.
    #[serde(default)]
    pub letter: Option<String>,
}

impl RowMark {
    /// Fill in the default color and truncate the letter to one character.
    pub fn normalized(mut self) -> Self {
        if self.color.is_none() {
            self.color = Some(DEFAULT_MARK_COLOR.to_string());
        }
        self.letter = self
            .letter
            .and_then(|letter| letter.chars().next())
            .map(String::from);
        self
    }
}

/// Everything the renderer needs to draw one row.
#[derive(Debug, Clone)]
pub struct RowProps<T> {
    /// Row identifier.
    pub identifier: String,
    /// Position in the logical order.
    pub row_index: usize,
    /// The host item.
    pub data: T,
    /// Visible columns, in display order.
    pub columns: Vec<Column>,
    /// Whether the selection input is shown.
    pub show_selection_input: bool,
    /// Selection mode (single mode draws the input as a radio).
    pub selection_mode: SelectionMode,
    /// Whether the grid renders a window rather than every row.
    pub virtual_scrolling_enabled: bool,
    /// Estimated row height in pixels (0 until the first measurement).
    pub height: f64,
    /// Initial checked state of the row's selection input.
    pub initialize_selected: bool,
    /// Whether the expansion area is open.
    pub expanded: bool,
    /// Highlight flag after a drag-and-drop move.
    pub relocated: bool,
    /// Whether the row accepts drag-and-drop.
    pub draggable: bool,
    /// Row mark, if a mark field is configured and present.
    pub mark: Option<RowMark>,
}

impl<T> RowProps<T> {
    /// Whether the selection input renders as a radio button.
    pub fn display_as_radio(&self) -> bool {
        self.selection_mode == SelectionMode::Single
    }
}
