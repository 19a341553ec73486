//! Grid configuration.

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::pagination::DEFAULT_ROWS_PER_PAGE;
use crate::selection::SelectionMode;
use crate::window::DEFAULT_SCROLL_BUFFER;

/// Host-supplied grid options.
///
/// Every field has a default, so a JSON config only needs the keys it
/// overrides. `identifierProperty` is required in practice: [`validate`]
/// rejects an empty one.
///
/// # Example
///
/// ```ignore
/// let config = GridConfig::new("id")
///     .rows_per_page(100)
///     .selection_mode(SelectionMode::Multiple)
///     .virtual_scrolling(true);
/// ```
///
/// [`validate`]: GridConfig::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Item field holding the unique row identifier.
    pub identifier_property: String,
    /// Rows requested per page.
    pub rows_per_page: usize,
    /// Single or multiple selection.
    pub selection_mode: SelectionMode,
    /// Whether rows show a selection input.
    pub show_selection_input: bool,
    /// Render only a window of rows.
    pub virtual_scrolling_enabled: bool,
    /// Rows rendered beyond each edge of the visible area.
    pub scroll_buffer: usize,
    /// Whether rows can be reordered by drag and drop.
    pub allow_rows_reorder: bool,
    /// Whether rows have an expansion area.
    pub expandable: bool,
    /// Item field holding the row mark.
    pub row_mark_field: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            identifier_property: String::new(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            selection_mode: SelectionMode::Single,
            show_selection_input: true,
            virtual_scrolling_enabled: false,
            scroll_buffer: DEFAULT_SCROLL_BUFFER,
            allow_rows_reorder: false,
            expandable: false,
            row_mark_field: None,
        }
    }
}

impl GridConfig {
    /// Create a config with defaults and the given identifier property.
    pub fn new(identifier_property: impl Into<String>) -> Self {
        Self {
            identifier_property: identifier_property.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config can drive a grid.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.identifier_property.trim().is_empty() {
            return Err(GridError::MissingIdentifierProperty);
        }
        Ok(())
    }

    /// Set the page size.
    pub fn rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = rows_per_page;
        self
    }

    /// Set the selection mode.
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Show or hide the selection input.
    pub fn show_selection_input(mut self, show: bool) -> Self {
        self.show_selection_input = show;
        self
    }

    /// Enable or disable virtual scrolling.
    pub fn virtual_scrolling(mut self, enabled: bool) -> Self {
        self.virtual_scrolling_enabled = enabled;
        self
    }

    /// Set the scroll buffer.
    pub fn scroll_buffer(mut self, buffer: usize) -> Self {
        self.scroll_buffer = buffer;
        self
    }

    /// Allow or forbid drag-and-drop reordering.
    pub fn allow_rows_reorder(mut self, allow: bool) -> Self {
        self.allow_rows_reorder = allow;
        self
    }

    /// Enable or disable row expansion.
    pub fn expandable(mut self, expandable: bool) -> Self {
        self.expandable = expandable;
        self
    }

    /// Set the row mark field.
    pub fn row_mark_field(mut self, field: impl Into<String>) -> Self {
        self.row_mark_field = Some(field.into());
        self
    }
}
