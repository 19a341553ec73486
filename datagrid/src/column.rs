//! Column descriptors and the column registration collaborator.

use serde::{Deserialize, Serialize};

/// Narrowest width a column can be resized to, in pixels.
pub const MIN_COLUMN_WIDTH: f64 = 20.0;

/// Column configuration.
///
/// Columns define the header text, the item field they display, an optional
/// fixed width, and the sort field sent to the host when the header is clicked.
///
/// # Examples
///
/// ```ignore
/// let columns = vec![
///     Column::new("id").header("ID").width(80.0),
///     Column::new("name").header("Name").sort_field("name"),
///     Column::new("body").header("Body").resizable(false),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Item field displayed in this column.
    pub field: String,
    /// Header text.
    #[serde(default)]
    pub header: String,
    /// Fixed width in pixels; `None` means flexible.
    #[serde(default)]
    pub width: Option<f64>,
    /// Field name sent to the host for sorting; `None` disables sorting.
    #[serde(default)]
    pub sort_field: Option<String>,
    /// Whether the column is displayed.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether the column can be resized.
    #[serde(default = "default_true")]
    pub resizable: bool,
    /// Name of the cell template the renderer should use.
    #[serde(default)]
    pub template: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// Create a visible, resizable, flexible column for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: String::new(),
            width: None,
            sort_field: None,
            visible: true,
            resizable: true,
            template: None,
        }
    }

    /// Set the header text.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Set a fixed width in pixels.
    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Make the column sortable by the given host field.
    pub fn sort_field(mut self, sort_field: impl Into<String>) -> Self {
        let sort_field = sort_field.into();
        self.sort_field = (!sort_field.is_empty()).then_some(sort_field);
        self
    }

    /// Set column visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set whether the column can be resized.
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Set the cell template name.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Whether clicking the header changes the sort.
    pub fn is_sortable(&self) -> bool {
        self.sort_field.is_some()
    }
}

/// Ordered set of registered columns, keyed by field.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<Column>,
}

impl ColumnRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column, replacing any existing column with the same field.
    pub fn register(&mut self, column: Column) -> &[Column] {
        match self.columns.iter().position(|c| c.field == column.field) {
            Some(index) => self.columns[index] = column,
            None => self.columns.push(column),
        }
        &self.columns
    }

    /// Get a column by field.
    pub fn get(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// All registered columns in registration order.
    pub fn all(&self) -> &[Column] {
        &self.columns
    }

    /// Visible columns in registration order.
    pub fn visible(&self) -> Vec<Column> {
        self.columns.iter().filter(|c| c.visible).cloned().collect()
    }

    /// Resize a column. Widths below [`MIN_COLUMN_WIDTH`] are rejected.
    ///
    /// Returns `true` if the width changed.
    pub fn resize(&mut self, field: &str, width: f64) -> bool {
        let Some(column) = self.columns.iter_mut().find(|c| c.field == field) else {
            return false;
        };
        if !column.resizable || width < MIN_COLUMN_WIDTH {
            return false;
        }
        column.width = Some(width);
        true
    }

    /// Number of registered columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if no columns are registered.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
