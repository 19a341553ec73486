//! Column sort state.
//!
//! The grid does not sort rows itself. It stores which field is sorted and
//! in which direction, and tells the host, which re-fetches the data.

use serde::{Deserialize, Serialize};

/// Sort direction sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

impl SortDirection {
    /// Direction for an ascending flag.
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// Emitted when a sortable header is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortChanged {
    /// Field the host should sort by.
    pub sort_field: String,
    /// Direction of the sort.
    pub sort_direction: SortDirection,
}

/// Current sort of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    field: Option<String>,
    ascending: bool,
}

impl SortState {
    /// Create an unsorted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle sort for a field.
    ///
    /// If the field is already sorted, toggles the direction.
    /// If sorting a different field, sorts ascending.
    pub fn toggle(&mut self, sort_field: &str) -> SortChanged {
        self.ascending = match self.field.as_deref() {
            Some(current) if current == sort_field => !self.ascending,
            _ => true,
        };
        self.field = Some(sort_field.to_string());
        SortChanged {
            sort_field: sort_field.to_string(),
            sort_direction: SortDirection::from_ascending(self.ascending),
        }
    }

    /// Sorted field, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Direction, if a field is sorted.
    pub fn direction(&self) -> Option<SortDirection> {
        self.field
            .as_ref()
            .map(|_| SortDirection::from_ascending(self.ascending))
    }

    /// Whether any field is sorted.
    pub fn is_sorting(&self) -> bool {
        self.field.is_some()
    }

    /// Clear sort state.
    pub fn clear(&mut self) {
        self.field = None;
        self.ascending = false;
    }
}
