//! RowItem trait for opaque host items.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::error::GridError;
use crate::row::RowMark;

/// Trait for host items that can be displayed as grid rows.
///
/// The grid never inspects items beyond reading named fields: the configured
/// identifier property, and optionally a row mark field.
///
/// # Examples
///
/// ```ignore
/// impl RowItem for Comment {
///     fn field(&self, name: &str) -> Option<String> {
///         match name {
///             "id" => Some(self.id.to_string()),
///             "name" => Some(self.name.clone()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait RowItem: Clone {
    /// Get a field value rendered as a string.
    fn field(&self, name: &str) -> Option<String>;

    /// Get the row mark stored under `field`, if any.
    fn row_mark(&self, _field: &str) -> Option<RowMark> {
        None
    }
}

impl RowItem for Value {
    fn field(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    fn row_mark(&self, field: &str) -> Option<RowMark> {
        let value = self.get(field)?;
        serde_json::from_value(value.clone()).ok()
    }
}

impl RowItem for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl RowItem for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Read the identifier of an item from the configured property.
pub fn identifier_of<T: RowItem>(item: &T, property: &str) -> Result<String, GridError> {
    item.field(property)
        .ok_or_else(|| GridError::MissingIdentifier {
            property: property.to_string(),
        })
}
