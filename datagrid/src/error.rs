//! Error types

/// Errors that can occur while configuring or driving a grid.
///
/// Only configuration errors are meant to reach the host. Lookup misses and
/// malformed rows are recovered inside the grid and surface as log output.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// No identifier property was configured.
    #[error("You have to set an identifier property")]
    MissingIdentifierProperty,

    /// The grid configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// A row identifier is not present in the registry.
    #[error("Row not found: {identifier}")]
    RowNotFound {
        /// The identifier that was looked up.
        identifier: String,
    },

    /// An item carries no value for the configured identifier property.
    #[error("Item has no value for identifier property `{property}`")]
    MissingIdentifier {
        /// The configured identifier property.
        property: String,
    },
}

impl GridError {
    /// Creates a new lookup miss error.
    pub fn row_not_found(identifier: impl Into<String>) -> Self {
        Self::RowNotFound {
            identifier: identifier.into(),
        }
    }

    /// Returns `true` if this error must halt grid setup.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingIdentifierProperty | Self::Config(_))
    }
}
