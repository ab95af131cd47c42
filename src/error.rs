//! Error types for sqlweave.

use thiserror::Error;

/// The main error type for sqlweave operations.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// A column name was registered twice on the same table.
    #[error("Duplicate column name '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A second primary key was declared on a table.
    #[error("Table '{table}' already has a primary key '{existing}', cannot mark '{column}' as primary key")]
    DuplicatePrimaryKey {
        table: String,
        column: String,
        existing: String,
    },

    /// A binding targets a field the entity type does not allow to be overridden.
    #[error("Cannot bind column '{column}' of table '{table}' to non-overridable field '{field}'")]
    NonOverridableField {
        table: String,
        column: String,
        field: String,
    },

    /// A binding path names a field the entity type does not declare.
    #[error("Entity type '{entity}' has no field named '{field}'")]
    UnknownField { entity: String, field: String },

    /// Attaching a reference would make a table reachable from itself.
    #[error("Circular reference detected, current table: '{table}', reference route: {}", route.join(" -> "))]
    CircularReference { table: String, route: Vec<String> },

    /// A referenced table has no primary key to join on.
    #[error("Table '{table}' has no primary key")]
    MissingPrimaryKey { table: String },

    /// A table without an entity type was asked to bind or materialize.
    #[error("Table '{table}' is not bound to an entity type")]
    NoEntityType { table: String },

    /// The active dialect has no pagination syntax.
    #[error("Pagination is not supported by the {dialect} dialect")]
    UnsupportedPagination { dialect: String },

    /// The active formatter chain does not recognize a node.
    #[error("Expression '{node}' is not supported by the {dialect} dialect")]
    UnsupportedExpression { dialect: String, node: String },

    /// An invariant inside sqlweave itself was broken.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A column label exceeds the dialect's identifier length limit.
    #[error("Column name '{name}' is too long, the max length of an identifier is {max}")]
    ColumnNameTooLong { name: String, max: usize },

    /// A result row has no column with the requested label.
    #[error("Column '{0}' not found in the result row")]
    ColumnNotFound(String),

    /// A driver value could not be converted to the declared column type.
    #[error("Cannot decode column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration.
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database driver error.
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl WeaveError {
    /// Create an unsupported-expression error.
    pub fn unsupported(dialect: impl Into<String>, node: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            dialect: dialect.into(),
            node: node.into(),
        }
    }

    /// Create a decode error for the given column.
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised while declaring tables and columns.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateColumn { .. }
                | Self::DuplicatePrimaryKey { .. }
                | Self::NonOverridableField { .. }
                | Self::UnknownField { .. }
                | Self::CircularReference { .. }
                | Self::MissingPrimaryKey { .. }
                | Self::NoEntityType { .. }
        )
    }
}

/// Result type alias for sqlweave operations.
pub type WeaveResult<T> = Result<T, WeaveError>;
