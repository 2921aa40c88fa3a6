//! Error types for the database-facing layer.

use quarry_core::TypeError;
use thiserror::Error;

/// Errors surfaced by database handles, tables, and statement builders.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid connection parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The connection was unusable after the retry policy was exhausted.
    #[error("database is not connected: {0}")]
    Connection(String),

    /// Declared columns disagree with the live schema, or a referenced
    /// column could not be found for a foreign column.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Update or Delete executed without a condition while the database's
    /// safety flag is enabled.
    #[error("{0} without any condition is prohibited while safety is enabled")]
    Safety(&'static str),

    /// A statement was requested on a table before `prepare()` ran.
    #[error("table {0} is not prepared")]
    TableNotPrepared(String),

    /// A builder's value count does not match its column count.
    #[error("{values} values bound for {columns} columns")]
    ValueCount {
        /// Number of columns bound.
        columns: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// A statement referenced a column the table does not declare.
    #[error("unknown column {column} in table {table}")]
    UnknownColumn {
        /// The missing column name.
        column: String,
        /// The table that was searched.
        table: String,
    },

    /// A value failed a type's cast, or a reported type name could not be
    /// recognized.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Failure reported by the underlying driver.
    #[error("driver error: {0}")]
    Driver(String),
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Driver(error.to_string())
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;
