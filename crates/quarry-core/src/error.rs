//! Error types for the typed value model.

use thiserror::Error;

/// Errors raised by the type registry while casting, parsing, or looking
/// up SQL types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A value does not fit the declared range of an integer type.
    #[error("value {value} is out of range for {ty}")]
    OutOfRange {
        /// The type the value was cast against.
        ty: String,
        /// Display form of the rejected value.
        value: String,
    },

    /// A value cannot be interpreted as the target type at all.
    #[error("cannot cast {value} as {ty}")]
    InvalidValue {
        /// The type the value was cast against.
        ty: String,
        /// Display form of the rejected value.
        value: String,
    },

    /// A database-reported type name has no registered mapping.
    #[error("unrecognized sql type name: {0:?}")]
    Unrecognized(String),

    /// A non-parametrized type was invoked with new parameters.
    #[error("{0} does not accept new parameters")]
    NotParametrizable(String),
}

/// Result type alias for type operations.
pub type Result<T> = std::result::Result<T, TypeError>;
