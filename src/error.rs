//! Error types for table operations.
//!
//! Structural mutations validate fully before applying anything, so a
//! returned error means the table is unchanged. Errors are contract
//! violations, not transient conditions; name errors always carry the
//! list of valid column names for remediation.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// Input is not usable as a sequence of sequences, or is jagged where
    /// uniform width is required.
    #[error("bad table shape: {0}")]
    Shape(String),

    /// Unknown column name.
    #[error("column '{name}' not found; available columns: [{}]", .available.join(", "))]
    NameNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Integer position out of range (after negative-index normalization).
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// An operation would introduce a repeated column name.
    #[error("duplicate column name '{0}'")]
    DuplicateName(String),

    /// A column name collides with a name the row/table API itself uses.
    #[error("column name '{0}' is reserved")]
    ReservedName(String),

    /// An inserted or renamed name collides with the existing header, or a
    /// bare name in a restructure request names no existing column.
    #[error("column '{0}' conflicts with the existing header")]
    Conflict(String),

    /// Header names are not acceptable as record field identifiers.
    #[error("field names not usable as record fields: [{}]", .0.join(", "))]
    InvalidFieldNames(Vec<String>),
}
