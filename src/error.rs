use arrow::{datatypes::DataType, error::ArrowError};
use thiserror::Error;

/// Error returned by user-supplied [`Satisfies`](crate::ConstraintNode::Satisfies) predicates.
pub type PredicateError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced while building or evaluating constraints.
///
/// A field missing from a row is not an error: `Field` constraints resolve it
/// through their totality policy.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// Coercion received a literal it cannot turn into a constraint.
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),
    /// An ordering constraint was applied to a column that is not numeric.
    #[error("{op} requires a numeric column, got {data_type:?}")]
    TypeMismatch {
        /// Constraint that rejected the column.
        op: &'static str,
        /// Type of the offending column.
        data_type: DataType,
    },
    /// The column type has no value mapping.
    #[error("unsupported column type {0:?}")]
    UnsupportedColumn(DataType),
    /// Row identifiers do not line up with the batch.
    #[error("row id count {ids} does not match row count {rows}")]
    RowIdLength {
        /// Number of identifiers supplied.
        ids: usize,
        /// Number of rows in the batch.
        rows: usize,
    },
    /// A selection mask does not cover the table.
    #[error("mask length {mask} does not match row count {rows}")]
    MaskLength {
        /// Length of the supplied mask.
        mask: usize,
        /// Number of rows in the table.
        rows: usize,
    },
    /// Row position past the end of the table.
    #[error("row {pos} out of bounds for table of {rows} rows")]
    RowOutOfBounds {
        /// Requested position.
        pos: usize,
        /// Number of rows in the table.
        rows: usize,
    },
    /// Row positions are tracked as `u32`.
    #[error("table has {0} rows, more than a row set can address")]
    TooManyRows(usize),
    /// A `Satisfies` predicate failed.
    #[error("predicate failed: {0}")]
    Predicate(#[source] PredicateError),
    /// Failure inside an Arrow kernel.
    #[error(transparent)]
    Arrow(#[from] ArrowError),
    /// Malformed literal document.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ConstraintError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConstraint(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ConstraintError> = std::result::Result<T, E>;
