#![deny(missing_docs)]
//! Composable constraints over scalar values and Arrow tables.
//!
//! A [`Constraint`] is an immutable predicate tree. It answers two questions:
//! does one [`Value`] satisfy it ([`Constraint::matches`]), and which rows of
//! a [`Table`] satisfy it ([`Constraint::select`]). Both answers agree for
//! every row. Table evaluation narrows the candidate rows as it descends, so
//! clauses after a failed `AND` branch only see the rows still in play.
//!
//! Loosely-typed input is turned into constraints by [`coerce`]: mappings
//! become field-wise matches, sets membership, other sequences "any of", and
//! scalars equality.
//!
//! ```
//! use std::sync::Arc;
//!
//! use arrow::array::{ArrayRef, Float64Array, StringArray};
//! use sieve::{filter, FieldBuilder, Literal, Range, Table};
//!
//! let units = Table::try_from_columns([
//!     ("isi_violations", Arc::new(Float64Array::from(vec![0.1, 0.9, 0.3])) as ArrayRef),
//!     ("area", Arc::new(StringArray::from(vec!["VISp", "VISp", "APN"])) as ArrayRef),
//! ])?;
//!
//! let good = FieldBuilder::new()
//!     .field("isi_violations", Range::below(0.5))
//!     .field("area", "VISp")
//!     .build();
//! assert_eq!(filter(&units, good)?.num_rows(), 1);
//!
//! let visual = Literal::map([("area", Literal::set(["VISp", "VISl"]))]);
//! assert_eq!(filter(&units, visual)?.num_rows(), 2);
//! # Ok::<(), sieve::ConstraintError>(())
//! ```

mod coerce;
mod constraint;
mod error;
mod eval;
mod observability;
mod option;
mod table;
mod value;

pub use crate::{
    coerce::{coerce, CallOp, Literal, TOTAL_KEY},
    constraint::{Constraint, ConstraintNode, FieldBuilder, Predicate, Range},
    error::{ConstraintError, PredicateError, Result},
    eval::row_set::{BitmapRowSet, RowPos, RowSet},
    option::SelectOptions,
    table::Table,
    value::{Number, Record, Value},
};

/// Rows of `table` satisfying `constraint`, in their original order and with
/// their row identifiers.
pub fn filter(table: &Table, constraint: impl Into<Literal>) -> Result<Table> {
    filter_with(table, constraint, &SelectOptions::default())
}

/// [`filter`] with explicit evaluation options.
pub fn filter_with(
    table: &Table,
    constraint: impl Into<Literal>,
    options: &SelectOptions,
) -> Result<Table> {
    let constraint = coerce(constraint)?;
    let mask = constraint.select_with(table, options)?;
    table.select_rows(&mask)
}

/// Whether `value` satisfies `constraint`, the membership reading of
/// `value in constraint`.
pub fn contains(value: &Value, constraint: impl Into<Literal>) -> Result<bool> {
    coerce(constraint)?.matches(value)
}
