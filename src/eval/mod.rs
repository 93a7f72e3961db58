//! Constraint evaluation over single values and over whole tables.

pub mod row_set;
pub(crate) mod scalar;
pub(crate) mod vector;
