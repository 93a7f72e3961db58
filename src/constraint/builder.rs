//! Builder for field-wise constraints.

use std::sync::Arc;

use super::Constraint;

/// Builder for [`ConstraintNode::Field`](super::ConstraintNode::Field)
/// constraints.
#[derive(Debug)]
pub struct FieldBuilder {
    fields: Vec<(Arc<str>, Constraint)>,
    total: bool,
}

impl FieldBuilder {
    /// Creates an empty, total builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            total: true,
        }
    }

    /// Adds a sub-constraint for `name`.
    #[must_use]
    pub fn field<N, C>(mut self, name: N, constraint: C) -> Self
    where
        N: Into<Arc<str>>,
        C: Into<Constraint>,
    {
        self.fields.push((name.into(), constraint.into()));
        self
    }

    /// Sets the missing-field policy.
    #[must_use]
    pub fn total(self, total: bool) -> Self {
        Self { total, ..self }
    }

    /// Shorthand for `total(false)`: missing fields are skipped.
    #[must_use]
    pub fn partial(self) -> Self {
        self.total(false)
    }

    /// Consumes the builder and returns the composed constraint.
    #[must_use]
    pub fn build(self) -> Constraint {
        Constraint::fields(self.fields, self.total)
    }
}

impl Default for FieldBuilder {
    fn default() -> Self {
        Self::new()
    }
}
