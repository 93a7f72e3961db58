//! Immutable constraint trees.

mod builder;
mod range;

use std::{fmt, sync::Arc};

use arrow::array::BooleanArray;

pub use self::{builder::FieldBuilder, range::Range};
use crate::{
    error::{PredicateError, Result},
    eval,
    option::SelectOptions,
    table::Table,
    value::{Number, Value},
};

type PredicateFn = dyn Fn(&Value) -> std::result::Result<bool, PredicateError> + Send + Sync;

/// Opaque boolean function wrapped by [`ConstraintNode::Satisfies`].
#[derive(Clone)]
pub struct Predicate {
    name: Arc<str>,
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Wraps a function under a display name.
    pub fn new<N, F>(name: N, func: F) -> Self
    where
        N: Into<Arc<str>>,
        F: Fn(&Value) -> std::result::Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the wrapped function.
    pub fn call(&self, value: &Value) -> std::result::Result<bool, PredicateError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func) as *const (),
            Arc::as_ptr(&other.func) as *const (),
        )
    }
}

/// Node of a constraint tree; leaf and combinator variants coexist.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintNode {
    /// Matches everything.
    True,
    /// Matches nothing.
    False,
    /// Logical negation.
    Not(Constraint),
    /// Conjunction; vacuously true without children.
    And(Vec<Constraint>),
    /// Disjunction; vacuously false without children.
    Or(Vec<Constraint>),
    /// Equality against a fixed value.
    Eq(Value),
    /// Numeric interval.
    Range(Range),
    /// Membership in a set of values, deduplicated on construction.
    Isin(Vec<Value>),
    /// Some element of an iterable value matches the child.
    Contains(Constraint),
    /// External boolean function; evaluated row by row.
    Satisfies(Predicate),
    /// Per-field sub-constraints over a record or table row.
    Field {
        /// Field names are unique and keep their first insertion position.
        fields: Vec<(Arc<str>, Constraint)>,
        /// Missing fields fail the match when true and are skipped otherwise.
        total: bool,
    },
}

/// Immutable predicate over a value or table row.
///
/// Clones share the underlying tree, so a constraint can be built once and
/// evaluated from many places or threads.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    node: Arc<ConstraintNode>,
}

impl Constraint {
    /// Returns the root node.
    #[must_use]
    pub fn node(&self) -> &ConstraintNode {
        &self.node
    }

    /// Constant true.
    #[must_use]
    pub fn always() -> Self {
        Self::from_node(ConstraintNode::True)
    }

    /// Constant false.
    #[must_use]
    pub fn never() -> Self {
        Self::from_node(ConstraintNode::False)
    }

    /// Negation of `inner`.
    #[must_use]
    pub fn not<C: Into<Constraint>>(inner: C) -> Self {
        Self::from_node(ConstraintNode::Not(inner.into()))
    }

    /// Conjunction of the supplied clauses, in order.
    #[must_use]
    pub fn and<I>(clauses: I) -> Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        Self::from_node(ConstraintNode::And(clauses.into_iter().collect()))
    }

    /// Disjunction of the supplied clauses, in order.
    #[must_use]
    pub fn or<I>(clauses: I) -> Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        Self::from_node(ConstraintNode::Or(clauses.into_iter().collect()))
    }

    /// Equality against `value`.
    #[must_use]
    pub fn eq<V: Into<Value>>(value: V) -> Self {
        Self::from_node(ConstraintNode::Eq(value.into()))
    }

    /// Numeric interval.
    #[must_use]
    pub fn range(range: Range) -> Self {
        Self::from_node(ConstraintNode::Range(range))
    }

    /// Membership in `members`; duplicates are dropped.
    #[must_use]
    pub fn isin<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut unique: Vec<Value> = Vec::new();
        for member in members {
            let member = member.into();
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        Self::from_node(ConstraintNode::Isin(unique))
    }

    /// Some element of the value matches `inner`.
    #[must_use]
    pub fn contains<C: Into<Constraint>>(inner: C) -> Self {
        Self::from_node(ConstraintNode::Contains(inner.into()))
    }

    /// Wraps an external predicate under a generic name.
    #[must_use]
    pub fn satisfies<F>(func: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self::satisfies_named("fn", func)
    }

    /// Wraps an external predicate under `name`.
    #[must_use]
    pub fn satisfies_named<N, F>(name: N, func: F) -> Self
    where
        N: Into<Arc<str>>,
        F: Fn(&Value) -> std::result::Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self::from_node(ConstraintNode::Satisfies(Predicate::new(name, func)))
    }

    /// Field-wise conjunction. A repeated name replaces the earlier
    /// constraint in place.
    #[must_use]
    pub fn fields<I, N>(fields: I, total: bool) -> Self
    where
        I: IntoIterator<Item = (N, Constraint)>,
        N: Into<Arc<str>>,
    {
        let mut unique: Vec<(Arc<str>, Constraint)> = Vec::new();
        for (name, constraint) in fields {
            let name = name.into();
            match unique.iter_mut().find(|(key, _)| *key == name) {
                Some((_, slot)) => *slot = constraint,
                None => unique.push((name, constraint)),
            }
        }
        Self::from_node(ConstraintNode::Field {
            fields: unique,
            total,
        })
    }

    /// Starts a [`FieldBuilder`].
    #[must_use]
    pub fn field_builder() -> FieldBuilder {
        FieldBuilder::new()
    }

    /// Returns true when `value` satisfies this constraint.
    ///
    /// Errors only come from `Satisfies` predicates.
    pub fn matches(&self, value: &Value) -> Result<bool> {
        eval::scalar::matches(self, value)
    }

    /// Membership test; `constraint.contains_value(x)` reads as "x in constraint".
    pub fn contains_value(&self, value: &Value) -> Result<bool> {
        self.matches(value)
    }

    /// Boolean mask of the table rows satisfying this constraint.
    pub fn select(&self, table: &Table) -> Result<BooleanArray> {
        self.select_with(table, &SelectOptions::default())
    }

    /// [`Constraint::select`] with explicit options.
    pub fn select_with(&self, table: &Table, options: &SelectOptions) -> Result<BooleanArray> {
        eval::vector::select(table, self, options)
    }

    pub(crate) fn from_node(node: ConstraintNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Constraint]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            ConstraintNode::True => f.write_str("TRUE"),
            ConstraintNode::False => f.write_str("FALSE"),
            ConstraintNode::Not(inner) => write!(f, "NOT({inner})"),
            ConstraintNode::And(clauses) => {
                f.write_str("AND(")?;
                write_list(f, clauses)?;
                f.write_str(")")
            }
            ConstraintNode::Or(clauses) => {
                f.write_str("OR(")?;
                write_list(f, clauses)?;
                f.write_str(")")
            }
            ConstraintNode::Eq(value) => write!(f, "EQ({value})"),
            ConstraintNode::Range(range) => write!(f, "RANGE{range}"),
            ConstraintNode::Isin(members) => {
                f.write_str("ISIN{")?;
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("}")
            }
            ConstraintNode::Contains(inner) => write!(f, "CONTAINS({inner})"),
            ConstraintNode::Satisfies(predicate) => write!(f, "SATISFIES({})", predicate.name()),
            ConstraintNode::Field { fields, total } => {
                f.write_str("FIELD(")?;
                for (name, constraint) in fields {
                    write!(f, "{name}={constraint}, ")?;
                }
                write!(f, "total={total})")
            }
        }
    }
}

impl From<Range> for Constraint {
    fn from(value: Range) -> Self {
        Constraint::range(value)
    }
}

impl From<Number> for Constraint {
    fn from(value: Number) -> Self {
        Constraint::eq(value)
    }
}

impl From<bool> for Constraint {
    fn from(value: bool) -> Self {
        Constraint::eq(value)
    }
}

impl From<i64> for Constraint {
    fn from(value: i64) -> Self {
        Constraint::eq(value)
    }
}

impl From<i32> for Constraint {
    fn from(value: i32) -> Self {
        Constraint::eq(value)
    }
}

impl From<f64> for Constraint {
    fn from(value: f64) -> Self {
        Constraint::eq(value)
    }
}

impl From<&str> for Constraint {
    fn from(value: &str) -> Self {
        Constraint::eq(value)
    }
}

impl From<String> for Constraint {
    fn from(value: String) -> Self {
        Constraint::eq(value)
    }
}
