//! Turning loosely-typed literals into constraints.
//!
//! [`coerce`] tries its cases in a fixed order: a constraint passes through,
//! a mapping becomes a field-wise match, a set becomes membership, any other
//! sequence becomes "any of", a scalar becomes equality, and an explicit
//! [`Literal::Call`] builds the named wrapper after checking its arguments.

mod json;

use std::{fmt, sync::Arc};

use crate::{
    constraint::{Constraint, Range},
    error::{ConstraintError, Result},
    observability::log_trace,
    value::{Number, Record, Value},
};

/// Reserved mapping key that switches a field-wise match to partial.
///
/// Its value must be a boolean; the key itself is never matched as a field.
pub const TOTAL_KEY: &str = "__total__";

/// Raw input accepted wherever a constraint is expected.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// Already a constraint.
    Constraint(Constraint),
    /// Plain value. Records coerce like [`Literal::Map`], lists like
    /// [`Literal::List`], everything else to equality.
    Value(Value),
    /// Unordered members, coerced to membership.
    Set(Vec<Value>),
    /// Alternatives, coerced to a disjunction.
    List(Vec<Literal>),
    /// Field name to literal, coerced to a field-wise match.
    Map(Vec<(String, Literal)>),
    /// Explicit wrapper with unchecked arguments.
    Call {
        /// Wrapper to build.
        op: CallOp,
        /// Arguments in call order.
        args: Vec<Literal>,
    },
}

/// Wrappers expressible as a [`Literal::Call`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallOp {
    /// `NOT(c)`
    Not,
    /// `AND(c, ...)`
    And,
    /// `OR(c, ...)`
    Or,
    /// `EQ(v)`
    Eq,
    /// `RANGE(lower, upper[, lower_strict[, upper_strict]])`
    Range,
    /// `ISIN(members)`
    Isin,
    /// `CONTAINS(c)`
    Contains,
}

impl CallOp {
    fn name(self) -> &'static str {
        match self {
            CallOp::Not => "NOT",
            CallOp::And => "AND",
            CallOp::Or => "OR",
            CallOp::Eq => "EQ",
            CallOp::Range => "RANGE",
            CallOp::Isin => "ISIN",
            CallOp::Contains => "CONTAINS",
        }
    }
}

impl fmt::Display for CallOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Literal {
    /// Membership literal.
    pub fn set<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Literal::Set(members.into_iter().map(Into::into).collect())
    }

    /// Field-wise literal; entries keep their order.
    pub fn map<I, K, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<Literal>,
    {
        Literal::Map(
            entries
                .into_iter()
                .map(|(key, literal)| (key.into(), literal.into()))
                .collect(),
        )
    }

    /// Explicit wrapper call.
    pub fn call<I, L>(op: CallOp, args: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        Literal::Call {
            op,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Literal::Constraint(_) => "constraint",
            Literal::Value(value) => value.type_name(),
            Literal::Set(_) => "set",
            Literal::List(_) => "list",
            Literal::Map(_) => "map",
            Literal::Call { .. } => "call",
        }
    }
}

/// Builds the constraint a literal stands for.
pub fn coerce(literal: impl Into<Literal>) -> Result<Constraint> {
    let literal = literal.into();
    log_trace!(component = "coerce", event = "coerce_literal", kind = literal.kind());
    coerce_literal(literal)
}

fn coerce_literal(literal: Literal) -> Result<Constraint> {
    match literal {
        Literal::Constraint(constraint) => Ok(constraint),
        Literal::Map(entries) => coerce_fields(
            entries
                .into_iter()
                .map(|(name, literal)| (Arc::from(name), literal)),
        ),
        Literal::Value(Value::Record(record)) => coerce_fields(
            record
                .iter()
                .map(|(name, value)| (Arc::from(name), Literal::Value(value.clone()))),
        ),
        Literal::Set(members) => Ok(Constraint::isin(members)),
        Literal::List(items) => any_of(items),
        Literal::Value(Value::List(items)) => any_of(items.into_iter().map(Literal::Value)),
        Literal::Value(value) => Ok(Constraint::eq(value)),
        Literal::Call { op, args } => coerce_call(op, args),
    }
}

fn any_of<I: IntoIterator<Item = Literal>>(items: I) -> Result<Constraint> {
    let clauses = items
        .into_iter()
        .map(coerce_literal)
        .collect::<Result<Vec<_>>>()?;
    Ok(Constraint::or(clauses))
}

fn coerce_fields<I>(entries: I) -> Result<Constraint>
where
    I: IntoIterator<Item = (Arc<str>, Literal)>,
{
    let mut total = true;
    let mut fields = Vec::new();
    for (name, literal) in entries {
        if &*name == TOTAL_KEY {
            total = match literal {
                Literal::Value(Value::Bool(flag)) => flag,
                other => {
                    return Err(ConstraintError::invalid(format!(
                        "{TOTAL_KEY} must be a bool, got {}",
                        other.kind()
                    )))
                }
            };
            continue;
        }
        fields.push((name, coerce_literal(literal)?));
    }
    Ok(Constraint::fields(fields, total))
}

fn coerce_call(op: CallOp, args: Vec<Literal>) -> Result<Constraint> {
    match op {
        CallOp::Not => Ok(Constraint::not(coerce_literal(single(op, args)?)?)),
        CallOp::Contains => Ok(Constraint::contains(coerce_literal(single(op, args)?)?)),
        CallOp::And | CallOp::Or => {
            let clauses = clause_list(args)
                .into_iter()
                .map(coerce_literal)
                .collect::<Result<Vec<_>>>()?;
            Ok(if op == CallOp::And {
                Constraint::and(clauses)
            } else {
                Constraint::or(clauses)
            })
        }
        CallOp::Eq => match single(op, args)? {
            Literal::Value(value) => Ok(Constraint::eq(value)),
            other => Err(ConstraintError::invalid(format!(
                "EQ takes a plain value, got {}",
                other.kind()
            ))),
        },
        CallOp::Range => coerce_range(args),
        CallOp::Isin => {
            let members = match single(op, args)? {
                Literal::Set(members) | Literal::Value(Value::List(members)) => members,
                Literal::List(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Literal::Value(value) => Ok(value),
                        other => Err(ConstraintError::invalid(format!(
                            "ISIN members must be plain values, got {}",
                            other.kind()
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?,
                other => {
                    return Err(ConstraintError::invalid(format!(
                        "ISIN takes a set or list, got {}",
                        other.kind()
                    )))
                }
            };
            Ok(Constraint::isin(members))
        }
    }
}

fn single(op: CallOp, args: Vec<Literal>) -> Result<Literal> {
    match <[Literal; 1]>::try_from(args) {
        Ok([arg]) => Ok(arg),
        Err(args) => Err(ConstraintError::invalid(format!(
            "{op} takes exactly one argument, got {}",
            args.len()
        ))),
    }
}

// A lone list argument is the clause list itself.
fn clause_list(args: Vec<Literal>) -> Vec<Literal> {
    match <[Literal; 1]>::try_from(args) {
        Ok([Literal::List(items)]) => items,
        Ok([Literal::Value(Value::List(items))]) => items.into_iter().map(Literal::Value).collect(),
        Ok([arg]) => vec![arg],
        Err(args) => args,
    }
}

fn coerce_range(args: Vec<Literal>) -> Result<Constraint> {
    if !(2..=4).contains(&args.len()) {
        return Err(ConstraintError::invalid(format!(
            "RANGE takes 2 to 4 arguments, got {}",
            args.len()
        )));
    }
    let mut args = args.into_iter();
    let lower = bound(args.next())?;
    let upper = bound(args.next())?;
    let mut range = Range::from_bounds(lower, upper);
    if let Some(flag) = args.next() {
        range = range.lower_strict(strictness(flag)?);
    }
    if let Some(flag) = args.next() {
        range = range.upper_strict(strictness(flag)?);
    }
    Ok(Constraint::range(range))
}

fn bound(arg: Option<Literal>) -> Result<Option<Number>> {
    match arg {
        None | Some(Literal::Value(Value::Null)) => Ok(None),
        Some(Literal::Value(Value::Int(v))) => Ok(Some(Number::Int(v))),
        Some(Literal::Value(Value::Float(v))) => Ok(Some(Number::Float(v))),
        Some(other) => Err(ConstraintError::invalid(format!(
            "RANGE bounds must be numbers or null, got {}",
            other.kind()
        ))),
    }
}

fn strictness(arg: Literal) -> Result<bool> {
    match arg {
        Literal::Value(Value::Bool(flag)) => Ok(flag),
        other => Err(ConstraintError::invalid(format!(
            "RANGE strictness must be a bool, got {}",
            other.kind()
        ))),
    }
}

impl TryFrom<Literal> for Constraint {
    type Error = ConstraintError;

    fn try_from(literal: Literal) -> Result<Self> {
        coerce(literal)
    }
}

impl From<Constraint> for Literal {
    fn from(value: Constraint) -> Self {
        Literal::Constraint(value)
    }
}

impl From<Range> for Literal {
    fn from(value: Range) -> Self {
        Literal::Constraint(Constraint::range(value))
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        Literal::Value(value)
    }
}

impl From<Record> for Literal {
    fn from(value: Record) -> Self {
        Literal::Value(Value::Record(value))
    }
}

impl From<Number> for Literal {
    fn from(value: Number) -> Self {
        Literal::Value(value.into())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Value(value.into())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Value(value.into())
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Value(value.into())
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Value(value.into())
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Value(value.into())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Value(value.into())
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(value: Vec<T>) -> Self {
        Literal::List(value.into_iter().map(Into::into).collect())
    }
}
