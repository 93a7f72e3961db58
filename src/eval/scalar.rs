//! Scalar evaluation: does one value satisfy a constraint?

use crate::{
    constraint::{Constraint, ConstraintNode},
    error::{ConstraintError, Result},
    value::Value,
};

/// Walks `constraint` against `value`.
///
/// Combinators stop at the first deciding child. Type mismatches (e.g. a
/// string under `Range`) are non-matches, never errors; the only error source
/// is a failing `Satisfies` predicate.
pub(crate) fn matches(constraint: &Constraint, value: &Value) -> Result<bool> {
    match constraint.node() {
        ConstraintNode::True => Ok(true),
        ConstraintNode::False => Ok(false),
        ConstraintNode::Not(inner) => Ok(!matches(inner, value)?),
        ConstraintNode::And(clauses) => {
            for clause in clauses {
                if !matches(clause, value)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        ConstraintNode::Or(clauses) => {
            for clause in clauses {
                if matches(clause, value)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ConstraintNode::Eq(expected) => Ok(value == expected),
        ConstraintNode::Range(range) => Ok(value
            .as_number()
            .is_some_and(|number| range.contains_number(&number))),
        ConstraintNode::Isin(members) => Ok(members.iter().any(|member| member == value)),
        ConstraintNode::Contains(inner) => contains(inner, value),
        ConstraintNode::Satisfies(predicate) => {
            predicate.call(value).map_err(ConstraintError::Predicate)
        }
        ConstraintNode::Field { fields, total } => {
            for (name, sub) in fields {
                match value.field(name) {
                    Some(field_value) => {
                        if !matches(sub, field_value)? {
                            return Ok(false);
                        }
                    }
                    None if *total => return Ok(false),
                    None => {}
                }
            }
            Ok(true)
        }
    }
}

// Lists iterate their elements and strings their characters; anything else
// has no elements.
fn contains(inner: &Constraint, value: &Value) -> Result<bool> {
    match value {
        Value::List(items) => {
            for item in items {
                if matches(inner, item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Str(text) => {
            let mut buf = [0u8; 4];
            for ch in text.chars() {
                if matches(inner, &Value::from(&*ch.encode_utf8(&mut buf)))? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}
