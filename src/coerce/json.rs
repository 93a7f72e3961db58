//! Literal documents written as JSON.
//!
//! Scalars, arrays and objects map onto plain values, alternatives and
//! field-wise matches. A single-key object whose key starts with `$` names a
//! wrapper instead:
//!
//! ```json
//! {"isi_violations": {"$range": [null, 0.7]}, "area": {"$in": ["VISp", "VISl"]}}
//! ```

use serde_json::Value as JsonValue;

use super::{CallOp, Literal};
use crate::{
    error::{ConstraintError, Result},
    value::{Record, Value},
};

impl Literal {
    /// Parses a JSON literal document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: JsonValue = serde_json::from_str(text)?;
        Literal::try_from(document)
    }
}

impl TryFrom<JsonValue> for Literal {
    type Error = ConstraintError;

    fn try_from(document: JsonValue) -> Result<Self> {
        match document {
            JsonValue::Array(items) => Ok(Literal::List(literals(items)?)),
            JsonValue::Object(object) => {
                let entries: Vec<(String, JsonValue)> = object.into_iter().collect();
                match <[(String, JsonValue); 1]>::try_from(entries) {
                    Ok([(key, payload)]) if key.starts_with('$') => operator(&key, payload),
                    Ok(single) => map(single),
                    Err(entries) => map(entries),
                }
            }
            scalar => Ok(Literal::Value(plain_value(scalar)?)),
        }
    }
}

fn literals(items: Vec<JsonValue>) -> Result<Vec<Literal>> {
    items.into_iter().map(Literal::try_from).collect()
}

fn map<I: IntoIterator<Item = (String, JsonValue)>>(entries: I) -> Result<Literal> {
    let entries = entries
        .into_iter()
        .map(|(key, value)| Ok((key, Literal::try_from(value)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Literal::Map(entries))
}

fn operator(key: &str, payload: JsonValue) -> Result<Literal> {
    let literal = match key {
        "$not" => Literal::call(CallOp::Not, [Literal::try_from(payload)?]),
        "$contains" => Literal::call(CallOp::Contains, [Literal::try_from(payload)?]),
        "$and" => Literal::call(CallOp::And, spread(payload)?),
        "$or" => Literal::call(CallOp::Or, spread(payload)?),
        "$range" => Literal::call(CallOp::Range, spread(payload)?),
        "$eq" => Literal::call(CallOp::Eq, [Literal::Value(plain_value(payload)?)]),
        "$in" => Literal::call(CallOp::Isin, [Literal::Set(members(key, payload)?)]),
        "$set" => Literal::Set(members(key, payload)?),
        other => {
            return Err(ConstraintError::invalid(format!(
                "unknown operator {other:?}"
            )))
        }
    };
    Ok(literal)
}

// Arrays are argument lists; anything else is a single argument.
fn spread(payload: JsonValue) -> Result<Vec<Literal>> {
    match payload {
        JsonValue::Array(items) => literals(items),
        other => Ok(vec![Literal::try_from(other)?]),
    }
}

fn members(key: &str, payload: JsonValue) -> Result<Vec<Value>> {
    match payload {
        JsonValue::Array(items) => items.into_iter().map(plain_value).collect(),
        _ => Err(ConstraintError::invalid(format!(
            "{key} takes an array of values"
        ))),
    }
}

fn plain_value(document: JsonValue) -> Result<Value> {
    let value = match document {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(flag) => Value::Bool(flag),
        JsonValue::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(int), _) => Value::Int(int),
            (None, Some(float)) => Value::Float(float),
            (None, None) => {
                return Err(ConstraintError::invalid(format!(
                    "number {number} is not representable"
                )))
            }
        },
        JsonValue::String(text) => Value::from(text),
        JsonValue::Array(items) => Value::List(
            items
                .into_iter()
                .map(plain_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        JsonValue::Object(object) => {
            let mut record = Record::new();
            for (key, value) in object {
                record.insert(key, plain_value(value)?);
            }
            Value::Record(record)
        }
    };
    Ok(value)
}
