//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use arrow::{
    array::{
        ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, ListArray, StringArray,
        StructArray, UInt64Array,
    },
    datatypes::{DataType, Field, Int32Type},
    record_batch::RecordBatch,
};
use sieve::{Constraint, Number, Range, Table, Value};

pub const RNG_SEED: u64 = 3;

pub const COLUMNS: [&str; 7] = ["int", "small", "float", "flag", "name", "tags", "point"];

const NAMES: [&str; 4] = ["a", "b", "c", "ab"];

pub fn make_rng(offset: u64) -> fastrand::Rng {
    fastrand::Rng::with_seed(RNG_SEED + offset)
}

/// Builds a table from named columns with the given row identifiers.
pub fn table_with_ids(columns: Vec<(&str, ArrayRef)>, ids: Vec<u64>) -> Table {
    let batch = RecordBatch::try_from_iter(columns).expect("record batch");
    Table::with_row_ids(batch, UInt64Array::from(ids)).expect("table")
}

/// Units-style table keyed by sparse identifiers.
pub fn units() -> Table {
    table_with_ids(
        vec![
            (
                "ecephys_structure_acronym",
                Arc::new(StringArray::from(vec![
                    Some("VISp"),
                    Some("VISl"),
                    Some("APN"),
                    None,
                    Some("VISp"),
                ])) as ArrayRef,
            ),
            (
                "isi_violations",
                Arc::new(Float64Array::from(vec![
                    Some(0.05),
                    Some(0.9),
                    Some(0.2),
                    Some(0.1),
                    None,
                ])) as ArrayRef,
            ),
            (
                "amplitude_cutoff",
                Arc::new(Float64Array::from(vec![0.01, 0.02, 0.3, 0.05, 0.09])) as ArrayRef,
            ),
            (
                "presence_ratio",
                Arc::new(Float64Array::from(vec![0.99, 0.95, 0.97, 0.5, 0.93])) as ArrayRef,
            ),
            (
                "probe_id",
                Arc::new(Int64Array::from(vec![
                    760640083, 760640083, 760640087, 760640087, 760640090,
                ])) as ArrayRef,
            ),
        ],
        vec![950_907_205, 950_907_210, 951_000_001, 951_000_002, 951_100_000],
    )
}

fn maybe<T>(rng: &mut fastrand::Rng, value: T) -> Option<T> {
    (rng.u8(..10) != 0).then_some(value)
}

/// Random table covering every supported column family.
pub fn random_table(rng: &mut fastrand::Rng, rows: usize) -> Table {
    let ints: Vec<Option<i64>> = (0..rows)
        .map(|_| {
            let value = rng.i64(-5..5);
            maybe(rng, value)
        })
        .collect();
    let smalls: Vec<i32> = (0..rows).map(|_| rng.i32(-3..3)).collect();
    let floats: Vec<Option<f64>> = (0..rows)
        .map(|_| {
            let value = match rng.u8(..20) {
                0 => f64::NAN,
                1 => -0.0,
                _ => f64::from(rng.i32(-10..10)) / 2.0,
            };
            maybe(rng, value)
        })
        .collect();
    let flags: Vec<Option<bool>> = (0..rows)
        .map(|_| {
            let value = rng.bool();
            maybe(rng, value)
        })
        .collect();
    let names: Vec<Option<&str>> = (0..rows)
        .map(|_| {
            let value = NAMES[rng.usize(..NAMES.len())];
            maybe(rng, value)
        })
        .collect();
    let tags: Vec<Option<Vec<Option<i32>>>> = (0..rows)
        .map(|_| {
            let len = rng.usize(..4);
            let items = (0..len).map(|_| Some(rng.i32(0..6))).collect();
            maybe(rng, items)
        })
        .collect();
    let xs: Vec<i64> = (0..rows).map(|_| rng.i64(0..4)).collect();
    let ys: Vec<Option<f64>> = (0..rows)
        .map(|_| {
            let value = f64::from(rng.i32(0..8)) / 4.0;
            maybe(rng, value)
        })
        .collect();
    let valid: Vec<bool> = (0..rows).map(|_| rng.u8(..6) != 0).collect();

    let point = StructArray::try_new(
        vec![
            Arc::new(Field::new("x", DataType::Int64, true)),
            Arc::new(Field::new("y", DataType::Float64, true)),
        ]
        .into(),
        vec![
            Arc::new(Int64Array::from(xs)) as ArrayRef,
            Arc::new(Float64Array::from(ys)) as ArrayRef,
        ],
        Some(valid.into()),
    )
    .expect("struct column");

    let ids: Vec<u64> = (0..rows as u64).map(|pos| pos * 7 + 1_000).collect();
    table_with_ids(
        vec![
            ("int", Arc::new(Int64Array::from(ints)) as ArrayRef),
            ("small", Arc::new(Int32Array::from(smalls)) as ArrayRef),
            ("float", Arc::new(Float64Array::from(floats)) as ArrayRef),
            ("flag", Arc::new(BooleanArray::from(flags)) as ArrayRef),
            ("name", Arc::new(StringArray::from(names)) as ArrayRef),
            (
                "tags",
                Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(tags)) as ArrayRef,
            ),
            ("point", Arc::new(point) as ArrayRef),
        ],
        ids,
    )
}

fn random_number(rng: &mut fastrand::Rng) -> Value {
    match rng.u8(..16) {
        0 => Value::Float(f64::NAN),
        1 => Value::Float(-0.0),
        2..=8 => Value::Int(rng.i64(-6..6)),
        _ => Value::Float(f64::from(rng.i32(-12..12)) / 2.0),
    }
}

fn random_scalar(rng: &mut fastrand::Rng) -> Value {
    match rng.u8(..6) {
        0 => Value::Null,
        1 => Value::Bool(rng.bool()),
        2 => Value::from(NAMES[rng.usize(..NAMES.len())]),
        _ => random_number(rng),
    }
}

fn random_range(rng: &mut fastrand::Rng) -> Range {
    let bound = |rng: &mut fastrand::Rng| -> Option<Number> {
        rng.bool().then(|| match random_number(rng) {
            Value::Int(v) => v.into(),
            Value::Float(v) => v.into(),
            _ => 0.into(),
        })
    };
    let lower = bound(rng);
    let upper = bound(rng);
    Range::from_bounds(lower, upper)
        .lower_strict(rng.bool())
        .upper_strict(rng.bool())
}

fn wrap(
    rng: &mut fastrand::Rng,
    depth: u32,
    leaf: &dyn Fn(&mut fastrand::Rng) -> Constraint,
) -> Constraint {
    if depth == 0 || rng.u8(..3) != 0 {
        return leaf(rng);
    }
    match rng.u8(..3) {
        0 => Constraint::not(wrap(rng, depth - 1, leaf)),
        op => {
            let children: Vec<Constraint> =
                (0..rng.usize(..4)).map(|_| wrap(rng, depth - 1, leaf)).collect();
            if op == 1 {
                Constraint::and(children)
            } else {
                Constraint::or(children)
            }
        }
    }
}

fn numeric_leaf(rng: &mut fastrand::Rng) -> Constraint {
    match rng.u8(..5) {
        0 | 1 => Constraint::range(random_range(rng)),
        2 => Constraint::eq(random_scalar(rng)),
        3 => Constraint::isin((0..rng.usize(..4)).map(|_| random_scalar(rng)).collect::<Vec<_>>()),
        _ => Constraint::satisfies_named("finite", |value| {
            Ok(value.as_number().is_some_and(|number| match number {
                Number::Float(v) => v.is_finite(),
                Number::Int(_) => true,
            }))
        }),
    }
}

fn scalar_leaf(rng: &mut fastrand::Rng) -> Constraint {
    match rng.u8(..4) {
        0 => Constraint::eq(random_scalar(rng)),
        1 => Constraint::isin((0..rng.usize(..4)).map(|_| random_scalar(rng)).collect::<Vec<_>>()),
        2 => Constraint::contains(NAMES[rng.usize(..3)]),
        _ => Constraint::always(),
    }
}

fn tags_leaf(rng: &mut fastrand::Rng) -> Constraint {
    match rng.u8(..3) {
        0 => Constraint::contains(random_range(rng)),
        1 => Constraint::eq(Value::List(
            (0..rng.usize(..3)).map(|_| Value::Int(rng.i64(0..6))).collect(),
        )),
        _ => Constraint::eq(Value::Null),
    }
}

fn point_leaf(rng: &mut fastrand::Rng) -> Constraint {
    let mut fields = Vec::new();
    for name in ["x", "y", "z"] {
        if rng.bool() {
            fields.push((name, wrap(rng, 1, &numeric_leaf)));
        }
    }
    Constraint::fields(fields, rng.bool())
}

fn column_constraint(rng: &mut fastrand::Rng, column: &str) -> Constraint {
    match column {
        "int" | "small" | "float" => wrap(rng, 2, &numeric_leaf),
        "flag" | "name" => wrap(rng, 2, &scalar_leaf),
        "tags" => wrap(rng, 2, &tags_leaf),
        "point" => wrap(rng, 1, &point_leaf),
        _ => Constraint::eq(random_scalar(rng)),
    }
}

fn field_constraint(rng: &mut fastrand::Rng) -> Constraint {
    let mut fields = Vec::new();
    for _ in 0..rng.usize(..4) {
        let column = if rng.u8(..8) == 0 {
            "missing"
        } else {
            COLUMNS[rng.usize(..COLUMNS.len())]
        };
        fields.push((column, column_constraint(rng, column)));
    }
    Constraint::fields(fields, rng.bool())
}

/// Random row-level constraint whose leaves fit their column types.
pub fn random_constraint(rng: &mut fastrand::Rng) -> Constraint {
    wrap(rng, 2, &field_constraint)
}
