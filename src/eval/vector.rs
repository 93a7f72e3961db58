//! Vectorized evaluation: which rows of a table satisfy a constraint?
//!
//! Every node is evaluated against a set of candidate row positions and
//! returns the subset that matches. Combinators hand later children only the
//! rows whose outcome is still open, so a row excluded by one clause of an
//! `AND` is never compared again. The final mask is the same as evaluating
//! every clause against the whole table.

use std::sync::Arc;

use arrow::{
    array::{
        Array, ArrayRef, AsArray, BooleanArray, Datum, Float64Array, Int64Array, StringArray,
        UInt32Array,
    },
    buffer::{BooleanBuffer, NullBuffer},
    compute::{
        and, cast,
        kernels::cmp::{eq, gt, gt_eq, lt, lt_eq},
        take,
    },
    datatypes::{DataType, Float64Type},
    error::ArrowError,
};

use super::{
    row_set::{BitmapRowSet, RowPos, RowSet},
    scalar,
};
use crate::{
    constraint::{Constraint, ConstraintNode, Range},
    error::{ConstraintError, Result},
    observability::{log_debug, log_trace},
    option::SelectOptions,
    table::{value_at, Table},
    value::{Number, Value},
};

type CmpKernel = fn(&dyn Datum, &dyn Datum) -> std::result::Result<BooleanArray, ArrowError>;

/// Evaluates `constraint` over every row of `table`.
pub(crate) fn select(
    table: &Table,
    constraint: &Constraint,
    options: &SelectOptions,
) -> Result<BooleanArray> {
    let rows = table.num_rows();
    let universe =
        BitmapRowSet::full(RowPos::try_from(rows).map_err(|_| ConstraintError::TooManyRows(rows))?);
    let evaluator = VectorEvaluator { options };
    let matched = evaluator.eval(constraint, Subject::Table(table), &universe)?;
    log_debug!(
        component = "select",
        event = "select_finished",
        rows,
        matched = matched.len(),
        narrowing = options.is_narrowing(),
    );
    Ok(matched.to_mask(rows))
}

/// What a node is evaluated against: whole table rows, or one column.
#[derive(Clone, Copy)]
enum Subject<'a> {
    Table(&'a Table),
    Column(&'a ArrayRef),
}

impl<'a> Subject<'a> {
    /// Child subject for `name`; `None` when the field does not exist.
    fn field(&self, name: &str) -> Option<Subject<'a>> {
        match *self {
            Subject::Table(table) => table.column(name).map(Subject::Column),
            Subject::Column(array) => match array.data_type() {
                DataType::Struct(_) => array.as_struct().column_by_name(name).map(Subject::Column),
                _ => None,
            },
        }
    }

    fn value_at(&self, pos: RowPos) -> Result<Value> {
        match *self {
            Subject::Table(table) => table.row(pos as usize),
            Subject::Column(array) => value_at(array.as_ref(), pos as usize),
        }
    }

    /// Rejects unsupported column types before any row is read.
    fn check_supported(&self) -> Result<()> {
        match *self {
            Subject::Table(table) => {
                for column in table.batch().columns() {
                    ColumnKind::of(column.data_type())?;
                }
                Ok(())
            }
            Subject::Column(array) => ColumnKind::of(array.data_type()).map(|_| ()),
        }
    }

    fn data_type(&self) -> DataType {
        match *self {
            Subject::Table(table) => DataType::Struct(table.batch().schema().fields().clone()),
            Subject::Column(array) => array.data_type().clone(),
        }
    }
}

/// Comparison families a column type supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Boolean,
    Integer,
    Float,
    Utf8,
    Nested,
}

impl ColumnKind {
    fn of(data_type: &DataType) -> Result<Self> {
        let kind = match data_type {
            DataType::Null => ColumnKind::Null,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32 => ColumnKind::Integer,
            DataType::Float32 | DataType::Float64 => ColumnKind::Float,
            DataType::Utf8 | DataType::LargeUtf8 => ColumnKind::Utf8,
            DataType::List(item) | DataType::LargeList(item) | DataType::FixedSizeList(item, _) => {
                ColumnKind::of(item.data_type())?;
                ColumnKind::Nested
            }
            DataType::Struct(fields) => {
                for field in fields {
                    ColumnKind::of(field.data_type())?;
                }
                ColumnKind::Nested
            }
            other => return Err(ConstraintError::UnsupportedColumn(other.clone())),
        };
        Ok(kind)
    }
}

/// How equality against one literal is computed for a column kind.
#[derive(Clone, Copy, Debug)]
enum EqPlan<'v> {
    /// The literal can never equal a cell of this column.
    Nothing,
    Nulls,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'v str),
    /// No kernel; compare row by row.
    Rows,
}

impl<'v> EqPlan<'v> {
    fn new(kind: ColumnKind, literal: &'v Value) -> Self {
        match (kind, literal) {
            (_, Value::Null) => EqPlan::Nulls,
            (_, Value::List(_) | Value::Record(_)) => EqPlan::Rows,
            (ColumnKind::Integer, Value::Int(v)) => EqPlan::Int(*v),
            (ColumnKind::Float, Value::Int(v)) => EqPlan::Float(*v as f64),
            (ColumnKind::Integer | ColumnKind::Float, Value::Float(v)) if v.is_nan() => {
                EqPlan::Nothing
            }
            (ColumnKind::Integer | ColumnKind::Float, Value::Float(v)) => EqPlan::Float(*v),
            (ColumnKind::Boolean, Value::Bool(v)) => EqPlan::Bool(*v),
            (ColumnKind::Utf8, Value::Str(v)) => EqPlan::Str(v),
            _ => EqPlan::Nothing,
        }
    }
}

/// Candidate rows of one column, gathered into a dense array.
struct View {
    array: ArrayRef,
    positions: Option<UInt32Array>,
}

impl View {
    fn gather(array: &ArrayRef, candidates: &BitmapRowSet) -> Result<Self> {
        if candidates.len() == array.len() {
            return Ok(View {
                array: Arc::clone(array),
                positions: None,
            });
        }
        let positions = candidates.to_indices();
        let array = take(array.as_ref(), &positions, None)?;
        Ok(View {
            array,
            positions: Some(positions),
        })
    }

    /// Maps a mask over the view back to table positions.
    fn scatter(&self, mask: &BooleanArray) -> BitmapRowSet {
        mask.iter()
            .enumerate()
            .filter(|(_, bit)| *bit == Some(true))
            .map(|(idx, _)| match &self.positions {
                Some(positions) => positions.value(idx),
                // Table rows fit in a RowPos, checked when the table is built.
                None => idx as RowPos,
            })
            .collect()
    }

    fn eq_mask(&self, plan: EqPlan<'_>) -> Result<Option<BooleanArray>> {
        let view = &self.array;
        let mask = match plan {
            EqPlan::Nothing | EqPlan::Rows => return Ok(None),
            EqPlan::Nulls => null_mask(view.as_ref()),
            EqPlan::Int(v) => eq(&cast(view, &DataType::Int64)?, &Int64Array::new_scalar(v))?,
            EqPlan::Float(v) => eq(
                &ieee_floats(view)?,
                &Float64Array::new_scalar(unsigned_zero(v)),
            )?,
            EqPlan::Bool(v) => eq(view, &BooleanArray::new_scalar(v))?,
            EqPlan::Str(v) => eq(&cast(view, &DataType::Utf8)?, &StringArray::new_scalar(v))?,
        };
        Ok(Some(mask))
    }

    fn range_mask(&self, kind: ColumnKind, range: &Range) -> Result<BooleanArray> {
        let view = &self.array;
        let lower = match range.lower() {
            Some(bound) => {
                let op: CmpKernel = if range.is_lower_strict() { gt } else { gt_eq };
                Some(compare_bound(view, kind, bound, op)?)
            }
            None => None,
        };
        let upper = match range.upper() {
            Some(bound) => {
                let op: CmpKernel = if range.is_upper_strict() { lt } else { lt_eq };
                Some(compare_bound(view, kind, bound, op)?)
            }
            None => None,
        };
        let mask = match (lower, upper) {
            (Some(lower), Some(upper)) => and(&lower, &upper)?,
            (Some(mask), None) | (None, Some(mask)) => mask,
            (None, None) => {
                let nulls = null_mask(view.as_ref());
                BooleanArray::from_iter(nulls.iter().map(|is_null| is_null.map(|null| !null)))
            }
        };
        Ok(mask)
    }
}

fn compare_bound(
    view: &ArrayRef,
    kind: ColumnKind,
    bound: Number,
    op: CmpKernel,
) -> Result<BooleanArray> {
    let bound = match (kind, bound) {
        (ColumnKind::Integer, Number::Int(v)) => {
            return Ok(op(&cast(view, &DataType::Int64)?, &Int64Array::new_scalar(v))?);
        }
        (_, Number::Int(v)) => v as f64,
        (_, Number::Float(v)) => v,
    };
    // Nothing is ordered against NaN.
    if bound.is_nan() {
        return Ok(BooleanArray::from(vec![false; view.len()]));
    }
    Ok(op(&ieee_floats(view)?, &Float64Array::new_scalar(unsigned_zero(bound)))?)
}

/// Casts `view` to `Float64` for IEEE comparison with Arrow's kernels, which
/// order floats by totalOrder. NaN cells become null and `-0.0` becomes `0.0`.
fn ieee_floats(view: &ArrayRef) -> Result<ArrayRef> {
    let floats = cast(view, &DataType::Float64)?;
    let floats = floats.as_primitive::<Float64Type>();
    let not_nan = BooleanBuffer::collect_bool(floats.len(), |idx| !floats.value(idx).is_nan());
    let nulls = NullBuffer::union(floats.nulls(), Some(&NullBuffer::new(not_nan)));
    let values = floats.unary::<_, Float64Type>(unsigned_zero);
    Ok(Arc::new(Float64Array::new(values.values().clone(), nulls)))
}

fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn null_mask(array: &dyn Array) -> BooleanArray {
    match array.logical_nulls() {
        Some(nulls) => BooleanArray::from_iter((0..array.len()).map(|idx| Some(nulls.is_null(idx)))),
        None => BooleanArray::from(vec![false; array.len()]),
    }
}

struct VectorEvaluator<'o> {
    options: &'o SelectOptions,
}

impl VectorEvaluator<'_> {
    /// Returns the subset of `candidates` matching `constraint`.
    fn eval(
        &self,
        constraint: &Constraint,
        subject: Subject<'_>,
        candidates: &BitmapRowSet,
    ) -> Result<BitmapRowSet> {
        match constraint.node() {
            ConstraintNode::True => Ok(candidates.clone()),
            ConstraintNode::False => Ok(BitmapRowSet::new()),
            ConstraintNode::Not(inner) => {
                let matched = self.eval(inner, subject, candidates)?;
                Ok(candidates.difference(&matched))
            }
            ConstraintNode::And(clauses) => {
                let mut surviving = candidates.clone();
                for clause in clauses {
                    let scope = if self.options.narrowing {
                        &surviving
                    } else {
                        candidates
                    };
                    let matched = self.eval(clause, subject, scope)?;
                    surviving = surviving.intersect(&matched);
                }
                Ok(surviving)
            }
            ConstraintNode::Or(clauses) => {
                let mut matched = BitmapRowSet::new();
                let mut remaining = candidates.clone();
                for clause in clauses {
                    let scope = if self.options.narrowing {
                        &remaining
                    } else {
                        candidates
                    };
                    let hits = self.eval(clause, subject, scope)?;
                    matched = matched.union(&hits);
                    remaining = remaining.difference(&hits);
                }
                Ok(matched)
            }
            ConstraintNode::Field { fields, total } => {
                self.eval_field(fields, *total, subject, candidates)
            }
            ConstraintNode::Eq(_) | ConstraintNode::Range(_) | ConstraintNode::Isin(_) => {
                match subject {
                    Subject::Column(array) => self.eval_leaf(constraint, array, candidates),
                    Subject::Table(_) => self.eval_table_leaf(constraint, subject, candidates),
                }
            }
            ConstraintNode::Contains(_) | ConstraintNode::Satisfies(_) => {
                self.eval_rows(constraint, subject, candidates)
            }
        }
    }

    fn eval_field(
        &self,
        fields: &[(Arc<str>, Constraint)],
        total: bool,
        subject: Subject<'_>,
        candidates: &BitmapRowSet,
    ) -> Result<BitmapRowSet> {
        // Null struct cells have no fields at all.
        let fieldless: BitmapRowSet = match subject {
            Subject::Column(array)
                if matches!(array.data_type(), DataType::Struct(_)) && array.null_count() > 0 =>
            {
                candidates
                    .iter()
                    .filter(|pos| array.is_null(*pos as usize))
                    .collect()
            }
            _ => BitmapRowSet::new(),
        };
        let present = candidates.difference(&fieldless);
        let mut surviving = present.clone();
        for (name, sub) in fields {
            let Some(child) = subject.field(name) else {
                if total {
                    log_trace!(
                        component = "select",
                        event = "field_missing",
                        field = %name,
                    );
                    return Ok(BitmapRowSet::new());
                }
                log_trace!(component = "select", event = "field_skipped", field = %name);
                continue;
            };
            let scope = if self.options.narrowing {
                &surviving
            } else {
                &present
            };
            let matched = self.eval(sub, child, scope)?;
            surviving = surviving.intersect(&matched);
        }
        if total && !fields.is_empty() {
            Ok(surviving)
        } else {
            Ok(surviving.union(&fieldless))
        }
    }

    fn eval_leaf(
        &self,
        constraint: &Constraint,
        array: &ArrayRef,
        candidates: &BitmapRowSet,
    ) -> Result<BitmapRowSet> {
        let kind = ColumnKind::of(array.data_type())?;
        match constraint.node() {
            ConstraintNode::Eq(literal) => {
                let plan = EqPlan::new(kind, literal);
                match plan {
                    EqPlan::Nothing => Ok(BitmapRowSet::new()),
                    EqPlan::Rows => self.eval_rows(constraint, Subject::Column(array), candidates),
                    _ => {
                        let view = View::gather(array, candidates)?;
                        Ok(view
                            .eq_mask(plan)?
                            .map(|mask| view.scatter(&mask))
                            .unwrap_or_default())
                    }
                }
            }
            ConstraintNode::Isin(members) => {
                let plans: Vec<EqPlan<'_>> =
                    members.iter().map(|member| EqPlan::new(kind, member)).collect();
                if plans.iter().any(|plan| matches!(plan, EqPlan::Rows)) {
                    return self.eval_rows(constraint, Subject::Column(array), candidates);
                }
                if plans.iter().all(|plan| matches!(plan, EqPlan::Nothing)) {
                    return Ok(BitmapRowSet::new());
                }
                let view = View::gather(array, candidates)?;
                let mut matched = BitmapRowSet::new();
                for plan in plans {
                    if let Some(mask) = view.eq_mask(plan)? {
                        matched = matched.union(&view.scatter(&mask));
                    }
                }
                Ok(matched)
            }
            ConstraintNode::Range(range) => match kind {
                ColumnKind::Null => Ok(BitmapRowSet::new()),
                ColumnKind::Integer | ColumnKind::Float => {
                    let view = View::gather(array, candidates)?;
                    let mask = view.range_mask(kind, range)?;
                    Ok(view.scatter(&mask))
                }
                ColumnKind::Boolean | ColumnKind::Utf8 | ColumnKind::Nested => {
                    Err(ConstraintError::TypeMismatch {
                        op: "range",
                        data_type: array.data_type().clone(),
                    })
                }
            },
            _ => self.eval_rows(constraint, Subject::Column(array), candidates),
        }
    }

    // Table rows are records: ranges never apply and equality needs a
    // record literal, so only the row-wise path remains.
    fn eval_table_leaf(
        &self,
        constraint: &Constraint,
        subject: Subject<'_>,
        candidates: &BitmapRowSet,
    ) -> Result<BitmapRowSet> {
        if let ConstraintNode::Range(_) = constraint.node() {
            return Err(ConstraintError::TypeMismatch {
                op: "range",
                data_type: subject.data_type(),
            });
        }
        self.eval_rows(constraint, subject, candidates)
    }

    fn eval_rows(
        &self,
        constraint: &Constraint,
        subject: Subject<'_>,
        candidates: &BitmapRowSet,
    ) -> Result<BitmapRowSet> {
        subject.check_supported()?;
        log_trace!(
            component = "select",
            event = "row_fallback",
            rows = candidates.len(),
            constraint = %constraint,
        );
        let mut matched = BitmapRowSet::new();
        for pos in candidates.iter() {
            if scalar::matches(constraint, &subject.value_at(pos)?)? {
                matched.insert(pos);
            }
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use arrow::{
        array::{
            ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, ListArray, NullArray,
            StringArray, StructArray, UInt64Array,
        },
        datatypes::{DataType, Field, Int32Type},
    };

    use crate::{Constraint, ConstraintError, FieldBuilder, Range, SelectOptions, Table, Value};

    fn table(columns: Vec<(&str, ArrayRef)>) -> Table {
        Table::try_from_columns(columns).expect("table")
    }

    fn mask(constraint: &Constraint, table: &Table) -> Vec<bool> {
        let narrowed = constraint.select(table).expect("select");
        let full = constraint
            .select_with(table, &SelectOptions::default().narrowing(false))
            .expect("select without narrowing");
        assert_eq!(narrowed, full, "narrowing changed the mask of {constraint}");
        narrowed.iter().map(|bit| bit == Some(true)).collect()
    }

    fn x_column() -> Table {
        table(vec![(
            "x",
            Arc::new(Int64Array::from(vec![1, 2, 3, 10])) as ArrayRef,
        )])
    }

    #[test]
    fn range_over_integer_column() {
        let constraint = FieldBuilder::new().field("x", Range::new(1, 10)).build();
        assert_eq!(mask(&constraint, &x_column()), vec![true, true, true, false]);
    }

    #[test]
    fn disjunction_over_strings() {
        let table = table(vec![(
            "s",
            Arc::new(StringArray::from(vec!["x", "y", "z"])) as ArrayRef,
        )]);
        let constraint = FieldBuilder::new()
            .field("s", Constraint::or([Constraint::eq("x"), Constraint::eq("y")]))
            .build();
        assert_eq!(mask(&constraint, &table), vec![true, true, false]);
    }

    #[test]
    fn empty_combinators_over_tables() {
        let table = x_column();
        assert_eq!(mask(&Constraint::and(Vec::new()), &table), vec![true; 4]);
        assert_eq!(mask(&Constraint::or(Vec::new()), &table), vec![false; 4]);
        assert_eq!(mask(&Constraint::not(Constraint::never()), &table), vec![true; 4]);
    }

    #[test]
    fn missing_column_follows_totality() {
        let table = x_column();
        let total = FieldBuilder::new()
            .field("x", 1)
            .field("missing", 1)
            .build();
        assert_eq!(mask(&total, &table), vec![false; 4]);

        let partial = FieldBuilder::new()
            .field("missing", 1)
            .field("x", Range::at_least(3))
            .partial()
            .build();
        assert_eq!(mask(&partial, &table), vec![false, false, true, true]);
    }

    #[test]
    fn numeric_equality_across_column_types() {
        let table = table(vec![
            ("i", Arc::new(Int32Array::from(vec![1, 2, 3])) as ArrayRef),
            (
                "f",
                Arc::new(Float64Array::from(vec![Some(1.0), None, Some(2.5)])) as ArrayRef,
            ),
        ]);
        let int_literal = FieldBuilder::new().field("f", 1).build();
        assert_eq!(mask(&int_literal, &table), vec![true, false, false]);
        let float_literal = FieldBuilder::new().field("i", 2.0).build();
        assert_eq!(mask(&float_literal, &table), vec![false, true, false]);
        let mismatched = FieldBuilder::new().field("i", "2").build();
        assert_eq!(mask(&mismatched, &table), vec![false; 3]);
        let nulls = FieldBuilder::new().field("f", Constraint::eq(Value::Null)).build();
        assert_eq!(mask(&nulls, &table), vec![false, true, false]);
        let members = FieldBuilder::new()
            .field("f", Constraint::isin([Value::Int(1), Value::Null]))
            .build();
        assert_eq!(mask(&members, &table), vec![true, true, false]);
    }

    #[test]
    fn null_cells_fail_ranges_but_pass_their_negation() {
        let table = table(vec![(
            "v",
            Arc::new(Float64Array::from(vec![Some(0.5), None, Some(f64::NAN)])) as ArrayRef,
        )]);
        let in_range = FieldBuilder::new().field("v", Range::unbounded()).build();
        assert_eq!(mask(&in_range, &table), vec![true, false, true]);
        let below = FieldBuilder::new()
            .field("v", Constraint::not(Range::below(0.7)))
            .build();
        assert_eq!(mask(&below, &table), vec![false, true, true]);
    }

    #[test]
    fn nan_fails_bounds_and_equality() {
        let table = table(vec![(
            "presence_ratio",
            Arc::new(Float64Array::from(vec![0.95, f64::NAN, 0.5])) as ArrayRef,
        )]);
        let present = FieldBuilder::new()
            .field("presence_ratio", Range::at_least(0.9))
            .build();
        assert_eq!(mask(&present, &table), vec![true, false, false]);
        let below = FieldBuilder::new()
            .field("presence_ratio", Range::below(0.9))
            .build();
        assert_eq!(mask(&below, &table), vec![false, false, true]);
        let nan_bound = FieldBuilder::new()
            .field("presence_ratio", Range::at_least(f64::NAN))
            .build();
        assert_eq!(mask(&nan_bound, &table), vec![false; 3]);
        let nan_literal = FieldBuilder::new()
            .field("presence_ratio", Constraint::isin([f64::NAN, 0.5]))
            .build();
        assert_eq!(mask(&nan_literal, &table), vec![false, false, true]);

        for constraint in [present, below, nan_bound, nan_literal] {
            for pos in 0..table.num_rows() {
                let row = table.row(pos).expect("row");
                assert_eq!(
                    constraint.matches(&row).expect("scalar"),
                    mask(&constraint, &table)[pos],
                    "row {pos} under {constraint}"
                );
            }
        }
    }

    #[test]
    fn signed_zeros_compare_equal() {
        let table = table(vec![
            ("f", Arc::new(Float64Array::from(vec![-0.0, 0.0, 1.0])) as ArrayRef),
            ("i", Arc::new(Int64Array::from(vec![0, 1, -1])) as ArrayRef),
        ]);
        let zero = FieldBuilder::new().field("f", 0).build();
        assert_eq!(mask(&zero, &table), vec![true, true, false]);
        let negative_zero = FieldBuilder::new().field("i", -0.0).build();
        assert_eq!(mask(&negative_zero, &table), vec![true, false, false]);
        let above_zero = FieldBuilder::new()
            .field("f", Range::at_least(0.0).lower_strict(true))
            .build();
        assert_eq!(mask(&above_zero, &table), vec![false, false, true]);
        let below_zero = FieldBuilder::new().field("f", Range::below(-0.0)).build();
        assert_eq!(mask(&below_zero, &table), vec![false; 3]);
    }

    #[test]
    fn range_over_non_numeric_column_is_a_type_error() {
        let table = table(vec![
            (
                "s",
                Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef,
            ),
            (
                "b",
                Arc::new(BooleanArray::from(vec![true, false])) as ArrayRef,
            ),
        ]);
        for column in ["s", "b"] {
            let constraint = FieldBuilder::new().field(column, Range::new(0, 1)).build();
            let err = constraint.select(&table).expect_err("type mismatch");
            assert!(matches!(
                err,
                ConstraintError::TypeMismatch { op: "range", .. }
            ));
        }

        // Raised from the column type even when no row survives to the range.
        let guarded = FieldBuilder::new()
            .field("s", Constraint::and([Constraint::eq("zzz"), Range::new(0, 1).into()]))
            .build();
        assert!(guarded.select(&table).is_err());
    }

    #[test]
    fn range_over_null_column_matches_nothing() {
        let table = table(vec![("n", Arc::new(NullArray::new(3)) as ArrayRef)]);
        let constraint = FieldBuilder::new().field("n", Range::unbounded()).build();
        assert_eq!(mask(&constraint, &table), vec![false; 3]);
        let nulls = FieldBuilder::new().field("n", Constraint::eq(Value::Null)).build();
        assert_eq!(mask(&nulls, &table), vec![true; 3]);
    }

    #[test]
    fn contains_over_list_column() {
        let acronyms = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![
            Some(vec![Some(1), Some(2)]),
            Some(vec![Some(3)]),
            None,
        ]);
        let table = table(vec![("areas", Arc::new(acronyms) as ArrayRef)]);
        let constraint = FieldBuilder::new()
            .field("areas", Constraint::contains(Range::new(2, 4)))
            .build();
        assert_eq!(mask(&constraint, &table), vec![true, true, false]);
    }

    #[test]
    fn nested_fields_over_struct_columns() {
        let stats = StructArray::try_new(
            vec![Arc::new(Field::new("rate", DataType::Float64, true))].into(),
            vec![Arc::new(Float64Array::from(vec![1.0, 5.0, 9.0])) as ArrayRef],
            Some(vec![true, true, false].into()),
        )
        .expect("struct");
        let table = table(vec![("stats", Arc::new(stats) as ArrayRef)]);

        let total = FieldBuilder::new()
            .field("stats", FieldBuilder::new().field("rate", Range::at_least(2)).build())
            .build();
        assert_eq!(mask(&total, &table), vec![false, true, false]);

        let partial = FieldBuilder::new()
            .field(
                "stats",
                FieldBuilder::new()
                    .field("rate", Range::at_least(2))
                    .partial()
                    .build(),
            )
            .build();
        assert_eq!(mask(&partial, &table), vec![false, true, true]);

        for (pos, expected) in mask(&partial, &table).into_iter().enumerate() {
            let row = table.row(pos).expect("row");
            assert_eq!(partial.matches(&row).expect("scalar"), expected);
        }
    }

    #[test]
    fn narrowing_skips_decided_rows() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counted = Constraint::satisfies_named("counted", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        });
        let constraint = FieldBuilder::new()
            .field("x", Constraint::and([Range::below(3).into(), counted]))
            .build();
        let table = x_column();

        constraint.select(&table).expect("narrowed");
        assert_eq!(calls.swap(0, Ordering::SeqCst), 2);
        constraint
            .select_with(&table, &SelectOptions::default().narrowing(false))
            .expect("full");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn predicate_errors_propagate() {
        let failing = Constraint::satisfies(|_| Err("bad row".into()));
        let err = failing.select(&x_column()).expect_err("predicate error");
        assert!(matches!(err, ConstraintError::Predicate(_)));
    }

    #[test]
    fn unsupported_columns_are_rejected() {
        let table = table(vec![(
            "id",
            Arc::new(UInt64Array::from(vec![1u64, 2])) as ArrayRef,
        )]);
        let constraint = FieldBuilder::new().field("id", 1).build();
        assert!(matches!(
            constraint.select(&table),
            Err(ConstraintError::UnsupportedColumn(DataType::UInt64))
        ));
    }

    #[test]
    fn record_literals_compare_whole_rows() {
        let table = x_column();
        let row = table.row(2).expect("row");
        assert_eq!(
            mask(&Constraint::eq(row), &table),
            vec![false, false, true, false]
        );
        assert!(Constraint::range(Range::unbounded()).select(&table).is_err());
    }
}
