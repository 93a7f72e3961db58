//! Arrow-backed tables with stable row identifiers.

use arrow::{
    array::{Array, ArrayRef, AsArray, BooleanArray, UInt64Array},
    compute::{filter, filter_record_batch},
    datatypes::{
        DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
        UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
    record_batch::RecordBatch,
};

use crate::{
    error::{ConstraintError, Result},
    value::{Record, Value},
};

/// Columns addressed by name plus one identifier per row.
///
/// Identifiers need not be contiguous; their order is the row order and is
/// preserved by [`Table::select_rows`].
#[derive(Clone, Debug)]
pub struct Table {
    batch: RecordBatch,
    row_ids: UInt64Array,
}

impl Table {
    /// Wraps `batch`, numbering rows `0..n`.
    pub fn new(batch: RecordBatch) -> Result<Self> {
        let row_ids = UInt64Array::from_iter_values(0..batch.num_rows() as u64);
        Self::with_row_ids(batch, row_ids)
    }

    /// Wraps `batch` with caller-supplied row identifiers.
    pub fn with_row_ids(batch: RecordBatch, row_ids: UInt64Array) -> Result<Self> {
        let rows = batch.num_rows();
        if row_ids.len() != rows {
            return Err(ConstraintError::RowIdLength {
                ids: row_ids.len(),
                rows,
            });
        }
        if u32::try_from(rows).is_err() {
            return Err(ConstraintError::TooManyRows(rows));
        }
        Ok(Self { batch, row_ids })
    }

    /// Builds a table from named columns of equal length.
    pub fn try_from_columns<I, N>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, ArrayRef)>,
        N: AsRef<str>,
    {
        let batch = RecordBatch::try_from_iter(columns)?;
        Self::new(batch)
    }

    /// Underlying record batch.
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Row identifiers, aligned with the batch.
    #[must_use]
    pub fn row_ids(&self) -> &UInt64Array {
        &self.row_ids
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column lookup; `None` means the table has no such column, which is
    /// distinct from a present column with zero rows.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Identifier of the row at `pos`.
    #[must_use]
    pub fn row_id(&self, pos: usize) -> Option<u64> {
        (pos < self.row_ids.len()).then(|| self.row_ids.value(pos))
    }

    /// Position of the row carrying `row_id`.
    #[must_use]
    pub fn position_of(&self, row_id: u64) -> Option<usize> {
        self.row_ids.values().iter().position(|id| *id == row_id)
    }

    /// Row at `pos` as a [`Value::Record`].
    pub fn row(&self, pos: usize) -> Result<Value> {
        let rows = self.num_rows();
        if pos >= rows {
            return Err(ConstraintError::RowOutOfBounds { pos, rows });
        }
        let schema = self.batch.schema();
        let mut record = Record::new();
        for (field, column) in schema.fields().iter().zip(self.batch.columns()) {
            record.insert(field.name().as_str(), value_at(column.as_ref(), pos)?);
        }
        Ok(Value::Record(record))
    }

    /// Keeps the rows whose mask entry is true; null entries drop the row.
    pub fn select_rows(&self, mask: &BooleanArray) -> Result<Table> {
        let rows = self.num_rows();
        if mask.len() != rows {
            return Err(ConstraintError::MaskLength {
                mask: mask.len(),
                rows,
            });
        }
        let batch = filter_record_batch(&self.batch, mask)?;
        let row_ids = filter(&self.row_ids, mask)?
            .as_primitive::<UInt64Type>()
            .clone();
        Ok(Table { batch, row_ids })
    }
}

/// Reads one cell as a [`Value`].
pub(crate) fn value_at(array: &dyn Array, pos: usize) -> Result<Value> {
    if matches!(array.data_type(), DataType::Null) || array.is_null(pos) {
        return Ok(Value::Null);
    }
    let value = match array.data_type() {
        DataType::Boolean => Value::Bool(array.as_boolean().value(pos)),
        DataType::Int8 => Value::Int(i64::from(array.as_primitive::<Int8Type>().value(pos))),
        DataType::Int16 => Value::Int(i64::from(array.as_primitive::<Int16Type>().value(pos))),
        DataType::Int32 => Value::Int(i64::from(array.as_primitive::<Int32Type>().value(pos))),
        DataType::Int64 => Value::Int(array.as_primitive::<Int64Type>().value(pos)),
        DataType::UInt8 => Value::Int(i64::from(array.as_primitive::<UInt8Type>().value(pos))),
        DataType::UInt16 => Value::Int(i64::from(array.as_primitive::<UInt16Type>().value(pos))),
        DataType::UInt32 => Value::Int(i64::from(array.as_primitive::<UInt32Type>().value(pos))),
        DataType::Float32 => {
            Value::Float(f64::from(array.as_primitive::<Float32Type>().value(pos)))
        }
        DataType::Float64 => Value::Float(array.as_primitive::<Float64Type>().value(pos)),
        DataType::Utf8 => Value::from(array.as_string::<i32>().value(pos)),
        DataType::LargeUtf8 => Value::from(array.as_string::<i64>().value(pos)),
        DataType::List(_) => list_value(&array.as_list::<i32>().value(pos))?,
        DataType::LargeList(_) => list_value(&array.as_list::<i64>().value(pos))?,
        DataType::FixedSizeList(_, _) => list_value(&array.as_fixed_size_list().value(pos))?,
        DataType::Struct(fields) => {
            let columns = array.as_struct().columns();
            let mut record = Record::new();
            for (field, column) in fields.iter().zip(columns) {
                record.insert(field.name().as_str(), value_at(column.as_ref(), pos)?);
            }
            Value::Record(record)
        }
        other => return Err(ConstraintError::UnsupportedColumn(other.clone())),
    };
    Ok(value)
}

fn list_value(values: &ArrayRef) -> Result<Value> {
    let items = (0..values.len())
        .map(|idx| value_at(values.as_ref(), idx))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::List(items))
}
