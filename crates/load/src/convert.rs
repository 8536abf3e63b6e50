//! Convert arrow record batches into bindable SQL rows.
//!
//! Conversion is driven by the destination [`ColumnSpec`]s, not by the
//! partition's own schema: a column the table needs must be present and
//! of a compatible arrow type, otherwise that table's load fails.
//! Accepted widths are lenient (Int32/Int64, Float32/Float64,
//! Utf8/LargeUtf8, List/LargeList of Utf8); nulls are preserved.

use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, LargeStringArray,
    ListArray, StringArray,
};
use arrow::record_batch::RecordBatch;

use trackwerk_core::{ColumnSpec, ColumnType};

use crate::error::TableLoadError;

/// One bindable cell, typed per the destination column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(Option<i64>),
    Double(Option<f64>),
    Text(Option<String>),
    TextArray(Option<Vec<String>>),
}

/// Flatten a batch into row-major values, one `SqlValue` per destination
/// column per row.
pub fn batch_to_rows(
    table: &str,
    batch: &RecordBatch,
    columns: &[ColumnSpec],
) -> Result<Vec<Vec<SqlValue>>, TableLoadError> {
    let mut column_values: Vec<Vec<SqlValue>> = Vec::with_capacity(columns.len());

    for spec in columns {
        let array = batch
            .column_by_name(&spec.name)
            .ok_or_else(|| TableLoadError::MissingColumn {
                table: table.to_string(),
                column: spec.name.clone(),
            })?;
        column_values.push(extract_column(table, spec, array.as_ref())?);
    }

    let num_rows = batch.num_rows();
    let mut rows = Vec::with_capacity(num_rows);
    for row_idx in 0..num_rows {
        rows.push(
            column_values
                .iter()
                .map(|col| col[row_idx].clone())
                .collect(),
        );
    }
    Ok(rows)
}

fn extract_column(
    table: &str,
    spec: &ColumnSpec,
    array: &dyn Array,
) -> Result<Vec<SqlValue>, TableLoadError> {
    let mismatch = || TableLoadError::TypeMismatch {
        table: table.to_string(),
        column: spec.name.clone(),
        expected: spec.col_type.sql(),
        actual: array.data_type().to_string(),
    };

    let num_rows = array.len();
    let mut values = Vec::with_capacity(num_rows);

    match spec.col_type {
        ColumnType::Integer => {
            if let Some(ints) = array.as_any().downcast_ref::<Int64Array>() {
                for i in 0..num_rows {
                    values.push(SqlValue::Int(opt(ints, i).map(|_| ints.value(i))));
                }
            } else if let Some(ints) = array.as_any().downcast_ref::<Int32Array>() {
                for i in 0..num_rows {
                    values.push(SqlValue::Int(opt(ints, i).map(|_| ints.value(i) as i64)));
                }
            } else {
                return Err(mismatch());
            }
        }
        ColumnType::Double => {
            if let Some(floats) = array.as_any().downcast_ref::<Float64Array>() {
                for i in 0..num_rows {
                    values.push(SqlValue::Double(opt(floats, i).map(|_| floats.value(i))));
                }
            } else if let Some(floats) = array.as_any().downcast_ref::<Float32Array>() {
                for i in 0..num_rows {
                    values.push(SqlValue::Double(
                        opt(floats, i).map(|_| floats.value(i) as f64),
                    ));
                }
            } else {
                return Err(mismatch());
            }
        }
        ColumnType::Varchar(_) | ColumnType::Text => {
            if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
                for i in 0..num_rows {
                    values.push(SqlValue::Text(
                        opt(strings, i).map(|_| strings.value(i).to_string()),
                    ));
                }
            } else if let Some(strings) = array.as_any().downcast_ref::<LargeStringArray>() {
                for i in 0..num_rows {
                    values.push(SqlValue::Text(
                        opt(strings, i).map(|_| strings.value(i).to_string()),
                    ));
                }
            } else {
                return Err(mismatch());
            }
        }
        ColumnType::TextArray => {
            if let Some(lists) = array.as_any().downcast_ref::<ListArray>() {
                for i in 0..num_rows {
                    values.push(SqlValue::TextArray(match opt(lists, i) {
                        None => None,
                        Some(_) => Some(string_list(table, spec, &lists.value(i))?),
                    }));
                }
            } else if let Some(lists) = array.as_any().downcast_ref::<LargeListArray>() {
                for i in 0..num_rows {
                    values.push(SqlValue::TextArray(match opt(lists, i) {
                        None => None,
                        Some(_) => Some(string_list(table, spec, &lists.value(i))?),
                    }));
                }
            } else {
                return Err(mismatch());
            }
        }
    }

    Ok(values)
}

fn opt(array: &dyn Array, i: usize) -> Option<()> {
    if array.is_null(i) {
        None
    } else {
        Some(())
    }
}

fn string_list(
    table: &str,
    spec: &ColumnSpec,
    values: &arrow::array::ArrayRef,
) -> Result<Vec<String>, TableLoadError> {
    let strings = values
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| TableLoadError::TypeMismatch {
            table: table.to_string(),
            column: spec.name.clone(),
            expected: spec.col_type.sql(),
            actual: values.data_type().to_string(),
        })?;

    Ok((0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                String::new()
            } else {
                strings.value(i).to_string()
            }
        })
        .collect())
}
