//! Column extraction from polars data frames
//!
//! Bound columns are read either as numbers (every integer and float dtype) or
//! as labels (strings, booleans, and anything else cast to string).

use polars::prelude::*;

use crate::{GgvegaError, Result};

/// Values of one bound column, still including missing entries
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Labels(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValues::Numeric(_))
    }
}

/// Check whether a dtype is read as numbers
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    use DataType::*;
    matches!(
        dtype,
        Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64 | Float32 | Float64
    )
}

/// Read a bound column from the frame
///
/// Returns `GgvegaError::ReaderError` when the column does not exist or
/// cannot be converted.
pub fn read_column(df: &DataFrame, name: &str) -> Result<ColumnValues> {
    let column = df.column(name).map_err(|_| {
        GgvegaError::ReaderError(format!(
            "Column '{}' is bound but not present in the data (available: {})",
            name,
            df.get_column_names()
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;
    let series = column.as_materialized_series();

    if is_numeric_dtype(series.dtype()) {
        let cast = series.cast(&DataType::Float64).map_err(|e| {
            GgvegaError::ReaderError(format!("Failed to read '{}' as numbers: {}", name, e))
        })?;
        let ca = cast.f64().map_err(|e| {
            GgvegaError::ReaderError(format!("Failed to cast '{}' to f64: {}", name, e))
        })?;
        return Ok(ColumnValues::Numeric(ca.into_iter().collect()));
    }

    let cast = series.cast(&DataType::String).map_err(|e| {
        GgvegaError::ReaderError(format!("Failed to read '{}' as labels: {}", name, e))
    })?;
    let ca = cast.str().map_err(|e| {
        GgvegaError::ReaderError(format!("Failed to cast '{}' to string: {}", name, e))
    })?;
    Ok(ColumnValues::Labels(
        ca.into_iter().map(|v| v.map(|s| s.to_string())).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_integer_column_as_numbers() {
        let df = df! { "n" => [1i32, 2, 3] }.unwrap();
        assert_eq!(
            read_column(&df, "n").unwrap(),
            ColumnValues::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)])
        );
    }

    #[test]
    fn test_read_nulls_are_kept() {
        let df = df! { "n" => [Some(1.5), None, Some(f64::NAN)] }.unwrap();
        match read_column(&df, "n").unwrap() {
            ColumnValues::Numeric(v) => {
                assert_eq!(v[0], Some(1.5));
                assert_eq!(v[1], None);
                assert!(v[2].unwrap().is_nan());
            }
            other => panic!("expected numbers, got {:?}", other),
        }
    }

    #[test]
    fn test_read_strings_and_booleans_as_labels() {
        let df = df! {
            "s" => ["a", "b"],
            "b" => [true, false],
        }
        .unwrap();
        assert_eq!(
            read_column(&df, "s").unwrap(),
            ColumnValues::Labels(vec![Some("a".into()), Some("b".into())])
        );
        assert!(!read_column(&df, "b").unwrap().is_numeric());
    }

    #[test]
    fn test_missing_column_is_reader_error() {
        let df = df! { "a" => [1.0] }.unwrap();
        let err = read_column(&df, "zzz").unwrap_err();
        assert!(matches!(err, GgvegaError::ReaderError(_)));
        assert!(err.to_string().contains("zzz"));
    }
}
