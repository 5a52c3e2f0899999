//! Data projection for ggvega
//!
//! The reader turns the descriptor's data frame and bindings into a dense,
//! cleaned table of `{x, y?, color?}` rows that every layer builder consumes.
//!
//! # Cleaning rules
//!
//! - Numeric fields drop rows whose value is null, NaN or infinite
//! - Label fields drop rows whose label is missing
//! - When color is bound, rows with a missing color label are dropped
//!
//! Each field is classified on its own: a numeric y stays continuous even when
//! x is categorical.
//!
//! # Example
//!
//! ```
//! use ggvega::reader::project;
//! use ggvega::{Bindings, FieldKind};
//! use polars::prelude::*;
//!
//! let df = df! { "a" => [1.0, f64::NAN, 3.0], "b" => [4.0, 5.0, 6.0] }.unwrap();
//! let projected = project(&df, &Bindings::xy("a", "b")).unwrap();
//! assert_eq!(projected.len(), 2);
//! assert_eq!(projected.dropped, 1);
//! assert_eq!(projected.x_kind, FieldKind::Continuous);
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::plot::{Bindings, Datum, FieldKind};
use crate::{naming, DataFrame, Result};

pub mod data;

pub use data::{read_column, ColumnValues};

/// One cleaned data row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRow {
    pub x: Datum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DataRow {
    /// Row as a JSON object using the shared field names
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(naming::X_FIELD.to_string(), self.x.to_json());
        if let Some(y) = &self.y {
            obj.insert(naming::Y_FIELD.to_string(), y.to_json());
        }
        if let Some(color) = &self.color {
            obj.insert(naming::COLOR_FIELD.to_string(), Value::String(color.clone()));
        }
        Value::Object(obj)
    }
}

/// Cleaned rows plus the facts builders and scales need about them
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedData {
    pub rows: Vec<DataRow>,
    pub x_kind: FieldKind,
    /// `None` when y is not bound
    pub y_kind: Option<FieldKind>,
    /// Distinct color labels in first-appearance order
    pub color_levels: Vec<String>,
    /// Color is bound and has more than one distinct level
    pub has_color_group: bool,
    /// Number of input rows removed during cleaning
    pub dropped: usize,
}

impl ProjectedData {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_y(&self) -> bool {
        self.y_kind.is_some()
    }

    pub fn x_is_continuous(&self) -> bool {
        self.x_kind.is_continuous()
    }

    pub fn y_is_continuous(&self) -> bool {
        self.y_kind.is_some_and(|k| k.is_continuous())
    }

    /// Numeric x values (empty when x is categorical)
    pub fn x_numbers(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.x.as_f64()).collect()
    }

    /// Numeric y values (empty when y is unbound or categorical)
    pub fn y_numbers(&self) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.y.as_ref().and_then(|y| y.as_f64()))
            .collect()
    }

    /// `(min, max)` of numeric x values
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(&self.x_numbers())
    }

    /// `(min, max)` of numeric y values
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        extent(&self.y_numbers())
    }

    /// Distinct x values for a banded axis
    ///
    /// Labels keep first-appearance order; numbers forced onto a band are
    /// sorted ascending.
    pub fn x_levels(&self) -> Vec<Datum> {
        let mut levels = distinct(self.rows.iter().map(|r| &r.x));
        if self.x_kind.is_continuous() {
            levels.sort_by(|a, b| {
                let a = a.as_f64().unwrap_or(f64::NAN);
                let b = b.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            });
        }
        levels
    }

    /// Distinct y values for a banded y axis, in first-appearance order
    pub fn y_levels(&self) -> Vec<Datum> {
        distinct(self.rows.iter().filter_map(|r| r.y.as_ref()))
    }

    /// Rows as JSON values for an inline data source
    pub fn values(&self) -> Vec<Value> {
        self.rows.iter().map(DataRow::to_json).collect()
    }
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn distinct<'a>(values: impl Iterator<Item = &'a Datum>) -> Vec<Datum> {
    let mut seen = Vec::new();
    for v in values {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    seen
}

fn cell(values: &ColumnValues, idx: usize) -> Option<Datum> {
    match values {
        ColumnValues::Numeric(v) => v[idx].filter(|n| n.is_finite()).map(Datum::Number),
        ColumnValues::Labels(v) => v[idx].clone().map(Datum::Label),
    }
}

fn kind_of(values: &ColumnValues) -> FieldKind {
    if values.is_numeric() {
        FieldKind::Continuous
    } else {
        FieldKind::Categorical
    }
}

/// Project the bound columns of `df` into cleaned rows
///
/// The input frame is never modified. A bound column missing from the frame
/// is a `GgvegaError::ReaderError`.
pub fn project(df: &DataFrame, bindings: &Bindings) -> Result<ProjectedData> {
    let x_values = read_column(df, &bindings.x)?;
    let y_values = bindings
        .y
        .as_deref()
        .map(|name| read_column(df, name))
        .transpose()?;
    let color_values = bindings
        .color
        .as_deref()
        .map(|name| read_column(df, name))
        .transpose()?;

    let total = x_values.len();
    let mut rows = Vec::with_capacity(total);
    let mut color_levels: Vec<String> = Vec::new();

    for idx in 0..total {
        let Some(x) = cell(&x_values, idx) else {
            continue;
        };
        let y = match &y_values {
            Some(values) => match cell(values, idx) {
                Some(y) => Some(y),
                None => continue,
            },
            None => None,
        };
        let color = match &color_values {
            Some(values) => match cell(values, idx) {
                Some(c) => Some(c.to_key_string()),
                None => continue,
            },
            None => None,
        };
        if let Some(c) = &color {
            if !color_levels.contains(c) {
                color_levels.push(c.clone());
            }
        }
        rows.push(DataRow { x, y, color });
    }

    let dropped = total - rows.len();
    let has_color_group = color_values.is_some() && color_levels.len() > 1;

    Ok(ProjectedData {
        rows,
        x_kind: kind_of(&x_values),
        y_kind: y_values.as_ref().map(kind_of),
        color_levels,
        has_color_group,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_project_numeric_drops_non_finite() {
        let df = df! {
            "x" => [Some(1.0), Some(2.0), None, Some(f64::INFINITY), Some(5.0)],
            "y" => [10.0, f64::NAN, 30.0, 40.0, 50.0],
        }
        .unwrap();
        let p = project(&df, &Bindings::xy("x", "y")).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.dropped, 3);
        assert_eq!(p.x_extent(), Some((1.0, 5.0)));
        assert_eq!(p.y_extent(), Some((10.0, 50.0)));
    }

    #[test]
    fn test_project_categorical_x_keeps_numeric_y() {
        let df = df! {
            "c" => [Some("a"), None, Some("b")],
            "v" => [1.0, 2.0, 3.0],
        }
        .unwrap();
        let p = project(&df, &Bindings::xy("c", "v")).unwrap();
        assert_eq!(p.x_kind, FieldKind::Categorical);
        assert_eq!(p.y_kind, Some(FieldKind::Continuous));
        assert_eq!(p.dropped, 1);
        assert_eq!(
            p.x_levels(),
            vec![Datum::Label("a".into()), Datum::Label("b".into())]
        );
    }

    #[test]
    fn test_color_levels_first_appearance_and_null_drop() {
        let df = df! {
            "x" => [1.0, 2.0, 3.0, 4.0],
            "g" => [Some("B"), Some("A"), None, Some("B")],
        }
        .unwrap();
        let p = project(&df, &Bindings::x_only("x").with_color("g")).unwrap();
        assert_eq!(p.color_levels, vec!["B".to_string(), "A".to_string()]);
        assert!(p.has_color_group);
        assert_eq!(p.dropped, 1);
        assert!(!p.has_y());
    }

    #[test]
    fn test_single_color_level_is_not_a_group() {
        let df = df! { "x" => [1.0, 2.0], "g" => ["A", "A"] }.unwrap();
        let p = project(&df, &Bindings::x_only("x").with_color("g")).unwrap();
        assert!(!p.has_color_group);
        assert_eq!(p.color_levels.len(), 1);
    }

    #[test]
    fn test_numeric_levels_sort_ascending() {
        let df = df! { "x" => [3.0, 1.0, 3.0, 2.0] }.unwrap();
        let p = project(&df, &Bindings::x_only("x")).unwrap();
        assert_eq!(
            p.x_levels(),
            vec![Datum::Number(1.0), Datum::Number(2.0), Datum::Number(3.0)]
        );
    }

    #[test]
    fn test_row_json_uses_shared_fields() {
        let df = df! { "a" => ["p"], "b" => [2.0], "c" => ["g"] }.unwrap();
        let p = project(&df, &Bindings::xy("a", "b").with_color("c")).unwrap();
        assert_eq!(
            p.values()[0],
            serde_json::json!({"x": "p", "y": 2.0, "color": "g"})
        );
    }

    #[test]
    fn test_input_frame_is_untouched() {
        let df = df! { "x" => [1.0, f64::NAN] }.unwrap();
        let before = df.clone();
        let _ = project(&df, &Bindings::x_only("x")).unwrap();
        assert!(df.equals_missing(&before));
    }
}
