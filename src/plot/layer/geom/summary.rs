//! Summary (mean and error) builder

use std::collections::HashMap;

use serde_json::json;

use super::reasons;
use super::types::{
    field_channel, hull, mean, sample_sd, value_channel, BandPlacement, BuildContext,
    DefaultParam, DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{linear_y, position_scale, zero_padded_extent, Axis, Usage};
use crate::plot::LayerKind;
use crate::reader::ProjectedData;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// A group with one row has no spread; its bar collapses onto the mean
const SINGLE_ROW_GUARD: &str = "isValid(datum.error) && isFinite(datum.error) ? datum.error : 0";

/// How the error bar half-length is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    StandardError,
    StandardDeviation,
}

impl ErrorKind {
    fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("sd") | Some("stdev") => ErrorKind::StandardDeviation,
            _ => ErrorKind::StandardError,
        }
    }

    fn vega_op(&self) -> &'static str {
        match self {
            ErrorKind::StandardError => "stderr",
            ErrorKind::StandardDeviation => "stdev",
        }
    }

    fn half_length(&self, values: &[f64]) -> f64 {
        let sd = sample_sd(values);
        match self {
            ErrorKind::StandardError => sd / (values.len() as f64).sqrt(),
            ErrorKind::StandardDeviation => sd,
        }
    }
}

/// Summary builder - mean with an error rule per x and color group
#[derive(Debug, Clone, Copy)]
pub struct Summary;

impl LayerBuilder for Summary {
    fn kind(&self) -> LayerKind {
        LayerKind::Summary
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "error",
                default: DefaultParamValue::String("stderr"),
            },
            DefaultParam {
                name: "size",
                default: DefaultParamValue::Number(60.0),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if !data.has_y() {
            return Ok(LayerFragment::empty(reasons::NEEDS_Y));
        }
        if !data.y_is_continuous() {
            return Ok(LayerFragment::empty(reasons::NEEDS_NUMERIC_Y));
        }
        if data.is_empty() {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        }

        let error = ErrorKind::from_param(ctx.string("error"));
        let source = ctx.source_name("summary");
        let derived = DataSource::derived(
            source.clone(),
            naming::TABLE_DATA,
            vec![
                json!({
                    "type": "aggregate",
                    "groupby": ctx.category_groupby(),
                    "fields": [naming::Y_FIELD, naming::Y_FIELD],
                    "ops": ["mean", error.vega_op()],
                    "as": ["mean", "error"]
                }),
                json!({"type": "formula", "as": "error", "expr": SINGLE_ROW_GUARD}),
                json!({"type": "formula", "as": "lower", "expr": "datum.mean - datum.error"}),
                json!({"type": "formula", "as": "upper", "expr": "datum.mean + datum.error"}),
            ],
        );

        let banded = !data.x_is_continuous();
        let placement = BandPlacement::for_context(ctx);
        let x = if banded {
            placement.x_at(0.5)
        } else {
            field_channel(naming::X_SCALE, naming::X_FIELD)
        };

        let rule = Mark::new(MarkKind::Rule)
            .from_data(source.clone())
            .enter("x", x.clone())
            .enter("y", field_channel(naming::Y_SCALE, "lower"))
            .enter("y2", field_channel(naming::Y_SCALE, "upper"))
            .enter("stroke", ctx.color_channel())
            .enter("strokeWidth", value_channel(2));
        let symbol = Mark::new(MarkKind::Symbol)
            .from_data(source.clone())
            .enter("x", x)
            .enter("y", field_channel(naming::Y_SCALE, "mean"))
            .enter("size", value_channel(ctx.number_or("size", 60.0)))
            .enter("fill", ctx.color_channel());

        let mut fragment = LayerFragment::default().with_derived_data(derived);
        let marks = if banded {
            placement.wrap(ctx, "summary", &source, vec![rule, symbol])
        } else {
            vec![rule, symbol]
        };
        for mark in marks {
            fragment = fragment.with_mark(mark);
        }

        let x_scale = position_scale(data, Axis::X, Usage::Scatter);
        let y_scale = summary_extent(data, error)
            .map(|(lo, hi)| linear_y(zero_padded_extent(lo, hi)));
        let dodge = if banded { ctx.dodge_scale() } else { None };

        Ok(fragment
            .with_scale(x_scale)
            .with_scale(y_scale)
            .with_scale(dodge)
            .with_scale(ctx.color_scale()))
    }
}

/// Extent covering every group's error bar and the raw values
fn summary_extent(data: &ProjectedData, error: ErrorKind) -> Option<(f64, f64)> {
    let mut groups: HashMap<(String, Option<&str>), Vec<f64>> = HashMap::new();
    for row in &data.rows {
        if let Some(y) = row.y.as_ref().and_then(|y| y.as_f64()) {
            groups
                .entry((row.x.to_key_string(), row.color.as_deref()))
                .or_default()
                .push(y);
        }
    }
    let mut extent = data.y_extent();
    for values in groups.values() {
        let Some(m) = mean(values) else { continue };
        let half = error.half_length(values);
        extent = hull(extent, Some((m - half, m + half)));
    }
    extent
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, marks_json, scale};
    use super::*;
    use crate::plot::scale::DomainSource;
    use crate::plot::{Bindings, ParameterValue};
    use polars::prelude::*;

    #[test]
    fn test_summary_stderr_transforms() {
        let df = df! { "c" => ["a", "a", "b", "b"], "v" => [1.0, 3.0, 2.0, 4.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Summary, &df, Bindings::xy("c", "v"), &[]);
        let transforms = &fragment.derived_data[0].transform;
        assert_eq!(transforms[0]["ops"], json!(["mean", "stderr"]));
        assert_eq!(transforms[1]["as"], "error");
        assert_eq!(transforms[2]["expr"], "datum.mean - datum.error");

        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["type"], "rule");
        assert_eq!(marks[1]["type"], "symbol");
    }

    #[test]
    fn test_single_row_group_collapses_error_bar() {
        let df = df! { "c" => ["a", "a", "b"], "v" => [1.0, 3.0, 7.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Summary, &df, Bindings::xy("c", "v"), &[]);
        let transforms = &fragment.derived_data[0].transform;
        let guard = transforms
            .iter()
            .position(|t| t["as"] == "error" && t["type"] == "formula")
            .unwrap();
        let lower = transforms.iter().position(|t| t["as"] == "lower").unwrap();
        assert!(guard < lower);
        assert_eq!(
            transforms[guard]["expr"],
            "isValid(datum.error) && isFinite(datum.error) ? datum.error : 0"
        );
        // the lone "b" row still lands inside the y domain
        match &scale(&fragment, "yscale").unwrap().domain {
            DomainSource::Extent([_, hi]) => assert!(*hi >= 7.0),
            other => panic!("unexpected domain {:?}", other),
        }
    }

    #[test]
    fn test_summary_sd_widens_domain() {
        let df = df! { "c" => ["a", "a"], "v" => [1.0, 3.0] }.unwrap();
        let (_, fragment) = build_with(
            LayerKind::Summary,
            &df,
            Bindings::xy("c", "v"),
            &[("error", ParameterValue::from("sd"))],
        );
        assert_eq!(
            fragment.derived_data[0].transform[0]["ops"],
            json!(["mean", "stdev"])
        );
        // mean 2, sd sqrt(2): upper bound 3.414 exceeds the raw max of 3
        match &scale(&fragment, "yscale").unwrap().domain {
            DomainSource::Extent([_, hi]) => assert!(*hi > 3.414 * 1.05 - 1e-6),
            other => panic!("unexpected domain {:?}", other),
        }
    }
}
