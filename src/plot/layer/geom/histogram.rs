//! Histogram builder
//!
//! The histogram never counts rows itself: it emits a `bin` transform over the
//! observed x extent followed by a `count` aggregate (and a `stack` when bars are
//! colored by group), and draws one rect per bin.

use serde_json::{json, Value};

use super::reasons;
use super::types::{
    field_channel, value_channel, BuildContext, DefaultParam, DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{
    banded_position_scale, linear_over_fields, linear_x, reference_extent, Axis, FieldRef,
    ScaleRange, Usage,
};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Histogram builder - binned row counts
#[derive(Debug, Clone, Copy)]
pub struct Histogram;

impl LayerBuilder for Histogram {
    fn kind(&self) -> LayerKind {
        LayerKind::Histogram
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "nbins",
                default: DefaultParamValue::Number(30.0),
            },
            DefaultParam {
                name: "opacity",
                default: DefaultParamValue::Number(0.9),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if data.is_empty() {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        }
        let fragment = match data.x_extent() {
            Some((lo, hi)) if data.x_is_continuous() => binned(ctx, lo, hi),
            _ => per_category(ctx),
        };
        Ok(fragment.with_scale(ctx.color_scale()).with_y_title("count"))
    }
}

/// Number of bins, at least one
pub(super) fn bin_count(ctx: &BuildContext) -> usize {
    let n = ctx.number_or("nbins", 30.0);
    if n.is_finite() && n >= 1.0 {
        n.floor() as usize
    } else {
        1
    }
}

/// `bin` transform splitting `[lo, hi]` into `nbins` equal-width bins
pub(super) fn bin_transform(field: &str, extent: [f64; 2], nbins: usize, as_: [&str; 2]) -> Value {
    json!({
        "type": "bin",
        "field": field,
        "extent": extent,
        "step": (extent[1] - extent[0]) / nbins as f64,
        "nice": false,
        "as": as_
    })
}

/// Stack per-bin counts of each color group on top of each other
pub(super) fn stack_transform(groupby: &str) -> Value {
    json!({
        "type": "stack",
        "groupby": [groupby],
        "field": "count",
        "sort": { "field": naming::COLOR_FIELD },
        "as": ["y0", "y1"]
    })
}

fn count_aggregate(mut groupby: Vec<&str>, ctx: &BuildContext) -> Value {
    groupby.extend(ctx.color_groupby());
    json!({
        "type": "aggregate",
        "groupby": groupby,
        "ops": ["count"],
        "as": ["count"]
    })
}

/// Vertical channels of a bar: stacked when grouped, from zero otherwise
fn bar_heights(ctx: &BuildContext) -> (Value, Value, &'static str) {
    if ctx.grouped() {
        (
            field_channel(naming::Y_SCALE, "y1"),
            field_channel(naming::Y_SCALE, "y0"),
            "y1",
        )
    } else {
        (
            field_channel(naming::Y_SCALE, "count"),
            json!({ "scale": naming::Y_SCALE, "value": 0 }),
            "count",
        )
    }
}

fn binned(ctx: &BuildContext, lo: f64, hi: f64) -> LayerFragment {
    let source = ctx.source_name("hist");
    let extent = reference_extent(lo, hi);
    let mut transform = vec![
        bin_transform(naming::X_FIELD, extent, bin_count(ctx), ["bin0", "bin1"]),
        count_aggregate(vec!["bin0", "bin1"], ctx),
    ];
    if ctx.grouped() {
        transform.push(stack_transform("bin0"));
    }

    let (y, y2, top) = bar_heights(ctx);
    let rect = Mark::new(MarkKind::Rect)
        .from_data(source.clone())
        .enter("x", field_channel(naming::X_SCALE, "bin0"))
        .enter("x2", field_channel(naming::X_SCALE, "bin1"))
        .enter("y", y)
        .enter("y2", y2)
        .enter("fill", ctx.color_channel())
        .enter("opacity", value_channel(ctx.number_or("opacity", 0.9)));

    LayerFragment::default()
        .with_derived_data(DataSource::derived(
            source.clone(),
            naming::TABLE_DATA,
            transform,
        ))
        .with_mark(rect)
        .with_scale(linear_x(extent))
        .with_scale(linear_over_fields(
            naming::Y_SCALE,
            vec![FieldRef::new(source, top)],
            ScaleRange::height(),
        ))
}

fn per_category(ctx: &BuildContext) -> LayerFragment {
    let source = ctx.source_name("hist");
    let mut transform = vec![count_aggregate(vec![naming::X_FIELD], ctx)];
    if ctx.grouped() {
        transform.push(stack_transform(naming::X_FIELD));
    }

    let (y, y2, top) = bar_heights(ctx);
    let rect = Mark::new(MarkKind::Rect)
        .from_data(source.clone())
        .enter("x", field_channel(naming::X_SCALE, naming::X_FIELD))
        .enter("width", json!({ "scale": naming::X_SCALE, "band": 1 }))
        .enter("y", y)
        .enter("y2", y2)
        .enter("fill", ctx.color_channel())
        .enter("opacity", value_channel(ctx.number_or("opacity", 0.9)));

    LayerFragment::default()
        .with_derived_data(DataSource::derived(
            source.clone(),
            naming::TABLE_DATA,
            transform,
        ))
        .with_mark(rect)
        .with_scale(banded_position_scale(ctx.data, Axis::X, Usage::Distribution))
        .with_scale(linear_over_fields(
            naming::Y_SCALE,
            vec![FieldRef::new(source, top)],
            ScaleRange::height(),
        ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, marks_json, scale};
    use super::*;
    use crate::plot::scale::{DomainSource, ScaleKind};
    use crate::plot::{Bindings, ParameterValue};
    use polars::prelude::*;
    use crate::plot::scale::FieldRef;

    #[test]
    fn test_histogram_bins_over_observed_extent() {
        let df = df! { "v" => [0.0, 2.5, 5.0, 10.0] }.unwrap();
        let (_, fragment) = build_with(
            LayerKind::Histogram,
            &df,
            Bindings::x_only("v"),
            &[("nbins", ParameterValue::Number(4.0))],
        );
        let source = &fragment.derived_data[0];
        assert_eq!(source.name, "hist_0");
        assert_eq!(source.source.as_deref(), Some("table"));
        assert_eq!(source.transform.len(), 2);

        let bin = &source.transform[0];
        assert_eq!(bin["type"], "bin");
        assert_eq!(bin["extent"], json!([0.0, 10.0]));
        assert_eq!(bin["step"], json!(2.5));
        assert_eq!(source.transform[1]["ops"], json!(["count"]));

        let y = scale(&fragment, "yscale").unwrap();
        assert_eq!(
            y.domain,
            DomainSource::Field(FieldRef::new("hist_0", "count"))
        );
        assert_eq!(fragment.axis_titles.y.as_deref(), Some("count"));
    }

    #[test]
    fn test_grouped_histogram_stacks() {
        let df = df! {
            "v" => [1.0, 2.0, 3.0, 4.0],
            "g" => ["a", "b", "a", "b"],
        }
        .unwrap();
        let (_, fragment) =
            build_with(LayerKind::Histogram, &df, Bindings::x_only("v").with_color("g"), &[]);
        let transform = &fragment.derived_data[0].transform;
        assert_eq!(transform[1]["groupby"], json!(["bin0", "bin1", "color"]));
        assert_eq!(transform[2]["type"], "stack");

        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["encode"]["enter"]["y"]["field"], "y1");
        assert!(scale(&fragment, "color").is_some());
    }

    #[test]
    fn test_categorical_histogram_counts_levels() {
        let df = df! { "c" => ["a", "b", "a"] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Histogram, &df, Bindings::x_only("c"), &[]);
        let transform = &fragment.derived_data[0].transform;
        assert_eq!(transform[0]["type"], "aggregate");
        assert_eq!(transform[0]["groupby"], json!(["x"]));
        assert_eq!(scale(&fragment, "xscale").unwrap().kind, ScaleKind::Banded);
    }

    #[test]
    fn test_degenerate_extent_is_widened() {
        let df = df! { "v" => [3.0, 3.0] }.unwrap();
        let (_, fragment) = build_with(
            LayerKind::Histogram,
            &df,
            Bindings::x_only("v"),
            &[("nbins", ParameterValue::Number(2.0))],
        );
        let bin = &fragment.derived_data[0].transform[0];
        assert_eq!(bin["extent"], json!([2.5, 3.5]));
        assert_eq!(bin["step"], json!(0.5));
    }
}
