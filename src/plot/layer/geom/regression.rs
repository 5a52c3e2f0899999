//! Regression and regression-plot builders
//!
//! The fitted curve is a Vega `regression` transform over the primary table,
//! drawn as one line per color group. A regression plot is the scatter of the
//! same rows with the fitted line on top.

use serde_json::{json, Map, Value};

use super::point::scatter_fragment;
use super::reasons;
use super::types::{
    field_channel, per_color_group, value_channel, BuildContext, DefaultParam, DefaultParamValue,
    LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{linear_x, linear_y, reference_extent, zero_padded_extent};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Fitting methods understood by the `regression` transform
const METHODS: &[&str] = &["linear", "log", "exp", "pow", "quad", "poly"];

const REGRESSION_PARAMS: &[DefaultParam] = &[
    DefaultParam {
        name: "method",
        default: DefaultParamValue::String("linear"),
    },
    DefaultParam {
        name: "order",
        default: DefaultParamValue::Number(3.0),
    },
    DefaultParam {
        name: "stroke_width",
        default: DefaultParamValue::Number(2.0),
    },
];

/// Regression builder - fitted curve per color group
#[derive(Debug, Clone, Copy)]
pub struct Regression;

impl LayerBuilder for Regression {
    fn kind(&self) -> LayerKind {
        LayerKind::Regression
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        REGRESSION_PARAMS
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        Ok(regression_fragment(ctx))
    }
}

/// Regression plot builder - scatter plus fitted curve over the same rows
#[derive(Debug, Clone, Copy)]
pub struct RegressionPlot;

impl LayerBuilder for RegressionPlot {
    fn kind(&self) -> LayerKind {
        LayerKind::RegressionPlot
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        REGRESSION_PARAMS
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        Ok(scatter_fragment(ctx).extend(regression_fragment(ctx)))
    }
}

fn method(ctx: &BuildContext) -> &'static str {
    let requested = ctx.string("method").unwrap_or("linear");
    match METHODS.iter().copied().find(|m| *m == requested) {
        Some(m) => m,
        None => {
            tracing::warn!(
                method = requested,
                "Unknown regression method, falling back to linear"
            );
            "linear"
        }
    }
}

fn regression_fragment(ctx: &BuildContext) -> LayerFragment {
    let method = method(ctx);
    let mut transform = Map::new();
    transform.insert("type".into(), json!("regression"));
    transform.insert("method".into(), json!(method));
    if method == "poly" {
        let order = ctx.number_or("order", 3.0).max(1.0).floor();
        transform.insert("order".into(), json!(order as u64));
    }
    transform.insert("x".into(), json!(naming::X_FIELD));
    transform.insert("y".into(), json!(naming::Y_FIELD));
    if ctx.grouped() {
        transform.insert("groupby".into(), json!(ctx.color_groupby()));
    }
    fitted_line(ctx, "regression", Value::Object(transform))
}

/// Line through the output of a curve-fitting transform over the primary table
///
/// Needs numeric x and y. The transform must emit `x`/`y` pairs and keep the
/// color field when grouped.
pub(super) fn fitted_line(ctx: &BuildContext, role: &str, transform: Value) -> LayerFragment {
    let data = ctx.data;
    if !data.has_y() {
        return LayerFragment::empty(reasons::NEEDS_Y);
    }
    if !data.x_is_continuous() {
        return LayerFragment::empty(reasons::NEEDS_NUMERIC_X);
    }
    if !data.y_is_continuous() {
        return LayerFragment::empty(reasons::NEEDS_NUMERIC_Y);
    }
    let (Some((x0, x1)), Some((y0, y1))) = (data.x_extent(), data.y_extent()) else {
        return LayerFragment::empty(reasons::NO_ROWS);
    };

    let source = ctx.source_name(role);
    let line = Mark::new(MarkKind::Line)
        .from_data(source.clone())
        .sorted_by(naming::X_FIELD)
        .enter("x", field_channel(naming::X_SCALE, naming::X_FIELD))
        .enter("y", field_channel(naming::Y_SCALE, naming::Y_FIELD))
        .enter("stroke", ctx.color_channel())
        .enter("strokeWidth", value_channel(ctx.number_or("stroke_width", 2.0)));

    LayerFragment::default()
        .with_derived_data(DataSource::derived(
            source.clone(),
            naming::TABLE_DATA,
            vec![transform],
        ))
        .with_mark(per_color_group(ctx, role, &source, line))
        .with_scale(linear_x(reference_extent(x0, x1)))
        .with_scale(linear_y(zero_padded_extent(y0, y1)))
        .with_scale(ctx.color_scale())
}
