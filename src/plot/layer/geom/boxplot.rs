//! Boxplot builder
//!
//! Two derived sources back a boxplot layer:
//!
//! - `box_<idx>`: five-number summary per category (and color group) with Tukey
//!   whisker ends clamped to the observed range
//! - `outliers_<idx>`: rows of the primary table whose y lies strictly outside
//!   their group's whiskers, found by looking the whiskers up by group key
//!
//! Whiskers, boxes and medians read the summary source; outliers are drawn as
//! symbols when the `outliers` parameter is set.

use serde_json::{json, Value};

use super::reasons;
use super::types::{
    field_channel, signal_channel, value_channel, BandPlacement, BuildContext, DefaultParam,
    DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{banded_position_scale, position_scale, Axis, Usage};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Boxplot builder - five-number summaries with Tukey whiskers
#[derive(Debug, Clone, Copy)]
pub struct Boxplot;

impl LayerBuilder for Boxplot {
    fn kind(&self) -> LayerKind {
        LayerKind::Boxplot
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "coef",
                default: DefaultParamValue::Number(1.5),
            },
            DefaultParam {
                name: "outliers",
                default: DefaultParamValue::Boolean(true),
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

        let coef = ctx.number_or("coef", 1.5);
        let box_source = ctx.source_name("box");
        let outlier_source = ctx.source_name("outliers");
        let key = if ctx.grouped() {
            naming::KEY_FIELD
        } else {
            naming::X_FIELD
        };

        let mut summary_transform = vec![json!({
            "type": "aggregate",
            "groupby": ctx.category_groupby(),
            "fields": vec![naming::Y_FIELD; 5],
            "ops": ["min", "q1", "median", "q3", "max"],
            "as": ["min", "q1", "median", "q3", "max"]
        })];
        summary_transform.extend(whisker_formulas(coef));
        if ctx.grouped() {
            summary_transform.push(key_formula());
        }

        let mut outlier_transform = Vec::new();
        if ctx.grouped() {
            outlier_transform.push(key_formula());
        }
        outlier_transform.push(json!({
            "type": "lookup",
            "from": box_source,
            "key": key,
            "fields": [key],
            "values": ["lower", "upper"]
        }));
        outlier_transform.push(json!({
            "type": "filter",
            "expr": "datum.y < datum.lower || datum.y > datum.upper"
        }));

        let placement = BandPlacement::for_context(ctx);
        let whisker = Mark::new(MarkKind::Rule)
            .from_data(box_source.clone())
            .enter("x", placement.x_at(0.5))
            .enter("y", field_channel(naming::Y_SCALE, "lower"))
            .enter("y2", field_channel(naming::Y_SCALE, "upper"))
            .enter("stroke", ctx.color_channel());
        let body = Mark::new(MarkKind::Rect)
            .from_data(box_source.clone())
            .enter("x", placement.x())
            .enter("width", placement.width())
            .enter("y", field_channel(naming::Y_SCALE, "q3"))
            .enter("y2", field_channel(naming::Y_SCALE, "q1"))
            .enter("fill", ctx.color_channel())
            .enter("fillOpacity", value_channel(0.5))
            .enter("stroke", ctx.color_channel());
        let median = Mark::new(MarkKind::Rule)
            .from_data(box_source.clone())
            .enter("x", placement.x())
            .enter("x2", placement.x_at(1.0))
            .enter("y", field_channel(naming::Y_SCALE, "median"))
            .enter("stroke", value_channel("#000000"))
            .enter("strokeWidth", value_channel(2));

        let mut fragment = LayerFragment::default().with_derived_data(DataSource::derived(
            box_source.clone(),
            naming::TABLE_DATA,
            summary_transform,
        ));
        for mark in placement.wrap(ctx, "box", &box_source, vec![whisker, body, median]) {
            fragment = fragment.with_mark(mark);
        }

        if ctx.boolean_or("outliers", true) {
            let outliers = Mark::new(MarkKind::Symbol)
                .from_data(outlier_source.clone())
                .enter("x", outlier_x(placement))
                .enter("y", field_channel(naming::Y_SCALE, naming::Y_FIELD))
                .enter("size", value_channel(20))
                .enter("fill", ctx.color_channel());
            fragment = fragment
                .with_derived_data(DataSource::derived(
                    outlier_source,
                    naming::TABLE_DATA,
                    outlier_transform,
                ))
                .with_mark(outliers);
        }

        Ok(fragment
            .with_scale(banded_position_scale(data, Axis::X, Usage::Distribution))
            .with_scale(position_scale(data, Axis::Y, Usage::Scatter))
            .with_scale(ctx.dodge_scale())
            .with_scale(ctx.color_scale()))
    }
}

/// Interquartile range and whisker ends clamped to the observed range
fn whisker_formulas(coef: f64) -> Vec<Value> {
    vec![
        json!({"type": "formula", "as": "iqr", "expr": "datum.q3 - datum.q1"}),
        json!({
            "type": "formula",
            "as": "lower",
            "expr": format!("max(datum.min, datum.q1 - {} * datum.iqr)", coef)
        }),
        json!({
            "type": "formula",
            "as": "upper",
            "expr": format!("min(datum.max, datum.q3 + {} * datum.iqr)", coef)
        }),
    ]
}

/// Composite category/color key joining rows to their group's whiskers
fn key_formula() -> Value {
    json!({
        "type": "formula",
        "as": naming::KEY_FIELD,
        "expr": format!(
            "{} + '|' + {}",
            naming::datum(naming::X_FIELD),
            naming::datum(naming::COLOR_FIELD)
        )
    })
}

/// Outlier symbols are not faceted, so dodged placement is computed in the expression
fn outlier_x(placement: BandPlacement) -> Value {
    match placement {
        BandPlacement::Whole => placement.x_at(0.5),
        BandPlacement::Dodged => signal_channel(format!(
            "scale('{}', datum.{}) + scale('{}', datum.{}) + bandwidth('{}') / 2",
            naming::X_SCALE,
            naming::X_FIELD,
            naming::DODGE_SCALE,
            naming::COLOR_FIELD,
            naming::DODGE_SCALE
        )),
    }
}
