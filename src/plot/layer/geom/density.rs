//! Density builder

use serde_json::{json, Value};

use super::reasons;
use super::types::{
    field_channel, per_color_group, scott_bandwidth, value_channel, BuildContext, DefaultParam,
    DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{
    linear_over_fields, linear_x, reference_extent, FieldRef, ScaleRange,
};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Density builder - kernel density estimate drawn as a filled area
#[derive(Debug, Clone, Copy)]
pub struct Density;

impl LayerBuilder for Density {
    fn kind(&self) -> LayerKind {
        LayerKind::Density
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "bandwidth",
                default: DefaultParamValue::Null,
            },
            DefaultParam {
                name: "opacity",
                default: DefaultParamValue::Number(0.4),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if !data.x_is_continuous() {
            return Ok(LayerFragment::empty(reasons::NEEDS_NUMERIC_X));
        }
        let Some((lo, hi)) = data.x_extent() else {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        };

        let extent = reference_extent(lo, hi);
        let source = ctx.source_name("density");
        let kde = kde_transform(
            naming::X_FIELD,
            ctx.color_groupby(),
            extent,
            bandwidth(ctx, &data.x_numbers()),
        );

        let area = Mark::new(MarkKind::Area)
            .from_data(source.clone())
            .sorted_by("value")
            .enter("x", field_channel(naming::X_SCALE, "value"))
            .enter("y", field_channel(naming::Y_SCALE, "density"))
            .enter("y2", json!({ "scale": naming::Y_SCALE, "value": 0 }))
            .enter("fill", ctx.color_channel())
            .enter("fillOpacity", value_channel(ctx.number_or("opacity", 0.4)))
            .enter("stroke", ctx.color_channel());

        Ok(LayerFragment::default()
            .with_derived_data(DataSource::derived(
                source.clone(),
                naming::TABLE_DATA,
                vec![kde],
            ))
            .with_mark(per_color_group(ctx, "density", &source, area))
            .with_scale(linear_x(extent))
            .with_scale(linear_over_fields(
                naming::Y_SCALE,
                vec![FieldRef::new(source, "density")],
                ScaleRange::height(),
            ))
            .with_scale(ctx.color_scale())
            .with_y_title("density"))
    }
}

/// The `bandwidth` parameter when positive, else Scott's rule over `values`
pub(super) fn bandwidth(ctx: &BuildContext, values: &[f64]) -> f64 {
    ctx.number("bandwidth")
        .filter(|b| b.is_finite() && *b > 0.0)
        .unwrap_or_else(|| scott_bandwidth(values))
}

/// `kde` transform producing `value`/`density` pairs over `extent`
pub(super) fn kde_transform(field: &str, groupby: Vec<&str>, extent: [f64; 2], bandwidth: f64) -> Value {
    json!({
        "type": "kde",
        "field": field,
        "groupby": groupby,
        "extent": extent,
        "bandwidth": bandwidth,
        "as": ["value", "density"]
    })
}
