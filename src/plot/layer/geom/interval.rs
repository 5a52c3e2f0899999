//! Interval (crossbar) builder

use serde_json::json;

use super::reasons;
use super::types::{
    field_channel, value_channel, BandPlacement, BuildContext, DefaultParam, DefaultParamValue,
    LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{banded_position_scale, position_scale, Axis, Usage};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Interval builder - min to max crossbar with a median rule per category
#[derive(Debug, Clone, Copy)]
pub struct Interval;

impl LayerBuilder for Interval {
    fn kind(&self) -> LayerKind {
        LayerKind::Interval
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[DefaultParam {
            name: "opacity",
            default: DefaultParamValue::Number(0.4),
        }]
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

        let source = ctx.source_name("interval");
        let derived = DataSource::derived(
            source.clone(),
            naming::TABLE_DATA,
            vec![json!({
                "type": "aggregate",
                "groupby": ctx.category_groupby(),
                "fields": [naming::Y_FIELD, naming::Y_FIELD, naming::Y_FIELD],
                "ops": ["min", "median", "max"],
                "as": ["lower", "middle", "upper"]
            })],
        );

        let placement = BandPlacement::for_context(ctx);
        let crossbar = Mark::new(MarkKind::Rect)
            .from_data(source.clone())
            .enter("x", placement.x())
            .enter("width", placement.width())
            .enter("y", field_channel(naming::Y_SCALE, "upper"))
            .enter("y2", field_channel(naming::Y_SCALE, "lower"))
            .enter("fill", ctx.color_channel())
            .enter("fillOpacity", value_channel(ctx.number_or("opacity", 0.4)))
            .enter("stroke", ctx.color_channel());
        let median = Mark::new(MarkKind::Rule)
            .from_data(source.clone())
            .enter("x", placement.x())
            .enter("x2", placement.x_at(1.0))
            .enter("y", field_channel(naming::Y_SCALE, "middle"))
            .enter("stroke", ctx.color_channel())
            .enter("strokeWidth", value_channel(2));

        let mut fragment = LayerFragment::default().with_derived_data(derived);
        for mark in placement.wrap(ctx, "interval", &source, vec![crossbar, median]) {
            fragment = fragment.with_mark(mark);
        }
        Ok(fragment
            .with_scale(banded_position_scale(data, Axis::X, Usage::Scatter))
            .with_scale(position_scale(data, Axis::Y, Usage::Reference))
            .with_scale(ctx.dodge_scale())
            .with_scale(ctx.color_scale()))
    }
}
