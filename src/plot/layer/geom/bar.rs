//! Bar builder

use serde_json::json;

use super::reasons;
use super::types::{
    field_channel, BandPlacement, BuildContext, DefaultParam, DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{banded_position_scale, position_scale, Axis, Usage};
use crate::plot::LayerKind;
use crate::writer::vega::{Mark, MarkKind};
use crate::Result;

/// Bar builder - one rect per row from zero to y, dodged by color
#[derive(Debug, Clone, Copy)]
pub struct Bar;

impl LayerBuilder for Bar {
    fn kind(&self) -> LayerKind {
        LayerKind::Bar
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[DefaultParam {
            name: "opacity",
            default: DefaultParamValue::Number(1.0),
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

        let placement = BandPlacement::for_context(ctx);
        let rect = Mark::new(MarkKind::Rect)
            .from_data(naming::TABLE_DATA)
            .enter("x", placement.x())
            .enter("width", placement.width())
            .enter("y", field_channel(naming::Y_SCALE, naming::Y_FIELD))
            .enter("y2", json!({ "scale": naming::Y_SCALE, "value": 0 }))
            .enter("opacity", json!({ "value": ctx.number_or("opacity", 1.0) }))
            .enter("fill", ctx.color_channel());

        let mut fragment = LayerFragment::default();
        for mark in placement.wrap(ctx, "bars", naming::TABLE_DATA, vec![rect]) {
            fragment = fragment.with_mark(mark);
        }
        Ok(fragment
            .with_scale(banded_position_scale(data, Axis::X, Usage::Scatter))
            .with_scale(position_scale(data, Axis::Y, Usage::Scatter))
            .with_scale(ctx.dodge_scale())
            .with_scale(ctx.color_scale()))
    }
}
