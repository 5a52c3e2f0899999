//! Line builder

use super::reasons;
use super::types::{
    per_color_group, value_channel, x_position, y_position, BuildContext, DefaultParam,
    DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{position_scale, Axis, Usage};
use crate::plot::LayerKind;
use crate::writer::vega::{Mark, MarkKind};
use crate::Result;

/// Line builder - one polyline sorted by x, one per color group
#[derive(Debug, Clone, Copy)]
pub struct Line;

impl LayerBuilder for Line {
    fn kind(&self) -> LayerKind {
        LayerKind::Line
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "linewidth",
                default: DefaultParamValue::Number(2.0),
            },
            DefaultParam {
                name: "interpolate",
                default: DefaultParamValue::String("linear"),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if !data.has_y() {
            return Ok(LayerFragment::empty(reasons::NEEDS_Y));
        }
        if data.is_empty() {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        }

        let line = Mark::new(MarkKind::Line)
            .from_data(naming::TABLE_DATA)
            .sorted_by(naming::X_FIELD)
            .enter("x", x_position(!data.x_is_continuous()))
            .enter("y", y_position(!data.y_is_continuous()))
            .enter("stroke", ctx.color_channel())
            .enter("strokeWidth", value_channel(ctx.number_or("linewidth", 2.0)))
            .enter(
                "interpolate",
                value_channel(ctx.string("interpolate").unwrap_or("linear")),
            );

        Ok(LayerFragment::default()
            .with_mark(per_color_group(ctx, "series", naming::TABLE_DATA, line))
            .with_scale(position_scale(data, Axis::X, Usage::Reference))
            .with_scale(position_scale(data, Axis::Y, Usage::Reference))
            .with_scale(ctx.color_scale()))
    }
}
