//! Polygon builder

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

/// Polygon builder - a closed outline through the rows in data order
#[derive(Debug, Clone, Copy)]
pub struct Polygon;

impl LayerBuilder for Polygon {
    fn kind(&self) -> LayerKind {
        LayerKind::Polygon
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[DefaultParam {
            name: "opacity",
            default: DefaultParamValue::Number(0.3),
        }]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if !data.has_y() {
            return Ok(LayerFragment::empty(reasons::NEEDS_Y));
        }
        if data.is_empty() {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        }

        let outline = Mark::new(MarkKind::Line)
            .from_data(naming::TABLE_DATA)
            .enter("interpolate", value_channel("linear-closed"))
            .enter("x", x_position(!data.x_is_continuous()))
            .enter("y", y_position(!data.y_is_continuous()))
            .enter("stroke", ctx.color_channel())
            .enter("fill", ctx.color_channel())
            .enter("fillOpacity", value_channel(ctx.number_or("opacity", 0.3)));

        Ok(LayerFragment::default()
            .with_mark(per_color_group(ctx, "polygon", naming::TABLE_DATA, outline))
            .with_scale(position_scale(data, Axis::X, Usage::Reference))
            .with_scale(position_scale(data, Axis::Y, Usage::Reference))
            .with_scale(ctx.color_scale()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, marks_json};
    use super::*;
    use crate::plot::Bindings;
    use polars::prelude::*;

    #[test]
    fn test_polygon_is_closed_line() {
        let df = df! { "x" => [0.0, 1.0, 0.5], "y" => [0.0, 0.0, 1.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Polygon, &df, Bindings::xy("x", "y"), &[]);
        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["type"], "line");
        assert_eq!(
            marks[0]["encode"]["enter"]["interpolate"]["value"],
            "linear-closed"
        );
        assert!(marks[0].get("sort").is_none());
    }
}
