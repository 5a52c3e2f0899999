//! Raster builder

use super::reasons;
use super::types::{
    signal_channel, value_channel, x_position, BuildContext, DefaultParam, DefaultParamValue,
    LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{position_scale, Axis, Usage};
use crate::plot::LayerKind;
use crate::writer::vega::{Mark, MarkKind};
use crate::Result;

/// Raster builder - a thin full-height rect at each row's x
#[derive(Debug, Clone, Copy)]
pub struct Raster;

impl LayerBuilder for Raster {
    fn kind(&self) -> LayerKind {
        LayerKind::Raster
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "width",
                default: DefaultParamValue::Number(1.0),
            },
            DefaultParam {
                name: "opacity",
                default: DefaultParamValue::Number(0.7),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if data.is_empty() {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        }

        let rect = Mark::new(MarkKind::Rect)
            .from_data(naming::TABLE_DATA)
            .enter("x", x_position(!data.x_is_continuous()))
            .enter("width", value_channel(ctx.number_or("width", 1.0)))
            .enter("y", value_channel(0))
            .enter("y2", signal_channel("height"))
            .enter("opacity", value_channel(ctx.number_or("opacity", 0.7)))
            .enter("fill", ctx.color_channel());

        Ok(LayerFragment::default()
            .with_mark(rect)
            .with_scale(position_scale(data, Axis::X, Usage::Scatter))
            .with_scale(ctx.color_scale()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, marks_json, scale};
    use super::*;
    use crate::plot::Bindings;
    use polars::prelude::*;
    use serde_json::json;

    #[test]
    fn test_raster_spans_full_height_with_x_scale_only() {
        let df = df! { "x" => [1.0, 4.0, 9.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Raster, &df, Bindings::x_only("x"), &[]);
        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["encode"]["enter"]["y2"], json!({"signal": "height"}));
        assert!(scale(&fragment, "xscale").is_some());
        assert!(scale(&fragment, "yscale").is_none());
    }
}
