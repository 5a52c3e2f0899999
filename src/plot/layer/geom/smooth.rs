//! Smoothing builder

use serde_json::json;

use super::regression::fitted_line;
use super::types::{BuildContext, DefaultParam, DefaultParamValue, LayerFragment};
use super::LayerBuilder;
use crate::naming;
use crate::plot::LayerKind;
use crate::Result;

/// Smoothing builder - locally weighted regression (`loess`) per color group
#[derive(Debug, Clone, Copy)]
pub struct Smoothing;

impl LayerBuilder for Smoothing {
    fn kind(&self) -> LayerKind {
        LayerKind::Smoothing
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "bandwidth",
                default: DefaultParamValue::Number(0.3),
            },
            DefaultParam {
                name: "stroke_width",
                default: DefaultParamValue::Number(2.0),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let bandwidth = ctx.number_or("bandwidth", 0.3).clamp(0.0, 1.0);
        let transform = json!({
            "type": "loess",
            "x": naming::X_FIELD,
            "y": naming::Y_FIELD,
            "groupby": ctx.color_groupby(),
            "bandwidth": bandwidth
        });
        Ok(fitted_line(ctx, "smooth", transform))
    }
}
