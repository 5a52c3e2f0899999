//! Normal quantile-quantile builder

use serde_json::json;

use super::reasons;
use super::types::{
    field_channel, value_channel, BuildContext, DefaultParam, DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{linear_over_fields, FieldRef, ScaleRange};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Q-Q builder - sample quantiles of x against standard normal quantiles
#[derive(Debug, Clone, Copy)]
pub struct Qq;

impl LayerBuilder for Qq {
    fn kind(&self) -> LayerKind {
        LayerKind::Qq
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "step",
                default: DefaultParamValue::Number(0.01),
            },
            DefaultParam {
                name: "size",
                default: DefaultParamValue::Number(30.0),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if !data.x_is_continuous() {
            return Ok(LayerFragment::empty(reasons::NEEDS_NUMERIC_X));
        }
        if data.is_empty() {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        }

        let step = ctx.number_or("step", 0.01);
        let step = if step > 0.0 && step < 1.0 { step } else { 0.01 };
        let source = ctx.source_name("qq");
        let transform = vec![
            json!({
                "type": "quantile",
                "field": naming::X_FIELD,
                "groupby": ctx.color_groupby(),
                "step": step,
                "as": ["prob", "value"]
            }),
            json!({
                "type": "formula",
                "as": "theoretical",
                "expr": "quantileNormal(datum.prob)"
            }),
        ];

        let symbol = Mark::new(MarkKind::Symbol)
            .from_data(source.clone())
            .enter("x", field_channel(naming::X_SCALE, "theoretical"))
            .enter("y", field_channel(naming::Y_SCALE, "value"))
            .enter("size", value_channel(ctx.number_or("size", 30.0)))
            .enter("fill", ctx.color_channel());

        Ok(LayerFragment::default()
            .with_derived_data(DataSource::derived(
                source.clone(),
                naming::TABLE_DATA,
                transform,
            ))
            .with_mark(symbol)
            .with_scale(linear_over_fields(
                naming::X_SCALE,
                vec![FieldRef::new(source.clone(), "theoretical")],
                ScaleRange::width(),
            ))
            .with_scale(linear_over_fields(
                naming::Y_SCALE,
                vec![FieldRef::new(source, "value")],
                ScaleRange::height(),
            ))
            .with_scale(ctx.color_scale())
            .with_x_title("theoretical quantiles")
            .with_y_title("sample quantiles"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, scale};
    use super::*;
    use crate::plot::scale::DomainSource;
    use crate::plot::Bindings;
    use polars::prelude::*;
    use crate::plot::scale::FieldRef;

    #[test]
    fn test_qq_quantiles_against_normal() {
        let df = df! { "v" => [0.3, -1.2, 2.2, 0.9] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Qq, &df, Bindings::x_only("v"), &[]);
        let transform = &fragment.derived_data[0].transform;
        assert_eq!(transform[0]["type"], "quantile");
        assert_eq!(transform[0]["step"], json!(0.01));
        assert_eq!(transform[1]["expr"], "quantileNormal(datum.prob)");

        assert_eq!(
            scale(&fragment, "xscale").unwrap().domain,
            DomainSource::Field(FieldRef::new("qq_0", "theoretical"))
        );
        assert_eq!(fragment.axis_titles.x.as_deref(), Some("theoretical quantiles"));
        assert_eq!(fragment.axis_titles.y.as_deref(), Some("sample quantiles"));
    }
}
