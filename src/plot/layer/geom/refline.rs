//! Reference line builder

use serde_json::{json, Value};

use super::reasons;
use super::types::{
    field_channel, hull, signal_channel, value_channel, BuildContext, DefaultParam,
    DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{linear_x, linear_y, reference_extent, scatter_extent, zero_padded_extent};
use crate::plot::{Datum, LayerKind};
use crate::reader::DataRow;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

const NEEDS_INTERCEPT: &str = "requires an intercept";

/// Reference line builder
///
/// - orientation `h`: horizontal rule across the plot at `y = intercept`
/// - orientation `v`: vertical rule at `x = intercept`
/// - with a `slope`: the line `y = intercept + slope * x` over the observed x range
#[derive(Debug, Clone, Copy)]
pub struct ReferenceLine;

impl LayerBuilder for ReferenceLine {
    fn kind(&self) -> LayerKind {
        LayerKind::ReferenceLine
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "orientation",
                default: DefaultParamValue::String("h"),
            },
            DefaultParam {
                name: "intercept",
                default: DefaultParamValue::Null,
            },
            DefaultParam {
                name: "slope",
                default: DefaultParamValue::Null,
            },
            DefaultParam {
                name: "color",
                default: DefaultParamValue::String("#444444"),
            },
            DefaultParam {
                name: "dashed",
                default: DefaultParamValue::Boolean(true),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let Some(intercept) = ctx.number("intercept") else {
            return Ok(LayerFragment::empty(NEEDS_INTERCEPT));
        };
        let vertical = matches!(ctx.string("orientation"), Some("v") | Some("vertical"));
        let fragment = match ctx.number("slope") {
            Some(slope) => sloped(ctx, intercept, slope),
            None if vertical => vertical_rule(ctx, intercept),
            None => horizontal_rule(ctx, intercept),
        };
        if fragment.is_empty() {
            return Ok(fragment);
        }
        // The rule itself is not colored, but the color scale keeps the legend.
        Ok(fragment.with_scale(ctx.color_scale()))
    }
}

/// Stroke channels shared by every variant
fn styled(ctx: &BuildContext, mark: Mark) -> Mark {
    let mark = mark
        .enter("stroke", value_channel(ctx.string("color").unwrap_or("#444444")))
        .enter("strokeWidth", value_channel(1.5));
    if ctx.boolean_or("dashed", true) {
        mark.enter("strokeDash", value_channel(json!([6, 4])))
    } else {
        mark
    }
}

fn horizontal_rule(ctx: &BuildContext, intercept: f64) -> LayerFragment {
    if ctx.data.has_y() && !ctx.data.y_is_continuous() {
        return LayerFragment::empty(reasons::NEEDS_NUMERIC_Y);
    }
    let rule = Mark::new(MarkKind::Rule)
        .enter("x", value_channel(0))
        .enter("x2", signal_channel("width"))
        .enter("y", json!({ "scale": naming::Y_SCALE, "value": intercept }));
    let (lo, hi) = hull(ctx.data.y_extent(), Some((intercept, intercept)))
        .unwrap_or((intercept, intercept));
    LayerFragment::default()
        .with_mark(styled(ctx, rule))
        .with_scale(linear_y(zero_padded_extent(lo, hi)))
}

fn vertical_rule(ctx: &BuildContext, intercept: f64) -> LayerFragment {
    if !ctx.data.x_is_continuous() {
        return LayerFragment::empty(reasons::NEEDS_NUMERIC_X);
    }
    let rule = Mark::new(MarkKind::Rule)
        .enter("x", json!({ "scale": naming::X_SCALE, "value": intercept }))
        .enter("y", value_channel(0))
        .enter("y2", signal_channel("height"));
    let (lo, hi) = hull(ctx.data.x_extent(), Some((intercept, intercept)))
        .unwrap_or((intercept, intercept));
    LayerFragment::default()
        .with_mark(styled(ctx, rule))
        .with_scale(linear_x(scatter_extent(lo, hi)))
}

fn sloped(ctx: &BuildContext, intercept: f64, slope: f64) -> LayerFragment {
    if !ctx.data.x_is_continuous() {
        return LayerFragment::empty(reasons::NEEDS_NUMERIC_X);
    }
    let Some((x0, x1)) = ctx.data.x_extent() else {
        return LayerFragment::empty(reasons::NO_ROWS);
    };
    let (y0, y1) = (intercept + slope * x0, intercept + slope * x1);
    let source = ctx.source_name("refline");
    let endpoints: Vec<Value> = [(x0, y0), (x1, y1)]
        .iter()
        .map(|&(x, y)| {
            DataRow {
                x: Datum::Number(x),
                y: Some(Datum::Number(y)),
                color: None,
            }
            .to_json()
        })
        .collect();

    let line = Mark::new(MarkKind::Line)
        .from_data(source.clone())
        .enter("x", field_channel(naming::X_SCALE, naming::X_FIELD))
        .enter("y", field_channel(naming::Y_SCALE, naming::Y_FIELD));
    let (lo, hi) = hull(ctx.data.y_extent(), Some((y0.min(y1), y0.max(y1))))
        .unwrap_or((y0.min(y1), y0.max(y1)));

    LayerFragment::default()
        .with_aux_data(DataSource::inline(source, endpoints))
        .with_mark(styled(ctx, line))
        .with_scale(linear_x(reference_extent(x0, x1)))
        .with_scale(linear_y(zero_padded_extent(lo, hi)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, marks_json, scale};
    use super::*;
    use crate::plot::scale::DomainSource;
    use crate::plot::{Bindings, ParameterValue};
    use polars::prelude::*;

    fn sample() -> DataFrame {
        df! { "x" => [0.0, 10.0], "y" => [1.0, 2.0] }.unwrap()
    }

    #[test]
    fn test_horizontal_rule_extends_y_domain() {
        let (_, fragment) = build_with(
            LayerKind::ReferenceLine,
            &sample(),
            Bindings::xy("x", "y"),
            &[("intercept", ParameterValue::Number(5.0))],
        );
        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["type"], "rule");
        assert_eq!(
            marks[0]["encode"]["enter"]["y"],
            json!({"scale": "yscale", "value": 5.0})
        );
        assert_eq!(marks[0]["encode"]["enter"]["strokeDash"]["value"], json!([6, 4]));
        match scale(&fragment, "yscale").unwrap().domain {
            DomainSource::Extent([lo, hi]) => {
                assert_eq!(lo, 0.0);
                assert!(hi >= 5.0);
            }
            ref other => panic!("unexpected domain {:?}", other),
        }
        assert!(scale(&fragment, "xscale").is_none());
    }

    #[test]
    fn test_vertical_rule_on_x_scale() {
        let (_, fragment) = build_with(
            LayerKind::ReferenceLine,
            &sample(),
            Bindings::xy("x", "y"),
            &[
                ("orientation", ParameterValue::from("v")),
                ("intercept", ParameterValue::Number(4.0)),
                ("dashed", ParameterValue::Boolean(false)),
            ],
        );
        let marks = marks_json(&fragment);
        assert_eq!(
            marks[0]["encode"]["enter"]["x"],
            json!({"scale": "xscale", "value": 4.0})
        );
        assert!(marks[0]["encode"]["enter"].get("strokeDash").is_none());
        assert!(scale(&fragment, "yscale").is_none());
    }

    #[test]
    fn test_sloped_line_uses_two_point_source() {
        let (_, fragment) = build_with(
            LayerKind::ReferenceLine,
            &sample(),
            Bindings::xy("x", "y"),
            &[
                ("intercept", ParameterValue::Number(1.0)),
                ("slope", ParameterValue::Number(0.5)),
            ],
        );
        let aux = &fragment.aux_data[0];
        assert_eq!(aux.name, "refline_0");
        assert_eq!(
            aux.values.as_ref().unwrap(),
            &vec![json!({"x": 0.0, "y": 1.0}), json!({"x": 10.0, "y": 6.0})]
        );
        assert_eq!(marks_json(&fragment)[0]["type"], "line");
    }

    #[test]
    fn test_grouped_data_keeps_color_scale() {
        let df = df! { "x" => [0.0, 10.0], "y" => [1.0, 2.0], "g" => ["a", "b"] }.unwrap();
        let (_, fragment) = build_with(
            LayerKind::ReferenceLine,
            &df,
            Bindings::xy("x", "y").with_color("g"),
            &[("intercept", ParameterValue::Number(1.5))],
        );
        let color = scale(&fragment, "color").unwrap();
        assert_eq!(
            color.domain,
            DomainSource::Values(vec![Datum::Label("a".into()), Datum::Label("b".into())])
        );
        assert_eq!(
            marks_json(&fragment)[0]["encode"]["enter"]["stroke"]["value"],
            "#444444"
        );
    }

    #[test]
    fn test_missing_intercept_is_empty() {
        let (_, fragment) =
            build_with(LayerKind::ReferenceLine, &sample(), Bindings::xy("x", "y"), &[]);
        assert!(fragment.is_empty());
        assert_eq!(fragment.empty_reason.as_deref(), Some(NEEDS_INTERCEPT));
    }
}
