//! Point, jitter and swarm builders

use serde_json::{json, Value};

use super::reasons;
use super::types::{
    signal_channel, value_channel, x_position, y_position, BuildContext, DefaultParam,
    DefaultParamValue, JitterMode, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{banded_position_scale, position_scale, Axis, Usage};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Fractional part of the golden ratio, the step of the jitter sequence
const GOLDEN_STEP: f64 = 0.618_033_988_749_894_9;

/// Pixel span of jitter on a continuous x axis
const CONTINUOUS_JITTER_SPAN: &str = "20";

const POINT_PARAMS: &[DefaultParam] = &[
    DefaultParam {
        name: "size",
        default: DefaultParamValue::Number(50.0),
    },
    DefaultParam {
        name: "opacity",
        default: DefaultParamValue::Number(0.8),
    },
    DefaultParam {
        name: "shape",
        default: DefaultParamValue::String("circle"),
    },
];

const JITTER_PARAMS: &[DefaultParam] = &[
    DefaultParam {
        name: "width",
        default: DefaultParamValue::Number(0.8),
    },
    DefaultParam {
        name: "size",
        default: DefaultParamValue::Number(50.0),
    },
    DefaultParam {
        name: "opacity",
        default: DefaultParamValue::Number(0.8),
    },
];

/// Point builder - one symbol per row
#[derive(Debug, Clone, Copy)]
pub struct Point;

impl LayerBuilder for Point {
    fn kind(&self) -> LayerKind {
        LayerKind::Point
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        POINT_PARAMS
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        Ok(scatter_fragment(ctx))
    }
}

/// Symbols for every row of the primary table, shared with regression plots
pub(super) fn scatter_fragment(ctx: &BuildContext) -> LayerFragment {
    let data = ctx.data;
    if !data.has_y() {
        return LayerFragment::empty(reasons::NEEDS_Y);
    }
    if data.is_empty() {
        return LayerFragment::empty(reasons::NO_ROWS);
    }

    let mark = Mark::new(MarkKind::Symbol)
        .from_data(naming::TABLE_DATA)
        .enter("x", x_position(!data.x_is_continuous()))
        .enter("y", y_position(!data.y_is_continuous()))
        .enter("shape", value_channel(ctx.string("shape").unwrap_or("circle")))
        .enter("size", value_channel(ctx.number_or("size", 50.0)))
        .enter("opacity", value_channel(ctx.number_or("opacity", 0.8)))
        .enter("fill", ctx.color_channel());

    LayerFragment::default()
        .with_mark(mark)
        .with_scale(position_scale(data, Axis::X, Usage::Scatter))
        .with_scale(position_scale(data, Axis::Y, Usage::Scatter))
        .with_scale(ctx.color_scale())
}

/// Jitter builder - symbols spread horizontally within their x position
#[derive(Debug, Clone, Copy)]
pub struct Jitter;

impl LayerBuilder for Jitter {
    fn kind(&self) -> LayerKind {
        LayerKind::Jitter
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        JITTER_PARAMS
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        Ok(jittered_fragment(ctx, !ctx.data.x_is_continuous(), "jitter"))
    }
}

/// Swarm builder - jittered symbols on an always-banded x axis
#[derive(Debug, Clone, Copy)]
pub struct Swarm;

impl LayerBuilder for Swarm {
    fn kind(&self) -> LayerKind {
        LayerKind::Swarm
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        JITTER_PARAMS
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        Ok(jittered_fragment(ctx, true, "swarm"))
    }
}

/// Offset in `[-0.5, 0.5)` for row `i` of the deterministic jitter sequence
pub fn jitter_offset(i: usize) -> f64 {
    (0.5 + i as f64 * GOLDEN_STEP).fract() - 0.5
}

fn jittered_fragment(ctx: &BuildContext, banded: bool, role: &str) -> LayerFragment {
    let data = ctx.data;
    if !data.has_y() {
        return LayerFragment::empty(reasons::NEEDS_Y);
    }
    if data.is_empty() {
        return LayerFragment::empty(reasons::NO_ROWS);
    }

    let width = ctx.number_or("width", 0.8);
    let span = if banded {
        format!("bandwidth('{}')", naming::X_SCALE)
    } else {
        CONTINUOUS_JITTER_SPAN.to_string()
    };

    let mut fragment = LayerFragment::default();
    let (source, offset) = match ctx.jitter {
        JitterMode::RenderTime => (
            naming::TABLE_DATA.to_string(),
            format!("(random() - 0.5) * {} * {}", span, width),
        ),
        JitterMode::Deterministic => {
            let name = ctx.source_name(role);
            let values: Vec<Value> = data
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let mut obj = row.to_json();
                    if let Value::Object(map) = &mut obj {
                        map.insert(naming::JITTER_FIELD.to_string(), json!(jitter_offset(i)));
                    }
                    obj
                })
                .collect();
            fragment = fragment.with_aux_data(DataSource::inline(name.clone(), values));
            (
                name,
                format!("{} * {} * {}", naming::datum(naming::JITTER_FIELD), span, width),
            )
        }
    };

    let mut x = x_position(banded);
    if let Value::Object(map) = &mut x {
        map.insert("offset".to_string(), signal_channel(offset));
    }

    let mark = Mark::new(MarkKind::Symbol)
        .from_data(source)
        .enter("x", x)
        .enter("y", y_position(!data.y_is_continuous()))
        .enter("size", value_channel(ctx.number_or("size", 50.0)))
        .enter("opacity", value_channel(ctx.number_or("opacity", 0.8)))
        .enter("fill", ctx.color_channel());

    let x_scale = if banded {
        banded_position_scale(data, Axis::X, Usage::Scatter)
    } else {
        position_scale(data, Axis::X, Usage::Scatter)
    };

    fragment
        .with_mark(mark)
        .with_scale(x_scale)
        .with_scale(position_scale(data, Axis::Y, Usage::Scatter))
        .with_scale(ctx.color_scale())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, build_with_mode, marks_json, scale};
    use super::*;
    use crate::plot::scale::{DomainSource, ScaleKind};
    use crate::plot::{Bindings, Datum};
    use polars::prelude::*;

    #[test]
    fn test_point_scatter_domain() {
        let df = df! {
            "x" => [1.0, 2.0, 3.0, f64::NAN, 5.0],
            "y" => [10.0, 20.0, 30.0, 40.0, 50.0],
        }
        .unwrap();
        let (data, fragment) = build_with(LayerKind::Point, &df, Bindings::xy("x", "y"), &[]);
        assert_eq!(data.len(), 4);
        match &scale(&fragment, "xscale").unwrap().domain {
            DomainSource::Extent([lo, hi]) => {
                assert!((lo - 0.8).abs() < 1e-9);
                assert_eq!(*hi, 5.0);
            }
            other => panic!("unexpected domain {:?}", other),
        }
        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["type"], "symbol");
        assert_eq!(marks[0]["from"]["data"], "table");
    }

    #[test]
    fn test_point_grouped_uses_color_scale() {
        let df = df! {
            "x" => [1.0, 2.0],
            "y" => [1.0, 2.0],
            "g" => ["A", "B"],
        }
        .unwrap();
        let (_, fragment) =
            build_with(LayerKind::Point, &df, Bindings::xy("x", "y").with_color("g"), &[]);
        let marks = marks_json(&fragment);
        assert_eq!(
            marks[0]["encode"]["enter"]["fill"],
            json!({"scale": "color", "field": "color"})
        );
        assert!(scale(&fragment, "color").is_some());
    }

    #[test]
    fn test_point_without_y_is_empty() {
        let df = df! { "x" => [1.0, 2.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Point, &df, Bindings::x_only("x"), &[]);
        assert!(fragment.is_empty());
        assert_eq!(fragment.empty_reason.as_deref(), Some(reasons::NEEDS_Y));
    }

    #[test]
    fn test_jitter_render_time_offset() {
        let df = df! { "c" => ["a", "b"], "v" => [1.0, 2.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Jitter, &df, Bindings::xy("c", "v"), &[]);
        let marks = marks_json(&fragment);
        assert_eq!(
            marks[0]["encode"]["enter"]["x"]["offset"]["signal"],
            "(random() - 0.5) * bandwidth('xscale') * 0.8"
        );
        assert!(fragment.aux_data.is_empty());
    }

    #[test]
    fn test_jitter_deterministic_embeds_offsets() {
        let df = df! { "c" => ["a", "b", "a"], "v" => [1.0, 2.0, 3.0] }.unwrap();
        let (_, first) = build_with_mode(
            LayerKind::Jitter,
            &df,
            Bindings::xy("c", "v"),
            &[],
            JitterMode::Deterministic,
        );
        let (_, second) = build_with_mode(
            LayerKind::Jitter,
            &df,
            Bindings::xy("c", "v"),
            &[],
            JitterMode::Deterministic,
        );
        assert_eq!(first, second);
        let source = &first.aux_data[0];
        assert_eq!(source.name, "jitter_0");
        let values = source.values.as_ref().unwrap();
        assert_eq!(values.len(), 3);
        assert!(values[0].get(naming::JITTER_FIELD).is_some());
        assert_eq!(marks_json(&first)[0]["from"]["data"], "jitter_0");
    }

    #[test]
    fn test_jitter_offsets_stay_in_range() {
        for i in 0..500 {
            let o = jitter_offset(i);
            assert!((-0.5..0.5).contains(&o));
        }
        assert_ne!(jitter_offset(1), jitter_offset(2));
    }

    #[test]
    fn test_swarm_forces_sorted_band() {
        let df = df! { "x" => [3.0, 1.0, 2.0], "y" => [1.0, 1.0, 1.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Swarm, &df, Bindings::xy("x", "y"), &[]);
        let x = scale(&fragment, "xscale").unwrap();
        assert_eq!(x.kind, ScaleKind::Banded);
        assert_eq!(
            x.domain,
            DomainSource::Values(vec![
                Datum::Number(1.0),
                Datum::Number(2.0),
                Datum::Number(3.0)
            ])
        );
        assert_eq!(
            marks_json(&fragment)[0]["encode"]["enter"]["x"]["band"],
            json!(0.5)
        );
    }
}
