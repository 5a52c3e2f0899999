//! Corner histogram builder
//!
//! Marginal histograms of x and y drawn outside the plot area: x counts grow
//! upward from just above the top edge, y counts grow rightward from just past
//! the right edge. Both share the main position scales and get their own
//! fixed-length count scales. When colored by group the counts of each group
//! are stacked along the bar.

use serde_json::{json, Value};

use super::histogram::{bin_count, bin_transform, stack_transform};
use super::reasons;
use super::types::{
    field_channel, signal_channel, value_channel, BuildContext, DefaultParam, DefaultParamValue,
    LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{
    linear_over_fields, linear_x, linear_y_unanchored, reference_extent, FieldRef, ScaleRange,
};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Gap in pixels between the plot edge and the marginal bars
const MARGIN_GAP: f64 = 4.0;

/// Longest marginal bar in pixels
const MARGIN_LENGTH: f64 = 40.0;

/// Corner histogram builder - marginal x and y histograms
#[derive(Debug, Clone, Copy)]
pub struct CornerHistogram;

impl LayerBuilder for CornerHistogram {
    fn kind(&self) -> LayerKind {
        LayerKind::CornerHistogram
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "nbins",
                default: DefaultParamValue::Number(20.0),
            },
            DefaultParam {
                name: "opacity",
                default: DefaultParamValue::Number(0.6),
            },
        ]
    }

    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment> {
        let data = ctx.data;
        if !data.has_y() {
            return Ok(LayerFragment::empty(reasons::NEEDS_Y));
        }
        if !data.x_is_continuous() {
            return Ok(LayerFragment::empty(reasons::NEEDS_NUMERIC_X));
        }
        if !data.y_is_continuous() {
            return Ok(LayerFragment::empty(reasons::NEEDS_NUMERIC_Y));
        }
        let (Some((x0, x1)), Some((y0, y1))) = (data.x_extent(), data.y_extent()) else {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        };

        let nbins = bin_count(ctx);
        let x_extent = reference_extent(x0, x1);
        let y_extent = reference_extent(y0, y1);
        let x_source = ctx.source_name("corner_x");
        let y_source = ctx.source_name("corner_y");
        let opacity = value_channel(ctx.number_or("opacity", 0.6));
        let fill = ctx.color_channel();
        let stacked = ctx.grouped();
        let far = if stacked { "y1" } else { "count" };

        let mut top = Mark::new(MarkKind::Rect)
            .from_data(x_source.clone())
            .enter("x", field_channel(naming::X_SCALE, "bin0"))
            .enter("x2", field_channel(naming::X_SCALE, "bin1"))
            .enter(
                "y",
                json!({
                    "scale": naming::CORNER_X_COUNT_SCALE,
                    "field": far,
                    "mult": -1,
                    "offset": -MARGIN_GAP
                }),
            );
        top = if stacked {
            top.enter(
                "y2",
                json!({
                    "scale": naming::CORNER_X_COUNT_SCALE,
                    "field": "y0",
                    "mult": -1,
                    "offset": -MARGIN_GAP
                }),
            )
        } else {
            top.enter("y2", value_channel(-MARGIN_GAP))
        };
        let top = top
            .enter("fill", fill.clone())
            .enter("opacity", opacity.clone());

        let edge = format!("width + {}", MARGIN_GAP);
        let mut right = Mark::new(MarkKind::Rect)
            .from_data(y_source.clone())
            .enter("y", field_channel(naming::Y_SCALE, "bin1"))
            .enter("y2", field_channel(naming::Y_SCALE, "bin0"))
            .enter(
                "x2",
                json!({
                    "scale": naming::CORNER_Y_COUNT_SCALE,
                    "field": far,
                    "offset": { "signal": edge.clone() }
                }),
            );
        right = if stacked {
            right.enter(
                "x",
                json!({
                    "scale": naming::CORNER_Y_COUNT_SCALE,
                    "field": "y0",
                    "offset": { "signal": edge }
                }),
            )
        } else {
            right.enter("x", signal_channel(edge))
        };
        let right = right.enter("fill", fill).enter("opacity", opacity);

        Ok(LayerFragment::default()
            .with_derived_data(DataSource::derived(
                x_source.clone(),
                naming::TABLE_DATA,
                marginal_counts(ctx, naming::X_FIELD, x_extent, nbins),
            ))
            .with_derived_data(DataSource::derived(
                y_source.clone(),
                naming::TABLE_DATA,
                marginal_counts(ctx, naming::Y_FIELD, y_extent, nbins),
            ))
            .with_mark(top)
            .with_mark(right)
            .with_scale(linear_x(x_extent))
            .with_scale(linear_y_unanchored(y_extent))
            .with_scale(linear_over_fields(
                naming::CORNER_X_COUNT_SCALE,
                vec![FieldRef::new(x_source, far)],
                ScaleRange::span(0.0, MARGIN_LENGTH),
            ))
            .with_scale(linear_over_fields(
                naming::CORNER_Y_COUNT_SCALE,
                vec![FieldRef::new(y_source, far)],
                ScaleRange::span(0.0, MARGIN_LENGTH),
            ))
            .with_scale(ctx.color_scale()))
    }
}

/// Bin one field and count per bin, stacked by color group when grouped
fn marginal_counts(ctx: &BuildContext, field: &str, extent: [f64; 2], nbins: usize) -> Vec<Value> {
    let mut groupby = vec!["bin0", "bin1"];
    groupby.extend(ctx.color_groupby());
    let mut transform = vec![
        bin_transform(field, extent, nbins, ["bin0", "bin1"]),
        json!({ "type": "aggregate", "groupby": groupby, "ops": ["count"], "as": ["count"] }),
    ];
    if ctx.grouped() {
        transform.push(stack_transform("bin0"));
    }
    transform
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, marks_json, scale};
    use super::*;
    use crate::plot::Bindings;
    use polars::prelude::*;
    use crate::plot::scale::FieldRef;

    #[test]
    fn test_corner_histogram_sources_and_scales() {
        let df = df! { "a" => [1.0, 2.0, 3.0], "b" => [4.0, 6.0, 5.0] }.unwrap();
        let (_, fragment) =
            build_with(LayerKind::CornerHistogram, &df, Bindings::xy("a", "b"), &[]);
        let names: Vec<_> = fragment.derived_data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["corner_x_0", "corner_y_0"]);
        assert_eq!(fragment.derived_data[1].transform[0]["field"], "y");

        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["encode"]["enter"]["y"]["mult"], json!(-1));
        assert_eq!(
            marks[1]["encode"]["enter"]["x"],
            json!({"signal": "width + 4"})
        );
        assert_eq!(
            scale(&fragment, "cx_count").unwrap().range,
            ScaleRange::span(0.0, 40.0)
        );
        assert!(scale(&fragment, "cy_count").is_some());
        assert!(scale(&fragment, "color").is_none());
    }

    #[test]
    fn test_grouped_counts_are_stacked() {
        let df = df! {
            "a" => [1.0, 2.0, 3.0, 4.0],
            "b" => [4.0, 6.0, 5.0, 7.0],
            "g" => ["u", "u", "v", "v"],
        }
        .unwrap();
        let (_, fragment) = build_with(
            LayerKind::CornerHistogram,
            &df,
            Bindings::xy("a", "b").with_color("g"),
            &[],
        );
        for source in &fragment.derived_data {
            assert_eq!(source.transform[1]["groupby"], json!(["bin0", "bin1", "color"]));
            assert_eq!(source.transform[2]["type"], "stack");
        }
        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["encode"]["enter"]["y2"]["field"], "y0");
        assert_eq!(marks[1]["encode"]["enter"]["x"]["field"], "y0");
        assert_eq!(
            marks[1]["encode"]["enter"]["fill"],
            json!({"scale": "color", "field": "color"})
        );
        assert_eq!(
            scale(&fragment, "cx_count").unwrap().domain,
            crate::plot::scale::DomainSource::Field(FieldRef::new("corner_x_0", "y1"))
        );
        assert!(scale(&fragment, "color").is_some());
    }
}
