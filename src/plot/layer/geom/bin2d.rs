//! 2D histogram builder

use serde_json::json;

use super::histogram::{bin_count, bin_transform};
use super::reasons;
use super::types::{
    field_channel, value_channel, BuildContext, DefaultParam, DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{heat_scale, linear_x, linear_y_unanchored, reference_extent, FieldRef};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// 2D histogram builder - counts over a grid of x and y bins, colored by count
///
/// When colored by group, each group's cells are counted separately and
/// outlined in the group color.
#[derive(Debug, Clone, Copy)]
pub struct Histogram2d;

impl LayerBuilder for Histogram2d {
    fn kind(&self) -> LayerKind {
        LayerKind::Histogram2d
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[DefaultParam {
            name: "nbins",
            default: DefaultParamValue::Number(20.0),
        }]
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
        let source = ctx.source_name("bin2d");
        let transform = vec![
            bin_transform(naming::X_FIELD, x_extent, nbins, ["x0", "x1"]),
            bin_transform(naming::Y_FIELD, y_extent, nbins, ["y0", "y1"]),
            json!({
                "type": "aggregate",
                "groupby": cell_groupby(ctx),
                "ops": ["count"],
                "as": ["count"]
            }),
        ];

        let mut cell = Mark::new(MarkKind::Rect)
            .from_data(source.clone())
            .enter("x", field_channel(naming::X_SCALE, "x0"))
            .enter("x2", field_channel(naming::X_SCALE, "x1"))
            .enter("y", field_channel(naming::Y_SCALE, "y1"))
            .enter("y2", field_channel(naming::Y_SCALE, "y0"))
            .enter("fill", field_channel(naming::HEAT_SCALE, "count"));
        if ctx.grouped() {
            cell = cell
                .enter("stroke", ctx.color_channel())
                .enter("strokeWidth", value_channel(1.5));
        }

        Ok(LayerFragment::default()
            .with_derived_data(DataSource::derived(
                source.clone(),
                naming::TABLE_DATA,
                transform,
            ))
            .with_mark(cell)
            .with_scale(linear_x(x_extent))
            .with_scale(linear_y_unanchored(y_extent))
            .with_scale(heat_scale(FieldRef::new(source, "count"), ctx.palette)?)
            .with_scale(ctx.color_scale()))
    }
}

fn cell_groupby(ctx: &BuildContext) -> Vec<&'static str> {
    let mut groupby = vec!["x0", "x1", "y0", "y1"];
    groupby.extend(ctx.color_groupby());
    groupby
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build_with, marks_json, scale};
    use super::*;
    use crate::plot::scale::DomainSource;
    use crate::plot::{Bindings, ParameterValue};
    use polars::prelude::*;
    use crate::plot::scale::FieldRef;

    #[test]
    fn test_two_bins_then_count() {
        let df = df! { "a" => [0.0, 1.0, 2.0, 4.0], "b" => [10.0, 20.0, 20.0, 30.0] }.unwrap();
        let (_, fragment) = build_with(
            LayerKind::Histogram2d,
            &df,
            Bindings::xy("a", "b"),
            &[("nbins", ParameterValue::Number(4.0))],
        );
        let transform = &fragment.derived_data[0].transform;
        assert_eq!(transform[0]["field"], "x");
        assert_eq!(transform[0]["step"], json!(1.0));
        assert_eq!(transform[1]["field"], "y");
        assert_eq!(transform[1]["step"], json!(5.0));
        assert_eq!(transform[2]["ops"], json!(["count"]));

        let marks = marks_json(&fragment);
        assert_eq!(marks[0]["encode"]["enter"]["fill"]["scale"], "heat");
        let heat = scale(&fragment, "heat").unwrap();
        assert_eq!(heat.domain, DomainSource::Field(FieldRef::new("bin2d_0", "count")));
        assert_eq!(
            scale(&fragment, "yscale").unwrap().domain,
            DomainSource::Extent([10.0, 30.0])
        );
        assert_ne!(scale(&fragment, "yscale").unwrap().zero, Some(true));
    }

    #[test]
    fn test_grouped_cells_count_per_color() {
        let df = df! {
            "a" => [0.0, 1.0, 2.0, 3.0],
            "b" => [1.0, 2.0, 3.0, 4.0],
            "g" => ["u", "v", "u", "v"],
        }
        .unwrap();
        let (_, fragment) = build_with(
            LayerKind::Histogram2d,
            &df,
            Bindings::xy("a", "b").with_color("g"),
            &[],
        );
        let transform = &fragment.derived_data[0].transform;
        assert_eq!(transform[2]["groupby"], json!(["x0", "x1", "y0", "y1", "color"]));
        let marks = marks_json(&fragment);
        assert_eq!(
            marks[0]["encode"]["enter"]["stroke"],
            json!({"scale": "color", "field": "color"})
        );
        assert!(scale(&fragment, "color").is_some());
    }

    #[test]
    fn test_categorical_axis_is_empty() {
        let df = df! { "a" => ["p", "q"], "b" => [1.0, 2.0] }.unwrap();
        let (_, fragment) = build_with(LayerKind::Histogram2d, &df, Bindings::xy("a", "b"), &[]);
        assert!(fragment.is_empty());
    }
}
