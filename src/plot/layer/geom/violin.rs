//! Violin builder
//!
//! A density estimate of y is computed per x category (and color group) and
//! drawn as two mirrored horizontal areas inside a group mark placed on the
//! category's band. The half-width of the body is the `vwidth` scale applied to
//! the density.

use super::density::{bandwidth, kde_transform};
use super::reasons;
use super::types::{
    field_channel, signal_channel, value_channel, BandPlacement, BuildContext, DefaultParam,
    DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{
    banded_position_scale, linear_over_fields, position_scale, reference_extent, Axis, FieldRef,
    ScaleRange, Usage,
};
use crate::plot::LayerKind;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Violin builder - mirrored density per category
#[derive(Debug, Clone, Copy)]
pub struct Violin;

impl LayerBuilder for Violin {
    fn kind(&self) -> LayerKind {
        LayerKind::Violin
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "bandwidth",
                default: DefaultParamValue::Null,
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
        if !data.y_is_continuous() {
            return Ok(LayerFragment::empty(reasons::NEEDS_NUMERIC_Y));
        }
        let Some((lo, hi)) = data.y_extent() else {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        };

        let source = ctx.source_name("violin");
        let kde = kde_transform(
            naming::Y_FIELD,
            ctx.category_groupby(),
            reference_extent(lo, hi),
            bandwidth(ctx, &data.y_numbers()),
        );

        let placement = BandPlacement::for_context(ctx);
        let facet = ctx.facet_name("violin");
        let center = format!("{} / 2", placement.bandwidth_expr());
        let half_width = format!(
            "scale('{}', datum.density)",
            naming::VIOLIN_WIDTH_SCALE
        );

        let left = body_half(ctx, &facet)
            .enter("x", signal_channel(format!("{} - {}", center, half_width)))
            .enter("x2", signal_channel(center.clone()));
        let right = body_half(ctx, &facet)
            .enter("x", signal_channel(center.clone()))
            .enter("x2", signal_channel(format!("{} + {}", center, half_width)));

        let group_x = match placement {
            BandPlacement::Whole => field_channel(naming::X_SCALE, naming::X_FIELD),
            BandPlacement::Dodged => signal_channel(format!(
                "scale('{}', datum.{}) + scale('{}', datum.{})",
                naming::X_SCALE,
                naming::X_FIELD,
                naming::DODGE_SCALE,
                naming::COLOR_FIELD
            )),
        };
        let groupby = ctx.category_groupby();
        let group = Mark::new(MarkKind::Group)
            .from_facet(facet, source.clone(), &groupby)
            .enter("x", group_x)
            .enter("width", signal_channel(placement.bandwidth_expr()))
            .with_marks(vec![left, right]);

        Ok(LayerFragment::default()
            .with_derived_data(DataSource::derived(
                source.clone(),
                naming::TABLE_DATA,
                vec![kde],
            ))
            .with_mark(group)
            .with_scale(banded_position_scale(data, Axis::X, Usage::Distribution))
            .with_scale(position_scale(data, Axis::Y, Usage::Reference))
            .with_scale(linear_over_fields(
                naming::VIOLIN_WIDTH_SCALE,
                vec![FieldRef::new(source, "density")],
                ScaleRange::to_signal(center),
            ))
            .with_scale(ctx.dodge_scale())
            .with_scale(ctx.color_scale()))
    }
}

/// One side of a violin body, reading the category's facet
fn body_half(ctx: &BuildContext, facet: &str) -> Mark {
    Mark::new(MarkKind::Area)
        .from_data(facet)
        .sorted_by("value")
        .enter("orient", value_channel("horizontal"))
        .enter("y", field_channel(naming::Y_SCALE, "value"))
        .enter("fill", ctx.color_channel())
        .enter("fillOpacity", value_channel(ctx.number_or("opacity", 0.6)))
        .enter("stroke", ctx.color_channel())
}
