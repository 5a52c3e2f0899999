//! Confidence ellipse builder
//!
//! The ellipse is computed by the renderer from the moments of each color
//! group: the covariance matrix is eigen-decomposed in closed form, its axes
//! are scaled to the requested coverage level under a bivariate normal, and a
//! `sequence`/`flatten` pair expands every group into outline vertices.
//!
//! The outline can reach beyond the observed points, so the position scales
//! cover each group's ellipse bounding box, computed here from the same
//! moments: a covariance ellipse scaled by `k` spans `k * sqrt(var)` either side
//! of the mean along each axis.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::reasons;
use super::types::{
    field_channel, hull, per_color_group, value_channel, BuildContext, DefaultParam,
    DefaultParamValue, LayerFragment,
};
use super::LayerBuilder;
use crate::naming;
use crate::plot::scale::{linear_x, linear_y, reference_extent, zero_padded_extent};
use crate::plot::LayerKind;
use crate::reader::ProjectedData;
use crate::writer::vega::{DataSource, Mark, MarkKind};
use crate::Result;

/// Ellipse builder - coverage ellipse of each color group
#[derive(Debug, Clone, Copy)]
pub struct Ellipse;

impl LayerBuilder for Ellipse {
    fn kind(&self) -> LayerKind {
        LayerKind::Ellipse
    }

    fn default_params(&self) -> &'static [DefaultParam] {
        &[
            DefaultParam {
                name: "level",
                default: DefaultParamValue::Number(0.95),
            },
            DefaultParam {
                name: "segments",
                default: DefaultParamValue::Number(64.0),
            },
            DefaultParam {
                name: "opacity",
                default: DefaultParamValue::Number(0.15),
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
        if data.is_empty() {
            return Ok(LayerFragment::empty(reasons::NO_ROWS));
        }

        let k = radius_factor(ctx.number_or("level", 0.95));
        let segments = ctx.number_or("segments", 64.0).max(8.0).floor() as usize;
        let source = ctx.source_name("ellipse");

        let outline = Mark::new(MarkKind::Line)
            .from_data(source.clone())
            .sorted_by("step")
            .enter("interpolate", value_channel("linear-closed"))
            .enter("x", field_channel(naming::X_SCALE, "px"))
            .enter("y", field_channel(naming::Y_SCALE, "py"))
            .enter("stroke", ctx.color_channel())
            .enter("fill", ctx.color_channel())
            .enter("fillOpacity", value_channel(ctx.number_or("opacity", 0.15)));

        let mut fragment = LayerFragment::default()
            .with_derived_data(DataSource::derived(
                source.clone(),
                naming::TABLE_DATA,
                ellipse_transform(ctx.color_groupby(), k, segments),
            ))
            .with_mark(per_color_group(ctx, "ellipse", &source, outline));

        let (x_box, y_box) = bounding_box(data, k);
        if let Some((lo, hi)) = hull(data.x_extent(), x_box) {
            fragment = fragment.with_scale(linear_x(reference_extent(lo, hi)));
        }
        if let Some((lo, hi)) = hull(data.y_extent(), y_box) {
            fragment = fragment.with_scale(linear_y(zero_padded_extent(lo, hi)));
        }
        Ok(fragment.with_scale(ctx.color_scale()))
    }
}

/// Mahalanobis radius enclosing `level` of a bivariate normal
fn radius_factor(level: f64) -> f64 {
    let level = if level > 0.0 && level < 1.0 { level } else { 0.95 };
    (-2.0 * (1.0 - level).ln()).sqrt()
}

fn formula(name: &str, expr: impl Into<String>) -> Value {
    json!({ "type": "formula", "as": name, "expr": expr.into() })
}

fn ellipse_transform(groupby: Vec<&str>, k: f64, segments: usize) -> Vec<Value> {
    let half_gap = "(datum.vx - datum.vy) / 2";
    let root = format!("sqrt(pow({}, 2) + pow(datum.cov, 2))", half_gap);
    vec![
        formula("xy", "datum.x * datum.y"),
        json!({
            "type": "aggregate",
            "groupby": groupby,
            "fields": ["x", "y", "x", "y", "xy"],
            "ops": ["mean", "mean", "variancep", "variancep", "mean"],
            "as": ["mx", "my", "vx", "vy", "mxy"]
        }),
        formula("cov", "datum.mxy - datum.mx * datum.my"),
        formula("theta", "0.5 * atan2(2 * datum.cov, datum.vx - datum.vy)"),
        formula("l1", format!("(datum.vx + datum.vy) / 2 + {}", root)),
        formula("l2", format!("(datum.vx + datum.vy) / 2 - {}", root)),
        formula("a", format!("{} * sqrt(max(datum.l1, 0))", k)),
        formula("b", format!("{} * sqrt(max(datum.l2, 0))", k)),
        formula("steps", format!("sequence(0, {})", segments)),
        json!({ "type": "flatten", "fields": ["steps"], "as": ["step"] }),
        formula("angle", format!("2 * PI * datum.step / {}", segments)),
        formula(
            "px",
            "datum.mx + datum.a * cos(datum.angle) * cos(datum.theta) \
             - datum.b * sin(datum.angle) * sin(datum.theta)",
        ),
        formula(
            "py",
            "datum.my + datum.a * cos(datum.angle) * sin(datum.theta) \
             + datum.b * sin(datum.angle) * cos(datum.theta)",
        ),
    ]
}

type Extent = Option<(f64, f64)>;

/// Hull of the bounding boxes of every group's ellipse
fn bounding_box(data: &ProjectedData, k: f64) -> (Extent, Extent) {
    let mut groups: HashMap<Option<&str>, (Vec<f64>, Vec<f64>)> = HashMap::new();
    for row in &data.rows {
        let (Some(x), Some(y)) = (row.x.as_f64(), row.y.as_ref().and_then(|y| y.as_f64())) else {
            continue;
        };
        let entry = groups.entry(row.color.as_deref()).or_default();
        entry.0.push(x);
        entry.1.push(y);
    }

    let mut x_box = None;
    let mut y_box = None;
    for (xs, ys) in groups.values() {
        x_box = hull(x_box, spread(xs, k));
        y_box = hull(y_box, spread(ys, k));
    }
    (x_box, y_box)
}

/// `mean ± k * population sd`
fn spread(values: &[f64], k: f64) -> Extent {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let m = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    let half = k * var.sqrt();
    Some((m - half, m + half))
}
