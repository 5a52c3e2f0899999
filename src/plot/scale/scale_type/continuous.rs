//! Continuous scale type implementation

use super::{Axis, ScaleTypeTrait, Usage};
use crate::plot::scale::types::{DomainSource, FieldRef, ScaleKind, ScaleRange, ScaleSpec};
use crate::reader::ProjectedData;

/// Fraction of the data range added as padding
pub const PAD_FRACTION: f64 = 0.05;

/// Half-width used to widen a zero-width extent
pub const DEGENERATE_HALF_WIDTH: f64 = 0.5;

/// Continuous scale type - numeric positions on a linear scale
#[derive(Debug, Clone, Copy)]
pub struct Continuous;

impl ScaleTypeTrait for Continuous {
    fn kind(&self) -> ScaleKind {
        ScaleKind::Continuous
    }

    fn name(&self) -> &'static str {
        "continuous"
    }

    fn position_scale(&self, data: &ProjectedData, axis: Axis, usage: Usage) -> Option<ScaleSpec> {
        match axis {
            Axis::X => {
                let (lo, hi) = data.x_extent()?;
                let extent = if usage.pads_continuous_x() {
                    scatter_extent(lo, hi)
                } else {
                    reference_extent(lo, hi)
                };
                Some(linear_x(extent))
            }
            Axis::Y => {
                let (lo, hi) = data.y_extent()?;
                Some(linear_y(zero_padded_extent(lo, hi)))
            }
        }
    }
}

impl std::fmt::Display for Continuous {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Widen a zero-width extent so the scale stays invertible
fn widen_degenerate(lo: f64, hi: f64) -> Option<[f64; 2]> {
    (lo == hi).then(|| [lo - DEGENERATE_HALF_WIDTH, hi + DEGENERATE_HALF_WIDTH])
}

/// Extent for row-level marks: the lower bound moves down by 5% of the range
pub fn scatter_extent(lo: f64, hi: f64) -> [f64; 2] {
    widen_degenerate(lo, hi).unwrap_or([lo - PAD_FRACTION * (hi - lo), hi])
}

/// Extent for curves and statistics: the data range as is
pub fn reference_extent(lo: f64, hi: f64) -> [f64; 2] {
    widen_degenerate(lo, hi).unwrap_or([lo, hi])
}

/// Extent that includes zero, padded by 5% away from zero on each side with data
pub fn zero_padded_extent(lo: f64, hi: f64) -> [f64; 2] {
    let lo = lo.min(0.0);
    let hi = hi.max(0.0);
    if let Some(extent) = widen_degenerate(lo, hi) {
        return extent;
    }
    let pad = PAD_FRACTION * (hi - lo);
    [
        if lo < 0.0 { lo - pad } else { lo },
        if hi > 0.0 { hi + pad } else { hi },
    ]
}

/// Horizontal linear scale over an explicit extent
///
/// `zero` is switched off explicitly: Vega extends linear domains to zero
/// unless told otherwise.
pub fn linear_x(extent: [f64; 2]) -> ScaleSpec {
    ScaleSpec::new(
        crate::naming::X_SCALE,
        ScaleKind::Continuous,
        DomainSource::Extent(extent),
        ScaleRange::width(),
    )
    .with_zero(false)
}

/// Vertical linear scale over an explicit extent, anchored at zero
pub fn linear_y(extent: [f64; 2]) -> ScaleSpec {
    ScaleSpec::new(
        crate::naming::Y_SCALE,
        ScaleKind::Continuous,
        DomainSource::Extent(extent),
        ScaleRange::height(),
    )
    .with_zero(true)
    .with_nice(true)
}

/// Vertical linear scale over an explicit extent, not extended to zero
pub fn linear_y_unanchored(extent: [f64; 2]) -> ScaleSpec {
    ScaleSpec::new(
        crate::naming::Y_SCALE,
        ScaleKind::Continuous,
        DomainSource::Extent(extent),
        ScaleRange::height(),
    )
    .with_zero(false)
}

/// Linear scale over fields computed by emitted transforms
pub fn linear_over_fields(name: &str, fields: Vec<FieldRef>, range: ScaleRange) -> ScaleSpec {
    let domain = if fields.len() == 1 {
        fields
            .into_iter()
            .next()
            .map(DomainSource::Field)
            .unwrap_or(DomainSource::Extent([0.0, 1.0]))
    } else {
        DomainSource::Fields { fields }
    };
    ScaleSpec::new(name, ScaleKind::Continuous, domain, range)
        .with_zero(true)
        .with_nice(true)
}
