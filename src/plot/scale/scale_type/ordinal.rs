//! Ordinal color scales

use crate::naming;
use crate::plot::scale::palettes::Palette;
use crate::plot::scale::types::{DomainSource, FieldRef, ScaleKind, ScaleRange, ScaleSpec};
use crate::plot::types::Datum;
use crate::Result;

/// Ordinal scale mapping each color level to a palette entry
///
/// Palettes shorter than the level list are cycled.
pub fn color_scale(levels: &[String], palette: &Palette) -> ScaleSpec {
    ScaleSpec::new(
        naming::COLOR_SCALE,
        ScaleKind::Ordinal,
        DomainSource::Values(levels.iter().map(|l| Datum::Label(l.clone())).collect()),
        ScaleRange::colors(&palette.cycle(levels.len())),
    )
}

/// Sequential scale coloring cells by a computed count field
pub fn heat_scale(count: FieldRef, palette: &Palette) -> Result<ScaleSpec> {
    Ok(ScaleSpec::new(
        naming::HEAT_SCALE,
        ScaleKind::Continuous,
        DomainSource::Field(count),
        ScaleRange::colors(&palette.sequential()?),
    )
    .with_zero(true))
}
