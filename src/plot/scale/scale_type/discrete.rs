//! Discrete (banded) scale type implementation

use super::{Axis, ScaleTypeTrait, Usage};
use crate::naming;
use crate::plot::scale::types::{DomainSource, ScaleKind, ScaleRange, ScaleSpec};
use crate::plot::types::Datum;
use crate::reader::ProjectedData;

/// Band padding for bars and symbols
pub const SIMPLE_BAND_PADDING: f64 = 0.2;

/// Band padding for histogram, boxplot and violin style layers
pub const DISTRIBUTION_BAND_PADDING: f64 = 0.1;

/// Inner padding between dodged sub-bands
const DODGE_PADDING: f64 = 0.05;

/// Discrete scale type - category labels laid out as bands
#[derive(Debug, Clone, Copy)]
pub struct Discrete;

impl ScaleTypeTrait for Discrete {
    fn kind(&self) -> ScaleKind {
        ScaleKind::Banded
    }

    fn name(&self) -> &'static str {
        "discrete"
    }

    fn position_scale(&self, data: &ProjectedData, axis: Axis, usage: Usage) -> Option<ScaleSpec> {
        let (levels, name, range) = match axis {
            Axis::X => (data.x_levels(), naming::X_SCALE, ScaleRange::width()),
            Axis::Y => (data.y_levels(), naming::Y_SCALE, ScaleRange::height()),
        };
        if levels.is_empty() {
            return None;
        }
        Some(band(name, levels, range, usage.band_padding()))
    }
}

impl std::fmt::Display for Discrete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Band scale over explicit levels
pub fn band(name: &str, levels: Vec<Datum>, range: ScaleRange, padding: f64) -> ScaleSpec {
    ScaleSpec::new(name, ScaleKind::Banded, DomainSource::Values(levels), range)
        .with_padding(padding)
}

/// Sub-band scale placing one mark per color level inside an x band
pub fn dodge_scale(levels: &[String]) -> ScaleSpec {
    band(
        naming::DODGE_SCALE,
        levels.iter().map(|l| Datum::Label(l.clone())).collect(),
        ScaleRange::to_signal(format!("bandwidth('{}')", naming::X_SCALE)),
        DODGE_PADDING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::Bindings;
    use crate::reader::project;
    use polars::prelude::*;

    #[test]
    fn test_band_x_over_levels() {
        let df = df! { "c" => ["b", "a", "b"], "v" => [1.0, 2.0, 3.0] }.unwrap();
        let data = project(&df, &Bindings::xy("c", "v")).unwrap();
        let scale = Discrete
            .position_scale(&data, Axis::X, Usage::Scatter)
            .unwrap();
        assert_eq!(scale.kind, ScaleKind::Banded);
        assert_eq!(scale.padding, Some(SIMPLE_BAND_PADDING));
        assert_eq!(
            scale.domain,
            DomainSource::Values(vec![Datum::Label("b".into()), Datum::Label("a".into())])
        );
    }

    #[test]
    fn test_distribution_padding() {
        let df = df! { "c" => ["a"], "v" => [1.0] }.unwrap();
        let data = project(&df, &Bindings::xy("c", "v")).unwrap();
        let scale = Discrete
            .position_scale(&data, Axis::X, Usage::Distribution)
            .unwrap();
        assert_eq!(scale.padding, Some(DISTRIBUTION_BAND_PADDING));
    }

    #[test]
    fn test_dodge_scale_spans_parent_band() {
        let scale = dodge_scale(&["A".to_string(), "B".to_string()]);
        assert_eq!(scale.name, "xsub");
        assert_eq!(
            serde_json::to_value(&scale.range).unwrap(),
            serde_json::json!([0, {"signal": "bandwidth('xscale')"}])
        );
    }
}
