//! Scale type trait and positional scale synthesis
//!
//! Positional scales are derived from the projected data: numeric fields get a
//! linear scale, label fields a band scale. Layers describe how they use the x
//! axis through [`Usage`], which decides padding.
//!
//! # Example
//!
//! ```
//! use ggvega::plot::scale::{position_scale, Axis, ScaleKind, Usage};
//! use ggvega::reader::project;
//! use ggvega::Bindings;
//! use polars::prelude::*;
//!
//! let df = df! { "a" => [1.0, 5.0], "b" => [10.0, 50.0] }.unwrap();
//! let data = project(&df, &Bindings::xy("a", "b")).unwrap();
//! let x = position_scale(&data, Axis::X, Usage::Scatter).unwrap();
//! assert_eq!(x.kind, ScaleKind::Continuous);
//! ```

use crate::plot::scale::types::{ScaleKind, ScaleSpec};
use crate::plot::types::FieldKind;
use crate::reader::ProjectedData;

mod continuous;
mod discrete;
mod ordinal;

pub use continuous::{
    linear_over_fields, linear_x, linear_y, linear_y_unanchored, reference_extent, scatter_extent,
    zero_padded_extent, Continuous,
};
pub use discrete::{
    band, dodge_scale, Discrete, DISTRIBUTION_BAND_PADDING, SIMPLE_BAND_PADDING,
};
pub use ordinal::{color_scale, heat_scale};

/// Positional axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// How a layer uses its positional scales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// One mark per data row (points, bars)
    Scatter,
    /// Curves and statistics spanning the data range
    Reference,
    /// Distribution summaries drawn in bands (histogram, boxplot, violin)
    Distribution,
}

impl Usage {
    /// Whether a continuous x domain gets lower padding
    pub fn pads_continuous_x(&self) -> bool {
        matches!(self, Usage::Scatter)
    }

    /// Band padding for banded scales
    pub fn band_padding(&self) -> f64 {
        match self {
            Usage::Distribution => DISTRIBUTION_BAND_PADDING,
            Usage::Scatter | Usage::Reference => SIMPLE_BAND_PADDING,
        }
    }
}

/// Core trait for positional scale types
pub trait ScaleTypeTrait: std::fmt::Debug + std::fmt::Display + Send + Sync {
    /// Which kind of scale this type produces
    fn kind(&self) -> ScaleKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Build the positional scale for one axis, or `None` when the axis has no data
    fn position_scale(&self, data: &ProjectedData, axis: Axis, usage: Usage) -> Option<ScaleSpec>;
}

/// Scale type used for a field of the given kind
pub fn scale_type_for(kind: FieldKind) -> &'static dyn ScaleTypeTrait {
    match kind {
        FieldKind::Continuous => &Continuous,
        FieldKind::Categorical => &Discrete,
    }
}

/// Positional scale following the field's kind
pub fn position_scale(data: &ProjectedData, axis: Axis, usage: Usage) -> Option<ScaleSpec> {
    let kind = match axis {
        Axis::X => data.x_kind,
        Axis::Y => data.y_kind?,
    };
    scale_type_for(kind).position_scale(data, axis, usage)
}

/// Positional scale forced onto bands, whatever the field's kind
pub fn banded_position_scale(data: &ProjectedData, axis: Axis, usage: Usage) -> Option<ScaleSpec> {
    Discrete.position_scale(data, axis, usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::scale::types::DomainSource;
    use crate::plot::{Bindings, Datum};
    use crate::reader::project;
    use polars::prelude::*;

    #[test]
    fn test_dispatch_by_field_kind() {
        assert_eq!(scale_type_for(FieldKind::Continuous).kind(), ScaleKind::Continuous);
        assert_eq!(scale_type_for(FieldKind::Categorical).kind(), ScaleKind::Banded);
        assert_eq!(scale_type_for(FieldKind::Categorical).to_string(), "discrete");
    }

    #[test]
    fn test_y_scale_includes_zero() {
        let df = df! { "a" => [1.0, 2.0], "b" => [10.0, 50.0] }.unwrap();
        let data = project(&df, &Bindings::xy("a", "b")).unwrap();
        let y = position_scale(&data, Axis::Y, Usage::Scatter).unwrap();
        match y.domain {
            DomainSource::Extent([lo, hi]) => {
                assert_eq!(lo, 0.0);
                assert!((hi - 52.5).abs() < 1e-9);
            }
            other => panic!("unexpected domain {:?}", other),
        }
    }

    #[test]
    fn test_forced_band_sorts_numbers() {
        let df = df! { "a" => [2.0, 1.0, 2.0], "b" => [1.0, 1.0, 1.0] }.unwrap();
        let data = project(&df, &Bindings::xy("a", "b")).unwrap();
        let x = banded_position_scale(&data, Axis::X, Usage::Scatter).unwrap();
        assert_eq!(
            x.domain,
            DomainSource::Values(vec![Datum::Number(1.0), Datum::Number(2.0)])
        );
    }

    #[test]
    fn test_unbound_y_has_no_scale() {
        let df = df! { "a" => [1.0] }.unwrap();
        let data = project(&df, &Bindings::x_only("a")).unwrap();
        assert!(position_scale(&data, Axis::Y, Usage::Reference).is_none());
    }
}
