//! Layer requests for ggvega plots
//!
//! This module defines the closed set of layer kinds the compiler knows how to
//! build and the normalized `LayerRequest` the analyzer produces for each
//! layer marker found on a plot descriptor.

use serde::{Deserialize, Serialize};

pub mod geom;

pub use geom::{
    builder_for, BuildContext, DefaultParam, DefaultParamValue, JitterMode, LayerBuilder,
    LayerFragment,
};

use crate::plot::types::{ParameterValue, Parameters};

/// Every layer kind the compiler can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Point,
    Line,
    Bar,
    Jitter,
    Swarm,
    Raster,
    Interval,
    ReferenceLine,
    Polygon,
    Regression,
    Smoothing,
    Histogram,
    Density,
    Violin,
    Boxplot,
    Summary,
    Qq,
    #[serde(rename = "2d-histogram")]
    Histogram2d,
    Ellipse,
    CornerHistogram,
    /// Points plus a fitted line sharing one source; produced by the analyzer only
    RegressionPlot,
}

/// Recognized marker names and their layer kinds
const KIND_ALIASES: &[(&str, LayerKind)] = &[
    ("point", LayerKind::Point),
    ("points", LayerKind::Point),
    ("scatter", LayerKind::Point),
    ("geom_point", LayerKind::Point),
    ("line", LayerKind::Line),
    ("lines", LayerKind::Line),
    ("geom_line", LayerKind::Line),
    ("bar", LayerKind::Bar),
    ("col", LayerKind::Bar),
    ("geom_bar", LayerKind::Bar),
    ("geom_col", LayerKind::Bar),
    ("jitter", LayerKind::Jitter),
    ("strip", LayerKind::Jitter),
    ("geom_jitter", LayerKind::Jitter),
    ("swarm", LayerKind::Swarm),
    ("beeswarm", LayerKind::Swarm),
    ("raster", LayerKind::Raster),
    ("rug", LayerKind::Raster),
    ("interval", LayerKind::Interval),
    ("crossbar", LayerKind::Interval),
    ("range", LayerKind::Interval),
    ("reference-line", LayerKind::ReferenceLine),
    ("refline", LayerKind::ReferenceLine),
    ("hline", LayerKind::ReferenceLine),
    ("vline", LayerKind::ReferenceLine),
    ("abline", LayerKind::ReferenceLine),
    ("polygon", LayerKind::Polygon),
    ("geom_polygon", LayerKind::Polygon),
    ("regression", LayerKind::Regression),
    ("glm", LayerKind::Regression),
    ("lm", LayerKind::Regression),
    ("fit", LayerKind::Regression),
    ("smoothing", LayerKind::Smoothing),
    ("smooth", LayerKind::Smoothing),
    ("loess", LayerKind::Smoothing),
    ("lowess", LayerKind::Smoothing),
    ("histogram", LayerKind::Histogram),
    ("hist", LayerKind::Histogram),
    ("stat_bin", LayerKind::Histogram),
    ("density", LayerKind::Density),
    ("kde", LayerKind::Density),
    ("stat_density", LayerKind::Density),
    ("violin", LayerKind::Violin),
    ("boxplot", LayerKind::Boxplot),
    ("box", LayerKind::Boxplot),
    ("summary", LayerKind::Summary),
    ("stat_summary", LayerKind::Summary),
    ("pointrange", LayerKind::Summary),
    ("qq", LayerKind::Qq),
    ("stat_qq", LayerKind::Qq),
    ("2d-histogram", LayerKind::Histogram2d),
    ("bin2d", LayerKind::Histogram2d),
    ("hist2d", LayerKind::Histogram2d),
    ("heatmap", LayerKind::Histogram2d),
    ("ellipse", LayerKind::Ellipse),
    ("stat_ellipse", LayerKind::Ellipse),
    ("corner-histogram", LayerKind::CornerHistogram),
    ("marginal", LayerKind::CornerHistogram),
    ("corner_hist", LayerKind::CornerHistogram),
];

impl LayerKind {
    /// Resolve a marker name (case-insensitive, `-`/`_` interchangeable)
    pub fn from_name(name: &str) -> Option<LayerKind> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        KIND_ALIASES
            .iter()
            .find(|(alias, _)| alias.replace('_', "-") == normalized)
            .map(|(_, kind)| *kind)
    }

    /// Default parameters of this kind
    pub fn default_params(&self) -> &'static [DefaultParam] {
        builder_for(*self).default_params()
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LayerKind::Point => "point",
            LayerKind::Line => "line",
            LayerKind::Bar => "bar",
            LayerKind::Jitter => "jitter",
            LayerKind::Swarm => "swarm",
            LayerKind::Raster => "raster",
            LayerKind::Interval => "interval",
            LayerKind::ReferenceLine => "reference-line",
            LayerKind::Polygon => "polygon",
            LayerKind::Regression => "regression",
            LayerKind::Smoothing => "smoothing",
            LayerKind::Histogram => "histogram",
            LayerKind::Density => "density",
            LayerKind::Violin => "violin",
            LayerKind::Boxplot => "boxplot",
            LayerKind::Summary => "summary",
            LayerKind::Qq => "qq",
            LayerKind::Histogram2d => "2d-histogram",
            LayerKind::Ellipse => "ellipse",
            LayerKind::CornerHistogram => "corner-histogram",
            LayerKind::RegressionPlot => "regression-plot",
        };
        write!(f, "{}", s)
    }
}

/// A normalized layer request produced by the analyzer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerRequest {
    pub kind: LayerKind,
    /// Parameters with defaults filled in
    pub parameters: Parameters,
}

impl LayerRequest {
    /// Create a request with the kind's default parameters
    pub fn new(kind: LayerKind) -> Self {
        let parameters = kind
            .default_params()
            .iter()
            .map(|p| (p.name.to_string(), p.default.to_parameter()))
            .collect();
        Self { kind, parameters }
    }

    /// Get a parameter value
    pub fn param(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(LayerKind::from_name("scatter"), Some(LayerKind::Point));
        assert_eq!(LayerKind::from_name("geom_point"), Some(LayerKind::Point));
        assert_eq!(LayerKind::from_name("Stat_Bin"), Some(LayerKind::Histogram));
        assert_eq!(LayerKind::from_name("bin2d"), Some(LayerKind::Histogram2d));
        assert_eq!(
            LayerKind::from_name("corner_histogram"),
            Some(LayerKind::CornerHistogram)
        );
        assert_eq!(LayerKind::from_name("glm"), Some(LayerKind::Regression));
        assert_eq!(LayerKind::from_name("sankey"), None);
    }

    #[test]
    fn test_regression_plot_is_not_addressable_by_name() {
        assert_eq!(LayerKind::from_name("regression-plot"), None);
    }

    #[test]
    fn test_display_round_trips_through_from_name() {
        for (_, kind) in KIND_ALIASES {
            let name = kind.to_string();
            assert_eq!(LayerKind::from_name(&name), Some(*kind));
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&LayerKind::Histogram2d).unwrap(),
            "\"2d-histogram\""
        );
        assert_eq!(
            serde_json::to_string(&LayerKind::ReferenceLine).unwrap(),
            "\"reference-line\""
        );
    }

    #[test]
    fn test_request_has_defaults() {
        let request = LayerRequest::new(LayerKind::Histogram);
        assert_eq!(request.param("nbins"), Some(&ParameterValue::Number(30.0)));
    }
}
