//! Layer builder trait and implementations
//!
//! Each layer kind is built by its own unit struct implementing
//! [`LayerBuilder`]. A builder is a pure function from a [`BuildContext`]
//! (cleaned rows, normalized parameters, layer index, palette, jitter mode) to
//! a [`LayerFragment`]: marks, the scales they need, and the data sources they
//! read. Builders never see each other's fragments; the assembler merges them.
//!
//! # Architecture
//!
//! - `LayerKind`: closed enum, one variant per buildable layer
//! - `LayerBuilder`: trait defining builder behavior
//! - `builder_for`: exhaustive dispatch from kind to builder
//!
//! # Example
//!
//! ```
//! use ggvega::plot::layer::{builder_for, LayerKind};
//!
//! let builder = builder_for(LayerKind::Histogram);
//! assert_eq!(builder.kind(), LayerKind::Histogram);
//! assert!(builder.default_params().iter().any(|p| p.name == "nbins"));
//! ```

use crate::Result;

pub mod types;

// Builder implementations
mod bar;
mod bin2d;
mod boxplot;
mod corner;
mod density;
mod ellipse;
mod histogram;
mod interval;
mod line;
mod point;
mod polygon;
mod qq;
mod raster;
mod refline;
mod regression;
mod smooth;
mod summary;
mod violin;

// Re-export types
pub use types::{
    AxisTitles, BandPlacement, BuildContext, DefaultParam, DefaultParamValue, JitterMode,
    LayerFragment,
};

// Re-export builder structs for direct access if needed
pub use bar::Bar;
pub use bin2d::Histogram2d;
pub use boxplot::Boxplot;
pub use corner::CornerHistogram;
pub use density::Density;
pub use ellipse::Ellipse;
pub use histogram::Histogram;
pub use interval::Interval;
pub use line::Line;
pub use point::{Jitter, Point, Swarm};
pub use polygon::Polygon;
pub use qq::Qq;
pub use raster::Raster;
pub use refline::ReferenceLine;
pub use regression::{Regression, RegressionPlot};
pub use smooth::Smoothing;
pub use summary::Summary;
pub use violin::Violin;

use super::LayerKind;

/// Core trait for layer builders
pub trait LayerBuilder: std::fmt::Debug + Send + Sync {
    /// Returns which layer kind this builder produces
    fn kind(&self) -> LayerKind;

    /// Returns parameters with their default values.
    ///
    /// The analyzer fills in missing parameters from this list and rejects
    /// names that are not on it.
    fn default_params(&self) -> &'static [DefaultParam] {
        &[]
    }

    /// Build the layer's fragment
    ///
    /// Degenerate input (no rows, a missing or wrongly typed field) yields
    /// `LayerFragment::empty` rather than an error.
    fn build(&self, ctx: &BuildContext) -> Result<LayerFragment>;
}

/// Builder for a layer kind
pub fn builder_for(kind: LayerKind) -> &'static dyn LayerBuilder {
    match kind {
        LayerKind::Point => &Point,
        LayerKind::Line => &Line,
        LayerKind::Bar => &Bar,
        LayerKind::Jitter => &Jitter,
        LayerKind::Swarm => &Swarm,
        LayerKind::Raster => &Raster,
        LayerKind::Interval => &Interval,
        LayerKind::ReferenceLine => &ReferenceLine,
        LayerKind::Polygon => &Polygon,
        LayerKind::Regression => &Regression,
        LayerKind::Smoothing => &Smoothing,
        LayerKind::Histogram => &Histogram,
        LayerKind::Density => &Density,
        LayerKind::Violin => &Violin,
        LayerKind::Boxplot => &Boxplot,
        LayerKind::Summary => &Summary,
        LayerKind::Qq => &Qq,
        LayerKind::Histogram2d => &Histogram2d,
        LayerKind::Ellipse => &Ellipse,
        LayerKind::CornerHistogram => &CornerHistogram,
        LayerKind::RegressionPlot => &RegressionPlot,
    }
}

/// Reasons shared by several builders for producing an empty fragment
pub(crate) mod reasons {
    pub const NO_ROWS: &str = "no rows left after cleaning";
    pub const NEEDS_Y: &str = "requires a y binding";
    pub const NEEDS_NUMERIC_X: &str = "requires a numeric x field";
    pub const NEEDS_NUMERIC_Y: &str = "requires a numeric y field";
}
