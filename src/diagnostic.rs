//! Non-fatal notices collected while compiling a plot
//!
//! Recoverable problems (dirty rows, unknown layer names, bad parameters, scale
//! conflicts) never abort compilation. They are reported alongside the finished
//! document as typed `Diagnostic`s and mirrored as `tracing` events.

use serde::Serialize;

use crate::plot::LayerKind;

/// A recoverable issue found during compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Rows removed because x, y or color was missing or non-finite
    DroppedRows { count: usize },
    /// The descriptor requested no recognizable layer; a point layer was used
    NoLayerDetected,
    /// A layer marker did not resolve to any known layer kind
    UnknownLayer { name: String },
    /// A parameter had the wrong type and was replaced by its default
    InvalidParameter {
        layer: LayerKind,
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A parameter the layer kind does not know was ignored
    UnknownParameter { layer: LayerKind, name: String },
    /// Two layers required incompatible scales under the same name
    ScaleConflict { scale: String, reason: String },
    /// A layer produced no marks for the given data
    EmptyLayer { layer: LayerKind, reason: String },
    /// A point and a regression layer were combined into one regression plot
    MergedRegressionPlot,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DroppedRows { count } => {
                write!(f, "dropped {} row(s) with missing or non-finite values", count)
            }
            Diagnostic::NoLayerDetected => {
                write!(f, "no layer detected, defaulting to a point layer")
            }
            Diagnostic::UnknownLayer { name } => write!(f, "unknown layer '{}' ignored", name),
            Diagnostic::InvalidParameter {
                layer,
                name,
                expected,
                found,
            } => write!(
                f,
                "parameter '{}' of {} expects a {}, found a {}; using the default",
                name, layer, expected, found
            ),
            Diagnostic::UnknownParameter { layer, name } => {
                write!(f, "parameter '{}' is not valid for {}", name, layer)
            }
            Diagnostic::ScaleConflict { scale, reason } => {
                write!(f, "scale '{}' kept its first definition: {}", scale, reason)
            }
            Diagnostic::EmptyLayer { layer, reason } => {
                write!(f, "{} layer is empty: {}", layer, reason)
            }
            Diagnostic::MergedRegressionPlot => {
                write!(f, "point and regression layers merged into a regression plot")
            }
        }
    }
}
