//! Layer analysis
//!
//! Turns the layer markers of a descriptor into normalized `LayerRequest`s:
//!
//! - resolves direct and handle-indexed markers to a `LayerKind`
//! - validates parameters against the kind's defaults and fills in the rest
//! - merges the first point and first regression into one regression plot
//! - falls back to a single point layer when nothing was recognized
//!
//! Every recoverable problem becomes a `Diagnostic`; analysis never fails.

use crate::diagnostic::Diagnostic;
use crate::plot::{LayerDecl, LayerKind, LayerRequest, Parameters, PlotDescriptor};

// =============================================================================
// Metadata
// =============================================================================

/// Titles for the document, axes and legend
///
/// Explicit labels win over defaults declared by layers, which win over the
/// bound column names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub color_label: Option<String>,
    pub x_column: String,
    pub y_column: Option<String>,
    pub color_column: Option<String>,
}

impl Metadata {
    pub fn from_descriptor(descriptor: &PlotDescriptor) -> Self {
        let labels = &descriptor.labels;
        Self {
            title: labels.title.clone(),
            x_label: labels.x.clone(),
            y_label: labels.y.clone(),
            color_label: labels.color.clone(),
            x_column: descriptor.bindings.x.clone(),
            y_column: descriptor.bindings.y.clone(),
            color_column: descriptor.bindings.color.clone(),
        }
    }

    /// Title of the bottom axis
    pub fn x_title(&self, layer_default: Option<&str>) -> String {
        self.x_label
            .clone()
            .or_else(|| layer_default.map(str::to_string))
            .unwrap_or_else(|| self.x_column.clone())
    }

    /// Title of the left axis, if there is anything to call it
    pub fn y_title(&self, layer_default: Option<&str>) -> Option<String> {
        self.y_label
            .clone()
            .or_else(|| layer_default.map(str::to_string))
            .or_else(|| self.y_column.clone())
    }

    /// Title of the color legend
    pub fn color_title(&self) -> Option<String> {
        self.color_label.clone().or_else(|| self.color_column.clone())
    }
}

// =============================================================================
// Analyzer
// =============================================================================

/// Result of analyzing a descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Requests in descriptor order
    pub requests: Vec<LayerRequest>,
    pub metadata: Metadata,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scans a descriptor for layer markers
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    descriptor: &'a PlotDescriptor,
}

impl<'a> Analyzer<'a> {
    pub fn new(descriptor: &'a PlotDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn analyze(&self) -> Analysis {
        let mut diagnostics = Vec::new();
        let mut requests = Vec::new();

        for decl in &self.descriptor.layers {
            let Some(kind) = self.resolve(decl, &mut diagnostics) else {
                continue;
            };
            requests.push(normalize(kind, decl.params(), &mut diagnostics));
        }

        merge_regression_plot(&mut requests, &mut diagnostics);

        if requests.is_empty() {
            tracing::info!("No layer detected, defaulting to point");
            diagnostics.push(Diagnostic::NoLayerDetected);
            requests.push(LayerRequest::new(LayerKind::Point));
        }

        Analysis {
            requests,
            metadata: Metadata::from_descriptor(self.descriptor),
            diagnostics,
        }
    }

    fn resolve(&self, decl: &LayerDecl, diagnostics: &mut Vec<Diagnostic>) -> Option<LayerKind> {
        let name = match decl {
            LayerDecl::Direct { kind, .. } => kind.clone(),
            LayerDecl::Handle { handle, .. } => match self.descriptor.handles.get(*handle) {
                Some(name) => name.clone(),
                None => {
                    let name = format!("handle #{}", handle);
                    tracing::warn!(handle, "Layer handle out of range");
                    diagnostics.push(Diagnostic::UnknownLayer { name });
                    return None;
                }
            },
        };
        let kind = LayerKind::from_name(&name);
        if kind.is_none() {
            tracing::warn!(layer = %name, "Unknown layer ignored");
            diagnostics.push(Diagnostic::UnknownLayer { name });
        }
        kind
    }
}

/// Request with declared parameters checked against the kind's defaults
fn normalize(kind: LayerKind, declared: &Parameters, diagnostics: &mut Vec<Diagnostic>) -> LayerRequest {
    let mut request = LayerRequest::new(kind);
    let defaults = kind.default_params();

    let mut names: Vec<&String> = declared.keys().collect();
    names.sort();
    for name in names {
        let value = &declared[name];
        match defaults.iter().find(|p| p.name == name.as_str()) {
            None => {
                tracing::warn!(layer = %kind, parameter = %name, "Unknown parameter ignored");
                diagnostics.push(Diagnostic::UnknownParameter {
                    layer: kind,
                    name: name.clone(),
                });
            }
            Some(param) if param.default.accepts(value) => {
                request.parameters.insert(name.clone(), value.clone());
            }
            Some(param) => {
                tracing::warn!(
                    layer = %kind,
                    parameter = %name,
                    "Parameter has the wrong type, using the default"
                );
                diagnostics.push(Diagnostic::InvalidParameter {
                    layer: kind,
                    name: name.clone(),
                    expected: param.default.type_name(),
                    found: value.type_name(),
                });
            }
        }
    }
    request
}

/// Replace the first point and first regression with one regression plot
///
/// The merged request sits at the earlier of the two positions. Point
/// parameters carry over; regression parameters win on a clash.
fn merge_regression_plot(requests: &mut Vec<LayerRequest>, diagnostics: &mut Vec<Diagnostic>) {
    let point = requests.iter().position(|r| r.kind == LayerKind::Point);
    let regression = requests.iter().position(|r| r.kind == LayerKind::Regression);
    let (Some(point), Some(regression)) = (point, regression) else {
        return;
    };

    let mut parameters = requests[point].parameters.clone();
    parameters.extend(requests[regression].parameters.clone());
    let merged = LayerRequest {
        kind: LayerKind::RegressionPlot,
        parameters,
    };

    let (first, second) = if point < regression {
        (point, regression)
    } else {
        (regression, point)
    };
    requests.remove(second);
    requests[first] = merged;

    tracing::info!("Merged point and regression layers into a regression plot");
    diagnostics.push(Diagnostic::MergedRegressionPlot);
}
