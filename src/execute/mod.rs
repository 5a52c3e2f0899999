//! Compilation pipeline for ggvega
//!
//! Ties the stages together: the descriptor's data is projected into cleaned
//! rows, layer markers are analyzed into requests, every request is built into
//! a fragment, and the fragments are assembled into one Vega document that the
//! legend augmenter finishes.
//!
//! This module is organized into submodules:
//! - `analyze`: layer marker resolution, parameter checks and title metadata

mod analyze;

// Re-export public API
pub use analyze::{Analysis, Analyzer, Metadata};
pub use crate::plot::layer::JitterMode;

use serde::Deserialize;

use crate::diagnostic::Diagnostic;
use crate::plot::layer::{builder_for, BuildContext, LayerFragment};
use crate::plot::scale::Palette;
use crate::plot::PlotDescriptor;
use crate::reader::project;
use crate::writer::vega::{assemble, legend, VisualizationSpec};
use crate::Result;

// =============================================================================
// Options
// =============================================================================

/// Settings for one compilation
///
/// Every field has a default, so hosts can load partial settings from JSON:
///
/// ```
/// use ggvega::CompileOptions;
///
/// let options: CompileOptions = serde_json::from_str(r#"{"interactive": true}"#).unwrap();
/// assert!(options.interactive);
/// assert_eq!(options.palette, ggvega::Palette::default());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Emit click/shift-select legend interactivity
    pub interactive: bool,
    /// Colors for groups, cycled when there are more groups than colors
    pub palette: Palette,
    pub jitter: JitterMode,
}

impl CompileOptions {
    /// Check the options and return the palette normalized to hex colors
    pub fn validate(&self) -> Result<Palette> {
        self.palette.normalized()
    }
}

/// A finished document plus the notices raised while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub spec: VisualizationSpec,
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Compile a plot descriptor into a Vega specification
///
/// Recoverable problems are reported in `Compiled::diagnostics`. Errors are
/// returned for an invalid palette, an unbound column, or a document that
/// would reference undefined scales or sources.
pub fn compile(descriptor: &PlotDescriptor, options: &CompileOptions) -> Result<Compiled> {
    let palette = options.validate()?;
    let data = project(&descriptor.data, &descriptor.bindings)?;

    let mut diagnostics = Vec::new();
    if data.dropped > 0 {
        tracing::warn!(count = data.dropped, "Dropped rows with missing or non-finite values");
        diagnostics.push(Diagnostic::DroppedRows {
            count: data.dropped,
        });
    }

    let analysis = Analyzer::new(descriptor).analyze();
    diagnostics.extend(analysis.diagnostics);

    let mut fragments: Vec<LayerFragment> = Vec::with_capacity(analysis.requests.len());
    for (layer_idx, request) in analysis.requests.iter().enumerate() {
        let ctx = BuildContext {
            data: &data,
            parameters: &request.parameters,
            layer_idx,
            palette: &palette,
            jitter: options.jitter,
        };
        let fragment = builder_for(request.kind).build(&ctx)?;
        tracing::debug!(
            layer = %request.kind,
            layer_idx,
            marks = fragment.marks.len(),
            scales = fragment.scales.len(),
            "Built layer"
        );
        if fragment.is_empty() {
            let reason = fragment
                .empty_reason
                .clone()
                .unwrap_or_else(|| "no marks produced".to_string());
            tracing::warn!(layer = %request.kind, reason = %reason, "Layer is empty");
            diagnostics.push(Diagnostic::EmptyLayer {
                layer: request.kind,
                reason,
            });
        }
        fragments.push(fragment);
    }

    let assembled = assemble::Assembler::new(&data, &analysis.metadata)
        .with_size(descriptor.width, descriptor.height)
        .assemble(fragments)?;
    diagnostics.extend(assembled.diagnostics);

    let mut spec = assembled.spec;
    legend::augment(
        &mut spec,
        &data,
        analysis.metadata.color_title(),
        options.interactive,
    );

    Ok(Compiled { spec, diagnostics })
}
