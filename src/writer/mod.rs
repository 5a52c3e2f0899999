//! Output writer abstraction layer for ggvega
//!
//! The writer module holds the Vega document model, the assembly of layer
//! fragments into one document, and a pluggable interface for turning a
//! finished document into output.
//!
//! # Architecture
//!
//! All writers implement the `Writer` trait, which provides:
//! - Spec → Output conversion
//! - Validation for writer compatibility
//! - A `render` entry point taking the result of [`crate::compile`]
//!
//! # Example
//!
//! ```
//! use ggvega::{compile, Bindings, CompileOptions, LayerDecl, PlotDescriptor};
//! use ggvega::writer::{VegaWriter, Writer};
//! use polars::prelude::*;
//!
//! let df = df! { "a" => [1.0, 2.0], "b" => [3.0, 4.0] }.unwrap();
//! let descriptor = PlotDescriptor::new(df, Bindings::xy("a", "b"))
//!     .with_layer(LayerDecl::kind("line"));
//! let compiled = compile(&descriptor, &CompileOptions::default()).unwrap();
//!
//! let json = VegaWriter::compact().render(&compiled).unwrap();
//! assert!(json.starts_with("{\"$schema\""));
//! ```

use crate::execute::Compiled;
use crate::{naming, GgvegaError, Result};

pub mod vega;

pub use vega::{VegaWriter, VisualizationSpec};

/// Trait for visualization output writers
///
/// Writers take a finished Vega document and produce formatted output
/// (JSON text, bytes, a handle to a rendered view, etc.).
///
/// # Associated Types
///
/// * `Output` - The type returned by `write()` and `render()`.
pub trait Writer {
    /// The output type produced by this writer.
    type Output;

    /// Generate output from a Vega document
    ///
    /// # Errors
    ///
    /// Returns `GgvegaError::WriterError` if output generation fails.
    fn write(&self, spec: &VisualizationSpec) -> Result<Self::Output>;

    /// Validate that a document is compatible with this writer
    ///
    /// The default accepts any Vega v5 document with a non-zero size.
    fn validate(&self, spec: &VisualizationSpec) -> Result<()> {
        if spec.schema != naming::VEGA_SCHEMA {
            return Err(GgvegaError::WriterError(format!(
                "Unsupported schema '{}'",
                spec.schema
            )));
        }
        if spec.width == 0 || spec.height == 0 {
            return Err(GgvegaError::WriterError(format!(
                "Document size {}x{} is empty",
                spec.width, spec.height
            )));
        }
        Ok(())
    }

    /// Render a compilation result
    ///
    /// Diagnostics stay with the caller; only the document is written.
    fn render(&self, compiled: &Compiled) -> Result<Self::Output> {
        self.validate(&compiled.spec)?;
        self.write(&compiled.spec)
    }
}
