//! Plot types for ggvega
//!
//! This module contains the types describing a plot before compilation and the
//! per-layer machinery that turns it into Vega fragments.
//!
//! # Architecture
//!
//! The module is organized into submodules:
//!
//! - `main` - `PlotDescriptor`, `Bindings`, `LayerDecl` and `Labels`
//! - `types` - Value types: `Datum`, `FieldKind`, `ParameterValue`
//! - `layer` - `LayerKind`, `LayerRequest` and the layer builders
//! - `scale` - Scale specs, the scale synthesizer, palettes and colour helpers

pub mod layer;
pub mod main;
pub mod scale;
pub mod types;

// Re-export all types for convenience
pub use layer::*;
pub use main::*;
pub use scale::*;
pub use types::*;
