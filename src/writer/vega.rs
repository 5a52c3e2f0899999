//! Vega JSON writer implementation
//!
//! Serializes an assembled [`VisualizationSpec`] into Vega v5 JSON text that
//! can be rendered in a browser with vega-embed.
//!
//! # Submodules
//!
//! - `spec`: the typed document model
//! - `assemble`: merging layer fragments into one document
//! - `legend`: color legend and click/shift-select interactivity

pub mod assemble;
pub mod legend;
pub mod spec;

pub use spec::*;

use crate::writer::Writer;
use crate::{GgvegaError, Result};

/// Vega JSON writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VegaWriter {
    /// Indent the output
    pretty: bool,
}

impl VegaWriter {
    /// Create a writer producing indented JSON
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a writer producing single-line JSON
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for VegaWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for VegaWriter {
    type Output = String;

    fn write(&self, spec: &VisualizationSpec) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(spec)
        } else {
            serde_json::to_string(spec)
        };
        json.map_err(|e| GgvegaError::WriterError(format!("Failed to serialize Vega JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_and_compact_agree() {
        let spec = VisualizationSpec::new(400, 300);
        let pretty = VegaWriter::new().write(&spec).unwrap();
        let compact = VegaWriter::compact().write(&spec).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
        let a: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        let b: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_output_round_trips_into_model() {
        let mut spec = VisualizationSpec::new(200, 100);
        spec.title = Some("Counts".to_string());
        let json = VegaWriter::compact().write(&spec).unwrap();
        let parsed: VisualizationSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn test_validate_rejects_empty_size() {
        let spec = VisualizationSpec::new(0, 300);
        let err = VegaWriter::new().validate(&spec).unwrap_err();
        assert!(matches!(err, GgvegaError::WriterError(_)));
    }
}
