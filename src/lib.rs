/*!
# ggvega - Grammar of Graphics to Vega

Compiles a declarative plot description (column bindings for x, y and color plus
one or more requested layers) into a complete, layered Vega v5 specification:
data sources with declarative transforms, shared scales, axes, marks, legends and
optional click/shift-select legend interactivity.

## Example

```
use ggvega::{compile, Bindings, CompileOptions, LayerDecl, PlotDescriptor};
use polars::prelude::*;

let df = df! {
    "height" => [1.0, 2.0, 3.0, 4.0],
    "weight" => [10.0, 20.0, 30.0, 40.0],
    "group" => ["A", "A", "B", "B"],
}
.unwrap();

let descriptor = PlotDescriptor::new(df, Bindings::xy("height", "weight").with_color("group"))
    .with_layer(LayerDecl::kind("point"))
    .with_title("Height vs weight");

let compiled = compile(&descriptor, &CompileOptions::default()).unwrap();
assert_eq!(compiled.spec.marks.len(), 1);
assert_eq!(compiled.spec.legends.len(), 1);
```

## Architecture

```text
PlotDescriptor ─▶ reader (projection) ─▶ execute (analysis) ─▶ plot::layer (builders)
                                                                   │
                          Writer ◀─ writer::vega (assembly + legend) ◀┘
```

## Core Components

- [`reader`] - Projects bound columns into cleaned rows
- [`execute`] - Layer analysis and the `compile` pipeline
- [`plot`] - Descriptor types, layer builders and scale synthesis
- [`writer`] - Vega document model, assembly and serialization
*/

pub mod diagnostic;
pub mod execute;
pub mod naming;
pub mod plot;
pub mod reader;
pub mod writer;

// Re-export key types for convenience
pub use diagnostic::Diagnostic;
pub use execute::{compile, CompileOptions, Compiled, JitterMode};
pub use plot::{
    Bindings, Datum, FieldKind, Labels, LayerDecl, LayerKind, LayerRequest, Palette,
    ParameterValue, PlotDescriptor,
};
pub use reader::{DataRow, ProjectedData};
pub use writer::{VegaWriter, VisualizationSpec, Writer};

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum GgvegaError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Data source error: {0}")]
    ReaderError(String),

    #[error("Output generation error: {0}")]
    WriterError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, GgvegaError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use polars::prelude::*;
    use serde_json::Value;

    fn to_json(compiled: &Compiled) -> Value {
        serde_json::to_value(&compiled.spec).unwrap()
    }

    #[test]
    fn test_end_to_end_point_drops_nan_and_pads_x() {
        let df = df! {
            "x" => [1.0, 2.0, 3.0, f64::NAN, 5.0],
            "y" => [10.0, 20.0, 30.0, 40.0, 50.0],
        }
        .unwrap();
        let descriptor =
            PlotDescriptor::new(df, Bindings::xy("x", "y")).with_layer(LayerDecl::kind("point"));

        let compiled = compile(&descriptor, &CompileOptions::default()).unwrap();
        let json = to_json(&compiled);

        assert_eq!(json["$schema"], naming::VEGA_SCHEMA);
        assert_eq!(json["data"][0]["name"], "table");
        assert_eq!(json["data"][0]["values"].as_array().unwrap().len(), 4);
        assert!(compiled
            .diagnostics
            .contains(&Diagnostic::DroppedRows { count: 1 }));

        let xscale = json["scales"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["name"] == "xscale")
            .unwrap();
        let domain = xscale["domain"].as_array().unwrap();
        assert!((domain[0].as_f64().unwrap() - 0.8).abs() < 1e-9);
        assert_eq!(domain[1].as_f64().unwrap(), 5.0);
    }

    #[test]
    fn test_end_to_end_grouped_bar_static_legend() {
        let df = df! {
            "cat" => ["p", "q", "p", "q"],
            "val" => [1.0, 2.0, 3.0, 4.0],
            "grp" => ["A", "A", "B", "B"],
        }
        .unwrap();
        let descriptor =
            PlotDescriptor::new(df, Bindings::xy("cat", "val").with_color("grp"))
                .with_layer(LayerDecl::kind("bar"));

        let compiled = compile(&descriptor, &CompileOptions::default()).unwrap();
        let json = to_json(&compiled);

        let color = json["scales"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["name"] == "color")
            .unwrap();
        assert_eq!(color["domain"], serde_json::json!(["A", "B"]));
        assert_eq!(json["legends"][0]["fill"], "color");
        assert!(json.get("signals").is_none());
    }

    #[test]
    fn test_end_to_end_interactive_legend() {
        let df = df! {
            "x" => [1.0, 2.0, 3.0, 4.0],
            "y" => [1.0, 4.0, 9.0, 16.0],
            "g" => ["A", "A", "B", "B"],
        }
        .unwrap();
        let descriptor = PlotDescriptor::new(df, Bindings::xy("x", "y").with_color("g"))
            .with_layer(LayerDecl::kind("point"));
        let options = CompileOptions {
            interactive: true,
            ..CompileOptions::default()
        };

        let compiled = compile(&descriptor, &options).unwrap();
        let json = to_json(&compiled);

        let signal_names: Vec<&str> = json["signals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(signal_names, vec!["clear", "shift", "clicked"]);
        assert!(json["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|d| d["name"] == "selected"));
        let fill = &json["marks"][0]["encode"]["update"]["fill"];
        assert!(fill[0]["test"].as_str().unwrap().contains("selected"));
    }

    #[test]
    fn test_end_to_end_writer_output_is_stable() {
        let df = df! {
            "v" => [1.0, 2.0, 2.5, 3.0, 7.0],
        }
        .unwrap();
        let descriptor = PlotDescriptor::new(df, Bindings::x_only("v"))
            .with_layer(LayerDecl::kind("histogram").with_param("nbins", 4.0));
        let options = CompileOptions::default();

        let writer = VegaWriter::new();
        let first = writer
            .render(&compile(&descriptor, &options).unwrap())
            .unwrap();
        let second = writer
            .render(&compile(&descriptor, &options).unwrap())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_end_to_end_missing_column_is_reader_error() {
        let df = df! { "a" => [1.0] }.unwrap();
        let descriptor = PlotDescriptor::new(df, Bindings::xy("a", "missing"));
        let err = compile(&descriptor, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, GgvegaError::ReaderError(_)));
    }
}
