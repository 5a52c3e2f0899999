//! Plot descriptor handed to the compiler by the host plotting library
//!
//! # Descriptor Structure
//!
//! ```text
//! PlotDescriptor
//! ├─ data: DataFrame          (raw columns, numeric or label)
//! ├─ bindings: Bindings       (x, optional y, optional color column names)
//! ├─ layers: Vec<LayerDecl>   (requested layers, direct or handle-indexed)
//! ├─ handles: Vec<String>     (handle table resolving LayerDecl::Handle indices)
//! ├─ labels: Labels           (title and axis/legend titles)
//! └─ width, height            (output dimensions in pixels)
//! ```
//!
//! The descriptor is read-only to the compiler.

use crate::DataFrame;
use serde::{Deserialize, Serialize};

use super::types::{ParameterValue, Parameters};

/// Default output width in pixels
pub const DEFAULT_WIDTH: u32 = 400;

/// Default output height in pixels
pub const DEFAULT_HEIGHT: u32 = 300;

/// Field bindings: which data frame column feeds each aesthetic
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bindings {
    pub x: String,
    pub y: Option<String>,
    pub color: Option<String>,
}

impl Bindings {
    /// Bind x and y columns
    pub fn xy(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: Some(y.into()),
            color: None,
        }
    }

    /// Bind only an x column (distribution layers such as histograms)
    pub fn x_only(x: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: None,
            color: None,
        }
    }

    /// Add a color/grouping column
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A layer marker as found on the host's plot object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerDecl {
    /// Layer named directly (e.g. `"histogram"`)
    Direct {
        kind: String,
        #[serde(default)]
        params: Parameters,
    },
    /// Layer referenced through the descriptor's handle table
    Handle {
        handle: usize,
        #[serde(default)]
        params: Parameters,
    },
}

impl LayerDecl {
    /// Declare a layer by name
    pub fn kind(kind: impl Into<String>) -> Self {
        LayerDecl::Direct {
            kind: kind.into(),
            params: Parameters::new(),
        }
    }

    /// Declare a layer by handle index
    pub fn handle(handle: usize) -> Self {
        LayerDecl::Handle {
            handle,
            params: Parameters::new(),
        }
    }

    /// Attach a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        match &mut self {
            LayerDecl::Direct { params, .. } | LayerDecl::Handle { params, .. } => {
                params.insert(name.into(), value.into());
            }
        }
        self
    }

    /// Parameters declared with this marker
    pub fn params(&self) -> &Parameters {
        match self {
            LayerDecl::Direct { params, .. } | LayerDecl::Handle { params, .. } => params,
        }
    }
}

/// Text labels for the title, axes and legend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Labels {
    pub title: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
}

/// Complete plot description produced by the host
#[derive(Debug, Clone)]
pub struct PlotDescriptor {
    /// Raw data columns
    pub data: DataFrame,
    /// Column bindings for x, y and color
    pub bindings: Bindings,
    /// Requested layers in declaration order
    pub layers: Vec<LayerDecl>,
    /// Handle table for handle-indexed layers
    pub handles: Vec<String>,
    /// Title and axis labels
    pub labels: Labels,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

impl PlotDescriptor {
    /// Create a descriptor with no layers and default dimensions
    pub fn new(data: DataFrame, bindings: Bindings) -> Self {
        Self {
            data,
            bindings,
            layers: Vec::new(),
            handles: Vec::new(),
            labels: Labels::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Add a requested layer
    pub fn with_layer(mut self, layer: LayerDecl) -> Self {
        self.layers.push(layer);
        self
    }

    /// Register a handle-indexed layer kind, returning the descriptor and the handle index
    pub fn with_handle(mut self, kind: impl Into<String>) -> (Self, usize) {
        self.handles.push(kind.into());
        let idx = self.handles.len() - 1;
        (self, idx)
    }

    /// Set the plot title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.labels.title = Some(title.into());
        self
    }

    /// Set all labels at once
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Set output dimensions
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Check if the descriptor declares any layers
    pub fn has_layers(&self) -> bool {
        !self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_layer_decl_deserializes_direct_and_handle() {
        let decls: Vec<LayerDecl> = serde_json::from_str(
            r#"[{"kind": "histogram", "params": {"nbins": 12}}, {"handle": 0}]"#,
        )
        .unwrap();
        assert_eq!(
            decls[0],
            LayerDecl::kind("histogram").with_param("nbins", 12.0)
        );
        assert_eq!(decls[1], LayerDecl::handle(0));
    }

    #[test]
    fn test_descriptor_builder() {
        let df = df! { "a" => [1.0, 2.0], "b" => [3.0, 4.0] }.unwrap();
        let (desc, idx) = PlotDescriptor::new(df, Bindings::xy("a", "b"))
            .with_title("T")
            .with_size(640, 480)
            .with_handle("regression");
        let desc = desc.with_layer(LayerDecl::handle(idx));

        assert_eq!(idx, 0);
        assert_eq!(desc.labels.title.as_deref(), Some("T"));
        assert_eq!((desc.width, desc.height), (640, 480));
        assert!(desc.has_layers());
        assert_eq!(desc.handles, vec!["regression".to_string()]);
    }

    #[test]
    fn test_bindings_helpers() {
        let b = Bindings::x_only("v").with_color("g");
        assert_eq!(b.x, "v");
        assert_eq!(b.y, None);
        assert_eq!(b.color.as_deref(), Some("g"));
    }
}
