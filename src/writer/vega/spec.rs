//! Vega document model
//!
//! Typed structs that serialize to a Vega v5 specification. Transforms,
//! encoding channels and signal handlers stay as `serde_json::Value` since
//! they are open-ended Vega expressions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::naming;
use crate::plot::scale::ScaleSpec;

/// Encoding channels of one encode set, keyed by channel name
pub type Channels = Map<String, Value>;

/// A complete Vega specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSpec {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<Signal>,
    pub data: Vec<DataSource>,
    pub scales: Vec<ScaleSpec>,
    pub axes: Vec<Axis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legends: Vec<Legend>,
    pub marks: Vec<Mark>,
}

impl VisualizationSpec {
    /// Empty document with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            schema: naming::VEGA_SCHEMA.to_string(),
            title: None,
            width,
            height,
            padding: 5,
            signals: Vec::new(),
            data: Vec::new(),
            scales: Vec::new(),
            axes: Vec::new(),
            legends: Vec::new(),
            marks: Vec::new(),
        }
    }

    /// Look up a scale by name
    pub fn scale(&self, name: &str) -> Option<&ScaleSpec> {
        self.scales.iter().find(|s| s.name == name)
    }

    /// Look up a data source by name
    pub fn data_source(&self, name: &str) -> Option<&DataSource> {
        self.data.iter().find(|d| d.name == name)
    }
}

/// A named data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on: Vec<Value>,
}

impl DataSource {
    /// Source with inline values
    pub fn inline(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values: Some(values),
            source: None,
            transform: Vec::new(),
            on: Vec::new(),
        }
    }

    /// Source derived from another source through transforms
    pub fn derived(name: impl Into<String>, source: impl Into<String>, transform: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values: None,
            source: Some(source.into()),
            transform,
            on: Vec::new(),
        }
    }

    /// Source with neither values nor parent, filled by triggers
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: None,
            source: None,
            transform: Vec::new(),
            on: Vec::new(),
        }
    }

    pub fn with_on(mut self, on: Vec<Value>) -> Self {
        self.on = on;
        self
    }
}

/// Mark types emitted by the builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Symbol,
    Line,
    Rect,
    Rule,
    Area,
    Group,
}

/// Facet partition of a group mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    pub data: String,
    pub groupby: Vec<String>,
}

/// Where a mark reads its data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkFrom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<Facet>,
}

/// Encode sets of a mark
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Encode {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub enter: Channels,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub update: Channels,
}

impl Encode {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty()
    }
}

/// A visual mark, possibly a group containing nested marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<MarkFrom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(default, skip_serializing_if = "Encode::is_empty")]
    pub encode: Encode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Mark {
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            name: None,
            from: None,
            sort: None,
            encode: Encode::default(),
            marks: Vec::new(),
        }
    }

    /// Read rows from a named data source
    pub fn from_data(mut self, data: impl Into<String>) -> Self {
        self.from = Some(MarkFrom {
            data: Some(data.into()),
            facet: None,
        });
        self
    }

    /// Partition a data source into one group per distinct `groupby` tuple
    pub fn from_facet(mut self, name: impl Into<String>, data: impl Into<String>, groupby: &[&str]) -> Self {
        self.from = Some(MarkFrom {
            data: None,
            facet: Some(Facet {
                name: name.into(),
                data: data.into(),
                groupby: groupby.iter().map(|g| g.to_string()).collect(),
            }),
        });
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn sorted_by(mut self, field: &str) -> Self {
        self.sort = Some(serde_json::json!({ "field": naming::datum(field) }));
        self
    }

    /// Set an `enter` channel
    pub fn enter(mut self, channel: &str, value: Value) -> Self {
        self.encode.enter.insert(channel.to_string(), value);
        self
    }

    /// Set an `update` channel
    pub fn update(mut self, channel: &str, value: Value) -> Self {
        self.encode.update.insert(channel.to_string(), value);
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    /// Data source this mark reads directly (facet input for groups)
    pub fn source_data(&self) -> Option<&str> {
        let from = self.from.as_ref()?;
        from.data
            .as_deref()
            .or_else(|| from.facet.as_ref().map(|f| f.data.as_str()))
    }

    /// Facet name this group mark introduces, if any
    pub fn facet_name(&self) -> Option<&str> {
        self.from
            .as_ref()
            .and_then(|f| f.facet.as_ref())
            .map(|f| f.name.as_str())
    }
}

/// Axis orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrient {
    Bottom,
    Left,
}

/// A positional axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub orient: AxisOrient,
    pub scale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A symbol legend bound to the color scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub fill: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<Value>,
}

/// A reactive signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on: Vec<Value>,
}
