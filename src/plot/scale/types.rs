//! Scale specification types
//!
//! A `ScaleSpec` serializes directly as a Vega scale definition. Layers each
//! declare the scales they need; the assembler folds same-named scales together
//! with [`ScaleSpec::merge`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::plot::types::Datum;

/// Kind of a scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Numeric position
    #[serde(rename = "linear")]
    Continuous,
    /// Category bands
    #[serde(rename = "band")]
    Banded,
    /// Discrete value-to-value mapping (colors)
    #[serde(rename = "ordinal")]
    Ordinal,
}

impl std::fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScaleKind::Continuous => "linear",
            ScaleKind::Banded => "band",
            ScaleKind::Ordinal => "ordinal",
        };
        write!(f, "{}", s)
    }
}

/// Reference to one field of a data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub data: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(data: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            field: field.into(),
        }
    }
}

/// Where a scale's domain comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainSource {
    /// Explicit numeric extent `[lo, hi]`
    Extent([f64; 2]),
    /// Explicit list of values
    Values(Vec<Datum>),
    /// A single data field
    Field(FieldRef),
    /// Several data fields, possibly across sources
    Fields { fields: Vec<FieldRef> },
}

impl DomainSource {
    fn representation(&self) -> &'static str {
        match self {
            DomainSource::Extent(_) => "extent",
            DomainSource::Values(_) => "value list",
            DomainSource::Field(_) | DomainSource::Fields { .. } => "field reference",
        }
    }

    fn field_refs(&self) -> Vec<FieldRef> {
        match self {
            DomainSource::Field(f) => vec![f.clone()],
            DomainSource::Fields { fields } => fields.clone(),
            _ => Vec::new(),
        }
    }

    /// Union two domains of the same representation
    ///
    /// Returns a description of the mismatch when the representations differ.
    pub fn union(&self, other: &DomainSource) -> std::result::Result<DomainSource, String> {
        match (self, other) {
            (DomainSource::Extent([a0, a1]), DomainSource::Extent([b0, b1])) => {
                Ok(DomainSource::Extent([a0.min(*b0), a1.max(*b1)]))
            }
            (DomainSource::Values(a), DomainSource::Values(b)) => {
                let mut merged = a.clone();
                for v in b {
                    if !merged.contains(v) {
                        merged.push(v.clone());
                    }
                }
                Ok(DomainSource::Values(merged))
            }
            (
                DomainSource::Field(_) | DomainSource::Fields { .. },
                DomainSource::Field(_) | DomainSource::Fields { .. },
            ) => {
                let mut fields = self.field_refs();
                for f in other.field_refs() {
                    if !fields.contains(&f) {
                        fields.push(f);
                    }
                }
                if fields.len() == 1 {
                    Ok(DomainSource::Field(fields.remove(0)))
                } else {
                    Ok(DomainSource::Fields { fields })
                }
            }
            _ => Err(format!(
                "cannot combine a {} domain with a {} domain",
                self.representation(),
                other.representation()
            )),
        }
    }

    /// Data sources this domain reads from
    pub fn data_refs(&self) -> Vec<String> {
        self.field_refs().into_iter().map(|f| f.data).collect()
    }
}

/// Output range of a scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleRange {
    /// A named Vega range such as `"width"` or `"height"`
    Named(String),
    /// Explicit output values (colors, pixel extents, signal objects)
    Values(Vec<Value>),
}

impl ScaleRange {
    pub fn width() -> Self {
        ScaleRange::Named("width".to_string())
    }

    pub fn height() -> Self {
        ScaleRange::Named("height".to_string())
    }

    /// Explicit color list
    pub fn colors(colors: &[String]) -> Self {
        ScaleRange::Values(colors.iter().map(|c| json!(c)).collect())
    }

    /// Pixel span from zero to a signal expression
    pub fn to_signal(expr: impl Into<String>) -> Self {
        ScaleRange::Values(vec![json!(0), json!({ "signal": expr.into() })])
    }

    /// Fixed pixel span
    pub fn span(lo: f64, hi: f64) -> Self {
        ScaleRange::Values(vec![json!(lo), json!(hi)])
    }
}

/// A named scale definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ScaleKind,
    pub domain: DomainSource,
    pub range: ScaleRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,
}

impl ScaleSpec {
    pub fn new(
        name: impl Into<String>,
        kind: ScaleKind,
        domain: DomainSource,
        range: ScaleRange,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            domain,
            range,
            padding: None,
            zero: None,
            nice: None,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn with_zero(mut self, zero: bool) -> Self {
        self.zero = Some(zero);
        self
    }

    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = Some(nice);
        self
    }

    /// Fold another definition of the same scale into this one
    ///
    /// Domains are unioned and `zero`/`nice` are OR-ed. On a kind or domain
    /// mismatch `self` is left unchanged and the reason is returned.
    pub fn merge(&mut self, other: &ScaleSpec) -> std::result::Result<(), String> {
        if self.kind != other.kind {
            return Err(format!(
                "kind {} conflicts with kind {}",
                self.kind, other.kind
            ));
        }
        self.domain = self.domain.union(&other.domain)?;
        self.zero = or_flag(self.zero, other.zero);
        self.nice = or_flag(self.nice, other.nice);
        if self.padding.is_none() {
            self.padding = other.padding;
        }
        Ok(())
    }
}

fn or_flag(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(false) || b.unwrap_or(false)),
    }
}
