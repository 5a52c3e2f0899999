//! Spec assembly
//!
//! Merges the fragments returned by the layer builders into one Vega document:
//!
//! - data: the primary `table` first, then every fragment's auxiliary and
//!   derived sources in request order
//! - marks: concatenated in request order, which is also z-order
//! - scales: folded by name in first-appearance order via [`ScaleSpec::merge`]
//! - axes: bottom on `xscale` and left on `yscale` when those scales exist
//!
//! The finished document is checked for dangling references. A mark reading an
//! undefined source or scale means a builder broke its contract, so it is an
//! internal error rather than something to patch over.

use std::collections::HashSet;

use serde_json::Value;

use super::spec::{Axis, AxisOrient, DataSource, Mark, VisualizationSpec};
use crate::diagnostic::Diagnostic;
use crate::execute::Metadata;
use crate::plot::layer::LayerFragment;
use crate::plot::scale::ScaleSpec;
use crate::plot::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::reader::ProjectedData;
use crate::{naming, GgvegaError, Result};

/// Document plus the diagnostics raised while merging scales
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub spec: VisualizationSpec,
    pub diagnostics: Vec<Diagnostic>,
}

/// Merges layer fragments into a document
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    data: &'a ProjectedData,
    metadata: &'a Metadata,
    width: u32,
    height: u32,
}

impl<'a> Assembler<'a> {
    pub fn new(data: &'a ProjectedData, metadata: &'a Metadata) -> Self {
        Self {
            data,
            metadata,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn assemble(&self, fragments: Vec<LayerFragment>) -> Result<Assembled> {
        let mut spec = VisualizationSpec::new(self.width, self.height);
        spec.title = self.metadata.title.clone();
        spec.data
            .push(DataSource::inline(naming::TABLE_DATA, self.data.values()));

        let mut diagnostics = Vec::new();
        let mut x_default = None;
        let mut y_default = None;

        for fragment in fragments {
            for source in fragment.aux_data.into_iter().chain(fragment.derived_data) {
                if spec.data_source(&source.name).is_some() {
                    return Err(GgvegaError::InternalError(format!(
                        "Data source '{}' is defined twice",
                        source.name
                    )));
                }
                spec.data.push(source);
            }
            for scale in fragment.scales {
                merge_scale(&mut spec.scales, scale, &mut diagnostics);
            }
            spec.marks.extend(fragment.marks);
            x_default = x_default.or(fragment.axis_titles.x);
            y_default = y_default.or(fragment.axis_titles.y);
        }

        if spec.scale(naming::X_SCALE).is_some() {
            spec.axes.push(Axis {
                orient: AxisOrient::Bottom,
                scale: naming::X_SCALE.to_string(),
                title: Some(self.metadata.x_title(x_default.as_deref())),
            });
        }
        if spec.scale(naming::Y_SCALE).is_some() {
            spec.axes.push(Axis {
                orient: AxisOrient::Left,
                scale: naming::Y_SCALE.to_string(),
                title: self.metadata.y_title(y_default.as_deref()),
            });
        }

        check_references(&spec)?;
        Ok(Assembled { spec, diagnostics })
    }
}

/// Fold `scale` into the list, keeping the first definition on a conflict
fn merge_scale(scales: &mut Vec<ScaleSpec>, scale: ScaleSpec, diagnostics: &mut Vec<Diagnostic>) {
    let Some(idx) = scales.iter().position(|s| s.name == scale.name) else {
        scales.push(scale);
        return;
    };
    if let Err(reason) = scales[idx].merge(&scale) {
        tracing::warn!(scale = %scale.name, reason = %reason, "Scale conflict");
        diagnostics.push(Diagnostic::ScaleConflict {
            scale: scale.name,
            reason,
        });
    }
}

// =============================================================================
// Reference check
// =============================================================================

fn dangling(kind: &str, name: &str) -> GgvegaError {
    GgvegaError::InternalError(format!("Reference to undefined {} '{}'", kind, name))
}

/// Every source and scale named anywhere in the document must be defined
pub fn check_references(spec: &VisualizationSpec) -> Result<()> {
    let scales: HashSet<&str> = spec.scales.iter().map(|s| s.name.as_str()).collect();

    let mut defined: HashSet<&str> = HashSet::new();
    for source in &spec.data {
        if let Some(parent) = source.source.as_deref() {
            if !defined.contains(parent) {
                return Err(dangling("data source", parent));
            }
        }
        for transform in &source.transform {
            if let Some(from) = transform.get("from").and_then(Value::as_str) {
                if !defined.contains(from) {
                    return Err(dangling("data source", from));
                }
            }
        }
        defined.insert(source.name.as_str());
    }

    for scale in &spec.scales {
        for data in scale.domain.data_refs() {
            if !defined.contains(data.as_str()) {
                return Err(dangling("data source", &data));
            }
        }
    }

    for axis in &spec.axes {
        if !scales.contains(axis.scale.as_str()) {
            return Err(dangling("scale", &axis.scale));
        }
    }

    let in_scope: Vec<&str> = Vec::new();
    for mark in &spec.marks {
        check_mark(mark, &defined, &in_scope, &scales)?;
    }
    Ok(())
}

fn check_mark<'a>(
    mark: &'a Mark,
    data: &HashSet<&str>,
    facets: &[&'a str],
    scales: &HashSet<&str>,
) -> Result<()> {
    if let Some(source) = mark.source_data() {
        if !data.contains(source) && !facets.contains(&source) {
            return Err(dangling("data source", source));
        }
    }
    for value in mark.encode.enter.values().chain(mark.encode.update.values()) {
        check_value(value, scales)?;
    }

    let mut nested = facets.to_vec();
    if let Some(facet) = mark.facet_name() {
        nested.push(facet);
    }
    for child in &mark.marks {
        check_mark(child, data, &nested, scales)?;
    }
    Ok(())
}

/// Scale names in `{"scale": ..}` references and in signal expressions
fn check_value(value: &Value, scales: &HashSet<&str>) -> Result<()> {
    match value {
        Value::Object(map) => {
            if let Some(scale) = map.get("scale").and_then(Value::as_str) {
                if !scales.contains(scale) {
                    return Err(dangling("scale", scale));
                }
            }
            if let Some(signal) = map.get("signal").and_then(Value::as_str) {
                for scale in expression_scales(signal) {
                    if !scales.contains(scale) {
                        return Err(dangling("scale", scale));
                    }
                }
            }
            map.values().try_for_each(|v| check_value(v, scales))
        }
        Value::Array(items) => items.iter().try_for_each(|v| check_value(v, scales)),
        _ => Ok(()),
    }
}

/// Scale names passed to `scale('..')` and `bandwidth('..')` in an expression
fn expression_scales(expr: &str) -> Vec<&str> {
    let mut names = Vec::new();
    for call in ["scale('", "bandwidth('"] {
        let mut rest = expr;
        while let Some(start) = rest.find(call) {
            let tail = &rest[start + call.len()..];
            let Some(end) = tail.find('\'') else {
                break;
            };
            names.push(&tail[..end]);
            rest = &tail[end..];
        }
    }
    names
}
