//! Core types for the layer builders
//!
//! These types are shared by all builder implementations: parameter defaults,
//! the build context, the fragment a builder returns, and the small encoding
//! helpers every builder uses to reference the shared fields and scales.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::naming;
use crate::plot::scale::{color_scale, dodge_scale, Palette, ScaleSpec};
use crate::plot::types::{ParameterValue, Parameters};
use crate::reader::ProjectedData;
use crate::writer::vega::{DataSource, Mark};

/// Default value for a layer parameter
#[derive(Debug, Clone)]
pub enum DefaultParamValue {
    String(&'static str),
    Number(f64),
    Boolean(bool),
    Null,
}

impl DefaultParamValue {
    pub fn to_parameter(&self) -> ParameterValue {
        match self {
            DefaultParamValue::String(s) => ParameterValue::String(s.to_string()),
            DefaultParamValue::Number(n) => ParameterValue::Number(*n),
            DefaultParamValue::Boolean(b) => ParameterValue::Boolean(*b),
            DefaultParamValue::Null => ParameterValue::Null,
        }
    }

    /// Whether a user-supplied value has an acceptable type
    ///
    /// Parameters defaulting to null accept numbers or null.
    pub fn accepts(&self, value: &ParameterValue) -> bool {
        matches!(
            (self, value),
            (DefaultParamValue::String(_), ParameterValue::String(_))
                | (DefaultParamValue::Number(_), ParameterValue::Number(_))
                | (DefaultParamValue::Boolean(_), ParameterValue::Boolean(_))
                | (DefaultParamValue::Null, ParameterValue::Number(_))
                | (DefaultParamValue::Null, ParameterValue::Null)
        )
    }

    /// Type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            DefaultParamValue::String(_) => "string",
            DefaultParamValue::Number(_) => "number",
            DefaultParamValue::Boolean(_) => "boolean",
            DefaultParamValue::Null => "number",
        }
    }
}

/// Layer parameter definition: name and default value
#[derive(Debug, Clone)]
pub struct DefaultParam {
    pub name: &'static str,
    pub default: DefaultParamValue,
}

/// How jitter offsets are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterMode {
    /// Offsets drawn by the renderer with `random()`
    #[default]
    RenderTime,
    /// Fixed offsets embedded in the document
    Deterministic,
}

/// Everything a builder needs to produce its fragment
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub data: &'a ProjectedData,
    pub parameters: &'a Parameters,
    /// Position of the layer in the request list
    pub layer_idx: usize,
    pub palette: &'a Palette,
    pub jitter: JitterMode,
}

impl<'a> BuildContext<'a> {
    /// Whether marks are colored by group
    pub fn grouped(&self) -> bool {
        self.data.has_color_group
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).and_then(|p| p.as_number())
    }

    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    pub fn string(&self, name: &str) -> Option<&'a str> {
        self.parameters.get(name).and_then(|p| p.as_str())
    }

    pub fn boolean_or(&self, name: &str, default: bool) -> bool {
        self.parameters
            .get(name)
            .and_then(|p| p.as_bool())
            .unwrap_or(default)
    }

    /// Name of a data source owned by this layer
    pub fn source_name(&self, role: &str) -> String {
        naming::layer_data(role, self.layer_idx)
    }

    /// Name of a facet partition owned by this layer
    pub fn facet_name(&self, role: &str) -> String {
        naming::facet_data(role, self.layer_idx)
    }

    /// Fill or stroke channel: the color scale when grouped, the primary color otherwise
    pub fn color_channel(&self) -> Value {
        if self.grouped() {
            field_channel(naming::COLOR_SCALE, naming::COLOR_FIELD)
        } else {
            json!({ "value": self.palette.primary() })
        }
    }

    /// The color scale when grouped
    pub fn color_scale(&self) -> Option<ScaleSpec> {
        self.grouped()
            .then(|| color_scale(&self.data.color_levels, self.palette))
    }

    /// The dodge scale when grouped
    pub fn dodge_scale(&self) -> Option<ScaleSpec> {
        self.grouped().then(|| dodge_scale(&self.data.color_levels))
    }

    /// `groupby` list for statistics computed per color group
    pub fn color_groupby(&self) -> Vec<&'static str> {
        if self.grouped() {
            vec![naming::COLOR_FIELD]
        } else {
            Vec::new()
        }
    }

    /// `groupby` list for statistics computed per x category and color group
    pub fn category_groupby(&self) -> Vec<&'static str> {
        let mut groupby = vec![naming::X_FIELD];
        groupby.extend(self.color_groupby());
        groupby
    }
}

/// Default axis titles declared by a fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisTitles {
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Output of one builder: marks plus everything they depend on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFragment {
    pub marks: Vec<Mark>,
    pub scales: Vec<ScaleSpec>,
    /// Sources with inline values owned by this layer
    pub aux_data: Vec<DataSource>,
    /// Sources computed from other sources through transforms
    pub derived_data: Vec<DataSource>,
    pub axis_titles: AxisTitles,
    /// Why the layer produced nothing, when it is empty
    pub empty_reason: Option<String>,
}

impl LayerFragment {
    /// Fragment with no marks
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            empty_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Add a scale; `None` is skipped
    pub fn with_scale(mut self, scale: impl Into<Option<ScaleSpec>>) -> Self {
        if let Some(scale) = scale.into() {
            self.scales.push(scale);
        }
        self
    }

    pub fn with_aux_data(mut self, source: DataSource) -> Self {
        self.aux_data.push(source);
        self
    }

    pub fn with_derived_data(mut self, source: DataSource) -> Self {
        self.derived_data.push(source);
        self
    }

    pub fn with_x_title(mut self, title: impl Into<String>) -> Self {
        self.axis_titles.x = Some(title.into());
        self
    }

    pub fn with_y_title(mut self, title: impl Into<String>) -> Self {
        self.axis_titles.y = Some(title.into());
        self
    }

    /// Append another fragment's content after this one's
    pub fn extend(mut self, other: LayerFragment) -> Self {
        self.marks.extend(other.marks);
        self.scales.extend(other.scales);
        self.aux_data.extend(other.aux_data);
        self.derived_data.extend(other.derived_data);
        if self.axis_titles.x.is_none() {
            self.axis_titles.x = other.axis_titles.x;
        }
        if self.axis_titles.y.is_none() {
            self.axis_titles.y = other.axis_titles.y;
        }
        if self.empty_reason.is_none() && self.marks.is_empty() {
            self.empty_reason = other.empty_reason;
        }
        self
    }
}

// =============================================================================
// Encoding helpers
// =============================================================================

/// `{"scale": scale, "field": field}`
pub fn field_channel(scale: &str, field: &str) -> Value {
    json!({ "scale": scale, "field": field })
}

/// Channel at a fraction of the band of a banded scale
pub fn band_channel(scale: &str, field: &str, band: f64) -> Value {
    json!({ "scale": scale, "field": field, "band": band })
}

/// Literal value channel
pub fn value_channel(value: impl Into<Value>) -> Value {
    json!({ "value": value.into() })
}

/// Signal expression channel
pub fn signal_channel(expr: impl Into<String>) -> Value {
    json!({ "signal": expr.into() })
}

/// Positional x channel, centered in the band when x is banded
pub fn x_position(banded: bool) -> Value {
    if banded {
        band_channel(naming::X_SCALE, naming::X_FIELD, 0.5)
    } else {
        field_channel(naming::X_SCALE, naming::X_FIELD)
    }
}

/// Positional y channel, centered in the band when y is banded
pub fn y_position(banded: bool) -> Value {
    if banded {
        band_channel(naming::Y_SCALE, naming::Y_FIELD, 0.5)
    } else {
        field_channel(naming::Y_SCALE, naming::Y_FIELD)
    }
}

/// Horizontal placement of band-wide marks inside a category
///
/// Dodged marks sit in their color's sub-band of the `xsub` scale and must be
/// drawn inside a group faceted by x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPlacement {
    Whole,
    Dodged,
}

impl BandPlacement {
    pub fn for_context(ctx: &BuildContext) -> Self {
        if ctx.grouped() {
            BandPlacement::Dodged
        } else {
            BandPlacement::Whole
        }
    }

    fn scale_and_field(&self) -> (&'static str, &'static str) {
        match self {
            BandPlacement::Whole => (naming::X_SCALE, naming::X_FIELD),
            BandPlacement::Dodged => (naming::DODGE_SCALE, naming::COLOR_FIELD),
        }
    }

    /// Left edge of the band
    pub fn x(&self) -> Value {
        let (scale, field) = self.scale_and_field();
        field_channel(scale, field)
    }

    /// A fraction across the band
    pub fn x_at(&self, band: f64) -> Value {
        let (scale, field) = self.scale_and_field();
        band_channel(scale, field, band)
    }

    /// Full band width
    pub fn width(&self) -> Value {
        let (scale, _) = self.scale_and_field();
        json!({ "scale": scale, "band": 1 })
    }

    /// Signal expression for the band width
    pub fn bandwidth_expr(&self) -> String {
        let (scale, _) = self.scale_and_field();
        format!("bandwidth('{}')", scale)
    }

    /// Wrap marks so that dodged placement resolves inside each x category
    pub fn wrap(&self, ctx: &BuildContext, role: &str, source: &str, marks: Vec<Mark>) -> Vec<Mark> {
        match self {
            BandPlacement::Whole => marks,
            BandPlacement::Dodged => {
                let facet = ctx.facet_name(role);
                let marks = marks
                    .into_iter()
                    .map(|m| retarget(m, source, &facet))
                    .collect();
                vec![Mark::new(crate::writer::vega::MarkKind::Group)
                    .from_facet(facet, source, &[naming::X_FIELD])
                    .enter("x", field_channel(naming::X_SCALE, naming::X_FIELD))
                    .enter("width", signal_channel(format!("bandwidth('{}')", naming::X_SCALE)))
                    .with_marks(marks)]
            }
        }
    }
}

/// Point a mark that reads `from` at `to` instead
pub fn retarget(mut mark: Mark, from: &str, to: &str) -> Mark {
    if let Some(f) = mark.from.as_mut() {
        if f.data.as_deref() == Some(from) {
            f.data = Some(to.to_string());
        }
    }
    mark
}

/// Draw `mark` once per color group when grouped
///
/// The mark is expected to read `source`; when grouped it is moved inside a
/// group faceted by color and reads the facet instead.
pub fn per_color_group(ctx: &BuildContext, role: &str, source: &str, mark: Mark) -> Mark {
    if !ctx.grouped() {
        return mark;
    }
    let facet = ctx.facet_name(role);
    Mark::new(crate::writer::vega::MarkKind::Group)
        .from_facet(facet.clone(), source, &[naming::COLOR_FIELD])
        .with_marks(vec![retarget(mark, source, &facet)])
}

// =============================================================================
// Numeric helpers
// =============================================================================

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (zero for fewer than two values)
pub fn sample_sd(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between order statistics of `sorted`
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let h = last as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(last);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Kernel bandwidth by Scott's rule, `1.06 * min(sd, iqr / 1.34) * n^-0.2`
///
/// Falls back to whichever spread is non-zero, then to 1 for constant data.
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let sd = sample_sd(&sorted);
    let iqr = match (quantile(&sorted, 0.25), quantile(&sorted, 0.75)) {
        (Some(q1), Some(q3)) => (q3 - q1) / 1.34,
        _ => 0.0,
    };
    let spread = match (sd > 0.0, iqr > 0.0) {
        (true, true) => sd.min(iqr),
        (true, false) => sd,
        (false, true) => iqr,
        (false, false) => return 1.0,
    };
    1.06 * spread * (sorted.len() as f64).powf(-0.2)
}

/// Hull of two optional extents
pub fn hull(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_scott_bandwidth() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        // sd = 1.5811, iqr / 1.34 = 1.4925
        let expected = 1.06 * (2.0 / 1.34) * 5f64.powf(-0.2);
        assert!((scott_bandwidth(&values) - expected).abs() < 1e-12);
        assert_eq!(scott_bandwidth(&[3.0, 3.0, 3.0]), 1.0);
        assert!(scott_bandwidth(&[3.0, 3.0, 3.0, 9.0]) > 0.0);
    }

    #[test]
    fn test_default_param_accepts() {
        assert!(DefaultParamValue::Number(1.0).accepts(&ParameterValue::Number(3.0)));
        assert!(!DefaultParamValue::Number(1.0).accepts(&ParameterValue::String("3".into())));
        assert!(DefaultParamValue::Null.accepts(&ParameterValue::Number(2.0)));
        assert!(DefaultParamValue::Null.accepts(&ParameterValue::Null));
        assert!(!DefaultParamValue::String("h").accepts(&ParameterValue::Boolean(true)));
    }

    #[test]
    fn test_band_placement_channels() {
        assert_eq!(
            BandPlacement::Whole.x_at(0.5),
            json!({"scale": "xscale", "field": "x", "band": 0.5})
        );
        assert_eq!(
            BandPlacement::Dodged.width(),
            json!({"scale": "xsub", "band": 1})
        );
        assert_eq!(BandPlacement::Dodged.bandwidth_expr(), "bandwidth('xsub')");
    }

    #[test]
    fn test_fragment_extend_keeps_first_titles() {
        let a = LayerFragment::default().with_y_title("count");
        let b = LayerFragment::default().with_y_title("density").with_x_title("v");
        let merged = a.extend(b);
        assert_eq!(merged.axis_titles.y.as_deref(), Some("count"));
        assert_eq!(merged.axis_titles.x.as_deref(), Some("v"));
    }

    #[test]
    fn test_numeric_helpers() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_sd(&[5.0]), 0.0);
        assert!((sample_sd(&[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-12);
        assert_eq!(hull(Some((0.0, 1.0)), Some((-1.0, 0.5))), Some((-1.0, 1.0)));
        assert_eq!(hull(None, Some((2.0, 3.0))), Some((2.0, 3.0)));
    }

    #[test]
    fn test_jitter_mode_default() {
        assert_eq!(JitterMode::default(), JitterMode::RenderTime);
        let mode: JitterMode = serde_json::from_str("\"deterministic\"").unwrap();
        assert_eq!(mode, JitterMode::Deterministic);
    }
}
