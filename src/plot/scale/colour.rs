//! Color utilities for ggvega
//!
//! Parses CSS colors into hex and builds perceptually even ramps for
//! sequential scales.

use palette::{FromColor, IntoColor, LinSrgb, Mix, Oklab, Srgb};

use crate::{GgvegaError, Result};

/// Fill used for marks outside the current legend selection
pub const DESELECTED_COLOR: &str = "#cccccc";

/// Convert a CSS color name/value to hex format.
/// Supports named colors (e.g., "red"), hex (#FF0000), rgb(), rgba(), hsl(), etc.
pub fn color_to_hex(value: &str) -> Result<String> {
    csscolorparser::parse(value)
        .map(|c| c.to_css_hex())
        .map_err(|e| GgvegaError::ValidationError(format!("Invalid color '{}': {}", value, e)))
}

/// Interpolate `count` evenly spaced colors through the given stops in Oklab.
///
/// # Example
/// ```
/// use ggvega::plot::scale::colour::ramp;
///
/// let colors = ramp(&["white", "#1f77b4"], 5).unwrap();
/// assert_eq!(colors.len(), 5);
/// assert_eq!(colors[0], "#ffffff");
/// ```
pub fn ramp(stops: &[&str], count: usize) -> Result<Vec<String>> {
    if stops.is_empty() {
        return Err(GgvegaError::ValidationError(
            "At least one color stop is required".to_string(),
        ));
    }
    if count == 0 {
        return Ok(vec![]);
    }

    let oklab: Vec<Oklab<f32>> = stops
        .iter()
        .map(|c| parse_to_srgb(c).map(|s| Oklab::from_color(s.into_linear::<f32>())))
        .collect::<Result<Vec<_>>>()?;

    if oklab.len() == 1 || count == 1 {
        return Ok(vec![oklab_to_hex(oklab[0]); count]);
    }

    let segments = oklab.len() - 1;
    Ok((0..count)
        .map(|i| {
            let t = i as f32 / (count - 1) as f32 * segments as f32;
            let segment = (t.floor() as usize).min(segments - 1);
            oklab_to_hex(oklab[segment].mix(oklab[segment + 1], t - segment as f32))
        })
        .collect())
}

fn parse_to_srgb(color: &str) -> Result<Srgb<f32>> {
    let parsed = csscolorparser::parse(color)
        .map_err(|e| GgvegaError::ValidationError(format!("Invalid color '{}': {}", color, e)))?;
    Ok(Srgb::new(parsed.r as f32, parsed.g as f32, parsed.b as f32))
}

fn oklab_to_hex(color: Oklab<f32>) -> String {
    let lin: LinSrgb<f32> = color.into_color();
    let srgb: Srgb<f32> = Srgb::from_linear(lin);
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(srgb.red),
        channel(srgb.green),
        channel(srgb.blue)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_hex() {
        assert_eq!(color_to_hex("red").unwrap(), "#ff0000");
        assert_eq!(color_to_hex("#F00").unwrap(), "#ff0000");
        assert_eq!(color_to_hex("rgb(0, 0, 255)").unwrap(), "#0000ff");
    }

    #[test]
    fn test_color_to_hex_invalid() {
        let err = color_to_hex("notacolor").unwrap_err();
        assert!(matches!(err, GgvegaError::ValidationError(_)));
    }

    #[test]
    fn test_ramp_preserves_endpoints() {
        let colors = ramp(&["black", "white"], 7).unwrap();
        assert_eq!(colors.len(), 7);
        assert_eq!(colors[0], "#000000");
        assert_eq!(colors[6], "#ffffff");
    }

    #[test]
    fn test_ramp_multi_stop_hits_middle() {
        let colors = ramp(&["red", "white", "blue"], 5).unwrap();
        assert_eq!(colors[2], "#ffffff");
    }

    #[test]
    fn test_ramp_edge_counts() {
        assert!(ramp(&["red", "blue"], 0).unwrap().is_empty());
        assert_eq!(ramp(&["red", "blue"], 1).unwrap(), vec!["#ff0000"]);
        assert_eq!(ramp(&["red"], 2).unwrap(), vec!["#ff0000", "#ff0000"]);
        assert!(ramp(&[], 3).is_err());
        assert!(ramp(&["red", "nope"], 3).is_err());
    }
}
