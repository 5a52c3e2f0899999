//! Scale types for ggvega
//!
//! This module defines scale specifications, the synthesizer deriving
//! positional and color scales from projected data, and color handling.

pub mod colour;
pub mod palettes;
mod scale_type;
mod types;

pub use colour::{color_to_hex, ramp, DESELECTED_COLOR};
pub use palettes::{Palette, DEFAULT_PALETTE};
pub use scale_type::{
    band, banded_position_scale, color_scale, dodge_scale, heat_scale, linear_over_fields,
    linear_x, linear_y, linear_y_unanchored, position_scale, reference_extent, scale_type_for, scatter_extent,
    zero_padded_extent, Axis, Continuous, Discrete, ScaleTypeTrait, Usage,
    DISTRIBUTION_BAND_PADDING, SIMPLE_BAND_PADDING,
};
pub use types::{DomainSource, FieldRef, ScaleKind, ScaleRange, ScaleSpec};
