//! Centralized naming conventions for ggvega-generated identifiers.
//!
//! Every name the compiler writes into a Vega document (data sources, fields,
//! scales, signals, legend element names) is defined here so that builders,
//! the assembler and the legend augmenter agree on them.
//!
//! # Categories
//!
//! - **Data sources**: the primary `table` plus per-layer derived sources (`<role>_<idx>`)
//! - **Row fields**: the projected columns `x`, `y` and `color`
//! - **Generated fields**: helper columns added by transforms (`__ggvega_<name>`)
//! - **Scales**: shared positional scales and special-purpose scales
//! - **Selection**: signals and the `selected` data source of interactive legends

use const_format::concatcp;

// ============================================================================
// Base Building Blocks
// ============================================================================

/// Prefix for helper fields computed by emitted transforms
const GGVEGA_PREFIX: &str = "__ggvega_";

/// Vega schema the emitted documents validate against
pub const VEGA_SCHEMA: &str = "https://vega.github.io/schema/vega/v5.json";

// ============================================================================
// Data Sources and Fields
// ============================================================================

/// Name of the primary data source holding the cleaned rows
pub const TABLE_DATA: &str = "table";

/// Field holding the projected x value of each row
pub const X_FIELD: &str = "x";

/// Field holding the projected y value of each row
pub const Y_FIELD: &str = "y";

/// Field holding the color/grouping label of each row
pub const COLOR_FIELD: &str = "color";

/// Precomputed jitter offset (deterministic jitter mode only)
pub const JITTER_FIELD: &str = concatcp!(GGVEGA_PREFIX, "jitter");

/// Composite category/color key used to join summaries back onto rows
pub const KEY_FIELD: &str = concatcp!(GGVEGA_PREFIX, "key");

// ============================================================================
// Scales
// ============================================================================

/// Shared horizontal positional scale
pub const X_SCALE: &str = "xscale";

/// Shared vertical positional scale
pub const Y_SCALE: &str = "yscale";

/// Ordinal color scale over the grouping levels
pub const COLOR_SCALE: &str = "color";

/// Band scale placing dodged marks inside an x category band
pub const DODGE_SCALE: &str = "xsub";

/// Sequential color scale of the 2D histogram
pub const HEAT_SCALE: &str = "heat";

/// Half-width scale of violin bodies
pub const VIOLIN_WIDTH_SCALE: &str = "vwidth";

/// Bar length scale of the top marginal histogram
pub const CORNER_X_COUNT_SCALE: &str = "cx_count";

/// Bar length scale of the right marginal histogram
pub const CORNER_Y_COUNT_SCALE: &str = "cy_count";

// ============================================================================
// Selection State Machine
// ============================================================================

/// Signal reset to true by a click on empty canvas
pub const CLEAR_SIGNAL: &str = "clear";

/// Signal holding whether shift was held on the last legend click
pub const SHIFT_SIGNAL: &str = "shift";

/// Signal holding the last clicked legend entry
pub const CLICKED_SIGNAL: &str = "clicked";

/// Data source holding the currently selected legend entries
pub const SELECTED_DATA: &str = "selected";

/// Name given to legend symbols so click events can target them
pub const LEGEND_SYMBOL: &str = "legendSymbol";

/// Name given to legend labels so click events can target them
pub const LEGEND_LABEL: &str = "legendLabel";

// ============================================================================
// Constructor Functions
// ============================================================================

/// Generate the name of a data source derived for one layer.
///
/// The layer index keeps sources of repeated layer kinds apart.
///
/// # Example
/// ```
/// use ggvega::naming;
/// assert_eq!(naming::layer_data("hist", 2), "hist_2");
/// ```
pub fn layer_data(role: &str, layer_idx: usize) -> String {
    format!("{}_{}", role, layer_idx)
}

/// Generate the name of a facet partition inside a group mark.
///
/// # Example
/// ```
/// use ggvega::naming;
/// assert_eq!(naming::facet_data("series", 0), "series_0_facet");
/// ```
pub fn facet_data(role: &str, layer_idx: usize) -> String {
    format!("{}_{}_facet", role, layer_idx)
}

/// Reference a row field inside a Vega expression.
///
/// # Example
/// ```
/// use ggvega::naming;
/// assert_eq!(naming::datum("y"), "datum.y");
/// ```
pub fn datum(field: &str) -> String {
    format!("datum.{}", field)
}

/// Check if a field name was generated by the compiler.
pub fn is_generated_field(name: &str) -> bool {
    name.starts_with(GGVEGA_PREFIX)
}
