//! Categorical color palettes
//!
//! The palette is a configuration value handed to the compiler. Colors are
//! validated and normalized to hex once, before any layer is built.

use serde::{Deserialize, Serialize};

use super::colour::{color_to_hex, ramp};
use crate::{GgvegaError, Result};

/// Default categorical palette (Tableau 10, first eight entries)
pub const DEFAULT_PALETTE: &[&str] = &[
    "#4c78a8", "#f58518", "#e45756", "#72b7b2", "#54a24b", "#eeca3b", "#b279a2", "#ff9da6",
];

/// Light end of sequential ramps
const RAMP_START: &str = "#f7fbff";

/// Number of steps in a sequential ramp
const RAMP_STEPS: usize = 9;

/// An ordered list of category colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<String>);

impl Default for Palette {
    fn default() -> Self {
        Palette(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl Palette {
    /// Build a palette from CSS colors, normalizing every entry to hex
    pub fn new<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        let palette = Palette(colors.iter().map(|c| c.as_ref().to_string()).collect());
        palette.normalized()
    }

    /// Check the palette is usable and return it with hex entries
    pub fn normalized(&self) -> Result<Self> {
        if self.0.is_empty() {
            return Err(GgvegaError::ValidationError(
                "Palette must contain at least one color".to_string(),
            ));
        }
        let colors = self
            .0
            .iter()
            .map(|c| color_to_hex(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Palette(colors))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[String] {
        &self.0
    }

    /// First palette entry, used for ungrouped marks
    pub fn primary(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or(DEFAULT_PALETTE[0])
    }

    /// `count` colors, cycling when there are more levels than entries
    pub fn cycle(&self, count: usize) -> Vec<String> {
        self.0.iter().cycle().take(count).cloned().collect()
    }

    /// Sequential ramp from a light tint to the primary color
    pub fn sequential(&self) -> Result<Vec<String>> {
        ramp(&[RAMP_START, self.primary()], RAMP_STEPS)
    }
}
