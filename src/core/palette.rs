//! Color palette and resolver.
//!
//! The palette is a shade grid: rows run light to dark, columns are named
//! hues. A display sequence reorders the hues into the series color cycle.
//! `ColorResolver::resolve` is pure: the same inputs always yield the same
//! color, and nothing in the process mutates the configured palette.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChartError, ChartResult};

/// Concrete display color as a hex string, the form the render engine accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    #[must_use]
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(hex: &str) -> Self {
        Self::new(hex)
    }
}

/// Shade grid from the LinkedIn extended screen palette.
/// Rows 0..=8 run light to dark; columns are
/// blue, purple, red, orange, cyan, yellow, pink, green, gray.
const SHADE_GRID: [[&str; 9]; 9] = [
    ["#CFEDFB", "#EBE4FF", "#FFE0DA", "#FFE7BB", "#D2ECEB", "#FFF2B6", "#FFDFF2", "#E0F4BE", "#E6E9EC"],
    ["#9BDAF3", "#D8CCF4", "#FAC2BB", "#F8CD94", "#9EDDDD", "#FBE491", "#FFC4E4", "#C7E59A", "#D0D3D6"],
    ["#68C7EC", "#BFABE6", "#F59890", "#F7B26A", "#69CDCF", "#F7D56B", "#F99ACA", "#AED677", "#B6B9BC"],
    ["#34B3E4", "#A589D9", "#F16D64", "#F59640", "#35BEC1", "#F3C746", "#F371AF", "#95C753", "#A0A3A6"],
    ["#00A0DC", "#8C68CB", "#EC4339", "#F47B16", "#00AEB3", "#EFB920", "#ED4795", "#7CB82F", "#86898C"],
    ["#008CC9", "#7C5BBB", "#DD2E1F", "#EC640C", "#009EA5", "#E6A700", "#E2247F", "#60AA14", "#737679"],
    ["#0077B5", "#6A4BA7", "#C11F1D", "#CD5308", "#008891", "#CA9400", "#C9186E", "#4E8F13", "#595C5F"],
    ["#005E93", "#573B93", "#A40F1C", "#AF4104", "#00727D", "#AA7D00", "#B10C5C", "#3B7511", "#434649"],
    ["#004471", "#452B7F", "#88001A", "#903000", "#005C69", "#8B6700", "#870044", "#295A10", "#303336"],
];

/// Hue column used for the neutral "merged axis" title marker.
const NEUTRAL_HUE: usize = 8;

/// Immutable palette configuration.
///
/// The process-wide default is just `PaletteConfig::default()`; every chart
/// receives its palette explicitly and no chart can mutate a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Shade rows, light to dark; each row lists colors per hue column.
    pub groups: Vec<Vec<Color>>,
    /// Row used for `delta_shade == 0`.
    pub default_group: usize,
    /// Hue columns in series display order.
    pub sequence: Vec<usize>,
    /// Hue column of the neutral color signalling a merged axis.
    pub neutral_hue: usize,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            groups: SHADE_GRID
                .iter()
                .map(|row| row.iter().map(|hex| Color::new(*hex)).collect())
                .collect(),
            default_group: 4,
            // Blue, red, green, yellow, gray, purple, pink, cyan, orange.
            sequence: vec![0, 2, 7, 5, 8, 1, 6, 4, 3],
            neutral_hue: NEUTRAL_HUE,
        }
    }
}

/// Maps a logical color index plus a delta-shade offset to a concrete color.
#[derive(Debug, Clone, Default)]
pub struct ColorResolver {
    palette: PaletteConfig,
}

impl ColorResolver {
    #[must_use]
    pub fn new(palette: PaletteConfig) -> Self {
        Self { palette }
    }

    #[must_use]
    pub fn palette(&self) -> &PaletteConfig {
        &self.palette
    }

    /// Resolves `color_index` (wrapping over the display sequence) at the
    /// default shade shifted by `delta_shade` (negative = lighter, positive =
    /// darker), clamped to the grid.
    pub fn resolve(&self, color_index: usize, delta_shade: i32) -> ChartResult<Color> {
        let palette = &self.palette;
        if palette.groups.is_empty() || palette.sequence.is_empty() {
            return Err(ChartError::EmptyPalette);
        }

        let hue = palette.sequence[color_index % palette.sequence.len()];
        let row_index = (palette.default_group as i64 + i64::from(delta_shade))
            .clamp(0, palette.groups.len() as i64 - 1) as usize;
        let row = &palette.groups[row_index];
        if row.is_empty() {
            return Err(ChartError::EmptyPalette);
        }

        Ok(row[hue % row.len()].clone())
    }

    /// Neutral color marking a merged (shared) axis title.
    pub fn neutral(&self) -> ChartResult<Color> {
        let palette = &self.palette;
        let row = palette
            .groups
            .get(palette.default_group)
            .or_else(|| palette.groups.first())
            .ok_or(ChartError::EmptyPalette)?;
        if row.is_empty() {
            return Err(ChartError::EmptyPalette);
        }
        Ok(row[palette.neutral_hue % row.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequence_starts_blue_red_green() {
        let resolver = ColorResolver::default();
        assert_eq!(resolver.resolve(0, 0).unwrap().as_str(), "#00A0DC");
        assert_eq!(resolver.resolve(1, 0).unwrap().as_str(), "#EC4339");
        assert_eq!(resolver.resolve(2, 0).unwrap().as_str(), "#7CB82F");
    }

    #[test]
    fn color_index_wraps_over_sequence() {
        let resolver = ColorResolver::default();
        let len = resolver.palette().sequence.len();
        assert_eq!(resolver.resolve(0, 0).unwrap(), resolver.resolve(len, 0).unwrap());
    }

    #[test]
    fn delta_shade_clamps_at_grid_edges() {
        let resolver = ColorResolver::default();
        assert_eq!(resolver.resolve(0, -100).unwrap().as_str(), "#CFEDFB");
        assert_eq!(resolver.resolve(0, 100).unwrap().as_str(), "#004471");
    }

    #[test]
    fn empty_palette_is_a_configuration_error() {
        let resolver = ColorResolver::new(PaletteConfig {
            groups: Vec::new(),
            default_group: 0,
            sequence: vec![0],
            neutral_hue: 0,
        });
        assert!(matches!(resolver.resolve(0, 0), Err(ChartError::EmptyPalette)));
        assert!(matches!(resolver.neutral(), Err(ChartError::EmptyPalette)));
    }
}
