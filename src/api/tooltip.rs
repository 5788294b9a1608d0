//! Tooltip composition: point-row formatters for single- and multi-series
//! displays, plus the standard and historical (min ▸ max) value formatters.
//!
//! Formatters are plain values selected at build time and carried inside the
//! option tree; the render engine's own formatter hook calls back into them
//! with a point context. Nothing here mutates engine state.

use num_format::{Locale, ToFormattedString};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::api::options::SeriesTooltipOptions;
use crate::core::palette::Color;

/// Separator glyph between min and max in the historical formatter.
const TO_CHAR: &str = "&#9656;";

/// 16-point compass rose, clockwise from north.
const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Which row layout the shared tooltip uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointFormat {
    /// Single parameter and location: value only.
    Single,
    /// Multiple parameters or locations: colored series name plus value.
    Multi,
}

/// How a point's value itself is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueFormat {
    Standard,
    /// `min ▸ max (mean)` over a data-grouped point's raw values.
    HistoricalMinMax,
}

/// Everything a formatter needs to know about one hovered point.
#[derive(Debug, Clone, Copy)]
pub struct PointContext<'a> {
    pub series_name: &'a str,
    pub color: &'a Color,
    pub y: f64,
    pub direction: Option<f64>,
    /// Underlying raw values of a data-grouped point; `None` entries are
    /// null samples and are excluded before computing min/max.
    pub group: Option<&'a [Option<f64>]>,
    pub series_prefix: Option<&'a str>,
    pub series_postfix: Option<&'a str>,
    pub no_tooltip: bool,
}

impl PointFormat {
    /// Renders one tooltip table row, or an empty fragment for a series that
    /// opted out of tooltips.
    #[must_use]
    pub fn render_row(
        self,
        ctx: &PointContext<'_>,
        value_format: ValueFormat,
        value_options: &SeriesTooltipOptions,
    ) -> String {
        if ctx.no_tooltip {
            return String::new();
        }

        let value = value_format.render(ctx, value_options);
        let prefix = ctx.series_prefix.unwrap_or("");
        let postfix = ctx.series_postfix.unwrap_or("");
        match self {
            Self::Single => format!(
                "<tr><td class=\"chart-tooltip-value\">{prefix}{value}{postfix}</td></tr>"
            ),
            Self::Multi => format!(
                "<tr><td class=\"chart-tooltip-name\" style=\"color:{color}\">{prefix}{name}{postfix}&nbsp;</td>\
                 <td class=\"chart-tooltip-value\">{value}</td></tr>",
                color = ctx.color,
                name = ctx.series_name,
            ),
        }
    }
}

impl ValueFormat {
    /// Renders the value cell content for one point.
    #[must_use]
    pub fn render(self, ctx: &PointContext<'_>, value_options: &SeriesTooltipOptions) -> String {
        match self {
            Self::Standard => {
                let value = format_point_value(ctx.y, value_options);
                match ctx.direction {
                    Some(degrees) => {
                        format!("<b>{}&nbsp;{value}</b>", compass_text(degrees))
                    }
                    None => format!("<b>{value}</b>"),
                }
            }
            Self::HistoricalMinMax => render_historical(ctx, value_options),
        }
    }
}

/// Historical rendering: distinct min/max as `min ▸ max` with the mean in a
/// trailing parenthesized cell, collapsing to the bare value when the whole
/// group agrees.
fn render_historical(ctx: &PointContext<'_>, value_options: &SeriesTooltipOptions) -> String {
    let mut group: Vec<f64> = ctx
        .group
        .map(|values| values.iter().flatten().copied().collect())
        .unwrap_or_default();
    if group.is_empty() {
        group.push(ctx.y);
    }
    group.sort_by_key(|value| OrderedFloat(*value));

    let min_value = format_point_value(group[0], value_options);
    let max_value = format_point_value(group[group.len() - 1], value_options);
    let mean_value = format_point_value(ctx.y, value_options);

    let result = if min_value == mean_value && mean_value == max_value {
        format!("<b>{mean_value}</b>")
    } else {
        format!("<b>{min_value}&nbsp;{TO_CHAR}&nbsp;{max_value}</b>")
    };

    let mean_cell = if min_value == mean_value || mean_value == max_value {
        String::new()
    } else {
        format!("({mean_value})")
    };

    format!("{result}</td><td class=\"chart-tooltip-value\">{mean_cell}")
}

fn format_point_value(value: f64, value_options: &SeriesTooltipOptions) -> String {
    format!(
        "{}{}{}",
        value_options.value_prefix,
        format_number(value, value_options.value_decimals),
        value_options.value_suffix
    )
}

/// Formats a value with fixed decimals and thousands grouping. Ties round
/// away from zero, not to even: 0.125 at two decimals is "0.13".
#[must_use]
pub fn format_number(value: f64, decimals: u8) -> String {
    let factor = 10f64.powi(i32::from(decimals));
    let value = (value * factor).round() / factor;
    let rounded = format!("{value:.*}", decimals as usize);
    let (int_part, fraction) = match rounded.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (rounded.as_str(), None),
    };

    let negative = int_part.starts_with('-');
    let digits = int_part.trim_start_matches('-');
    let grouped = digits
        .parse::<u64>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| digits.to_owned());

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Maps a direction in degrees to its 16-point compass text.
#[must_use]
pub fn compass_text(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let sector = ((normalized / 22.5).round() as usize) % COMPASS.len();
    COMPASS[sector]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_options(decimals: u8) -> SeriesTooltipOptions {
        SeriesTooltipOptions {
            value_decimals: decimals,
            value_prefix: String::new(),
            value_suffix: " m".to_owned(),
        }
    }

    fn ctx<'a>(color: &'a Color, y: f64, group: Option<&'a [Option<f64>]>) -> PointContext<'a> {
        PointContext {
            series_name: "Sea level",
            color,
            y,
            direction: None,
            group,
            series_prefix: None,
            series_postfix: None,
            no_tooltip: false,
        }
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.5, 1), "1,234,567.5");
        assert_eq!(format_number(-1234.0, 0), "-1,234");
        assert_eq!(format_number(0.125, 2), "0.13");
    }

    #[test]
    fn format_number_rounds_ties_away_from_zero() {
        assert_eq!(format_number(0.125, 2), "0.13");
        assert_eq!(format_number(-0.125, 2), "-0.13");
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(0.625, 2), "0.63");
    }

    #[test]
    fn compass_sectors_wrap() {
        assert_eq!(compass_text(0.0), "N");
        assert_eq!(compass_text(90.0), "E");
        assert_eq!(compass_text(191.25), "SSW");
        assert_eq!(compass_text(359.0), "N");
        assert_eq!(compass_text(-90.0), "W");
    }

    #[test]
    fn historical_renders_distinct_min_max_with_mean() {
        let color = Color::new("#00A0DC");
        let group = [Some(2.0), Some(5.0), Some(5.0), Some(8.0)];
        let rendered =
            ValueFormat::HistoricalMinMax.render(&ctx(&color, 5.0, Some(&group)), &value_options(0));
        assert!(rendered.contains("<b>2 m&nbsp;&#9656;&nbsp;8 m</b>"));
        assert!(rendered.contains("(5 m)"));
    }

    #[test]
    fn historical_collapses_uniform_group() {
        let color = Color::new("#00A0DC");
        let group = [Some(5.0), Some(5.0), Some(5.0)];
        let rendered =
            ValueFormat::HistoricalMinMax.render(&ctx(&color, 5.0, Some(&group)), &value_options(0));
        assert!(rendered.starts_with("<b>5 m</b>"));
        assert!(!rendered.contains('('));
    }

    #[test]
    fn historical_excludes_null_samples() {
        let color = Color::new("#00A0DC");
        let group = [None, Some(2.0), Some(8.0), None];
        let rendered =
            ValueFormat::HistoricalMinMax.render(&ctx(&color, 5.0, Some(&group)), &value_options(0));
        assert!(rendered.contains("2 m"));
        assert!(rendered.contains("8 m"));
    }

    #[test]
    fn multi_row_carries_series_color_and_name() {
        let color = Color::new("#EC4339");
        let row = PointFormat::Multi.render_row(
            &ctx(&color, 1.5, None),
            ValueFormat::Standard,
            &value_options(1),
        );
        assert!(row.contains("color:#EC4339"));
        assert!(row.contains("Sea level"));
        assert!(row.contains("<b>1.5 m</b>"));
    }

    #[test]
    fn vector_value_gets_compass_prefix() {
        let color = Color::new("#00A0DC");
        let mut context = ctx(&color, 5.0, None);
        context.direction = Some(90.0);
        let rendered = ValueFormat::Standard.render(&context, &value_options(1));
        assert_eq!(rendered, "<b>E&nbsp;5.0 m</b>");
    }

    #[test]
    fn opted_out_series_renders_empty_row() {
        let color = Color::new("#00A0DC");
        let mut context = ctx(&color, 1.0, None);
        context.no_tooltip = true;
        let row =
            PointFormat::Single.render_row(&context, ValueFormat::Standard, &value_options(0));
        assert!(row.is_empty());
    }
}
