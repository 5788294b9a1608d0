//! The emitted chart option tree.
//!
//! Every knob is a typed field with a `Default` that matches the house chart
//! chrome; there is no dynamic path mutation. The tree is serializable so a
//! host can ship it to an embedded render engine as JSON.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::tooltip::{PointFormat, ValueFormat};
use crate::core::palette::Color;
use crate::core::range_policy::TickPositioner;
use crate::core::series::{DashStyle, DirectionMarker};
use crate::core::text::LocalizedText;

/// Complete configuration handed to the render engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub chart: ChartAreaOptions,
    pub title: TitleOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<TitleOptions>,
    pub legend: LegendOptions,
    pub credits: CreditsOptions,
    pub tooltip: TooltipOptions,
    pub x_axis: XAxisOptions,
    pub y_axis: Vec<YAxisOptions>,
    pub series: Vec<SeriesOptions>,
    pub plot_options: PlotOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_selector: Option<RangeSelectorOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAreaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_type: Option<String>,
    pub align_ticks: bool,
}

impl Default for ChartAreaOptions {
    fn default() -> Self {
        Self {
            zoom_type: Some("x".to_owned()),
            // With one axis per parameter, aligned ticks add ghost grid
            // lines; charts disable the alignment instead.
            align_ticks: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleOptions {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
}

impl TitleOptions {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            margin: Some(6.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendOptions {
    pub enabled: bool,
    pub align: String,
    pub vertical_align: String,
    pub border_width: f64,
    pub margin: f64,
}

impl LegendOptions {
    /// Legend centered below the title, the layout multi-series charts use.
    #[must_use]
    pub fn top_centered() -> Self {
        Self {
            enabled: true,
            align: "center".to_owned(),
            vertical_align: "top".to_owned(),
            border_width: 0.0,
            margin: 0.0,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::top_centered()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditsOptions {
    pub enabled: bool,
}

impl Default for CreditsOptions {
    fn default() -> Self {
        Self { enabled: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub enabled: bool,
    pub shared: bool,
    pub split: bool,
    pub use_html: bool,
    pub border_color: Color,
    pub border_radius: f64,
    pub header_format: String,
    pub footer_format: String,
    pub value_decimals: u8,
    pub value_prefix: String,
    pub value_suffix: String,
    pub point_format: PointFormat,
    pub value_format: ValueFormat,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            shared: true,
            split: false,
            use_html: true,
            border_color: Color::new("#868e96"),
            border_radius: 8.0,
            header_format:
                "<span class=\"chart-tooltip-time\">{point.key}</span><table class=\"chart-tooltip-table\">"
                    .to_owned(),
            footer_format: "</table>".to_owned(),
            value_decimals: 0,
            value_prefix: String::new(),
            value_suffix: String::new(),
            point_format: PointFormat::Single,
            value_format: ValueFormat::Standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxisOptions {
    #[serde(rename = "type")]
    pub axis_type: String,
    pub crosshair: bool,
}

impl Default for XAxisOptions {
    fn default() -> Self {
        Self {
            axis_type: "datetime".to_owned(),
            crosshair: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTitleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabelOptions {
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// One y-axis of the emitted tree, flattened from an `AxisSpec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxisOptions {
    pub id: String,
    pub opposite: bool,
    pub title: AxisTitleOptions,
    pub labels: AxisLabelOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_range: Option<f64>,
    pub start_on_tick: bool,
    pub end_on_tick: bool,
    pub tick_positioner: TickPositioner,
    /// Non-negative floor for parameters that cannot go below zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
    /// Draw a zero plot line for parameters that can.
    pub zero_plot_line: bool,
    pub crosshair: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerOptions {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub hover_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTooltipOptions {
    pub value_decimals: u8,
    pub value_prefix: String,
    pub value_suffix: String,
}

/// One series of the emitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOptions {
    /// Stable key addressing the live series for incremental updates.
    pub id: String,
    pub name: String,
    /// Alternative label used inside the shared tooltip for multi-parameter
    /// charts (short name, no unit).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_in_tooltip: Option<String>,
    pub color: Color,
    /// Id of the owning y-axis.
    pub y_axis: String,
    pub line_width: f64,
    pub dash_style: DashStyle,
    pub marker: MarkerOptions,
    pub tooltip: SeriesTooltipOptions,
    pub no_tooltip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_postfix: Option<String>,
    /// Legend/axis group link for min/max band sub-series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<String>,
    pub direction_arrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_marker: Option<DirectionMarker>,
    pub show_all_arrows: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_grouping: Option<DataGroupingOptions>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPlotOptions {
    /// Default time step between implicit points, in milliseconds.
    pub point_interval: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_navigator: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotOptions {
    pub series: SeriesPlotOptions,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            series: SeriesPlotOptions {
                point_interval: 60 * 60 * 1000,
                show_in_navigator: None,
            },
        }
    }
}

/// Aggregation of many raw points into fewer rendered points at low zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGroupingOptions {
    pub enabled: bool,
    pub forced: bool,
    pub group_all: bool,
    pub smoothed: bool,
    pub approximation: String,
    pub group_pixel_width: f64,
    /// Allowed grouping intervals: unit name plus permitted multiples.
    pub units: Vec<(String, Vec<u32>)>,
}

impl Default for DataGroupingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            forced: false,
            group_all: false,
            smoothed: false,
            approximation: "average".to_owned(),
            group_pixel_width: 10.0,
            units: vec![
                ("hour".to_owned(), vec![1, 2, 3, 4, 6, 12]),
                ("day".to_owned(), vec![1, 2, 3]),
                ("week".to_owned(), vec![1, 2, 3]),
                ("month".to_owned(), vec![1, 2, 3, 4, 6]),
            ],
        }
    }
}

/// Time span unit of a range-selector button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeButtonKind {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeButton {
    #[serde(rename = "type")]
    pub kind: RangeButtonKind,
    pub count: u32,
    pub text: LocalizedText,
}

impl RangeButton {
    /// Parses the `"3 d"` shorthand: a count plus a unit code
    /// (ms, s, mi, h, d, w, m, y). Unknown shorthand yields `None`.
    #[must_use]
    pub fn parse(shorthand: &str) -> Option<Self> {
        let (count, code) = shorthand.split_once(' ')?;
        let count: u32 = count.parse().ok()?;
        let plural = count > 1;

        let (kind, da, en) = match code {
            "ms" => (RangeButtonKind::Millisecond, "ms", "ms"),
            "s" => (RangeButtonKind::Second, "sek", "sec"),
            "mi" => (RangeButtonKind::Minute, "min", if plural { "mins" } else { "min" }),
            "h" => (
                RangeButtonKind::Hour,
                if plural { "timer" } else { "time" },
                if plural { "hrs" } else { "hour" },
            ),
            "d" => (
                RangeButtonKind::Day,
                if plural { "dage" } else { "dag" },
                if plural { "days" } else { "day" },
            ),
            "w" => (
                RangeButtonKind::Week,
                if plural { "uger" } else { "uge" },
                if plural { "wks" } else { "week" },
            ),
            "m" => (RangeButtonKind::Month, "mdr", if plural { "mths" } else { "mth" }),
            "y" => (RangeButtonKind::Year, "år", if plural { "yrs" } else { "year" }),
            _ => return None,
        };

        Some(Self {
            kind,
            count,
            text: LocalizedText::by_lang([
                ("da", format!("{count} {da}")),
                ("en", format!("{count} {en}")),
            ]),
        })
    }

    #[must_use]
    pub fn all() -> Self {
        Self {
            kind: RangeButtonKind::All,
            count: 0,
            text: LocalizedText::by_lang([("da", "Alt"), ("en", "All")]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSelectorOptions {
    pub enabled: bool,
    /// Index of the button selected by default.
    pub selected: usize,
    pub buttons: Vec<RangeButton>,
}

impl RangeSelectorOptions {
    /// Default button row for historical charts, with the trailing "All"
    /// button appended.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_shorthand(&["3 d", "1 w", "1 m", "6 m", "1 y"], 3)
    }

    /// Builds a button row from `"3 d"`-style shorthand, silently dropping
    /// entries that do not parse.
    #[must_use]
    pub fn from_shorthand(shorthand: &[&str], selected: usize) -> Self {
        let mut buttons = Vec::with_capacity(shorthand.len() + 1);
        for entry in shorthand {
            match RangeButton::parse(entry) {
                Some(button) => buttons.push(button),
                None => warn!(entry, "unparseable range-selector button"),
            }
        }
        buttons.push(RangeButton::all());
        Self {
            enabled: true,
            selected,
            buttons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_button_shorthand_parses_with_plural_text() {
        let button = RangeButton::parse("3 d").unwrap();
        assert_eq!(button.kind, RangeButtonKind::Day);
        assert_eq!(button.count, 3);
        assert_eq!(button.text.resolve("en"), "3 days");
        assert_eq!(button.text.resolve("da"), "3 dage");

        let single = RangeButton::parse("1 w").unwrap();
        assert_eq!(single.text.resolve("en"), "1 week");

        assert!(RangeButton::parse("soon").is_none());
        assert!(RangeButton::parse("3 fortnights").is_none());
    }

    #[test]
    fn standard_selector_appends_all_button() {
        let selector = RangeSelectorOptions::standard();
        assert_eq!(selector.buttons.len(), 6);
        assert_eq!(selector.buttons.last().unwrap().kind, RangeButtonKind::All);
        assert_eq!(selector.selected, 3);
    }

    #[test]
    fn option_tree_serializes_with_engine_field_names() {
        let options = ChartOptions {
            chart: ChartAreaOptions::default(),
            title: TitleOptions::new("Drogden"),
            subtitle: None,
            legend: LegendOptions::disabled(),
            credits: CreditsOptions::default(),
            tooltip: TooltipOptions::default(),
            x_axis: XAxisOptions::default(),
            y_axis: Vec::new(),
            series: Vec::new(),
            plot_options: PlotOptions::default(),
            range_selector: None,
        };

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["xAxis"]["type"], "datetime");
        assert_eq!(json["chart"]["zoomType"], "x");
        assert_eq!(json["plotOptions"]["series"]["pointInterval"], 3_600_000);
        assert!(json.get("rangeSelector").is_none());
    }
}
