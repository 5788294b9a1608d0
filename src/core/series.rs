//! Series styling and descriptors.
//!
//! A `SeriesDescriptor` is one renderable line: owning parameter and location,
//! normalized style, and a pending data source. Data resolution converts a raw
//! payload into a `SeriesDataUpdate`; applying it to the live render-engine
//! series (and the redraw policy around it) belongs to the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::core::data::{SeriesDataUpdate, decode_payload};
use crate::core::location::Location;
use crate::core::palette::{Color, ColorResolver};
use crate::core::parameter::Parameter;
use crate::core::text::{LocalizedText, Translator, escape_html};
use crate::error::ChartResult;

/// Marker policy for a series: cycle through the default symbols, none, or a
/// caller-specified symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPolicy {
    #[default]
    Auto,
    Off,
    Symbol(String),
}

/// Default marker symbol cycle, indexed by series position.
pub const DEFAULT_MARKER_SYMBOLS: &[&str] =
    &["circle", "diamond", "square", "triangle", "triangle-down"];

/// Line dash style names understood by the render engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashStyle {
    #[default]
    Solid,
    ShortDash,
    ShortDot,
    ShortDashDot,
    ShortDashDotDot,
    Dot,
    Dash,
    LongDash,
    DashDot,
    LongDashDot,
    LongDashDotDot,
}

impl DashStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::ShortDash => "ShortDash",
            Self::ShortDot => "ShortDot",
            Self::ShortDashDot => "ShortDashDot",
            Self::ShortDashDotDot => "ShortDashDotDot",
            Self::Dot => "Dot",
            Self::Dash => "Dash",
            Self::LongDash => "LongDash",
            Self::DashDot => "DashDot",
            Self::LongDashDot => "LongDashDot",
            Self::LongDashDotDot => "LongDashDotDot",
        }
    }
}

/// Direction-arrow rendering mode for vector series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectionArrow {
    #[default]
    Off,
    Default,
    Glyph(String),
    Custom { width: f64, height: f64 },
}

/// Largest rendered dimension of a direction glyph, in pixels.
pub const DIRECTION_MARKER_TARGET_DIM: f64 = 20.0;

/// Known arrow glyphs as (id, natural width, natural height).
const ARROW_GLYPHS: &[(&str, f64, f64)] = &[
    ("arrow-up", 160.0, 256.0),
    ("arrow-up-wide", 224.0, 256.0),
    ("location-arrow", 256.0, 256.0),
];

/// Resolved direction marker: glyph id plus proportional dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionMarker {
    pub symbol: String,
    pub width: f64,
    pub height: f64,
}

impl DirectionMarker {
    fn scaled(symbol: &str, width: f64, height: f64) -> Self {
        let factor = DIRECTION_MARKER_TARGET_DIM / width.max(height);
        Self {
            symbol: symbol.to_owned(),
            width: width * factor,
            height: height * factor,
        }
    }

    fn from_arrow(arrow: &DirectionArrow) -> Option<Self> {
        match arrow {
            DirectionArrow::Off => None,
            DirectionArrow::Default => {
                let (id, width, height) = ARROW_GLYPHS[0];
                Some(Self::scaled(id, width, height))
            }
            DirectionArrow::Glyph(id) => {
                let glyph = ARROW_GLYPHS.iter().find(|(name, _, _)| name == id);
                let (id, width, height) = glyph.copied().unwrap_or_else(|| {
                    warn!(glyph = %id, "unknown direction glyph, using default");
                    ARROW_GLYPHS[0]
                });
                Some(Self::scaled(id, width, height))
            }
            DirectionArrow::Custom { width, height } => Some(Self::scaled("custom", *width, *height)),
        }
    }
}

/// Caller-supplied style for one series; every field optional, defaults come
/// from the series index and, for linked sub-series, from the main series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesStyleInput {
    pub color: Option<usize>,
    pub delta_shade: Option<i32>,
    pub marker: Option<MarkerPolicy>,
    pub line_width: Option<f64>,
    pub dash_style: Option<DashStyle>,
    pub no_tooltip: Option<bool>,
    pub tooltip_prefix: Option<LocalizedText>,
    pub tooltip_postfix: Option<LocalizedText>,
    pub direction_arrow: Option<DirectionArrow>,
    pub show_all_arrows: Option<bool>,
}

impl SeriesStyleInput {
    /// Normalizes this input into renderer-ready attributes.
    ///
    /// Field precedence: this input > `sibling` (the main series of a linked
    /// group) > defaults derived from `index`.
    pub fn normalize(
        &self,
        index: usize,
        sibling: Option<&SeriesStyleInput>,
        colors: &ColorResolver,
        translator: &dyn Translator,
    ) -> ChartResult<SeriesStyle> {
        fn pick<T: Clone>(
            own: &Option<T>,
            sibling: Option<&SeriesStyleInput>,
            get: impl Fn(&SeriesStyleInput) -> &Option<T>,
        ) -> Option<T> {
            own.clone().or_else(|| sibling.and_then(|s| get(s).clone()))
        }

        let color_index = pick(&self.color, sibling, |s| &s.color).unwrap_or(index);
        let delta_shade = pick(&self.delta_shade, sibling, |s| &s.delta_shade).unwrap_or(0);
        let marker = pick(&self.marker, sibling, |s| &s.marker).unwrap_or_default();
        let no_tooltip = pick(&self.no_tooltip, sibling, |s| &s.no_tooltip).unwrap_or(false);
        let arrow = pick(&self.direction_arrow, sibling, |s| &s.direction_arrow).unwrap_or_default();

        let marker_symbol = match &marker {
            MarkerPolicy::Off => None,
            MarkerPolicy::Auto => {
                Some(DEFAULT_MARKER_SYMBOLS[index % DEFAULT_MARKER_SYMBOLS.len()].to_owned())
            }
            MarkerPolicy::Symbol(symbol) => Some(symbol.clone()),
        };

        let affix = |text: &Option<LocalizedText>| {
            text.as_ref().map(|t| escape_html(&translator.translate(t)))
        };

        Ok(SeriesStyle {
            color: colors.resolve(color_index, delta_shade)?,
            line_width: pick(&self.line_width, sibling, |s| &s.line_width).unwrap_or(1.0),
            dash_style: pick(&self.dash_style, sibling, |s| &s.dash_style).unwrap_or_default(),
            marker_enabled: marker_symbol.is_some(),
            marker_symbol,
            no_tooltip,
            tooltip_prefix: affix(&self.tooltip_prefix),
            tooltip_postfix: affix(&self.tooltip_postfix),
            direction_marker: DirectionMarker::from_arrow(&arrow),
            show_all_arrows: pick(&self.show_all_arrows, sibling, |s| &s.show_all_arrows)
                .unwrap_or(false),
        })
    }
}

/// Normalized, renderer-ready series attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: Color,
    pub line_width: f64,
    pub dash_style: DashStyle,
    pub marker_enabled: bool,
    pub marker_symbol: Option<String>,
    pub no_tooltip: bool,
    /// Escaped tooltip affixes, ready for HTML embedding.
    pub tooltip_prefix: Option<String>,
    pub tooltip_postfix: Option<String>,
    pub direction_marker: Option<DirectionMarker>,
    pub show_all_arrows: bool,
}

impl SeriesStyle {
    #[must_use]
    pub fn direction_arrow_enabled(&self) -> bool {
        self.direction_marker.is_some()
    }
}

/// Conversion hook applied to a raw payload before decoding.
pub type ConvertFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Where a series' data comes from: an inline value, or a named deferred file,
/// each optionally paired with a conversion function and implicit-timestamp
/// defaults.
#[derive(Clone, Default)]
pub struct DataSource {
    pub inline: Option<Value>,
    pub file_name: Option<String>,
    /// Default `pointStart` used when the payload does not carry one.
    pub start: Option<Value>,
    /// Default `pointInterval` used when the payload does not carry one.
    pub interval: Option<Value>,
    pub convert: Option<ConvertFn>,
}

impl DataSource {
    #[must_use]
    pub fn inline(data: Value) -> Self {
        Self {
            inline: Some(data),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn file(file_name: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_start(mut self, start: Value) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Value) -> Self {
        self.interval = Some(interval);
        self
    }

    #[must_use]
    pub fn with_convert(mut self, convert: ConvertFn) -> Self {
        self.convert = Some(convert);
        self
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("inline", &self.inline.is_some())
            .field("file_name", &self.file_name)
            .field("start", &self.start)
            .field("interval", &self.interval)
            .field("convert", &self.convert.is_some())
            .finish()
    }
}

/// One renderable line: owning parameter/location, normalized style, pending
/// data source, resolved axis id, and linked sub-series sharing its axis and
/// legend group.
#[derive(Debug, Clone)]
pub struct SeriesDescriptor {
    /// Stable key addressing the render engine's live series.
    pub key: String,
    /// Creation-order index; determines default color and axis-sharing key.
    pub index: usize,
    pub parameter: Parameter,
    pub location: Location,
    pub style: SeriesStyle,
    pub source: DataSource,
    pub axis_id: Option<String>,
    pub sub_series: Vec<SeriesDescriptor>,
}

impl SeriesDescriptor {
    /// Resolves a raw payload into a series update.
    ///
    /// Returns `None` for an absent or null payload: that models "still
    /// loading", not a failure, and must leave render state untouched.
    #[must_use]
    pub fn resolve(&self, payload: Option<&Value>) -> Option<SeriesDataUpdate> {
        let payload = match payload {
            None | Some(Value::Null) => return None,
            Some(value) => value,
        };

        let converted = match &self.source.convert {
            Some(convert) => convert(payload.clone()),
            None => self.apply_source_defaults(payload),
        };

        let vector = self.parameter.is_vector();
        let carry_direction = self.style.direction_arrow_enabled();
        Some(decode_payload(&converted, vector, carry_direction))
    }

    /// Standard conversion: injects the source's default start/interval (and
    /// inline data) into an object payload that lacks them.
    fn apply_source_defaults(&self, payload: &Value) -> Value {
        let Value::Object(map) = payload else {
            return payload.clone();
        };

        let mut map = map.clone();
        if !map.contains_key("data") {
            if let Some(inline) = &self.source.inline {
                map.insert("data".to_owned(), inline.clone());
            }
        }
        if !map.contains_key("pointStart") && !map.contains_key("start") {
            if let Some(start) = &self.source.start {
                map.insert("pointStart".to_owned(), start.clone());
            }
        }
        if !map.contains_key("pointInterval") && !map.contains_key("interval") {
            if let Some(interval) = &self.source.interval {
                map.insert("pointInterval".to_owned(), interval.clone());
            }
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameter::Unit;
    use crate::core::text::LangTranslator;
    use serde_json::json;

    fn descriptor(style: SeriesStyle) -> SeriesDescriptor {
        SeriesDescriptor {
            key: "series_0".to_owned(),
            index: 0,
            parameter: Parameter::new("p", "P", Unit::new("m", "m", 1.0)),
            location: Location::none(),
            style,
            source: DataSource::default(),
            axis_id: None,
            sub_series: Vec::new(),
        }
    }

    fn plain_style() -> SeriesStyle {
        SeriesStyleInput::default()
            .normalize(0, None, &ColorResolver::default(), &LangTranslator::default())
            .unwrap()
    }

    #[test]
    fn defaults_follow_series_index() {
        let colors = ColorResolver::default();
        let translator = LangTranslator::default();
        let style = SeriesStyleInput::default()
            .normalize(2, None, &colors, &translator)
            .unwrap();

        assert_eq!(style.color, colors.resolve(2, 0).unwrap());
        assert_eq!(style.marker_symbol.as_deref(), Some("square"));
        assert!(style.marker_enabled);
        assert_eq!(style.line_width, 1.0);
        assert_eq!(style.dash_style, DashStyle::Solid);
        assert!(!style.no_tooltip);
    }

    #[test]
    fn sibling_style_fills_unset_fields_only() {
        let colors = ColorResolver::default();
        let translator = LangTranslator::default();
        let main = SeriesStyleInput {
            color: Some(1),
            dash_style: Some(DashStyle::Dash),
            ..SeriesStyleInput::default()
        };
        let sub = SeriesStyleInput {
            dash_style: Some(DashStyle::Dot),
            ..SeriesStyleInput::default()
        };
        let style = sub.normalize(0, Some(&main), &colors, &translator).unwrap();

        assert_eq!(style.color, colors.resolve(1, 0).unwrap());
        assert_eq!(style.dash_style, DashStyle::Dot);
    }

    #[test]
    fn affixes_are_translated_and_escaped() {
        let style = SeriesStyleInput {
            tooltip_prefix: Some(LocalizedText::by_lang([("en", "<max>")])),
            ..SeriesStyleInput::default()
        }
        .normalize(0, None, &ColorResolver::default(), &LangTranslator::default())
        .unwrap();

        assert_eq!(style.tooltip_prefix.as_deref(), Some("&lt;max&gt;"));
    }

    #[test]
    fn direction_marker_scales_to_target_dimension() {
        let marker = DirectionMarker::from_arrow(&DirectionArrow::Default).unwrap();
        assert!((marker.height - DIRECTION_MARKER_TARGET_DIM).abs() < 1e-9);
        assert!((marker.width - 12.5).abs() < 1e-9);

        let custom = DirectionMarker::from_arrow(&DirectionArrow::Custom {
            width: 40.0,
            height: 10.0,
        })
        .unwrap();
        assert!((custom.width - DIRECTION_MARKER_TARGET_DIM).abs() < 1e-9);
        assert!((custom.height - 5.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_glyph_falls_back_to_default() {
        let marker = DirectionMarker::from_arrow(&DirectionArrow::Glyph("mystery".into())).unwrap();
        assert_eq!(marker.symbol, "arrow-up");
    }

    #[test]
    fn resolve_without_payload_is_a_no_op() {
        let descriptor = descriptor(plain_style());
        assert!(descriptor.resolve(None).is_none());
        assert!(descriptor.resolve(Some(&Value::Null)).is_none());
    }

    #[test]
    fn resolve_injects_source_defaults() {
        let mut descriptor = descriptor(plain_style());
        descriptor.source = DataSource::default()
            .with_start(json!(0))
            .with_interval(json!(3_600_000));

        let update = descriptor.resolve(Some(&json!({"data": [1.0, 2.0]}))).unwrap();
        assert_eq!(update.point_start, Some(0));
        assert_eq!(update.point_interval, Some(3_600_000));
    }

    #[test]
    fn resolve_applies_convert_hook() {
        let mut descriptor = descriptor(plain_style());
        descriptor.source = DataSource::default().with_convert(Arc::new(|raw| {
            json!({ "data": raw.get("values").cloned().unwrap_or(Value::Null) })
        }));

        let update = descriptor
            .resolve(Some(&json!({"values": [[0, 1.0], [1, 2.0]]})))
            .unwrap();
        assert_eq!(update.points.len(), 2);
    }
}
