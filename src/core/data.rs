//! Raw payload decoding and point normalization.
//!
//! Payloads cross the loader boundary as JSON in one of three variations:
//!
//! 1. `{data, pointStart, pointInterval | pointIntervalUnit}` with implicit
//!    fixed-interval timestamps,
//! 2. `{data: [[timestamp, value], ...]}` or an array of `{x, y, ...}` objects,
//! 3. a bare array treated as variation 2 data directly.
//!
//! Vector (speed+direction) series additionally accept `[speed, direction]`
//! and `{y|speed, d|direction}` element shapes, with or without a leading
//! timestamp. A malformed element is skipped, never fatal: the rest of the
//! series still renders.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Calendar stepping unit for implicit-timestamp payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Day,
    Month,
    Year,
}

impl IntervalUnit {
    fn from_str(value: &str) -> Option<Self> {
        match value {
            "day" => Some(Self::Day),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

/// One normalized point handed to the render engine.
///
/// `x` is `None` for implicit-timestamp payloads (the engine derives it from
/// `point_start`/`point_interval`). `y == None` renders a gap. `direction` is
/// carried only when the owning series has direction arrows enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: Option<i64>,
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<f64>,
}

impl DataPoint {
    #[must_use]
    pub fn xy(x: i64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            direction: None,
        }
    }
}

/// Decoded payload applied to the render engine's live series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesDataUpdate {
    /// Epoch milliseconds of the first point for implicit timestamps.
    pub point_start: Option<i64>,
    /// Fixed interval in milliseconds.
    pub point_interval: Option<i64>,
    pub point_interval_unit: Option<IntervalUnit>,
    pub points: Vec<DataPoint>,
}

/// Decodes a raw payload into a series update.
///
/// `vector` selects the speed+direction element shapes; `carry_direction`
/// controls whether the direction component survives normalization.
#[must_use]
pub fn decode_payload(payload: &Value, vector: bool, carry_direction: bool) -> SeriesDataUpdate {
    let mut update = SeriesDataUpdate::default();

    let elements = match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => {
            update.point_start = map
                .get("pointStart")
                .or_else(|| map.get("start"))
                .and_then(parse_point_start);
            update.point_interval = map
                .get("pointInterval")
                .or_else(|| map.get("interval"))
                .and_then(parse_interval);
            update.point_interval_unit = map
                .get("pointIntervalUnit")
                .and_then(Value::as_str)
                .and_then(IntervalUnit::from_str);
            map.get("data").and_then(Value::as_array)
        }
        _ => None,
    };

    let Some(elements) = elements else {
        debug!(payload = %payload, "payload carries no data array");
        return update;
    };

    let mut skipped = 0usize;
    update.points.reserve(elements.len());
    for element in elements {
        match normalize_element(element, vector, carry_direction) {
            Some(point) => update.points.push(point),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(
            skipped,
            kept = update.points.len(),
            "skipped malformed data elements"
        );
    }

    update
}

/// Normalizes one payload element, or `None` when its shape is unusable.
#[must_use]
pub fn normalize_element(element: &Value, vector: bool, carry_direction: bool) -> Option<DataPoint> {
    let mut point = match element {
        Value::Null => DataPoint {
            x: None,
            y: None,
            direction: None,
        },
        Value::Number(value) => DataPoint {
            x: None,
            y: value.as_f64(),
            direction: None,
        },
        Value::Array(items) => normalize_tuple(items, vector)?,
        Value::Object(map) => normalize_object(map, vector)?,
        _ => return None,
    };

    if !carry_direction {
        point.direction = None;
    }
    Some(point)
}

fn normalize_tuple(items: &[Value], vector: bool) -> Option<DataPoint> {
    match (items, vector) {
        // [speed, direction]
        ([speed, direction], true) => Some(DataPoint {
            x: None,
            y: speed.as_f64(),
            direction: direction.as_f64(),
        }),
        // [timestamp, speed, direction]
        ([timestamp, speed, direction], true) => Some(DataPoint {
            x: Some(timestamp.as_i64()?),
            y: speed.as_f64(),
            direction: direction.as_f64(),
        }),
        // [timestamp, value]; the value slot may be null for a gap
        ([timestamp, value], false) => Some(DataPoint {
            x: Some(timestamp.as_i64()?),
            y: value.as_f64(),
            direction: None,
        }),
        _ => None,
    }
}

fn normalize_object(map: &serde_json::Map<String, Value>, vector: bool) -> Option<DataPoint> {
    let x = match map.get("x") {
        Some(value) => Some(value.as_i64()?),
        None => None,
    };

    if vector {
        let value = map.get("y").or_else(|| map.get("speed"))?;
        // y itself may hold the [speed, direction] pair
        if let Some(pair) = value.as_array() {
            let inner = normalize_tuple(pair, true)?;
            return Some(DataPoint { x, ..inner });
        }
        let direction = map
            .get("d")
            .or_else(|| map.get("direction"))
            .and_then(Value::as_f64);
        return Some(DataPoint {
            x,
            y: value.as_f64(),
            direction,
        });
    }

    // Scalar objects must address at least a timestamp to be meaningful.
    if x.is_none() && !map.contains_key("y") {
        return None;
    }
    Some(DataPoint {
        x,
        y: map.get("y").and_then(Value::as_f64),
        direction: None,
    })
}

/// Parses a `pointStart` value: epoch milliseconds or a date string.
#[must_use]
pub fn parse_point_start(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => parse_date_ms(text),
        _ => None,
    }
}

fn parse_date_ms(text: &str) -> Option<i64> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(text) {
        return Some(moment.timestamp_millis());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Parses a `pointInterval` value: milliseconds or an ISO-8601 duration
/// string like `PT1H` / `P1DT6H`.
#[must_use]
pub fn parse_interval(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => parse_duration_ms(text),
        _ => None,
    }
}

fn parse_duration_ms(text: &str) -> Option<i64> {
    let body = text.strip_prefix('P')?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => (date, time),
        None => (body, ""),
    };

    let mut total_ms = 0i64;
    for (amount, unit) in segments(date_part) {
        total_ms += match unit {
            'W' => amount * 7 * 24 * 3_600_000,
            'D' => amount * 24 * 3_600_000,
            _ => return None,
        };
    }
    for (amount, unit) in segments(time_part) {
        total_ms += match unit {
            'H' => amount * 3_600_000,
            'M' => amount * 60_000,
            'S' => amount * 1_000,
            _ => return None,
        };
    }
    (total_ms > 0).then_some(total_ms)
}

fn segments(part: &str) -> impl Iterator<Item = (i64, char)> + '_ {
    let mut rest = part;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            rest = "";
            return None;
        }
        let unit = rest[digits.len()..].chars().next()?;
        rest = &rest[digits.len() + unit.len_utf8()..];
        Some((digits.parse().ok()?, unit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_decodes_as_explicit_timestamps() {
        let update = decode_payload(&json!([[0, 1.5], [3_600_000, null], [7_200_000, 2.0]]), false, false);
        assert_eq!(update.points.len(), 3);
        assert_eq!(update.points[0], DataPoint::xy(0, 1.5));
        assert_eq!(update.points[1].y, None);
        assert_eq!(update.point_start, None);
    }

    #[test]
    fn implicit_payload_parses_start_and_interval_strings() {
        let update = decode_payload(
            &json!({"data": [1.0, 2.0], "start": "2021-05-12", "interval": "PT1H"}),
            false,
            false,
        );
        assert_eq!(update.point_start, Some(1_620_777_600_000));
        assert_eq!(update.point_interval, Some(3_600_000));
        assert_eq!(update.points.len(), 2);
        assert_eq!(update.points[0].x, None);
    }

    #[test]
    fn interval_unit_beats_nothing_but_parses() {
        let update = decode_payload(
            &json!({"data": [1.0], "pointStart": 0, "pointIntervalUnit": "month"}),
            false,
            false,
        );
        assert_eq!(update.point_interval_unit, Some(IntervalUnit::Month));
    }

    #[test]
    fn vector_elements_normalize_with_and_without_timestamp() {
        assert_eq!(
            normalize_element(&json!([5.0, 90.0]), true, true),
            Some(DataPoint { x: None, y: Some(5.0), direction: Some(90.0) })
        );
        assert_eq!(
            normalize_element(&json!([1000, 5.0, 90.0]), true, true),
            Some(DataPoint { x: Some(1000), y: Some(5.0), direction: Some(90.0) })
        );
        assert_eq!(
            normalize_element(&json!({"x": 1000, "speed": 5.0, "d": 90.0}), true, true),
            Some(DataPoint { x: Some(1000), y: Some(5.0), direction: Some(90.0) })
        );
        assert_eq!(
            normalize_element(&json!({"x": 1000, "y": [5.0, 90.0]}), true, true),
            Some(DataPoint { x: Some(1000), y: Some(5.0), direction: Some(90.0) })
        );
    }

    #[test]
    fn direction_is_dropped_when_arrows_are_disabled() {
        let point = normalize_element(&json!({"x": 1000, "y": [5.0, 90.0]}), true, false).unwrap();
        assert_eq!(point.y, Some(5.0));
        assert_eq!(point.direction, None);
    }

    #[test]
    fn malformed_elements_are_skipped_not_fatal() {
        let update = decode_payload(&json!([[0, 1.0], "bogus", [1, 2, 3, 4], [2, 2.0]]), false, false);
        assert_eq!(update.points.len(), 2);
    }

    #[test]
    fn duration_parser_covers_common_forms() {
        assert_eq!(parse_duration_ms("PT1H"), Some(3_600_000));
        assert_eq!(parse_duration_ms("PT30M"), Some(1_800_000));
        assert_eq!(parse_duration_ms("P1DT6H"), Some(108_000_000));
        assert_eq!(parse_duration_ms("P2W"), Some(1_209_600_000));
        assert_eq!(parse_duration_ms("soon"), None);
    }
}
