//! Axis range policies and their resolution into renderer-ready constraints.
//!
//! A policy is one of: none, fixed `[lo, hi]` window, semi-fixed (pinned min
//! plus forced span), or a minimum-range constraint. The resolver assumes a
//! single selected policy; precedence between conflicting sources is settled
//! by `effective_policy` before resolution, and a fixed range always silences
//! the other two.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// Declared range behavior for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangePolicy {
    None,
    FixedRange { min: f64, max: f64 },
    SemiFixedRange { min: f64, range: f64 },
    MinRange(f64),
}

impl RangePolicy {
    /// Parses the loose wire shapes accepted for a policy object:
    /// `{"fixedRange": [lo, hi]}`, `{"semiFixedRange": [min, range]}` or
    /// `{"semiFixedRange": {"min": .., "range": ..}}`, `{"minRange": value}`.
    pub fn from_value(value: &Value) -> ChartResult<Self> {
        let Some(object) = value.as_object() else {
            return Err(ChartError::InvalidRangePolicy(format!(
                "expected an object, got {value}"
            )));
        };

        if let Some(fixed) = object.get("fixedRange") {
            let (min, max) = pair_from(fixed)
                .ok_or_else(|| ChartError::InvalidRangePolicy(format!(
                    "fixedRange must be a [lo, hi] tuple, got {fixed}"
                )))?;
            return Ok(Self::FixedRange { min, max });
        }

        if let Some(semi) = object.get("semiFixedRange") {
            if let Some((min, range)) = pair_from(semi) {
                return Ok(Self::SemiFixedRange { min, range });
            }
            let min = semi.get("min").and_then(Value::as_f64);
            let range = semi.get("range").and_then(Value::as_f64);
            return match (min, range) {
                (Some(min), Some(range)) => Ok(Self::SemiFixedRange { min, range }),
                _ => Err(ChartError::InvalidRangePolicy(format!(
                    "semiFixedRange must be a [min, range] tuple or a {{min, range}} object, got {semi}"
                ))),
            };
        }

        if let Some(min_range) = object.get("minRange") {
            return min_range
                .as_f64()
                .map(Self::MinRange)
                .ok_or_else(|| ChartError::InvalidRangePolicy(format!(
                    "minRange must be a number, got {min_range}"
                )));
        }

        Err(ChartError::InvalidRangePolicy(format!(
            "no recognized policy key in {value}"
        )))
    }

    /// Resolves this policy into axis min/max/tick behavior.
    #[must_use]
    pub fn resolve(&self) -> RangeSpec {
        match *self {
            Self::None => RangeSpec::default(),
            Self::FixedRange { min, max } => RangeSpec {
                min: Some(min),
                max: Some(max),
                min_span: None,
                start_on_tick: false,
                end_on_tick: false,
                tick_positioner: TickPositioner::FixedAnchors { lo: min, hi: max },
            },
            Self::SemiFixedRange { min, range } => RangeSpec {
                min: Some(min),
                max: Some(min + range),
                min_span: None,
                start_on_tick: true,
                end_on_tick: true,
                // Default ticking runs against the pinned min and span.
                tick_positioner: TickPositioner::Default,
            },
            Self::MinRange(value) => RangeSpec {
                min: None,
                max: None,
                min_span: Some(value),
                start_on_tick: true,
                end_on_tick: true,
                tick_positioner: TickPositioner::PassThrough,
            },
        }
    }
}

/// Selects the single applicable policy for an axis.
///
/// Precedence: explicit per-axis override > chart-level per-parameter map >
/// the parameter's own declared policy > none.
#[must_use]
pub fn effective_policy(
    override_policy: Option<&RangePolicy>,
    chart_policy: Option<&RangePolicy>,
    declared_policy: Option<&RangePolicy>,
) -> RangePolicy {
    override_policy
        .or(chart_policy)
        .or(declared_policy)
        .copied()
        .unwrap_or(RangePolicy::None)
}

/// Resolved range-policy output carried by an axis spec.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Standard minimum-range constraint passed through to the axis.
    pub min_span: Option<f64>,
    pub start_on_tick: bool,
    pub end_on_tick: bool,
    pub tick_positioner: TickPositioner,
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            min_span: None,
            start_on_tick: false,
            end_on_tick: false,
            tick_positioner: TickPositioner::Default,
        }
    }
}

/// Tick placement strategy applied against the renderer's computed ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TickPositioner {
    /// Let the renderer's own ticking run.
    Default,
    /// Keep the computed ticks as-is. Used by `MinRange`, where the legacy
    /// corrective logic is deprecated and intentionally not reproduced.
    PassThrough,
    /// Anchor ticks for a fixed range.
    FixedAnchors { lo: f64, hi: f64 },
}

impl TickPositioner {
    /// Produces the final tick set given the renderer's computed ticks, or
    /// `None` when default ticking should be left alone.
    ///
    /// Fixed anchors yield the sorted unique set of `{0, lo, hi}` plus every
    /// computed tick strictly inside `(lo, hi)`.
    #[must_use]
    pub fn apply(&self, computed: &[f64]) -> Option<Vec<f64>> {
        match *self {
            Self::Default => None,
            Self::PassThrough => Some(computed.to_vec()),
            Self::FixedAnchors { lo, hi } => {
                let mut ticks: SmallVec<[f64; 8]> = SmallVec::new();
                ticks.push(0.0);
                ticks.push(lo);
                ticks.push(hi);
                ticks.extend(computed.iter().copied().filter(|t| *t > lo && *t < hi));
                ticks.sort_by_key(|t| OrderedFloat(*t));
                ticks.dedup();
                Some(ticks.into_vec())
            }
        }
    }
}

fn pair_from(value: &Value) -> Option<(f64, f64)> {
    let items = value.as_array()?;
    if items.len() != 2 {
        return None;
    }
    Some((items[0].as_f64()?, items[1].as_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_shapes_parse_into_policies() {
        assert_eq!(
            RangePolicy::from_value(&json!({"fixedRange": [0.0, 10.0]})).unwrap(),
            RangePolicy::FixedRange { min: 0.0, max: 10.0 }
        );
        assert_eq!(
            RangePolicy::from_value(&json!({"semiFixedRange": [-1.0, 4.0]})).unwrap(),
            RangePolicy::SemiFixedRange { min: -1.0, range: 4.0 }
        );
        assert_eq!(
            RangePolicy::from_value(&json!({"semiFixedRange": {"min": 2.0, "range": 8.0}})).unwrap(),
            RangePolicy::SemiFixedRange { min: 2.0, range: 8.0 }
        );
        assert_eq!(
            RangePolicy::from_value(&json!({"minRange": 5.0})).unwrap(),
            RangePolicy::MinRange(5.0)
        );
    }

    #[test]
    fn malformed_shapes_are_configuration_errors() {
        for bad in [
            json!(42),
            json!({"fixedRange": [1.0]}),
            json!({"fixedRange": "wide"}),
            json!({"semiFixedRange": {"min": 1.0}}),
            json!({"somethingElse": 1}),
        ] {
            assert!(matches!(
                RangePolicy::from_value(&bad),
                Err(ChartError::InvalidRangePolicy(_))
            ));
        }
    }

    #[test]
    fn fixed_anchor_ticks_merge_inner_computed_ticks() {
        let spec = RangePolicy::FixedRange { min: 0.0, max: 10.0 }.resolve();
        let ticks = spec.tick_positioner.apply(&[-2.0, 2.5, 5.0, 10.0, 12.0]).unwrap();
        assert_eq!(ticks, vec![0.0, 2.5, 5.0, 10.0]);
        assert!(!spec.start_on_tick);
        assert!(!spec.end_on_tick);
    }

    #[test]
    fn min_range_is_a_bare_pass_through() {
        let spec = RangePolicy::MinRange(3.0).resolve();
        assert_eq!(spec.min_span, Some(3.0));
        assert_eq!(spec.tick_positioner.apply(&[1.0, 2.0]), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn precedence_prefers_override_then_chart_then_declared() {
        let declared = RangePolicy::MinRange(1.0);
        let chart = RangePolicy::SemiFixedRange { min: 0.0, range: 5.0 };
        let explicit = RangePolicy::FixedRange { min: -1.0, max: 1.0 };

        assert_eq!(
            effective_policy(Some(&explicit), Some(&chart), Some(&declared)),
            explicit
        );
        assert_eq!(effective_policy(None, Some(&chart), Some(&declared)), chart);
        assert_eq!(effective_policy(None, None, Some(&declared)), declared);
        assert_eq!(effective_policy(None, None, None), RangePolicy::None);
    }
}
