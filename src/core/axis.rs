//! Y-axis synthesis: how many axes a chart gets, which series share one, and
//! where each axis sits.
//!
//! Placement invariant: axes are ordered by the original parameter index of
//! their first occurrence; the first ceil(N/2) go to the left, the remainder
//! to the right, so axis positions match legend/series order left-to-right.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::palette::Color;
use crate::core::parameter::Parameter;
use crate::core::range_policy::{RangePolicy, RangeSpec, effective_policy};
use crate::core::series::SeriesDescriptor;
use crate::core::text::Translator;
use crate::error::{ChartError, ChartResult};

/// Axis id used when every series shares one vertical scale.
pub const SHARED_AXIS_ID: &str = "ALL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSide {
    Left,
    Right,
}

/// Axis title text and color. A merged (shared) axis forces the color to the
/// palette's neutral mark.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisTitle {
    pub text: Option<String>,
    pub color: Option<Color>,
}

/// One finalized y-axis. Built once per chart build; never mutated after the
/// axis list is handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub id: String,
    pub parameter_id: String,
    pub side: AxisSide,
    pub title: AxisTitle,
    pub label_decimals: u8,
    pub line_color: Option<Color>,
    pub range: RangeSpec,
    /// Draw a zero plot line when the parameter admits negative values.
    pub zero_line: bool,
    /// Clamp the axis floor at zero for non-negative parameters.
    pub non_negative_floor: bool,
    pub crosshair: bool,
}

/// Caller-supplied per-axis override, matched by original parameter index.
/// Overrides touch cosmetic and range fields only; they never change placement
/// side or axis identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOverride {
    pub title_text: Option<String>,
    pub title_color: Option<Color>,
    pub range_policy: Option<RangePolicy>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Output of axis assignment: the axis list plus the axis id resolved for each
/// original parameter index.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisAssignment {
    pub axes: Vec<AxisSpec>,
    pub parameter_axis: Vec<String>,
}

/// Decides the number of y-axes, axis sharing, and left/right placement.
#[derive(Debug, Clone)]
pub struct AxisAssignmentEngine {
    pub share_y_axis: bool,
    /// Chart-level per-parameter range policies, keyed by parameter id.
    pub range_policies: IndexMap<String, RangePolicy>,
    /// Per-axis overrides matched by original parameter index.
    pub overrides: Vec<AxisOverride>,
    /// Title color signalling a merged axis.
    pub neutral_title_color: Color,
}

impl AxisAssignmentEngine {
    pub fn assign(
        &self,
        parameters: &[Parameter],
        series: &[SeriesDescriptor],
        translator: &dyn Translator,
    ) -> ChartResult<AxisAssignment> {
        if parameters.is_empty() {
            return Err(ChartError::EmptyParameters);
        }

        if parameters.len() == 1 {
            return Ok(self.assign_shared(&parameters[0]));
        }
        Ok(self.assign_multi(parameters, series, translator))
    }

    /// Single parameter (one or many locations): one shared axis.
    fn assign_shared(&self, parameter: &Parameter) -> AxisAssignment {
        let range = self.effective_range(0, parameter);
        let mut axis = AxisSpec {
            id: SHARED_AXIS_ID.to_owned(),
            parameter_id: parameter.id.clone(),
            side: AxisSide::Left,
            // Shared axis keeps its title off; the parameter name lives in
            // the chart title or subtitle instead.
            title: AxisTitle::default(),
            label_decimals: parameter.decimals,
            line_color: None,
            range,
            zero_line: parameter.negative,
            non_negative_floor: !parameter.negative,
            crosshair: true,
        };
        self.apply_override(0, &mut axis);

        AxisAssignment {
            axes: vec![axis],
            parameter_axis: vec![SHARED_AXIS_ID.to_owned()],
        }
    }

    fn assign_multi(
        &self,
        parameters: &[Parameter],
        series: &[SeriesDescriptor],
        translator: &dyn Translator,
    ) -> AxisAssignment {
        // Sharing only activates when it would actually merge two series:
        // a chart with all-distinct parameters never merges.
        let has_duplicate = parameters.iter().enumerate().any(|(index, parameter)| {
            parameters[..index].iter().any(|other| other.id == parameter.id)
        });
        let share_active = self.share_y_axis && has_duplicate;

        struct Draft {
            first_index: usize,
            merged: bool,
        }

        let mut drafts: IndexMap<String, Draft> = IndexMap::new();
        let mut parameter_axis = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.iter().enumerate() {
            let key = if share_active {
                parameter.id.clone()
            } else {
                format!("{}:{index}", parameter.id)
            };
            drafts
                .entry(key.clone())
                .and_modify(|draft| draft.merged = true)
                .or_insert(Draft {
                    first_index: index,
                    merged: false,
                });
            parameter_axis.push(key);
        }

        let left_count = drafts.len().div_ceil(2);
        let mut axes = Vec::with_capacity(drafts.len());
        for (position, (key, draft)) in drafts.iter().enumerate() {
            let parameter = &parameters[draft.first_index];
            let series_color = series.get(draft.first_index).map(|s| s.style.color.clone());
            let title_color = if draft.merged {
                Some(self.neutral_title_color.clone())
            } else {
                series_color.clone()
            };

            let mut axis = AxisSpec {
                id: key.clone(),
                parameter_id: parameter.id.clone(),
                side: if position < left_count {
                    AxisSide::Left
                } else {
                    AxisSide::Right
                },
                title: AxisTitle {
                    text: Some(parameter.display_name(translator, true, true)),
                    color: title_color,
                },
                label_decimals: parameter.decimals,
                line_color: series_color,
                range: self.effective_range(draft.first_index, parameter),
                zero_line: parameter.negative,
                non_negative_floor: !parameter.negative,
                crosshair: true,
            };
            self.apply_override(draft.first_index, &mut axis);
            axes.push(axis);
        }

        // Overrides addressed to an index that never became an axis anchor
        // are silently dropped.
        for (index, override_options) in self.overrides.iter().enumerate() {
            let anchors_axis = drafts.values().any(|draft| draft.first_index == index);
            if !anchors_axis && *override_options != AxisOverride::default() {
                warn!(index, "axis override does not match any axis, ignoring");
            }
        }

        AxisAssignment {
            axes,
            parameter_axis,
        }
    }

    /// Resolves the single applicable range policy for the axis anchored at
    /// `index`, honoring precedence and the fixed-silences-others rule.
    fn effective_range(&self, index: usize, parameter: &Parameter) -> RangeSpec {
        let policy = effective_policy(
            self.overrides.get(index).and_then(|o| o.range_policy.as_ref()),
            self.range_policies.get(&parameter.id),
            parameter.range_policy.as_ref(),
        );
        policy.resolve()
    }

    /// Merges the override matched to `index` on top of the finished axis.
    /// Override fields always win when present; absent fields never clear
    /// policy output.
    fn apply_override(&self, index: usize, axis: &mut AxisSpec) {
        let Some(override_options) = self.overrides.get(index) else {
            return;
        };
        if let Some(text) = &override_options.title_text {
            axis.title.text = Some(text.clone());
        }
        if let Some(color) = &override_options.title_color {
            axis.title.color = Some(color.clone());
        }
        if let Some(min) = override_options.min {
            axis.range.min = Some(min);
        }
        if let Some(max) = override_options.max {
            axis.range.max = Some(max);
        }
    }
}
