//! Measured-quantity model: units and parameters.
//!
//! A `Parameter` is immutable once constructed. Cloning with an overridden
//! unit produces a new value with its decimal precision recalculated from the
//! ratio of SI scale factors; the shared original is never touched.

use serde::{Deserialize, Serialize};

use crate::core::range_policy::RangePolicy;
use crate::core::text::{LocalizedText, Translator, decode_entities};

/// Measurement unit with the SI scale factor used for precision recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: LocalizedText,
    /// Scale factor relative to the SI base unit (cm => 0.01).
    pub si_factor: f64,
    /// Suppresses the separator space between value and unit (e.g. `12°`).
    #[serde(default)]
    pub no_space: bool,
}

impl Unit {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<LocalizedText>, si_factor: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            si_factor,
            no_space: false,
        }
    }

    #[must_use]
    pub fn without_space(mut self) -> Self {
        self.no_space = true;
        self
    }

    /// Plain-text unit name, optionally with its leading separator space.
    #[must_use]
    pub fn display_name(&self, translator: &dyn Translator, incl_space: bool) -> String {
        let name = decode_entities(&translator.translate(&self.name));
        if incl_space && !self.no_space {
            format!(" {name}")
        } else {
            name
        }
    }
}

/// Speed and direction components of a vector parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorComponents {
    pub speed: Box<Parameter>,
    pub direction: Box<Parameter>,
}

/// A named measured quantity with unit, precision, and range metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub name: LocalizedText,
    pub unit: Unit,
    pub decimals: u8,
    /// Whether the quantity can go below zero. Drives zero-line rendering and
    /// the non-negative axis floor.
    #[serde(default)]
    pub negative: bool,
    /// Present when this parameter represents a speed+direction vector pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<VectorComponents>,
    /// The parameter's own declared range policy, lowest in the precedence
    /// chain (explicit per-axis override > chart-level map > this > none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_policy: Option<RangePolicy>,
}

impl Parameter {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<LocalizedText>, unit: Unit) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit,
            decimals: 0,
            negative: false,
            vector: None,
            range_policy: None,
        }
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub fn allow_negative(mut self) -> Self {
        self.negative = true;
        self
    }

    #[must_use]
    pub fn with_vector(mut self, speed: Parameter, direction: Parameter) -> Self {
        self.vector = Some(VectorComponents {
            speed: Box::new(speed),
            direction: Box::new(direction),
        });
        self
    }

    #[must_use]
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn is_vector(&self) -> bool {
        self.vector.is_some()
    }

    /// Clone with an overridden unit.
    ///
    /// Decimal precision shifts by the rounded log10 ratio of the unit scale
    /// factors, floored at zero: sealevel in m with 2 decimals becomes
    /// sealevel in cm with 0 decimals.
    #[must_use]
    pub fn with_unit(&self, unit: Unit) -> Self {
        let shift = (unit.si_factor / self.unit.si_factor).log10().round() as i32;
        let decimals = (i32::from(self.decimals) + shift).max(0) as u8;
        let mut clone = self.clone();
        clone.unit = unit;
        clone.decimals = decimals;
        clone
    }

    /// Plain-text display name, optionally with the unit appended.
    ///
    /// `use_speed` substitutes the speed component's name for vector
    /// parameters, matching how a merged speed+direction series is labeled.
    #[must_use]
    pub fn display_name(
        &self,
        translator: &dyn Translator,
        incl_unit: bool,
        use_speed: bool,
    ) -> String {
        let named = match (&self.vector, use_speed) {
            (Some(vector), true) => &vector.speed,
            _ => self,
        };
        let mut name = decode_entities(&translator.translate(&named.name));
        if incl_unit {
            name.push_str(&named.unit.display_name(translator, true));
        }
        name
    }

    /// Unit text appended after each formatted value in tooltips.
    #[must_use]
    pub fn value_suffix(&self, translator: &dyn Translator) -> String {
        self.unit.display_name(translator, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::text::LangTranslator;

    fn meters() -> Unit {
        Unit::new("m", "m", 1.0)
    }

    #[test]
    fn with_unit_recalculates_decimals_by_log_ratio() {
        let sealevel = Parameter::new("sealevel", "Sea level", meters()).with_decimals(2);
        let in_cm = sealevel.with_unit(Unit::new("cm", "cm", 0.01));

        assert_eq!(in_cm.decimals, 0);
        assert_eq!(in_cm.unit.id, "cm");
        // The shared original is untouched.
        assert_eq!(sealevel.decimals, 2);
        assert_eq!(sealevel.unit.id, "m");
    }

    #[test]
    fn with_unit_gains_decimals_for_coarser_units_and_floors_at_zero() {
        let param = Parameter::new("p", "P", meters()).with_decimals(1);
        // A km reading needs more decimals to keep the same resolution.
        let coarse = param.with_unit(Unit::new("km", "km", 1000.0));
        assert_eq!(coarse.decimals, 4);

        // The mm shift would be negative, so precision floors at zero.
        let fine = param.with_unit(Unit::new("mm", "mm", 0.001));
        assert_eq!(fine.decimals, 0);
    }

    #[test]
    fn display_name_decodes_entities_and_appends_unit() {
        let translator = LangTranslator::default();
        let temp = Parameter::new(
            "temp",
            "Temperature",
            Unit::new("degC", "&deg;C", 1.0).without_space(),
        );
        assert_eq!(temp.display_name(&translator, true, false), "Temperature°C");
        assert_eq!(temp.display_name(&translator, false, false), "Temperature");
    }

    #[test]
    fn display_name_uses_speed_component_for_vectors() {
        let translator = LangTranslator::default();
        let speed = Parameter::new("wind-speed", "Wind speed", Unit::new("ms", "m/s", 1.0));
        let direction = Parameter::new("wind-dir", "Wind direction", meters());
        let wind = Parameter::new("wind", "Wind", Unit::new("ms", "m/s", 1.0))
            .with_vector(speed, direction);

        assert_eq!(wind.display_name(&translator, false, true), "Wind speed");
        assert_eq!(wind.display_name(&translator, false, false), "Wind");
    }
}
