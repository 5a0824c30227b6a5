//! # Unit Conversion
//!
//! Converts amounts between cooking units. Units of one family convert by a
//! fixed ratio; volume and weight convert through the ingredient's density
//! (grams per US cup), looked up by name with a default fallback so a
//! missing entry never blocks a conversion.
//!
//! Failures never raise: the result carries `success: false` and the
//! original amount text.
//!
//! ```rust
//! use ingredient_scaler::engine::default_engine;
//! use ingredient_scaler::convert::DisplayMode;
//!
//! let engine = default_engine();
//! let result = engine.convert_ingredient("1", "cup", "g", "flour");
//! assert!(result.success);
//! assert_eq!(result.amount, "125");
//!
//! let shown = engine.convert_for_display("250", "g", "flour", DisplayMode::American);
//! assert_eq!((shown.amount.as_str(), shown.unit.as_str()), ("2", "cups"));
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::engine::{DensitySource, IngredientEngine};
use crate::quantity::{map_amount, parse_quantity, parse_range};
use crate::units::{convert_within_family, Unit, UnitFamily, UnitSystem, ML_PER_CUP};

/// Outcome of [`IngredientEngine::convert_ingredient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    /// Converted amount, or the original text when `success` is false.
    pub amount: String,
}

impl ConversionResult {
    fn failed(amount: &str) -> Self {
        Self {
            success: false,
            amount: amount.trim().to_string(),
        }
    }
}

/// Measurement system the user wants to read amounts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Amounts as written.
    #[default]
    Original,
    Metric,
    American,
}

/// An amount and unit ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayAmount {
    pub amount: String,
    pub unit: String,
}

impl DisplayAmount {
    pub fn new(amount: &str, unit: &str) -> Self {
        Self {
            amount: amount.trim().to_string(),
            unit: unit.trim().to_string(),
        }
    }
}

/// Low and high end of a numeric amount or range.
pub(crate) fn amount_bounds(amount: &str) -> Option<(f64, f64)> {
    if let Some(value) = parse_quantity(amount).value {
        return Some((value, value));
    }
    let range = parse_range(amount)?;
    Some((range.low, range.high))
}

impl IngredientEngine {
    /// Multiplier taking an amount in `from` to `to` for the named ingredient.
    ///
    /// `None` when a count unit is involved (other than an identity).
    pub fn conversion_factor(&self, from: Unit, to: Unit, ingredient_name: &str) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }

        match (from.family(), to.family()) {
            (UnitFamily::Count, _) | (_, UnitFamily::Count) => None,
            (a, b) if a == b => convert_within_family(1.0, from, to),
            (UnitFamily::Volume, UnitFamily::Weight) => {
                let (grams_per_cup, source) = self.density_for(ingredient_name);
                log_density(ingredient_name, source);
                Some(from.base_factor()? / ML_PER_CUP * grams_per_cup / to.base_factor()?)
            }
            (UnitFamily::Weight, UnitFamily::Volume) => {
                let (grams_per_cup, source) = self.density_for(ingredient_name);
                log_density(ingredient_name, source);
                Some(from.base_factor()? / grams_per_cup * ML_PER_CUP / to.base_factor()?)
            }
            _ => None,
        }
    }

    /// Numeric core of conversion.
    pub fn convert_value(
        &self,
        value: f64,
        from: Unit,
        to: Unit,
        ingredient_name: &str,
    ) -> Option<f64> {
        Some(value * self.conversion_factor(from, to, ingredient_name)?)
    }

    /// Convert an amount written in `from_unit` to `to_unit`.
    ///
    /// Both ends of a range are converted. Fails when either unit is not
    /// recognized, when a count unit has no volume or weight equivalent, or
    /// when the amount is not numeric.
    pub fn convert_ingredient(
        &self,
        amount: &str,
        from_unit: &str,
        to_unit: &str,
        ingredient_name: &str,
    ) -> ConversionResult {
        let Some(from) = self.normalize_unit(from_unit) else {
            debug!("Unknown source unit '{}'", from_unit);
            return ConversionResult::failed(amount);
        };
        let Some(to) = self.normalize_unit(to_unit) else {
            debug!("Unknown target unit '{}'", to_unit);
            return ConversionResult::failed(amount);
        };
        let Some(factor) = self.conversion_factor(from, to, ingredient_name) else {
            debug!("No conversion from {} to {}", from, to);
            return ConversionResult::failed(amount);
        };

        match map_amount(amount, |value| value * factor) {
            Some(converted) => {
                trace!("Converted '{} {}' to '{} {}'", amount, from, converted, to);
                ConversionResult {
                    success: true,
                    amount: converted,
                }
            }
            None => {
                debug!("Amount '{}' is not numeric, nothing to convert", amount);
                ConversionResult::failed(amount)
            }
        }
    }

    /// Re-express an amount in the requested measurement system.
    ///
    /// American mode moves metric weights and volumes to cups, stepping down
    /// to tablespoons below 0.1 cup and to teaspoons below 1 tablespoon.
    /// Metric mode moves ounces and pounds to grams (kilograms from 1000 g),
    /// re-buckets gram totals of 1000 g and up to kilograms, and moves
    /// cup-scale imperial volumes to milliliters; spoons stay as they are.
    /// Count units, unknown units and non-numeric amounts pass through.
    pub fn convert_for_display(
        &self,
        amount: &str,
        unit: &str,
        ingredient_name: &str,
        mode: DisplayMode,
    ) -> DisplayAmount {
        let original = DisplayAmount::new(amount, unit);
        if mode == DisplayMode::Original {
            return original;
        }

        let Some(from) = self.normalize_unit(unit) else {
            return original;
        };
        let Some((low, high)) = amount_bounds(amount) else {
            return original;
        };

        let target = match mode {
            DisplayMode::American => self.american_target(from, low, ingredient_name),
            DisplayMode::Metric => metric_target(from, low),
            DisplayMode::Original => None,
        };
        let Some(target) = target else {
            return original;
        };
        let Some(factor) = self.conversion_factor(from, target, ingredient_name) else {
            return original;
        };

        let whole_small_units = matches!(target, Unit::Gram | Unit::Milliliter);
        let convert = |value: f64| {
            let converted = value * factor;
            if whole_small_units && converted >= 10.0 {
                converted.round()
            } else {
                converted
            }
        };

        match map_amount(amount, convert) {
            Some(converted) => DisplayAmount {
                amount: converted,
                unit: target.label(high * factor),
            },
            None => original,
        }
    }

    fn american_target(&self, from: Unit, value: f64, ingredient_name: &str) -> Option<Unit> {
        if from.system() != UnitSystem::Metric {
            return None;
        }
        let cups = self.convert_value(value, from, Unit::Cup, ingredient_name)?;
        if cups >= 0.1 {
            return Some(Unit::Cup);
        }
        let tablespoons = convert_within_family(cups, Unit::Cup, Unit::Tablespoon)?;
        if tablespoons >= 1.0 {
            Some(Unit::Tablespoon)
        } else {
            Some(Unit::Teaspoon)
        }
    }
}

fn metric_target(from: Unit, value: f64) -> Option<Unit> {
    if matches!(from, Unit::Milligram | Unit::Gram) {
        let grams = convert_within_family(value, from, Unit::Gram)?;
        return (grams >= 1000.0).then_some(Unit::Kilogram);
    }
    if from.system() != UnitSystem::Imperial {
        return None;
    }
    if from.is_weight() {
        let grams = convert_within_family(value, from, Unit::Gram)?;
        return Some(if grams >= 1000.0 {
            Unit::Kilogram
        } else {
            Unit::Gram
        });
    }
    Some(Unit::Milliliter)
}

fn log_density(ingredient_name: &str, source: DensitySource) {
    if source != DensitySource::Table {
        trace!("Converting '{}' with {:?} density", ingredient_name, source);
    }
}
