//! # Measurement Units
//!
//! Canonical cooking units, grouped into families. Spelling and locale
//! variants ("cucharada", "tbsp", "Tablespoons") are resolved to a [`Unit`]
//! through the synonym table in [`crate::tables::Tables`]; this module only
//! knows the canonical set and the fixed ratios inside each family.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement family. Only units of the same family convert by a fixed ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitFamily {
    Volume,
    Weight,
    Count,
}

/// Which measurement system a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSystem {
    Metric,
    Imperial,
    /// Spoons, pinches and counts are used the same way on both sides.
    Neutral,
}

/// Canonical cooking units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    // Volume units
    Teaspoon,
    Tablespoon,
    FluidOunce,
    Cup,
    Pint,
    Quart,
    Gallon,
    Milliliter,
    Centiliter,
    Deciliter,
    Liter,

    // Weight units
    Milligram,
    Gram,
    Kilogram,
    Ounce,
    Pound,

    // Count units
    Piece,
    Clove,
    Bulb,
    Pinch,
    Dash,
    Can,
    Slice,
    Package,
    Bunch,
    Handful,
    Stick,
    Sprig,
}

/// Milliliters in one US cup; densities are expressed per cup.
pub const ML_PER_CUP: f64 = 236.588;

impl Unit {
    pub const ALL: [Unit; 28] = [
        Unit::Teaspoon,
        Unit::Tablespoon,
        Unit::FluidOunce,
        Unit::Cup,
        Unit::Pint,
        Unit::Quart,
        Unit::Gallon,
        Unit::Milliliter,
        Unit::Centiliter,
        Unit::Deciliter,
        Unit::Liter,
        Unit::Milligram,
        Unit::Gram,
        Unit::Kilogram,
        Unit::Ounce,
        Unit::Pound,
        Unit::Piece,
        Unit::Clove,
        Unit::Bulb,
        Unit::Pinch,
        Unit::Dash,
        Unit::Can,
        Unit::Slice,
        Unit::Package,
        Unit::Bunch,
        Unit::Handful,
        Unit::Stick,
        Unit::Sprig,
    ];

    /// Canonical short token, also used as the display form.
    pub fn token(&self) -> &'static str {
        match self {
            Unit::Teaspoon => "tsp",
            Unit::Tablespoon => "tbsp",
            Unit::FluidOunce => "fl oz",
            Unit::Cup => "cup",
            Unit::Pint => "pint",
            Unit::Quart => "quart",
            Unit::Gallon => "gallon",
            Unit::Milliliter => "ml",
            Unit::Centiliter => "cl",
            Unit::Deciliter => "dl",
            Unit::Liter => "l",
            Unit::Milligram => "mg",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Piece => "piece",
            Unit::Clove => "clove",
            Unit::Bulb => "bulb",
            Unit::Pinch => "pinch",
            Unit::Dash => "dash",
            Unit::Can => "can",
            Unit::Slice => "slice",
            Unit::Package => "package",
            Unit::Bunch => "bunch",
            Unit::Handful => "handful",
            Unit::Stick => "stick",
            Unit::Sprig => "sprig",
        }
    }

    /// Display token for an amount, pluralizing word units above one.
    pub fn label(&self, amount: f64) -> String {
        let token = self.token();
        let is_word =
            self.is_count() || matches!(self, Unit::Cup | Unit::Pint | Unit::Quart | Unit::Gallon);
        if !is_word || amount <= 1.0 {
            return token.to_string();
        }
        match self {
            Unit::Pinch | Unit::Dash | Unit::Bunch => format!("{}es", token),
            _ => format!("{}s", token),
        }
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Teaspoon
            | Unit::Tablespoon
            | Unit::FluidOunce
            | Unit::Cup
            | Unit::Pint
            | Unit::Quart
            | Unit::Gallon
            | Unit::Milliliter
            | Unit::Centiliter
            | Unit::Deciliter
            | Unit::Liter => UnitFamily::Volume,
            Unit::Milligram | Unit::Gram | Unit::Kilogram | Unit::Ounce | Unit::Pound => {
                UnitFamily::Weight
            }
            _ => UnitFamily::Count,
        }
    }

    pub fn system(&self) -> UnitSystem {
        match self {
            Unit::Milliliter
            | Unit::Centiliter
            | Unit::Deciliter
            | Unit::Liter
            | Unit::Milligram
            | Unit::Gram
            | Unit::Kilogram => UnitSystem::Metric,
            Unit::FluidOunce
            | Unit::Cup
            | Unit::Pint
            | Unit::Quart
            | Unit::Gallon
            | Unit::Ounce
            | Unit::Pound => UnitSystem::Imperial,
            _ => UnitSystem::Neutral,
        }
    }

    /// Size of one unit in its family's base unit (ml for volume, g for weight).
    ///
    /// Count units have no fixed size and return `None`.
    pub fn base_factor(&self) -> Option<f64> {
        let factor = match self {
            Unit::Teaspoon => 4.92892,
            Unit::Tablespoon => 14.7868,
            Unit::FluidOunce => 29.5735,
            Unit::Cup => ML_PER_CUP,
            Unit::Pint => 473.176,
            Unit::Quart => 946.353,
            Unit::Gallon => 3785.41,
            Unit::Milliliter => 1.0,
            Unit::Centiliter => 10.0,
            Unit::Deciliter => 100.0,
            Unit::Liter => 1000.0,
            Unit::Milligram => 0.001,
            Unit::Gram => 1.0,
            Unit::Kilogram => 1000.0,
            Unit::Ounce => 28.3495,
            Unit::Pound => 453.592,
            _ => return None,
        };
        Some(factor)
    }

    pub fn is_volume(&self) -> bool {
        self.family() == UnitFamily::Volume
    }

    pub fn is_weight(&self) -> bool {
        self.family() == UnitFamily::Weight
    }

    pub fn is_count(&self) -> bool {
        self.family() == UnitFamily::Count
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Convert an amount between two units of the same measurable family.
pub fn convert_within_family(amount: f64, from: Unit, to: Unit) -> Option<f64> {
    if from.family() != to.family() {
        return None;
    }
    if from == to {
        return Some(amount);
    }
    Some(amount * from.base_factor()? / to.base_factor()?)
}
