//! # Ingredient and Instruction Data Model
//!
//! Structured results of parsing recipe text.
//!
//! ## Core Concepts
//!
//! - **ParsedIngredient**: one ingredient line, or a section header
//! - **Variant amount**: a second amount/unit for the same ingredient
//!   (a different mold size or unit system), stored in `amount2`/`unit2`
//! - **AlternativeIngredient**: a separate substitute offered as an "or" choice
//! - **Instruction**: one step, with advisory links to the ingredients it uses
//!
//! ## Usage
//!
//! ```rust
//! use ingredient_scaler::model::{ParsedIngredient, VariantSlot};
//!
//! let mut flour = ParsedIngredient::named("flour").with_amount("200", "g");
//! flour.set_variant_amount(VariantSlot::Secondary, "300", "g");
//!
//! let (amount, unit) = flour.amount_for(true);
//! assert_eq!((amount.display.as_str(), unit), ("300", "g"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quantity::{normalize_fraction_glyphs, parse_quantity, Quantity};

/// A substitute ingredient ("or 30 ml olive oil").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlternativeIngredient {
    pub name: String,
    pub amount: Quantity,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount2: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit2: Option<String>,
}

/// A parsed ingredient line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// Ingredient name; empty when nothing usable was extracted.
    pub name: String,

    pub amount: Quantity,

    /// Unit as written in the source ("cups", "cucharadas"); empty when absent.
    pub unit: String,

    /// Second variant of the same ingredient (another mold size, another unit system).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount2: Option<Quantity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit2: Option<String>,

    /// Section label ("For the base"); headers carry no amount.
    #[serde(default)]
    pub is_header: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<AlternativeIngredient>,

    /// Non-measurement parenthetical ("optional", "room temperature").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Which of the two amount slots of an ingredient to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantSlot {
    Primary,
    Secondary,
}

/// A recipe step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    /// Positions in the owning recipe's ingredient list. Advisory only.
    #[serde(default)]
    pub ingredient_indices: Vec<usize>,
    #[serde(default)]
    pub is_header: bool,
}

/// Build a stored amount: glyphs become ASCII fractions before parsing.
pub(crate) fn stored_quantity(text: &str) -> Quantity {
    parse_quantity(&normalize_fraction_glyphs(text))
}

impl ParsedIngredient {
    /// An ingredient with just a name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// A section header.
    pub fn header(label: &str) -> Self {
        Self {
            name: label.to_string(),
            is_header: true,
            ..Default::default()
        }
    }

    /// Set the primary amount and unit.
    pub fn with_amount(mut self, amount: &str, unit: &str) -> Self {
        self.set_variant_amount(VariantSlot::Primary, amount, unit);
        self
    }

    /// Overwrite one of the two amount slots. This is the only edit a
    /// parsed ingredient supports; headers ignore it.
    pub fn set_variant_amount(&mut self, slot: VariantSlot, amount: &str, unit: &str) {
        if self.is_header {
            return;
        }
        let quantity = stored_quantity(amount);
        let unit = unit.trim().to_string();
        match slot {
            VariantSlot::Primary => {
                self.amount = quantity;
                self.unit = unit;
            }
            VariantSlot::Secondary => {
                if quantity.is_empty() && unit.is_empty() {
                    self.amount2 = None;
                    self.unit2 = None;
                } else {
                    self.amount2 = Some(quantity);
                    self.unit2 = Some(unit);
                }
            }
        }
    }

    pub fn has_amount(&self) -> bool {
        !self.amount.is_empty()
    }

    pub fn has_variant(&self) -> bool {
        self.amount2.as_ref().is_some_and(|q| !q.is_empty())
    }

    /// Amount and unit to show: the variant pair when requested and present.
    pub fn amount_for(&self, use_variant: bool) -> (&Quantity, &str) {
        if use_variant {
            if let Some(amount2) = self.amount2.as_ref().filter(|q| !q.is_empty()) {
                return (amount2, self.unit2.as_deref().unwrap_or(""));
            }
        }
        (&self.amount, &self.unit)
    }

    /// Whether this entry is worth displaying (see the empty-name sentinel).
    pub fn is_usable(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl From<ParsedIngredient> for AlternativeIngredient {
    fn from(parsed: ParsedIngredient) -> Self {
        Self {
            name: parsed.name,
            amount: parsed.amount,
            unit: parsed.unit,
            amount2: parsed.amount2,
            unit2: parsed.unit2,
        }
    }
}

fn write_amount(f: &mut fmt::Formatter<'_>, amount: &Quantity, unit: &str) -> fmt::Result {
    match (amount.is_empty(), unit.is_empty()) {
        (true, true) => Ok(()),
        (false, true) => write!(f, "{} ", amount),
        (true, false) => write!(f, "{} ", unit),
        (false, false) => write!(f, "{} {} ", amount, unit),
    }
}

impl fmt::Display for AlternativeIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_amount(f, &self.amount, &self.unit)?;
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for ParsedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_header {
            return write!(f, "{}:", self.name);
        }

        write_amount(f, &self.amount, &self.unit)?;
        write!(f, "{}", self.name)?;

        if let Some(amount2) = &self.amount2 {
            write!(f, " ({}", amount2)?;
            if let Some(unit2) = self.unit2.as_deref().filter(|u| !u.is_empty()) {
                write!(f, " {}", unit2)?;
            }
            write!(f, ")")?;
        }

        if let Some(note) = &self.note {
            write!(f, " ({})", note)?;
        }

        if let Some(alternative) = &self.alternative {
            write!(f, " or {}", alternative)?;
        }

        Ok(())
    }
}
