//! # Scaling
//!
//! Multiplies amounts by a serving ratio. The multiplier is
//! `target / original` for whatever the recipe counts in (servings, units,
//! containers); scaling itself does not care which.
//!
//! Text after the leading amount is kept exactly as written, so
//! `"1/2 cup"` scaled by 3 reads `"1½ cup"` and `"200g"` doubled reads `"400g"`.
//! A zero, negative or non-finite multiplier leaves the amount untouched.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::model::{AlternativeIngredient, ParsedIngredient};
use crate::quantity::{leading_quantity_span, map_amount, Quantity};

/// What a recipe's yield counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingModel {
    /// People served.
    #[default]
    Servings,
    /// Pieces produced (cookies, muffins).
    Units,
    /// Molds or pans filled.
    Containers,
}

/// A recipe yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portions {
    pub model: ServingModel,
    pub count: f64,
}

impl Portions {
    pub fn new(model: ServingModel, count: f64) -> Self {
        Self { model, count }
    }

    /// Multiplier from this yield to `target` of the same kind.
    pub fn multiplier_to(&self, target: f64) -> Option<f64> {
        portion_multiplier(self.count, target)
    }
}

/// `target / original`, or `None` when the original count is not a positive number.
pub fn portion_multiplier(original: f64, target: f64) -> Option<f64> {
    if !original.is_finite() || original <= 0.0 || !target.is_finite() {
        return None;
    }
    Some(target / original)
}

fn is_noop(multiplier: f64) -> bool {
    multiplier == 1.0 || !multiplier.is_finite() || multiplier <= 0.0
}

/// Scale the leading amount of `amount`, keeping whatever follows it.
pub fn scale_amount(amount: &str, multiplier: f64) -> String {
    if is_noop(multiplier) {
        return amount.to_string();
    }

    let Some((start, end)) = leading_quantity_span(amount) else {
        trace!("No leading amount in '{}', leaving it unscaled", amount);
        return amount.to_string();
    };

    match map_amount(&amount[start..end], |value| value * multiplier) {
        Some(scaled) => format!("{}{}{}", &amount[..start], scaled, &amount[end..]),
        None => amount.to_string(),
    }
}

/// Scale an amount written for `original` portions to `target` portions.
///
/// A target of zero, or an unusable original count, returns the text unchanged.
pub fn scale_for_portions(amount: &str, original: f64, target: f64) -> String {
    match portion_multiplier(original, target) {
        Some(multiplier) => scale_amount(amount, multiplier),
        None => amount.to_string(),
    }
}

/// Scale a [`Quantity`]; non-numeric quantities come back unchanged.
pub fn scale_quantity(quantity: &Quantity, multiplier: f64) -> Quantity {
    if is_noop(multiplier) {
        return quantity.clone();
    }
    match quantity.value {
        Some(value) => Quantity::from_value(value * multiplier),
        None => match map_amount(&quantity.display, |value| value * multiplier) {
            Some(display) => Quantity {
                value: None,
                display,
            },
            None => quantity.clone(),
        },
    }
}

/// Scale every amount slot of an ingredient, its alternative included.
pub fn scale_ingredient(ingredient: &ParsedIngredient, multiplier: f64) -> ParsedIngredient {
    if ingredient.is_header {
        return ingredient.clone();
    }

    ParsedIngredient {
        amount: scale_quantity(&ingredient.amount, multiplier),
        amount2: ingredient
            .amount2
            .as_ref()
            .map(|q| scale_quantity(q, multiplier)),
        alternative: ingredient
            .alternative
            .as_ref()
            .map(|alt| AlternativeIngredient {
                amount: scale_quantity(&alt.amount, multiplier),
                amount2: alt.amount2.as_ref().map(|q| scale_quantity(q, multiplier)),
                ..alt.clone()
            }),
        ..ingredient.clone()
    }
}
