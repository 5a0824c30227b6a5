//! # Shopping List Aggregation
//!
//! Combines the amounts of one ingredient coming from several recipes.
//!
//! A running total is a set of parts, one per unit family:
//!
//! - **Measured** volume or weight: summed in the largest unit seen, then
//!   re-bucketed (1000 g and up reads as kg, less than 0.1 cup steps down to
//!   spoons). A bucket whose rendering would round the total away steps down
//!   to a smaller unit instead, so "1 kg" and "4 g" stay "1004 g"
//! - **Counted** amounts ("2 cloves", "3"): summed per count unit
//! - **Text** that is not a number ("to taste"): listed once
//!
//! Parts that cannot be summed are joined with the configured separator in a
//! fixed order, so merging is order-independent:
//!
//! ```rust
//! use ingredient_scaler::engine::default_engine;
//!
//! let engine = default_engine();
//! assert_eq!(engine.combine_quantities("200 g", "1 kg", "flour"), "1.2 kg");
//! assert_eq!(engine.combine_quantities("2 cloves", "500 g", "garlic"), "2 cloves + 500 g");
//! ```
//!
//! Combining is not idempotent ("200 g" with itself is "400 g"), so
//! [`ShoppingList`] tracks contributions per recipe and replaces a recipe's
//! share when it is added again.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::engine::IngredientEngine;
use crate::model::ParsedIngredient;
use crate::quantity::{format_quantity, parse_quantity, split_leading_quantity};
use crate::text::normalize_key;
use crate::units::{convert_within_family, Unit, UnitFamily};

/// Largest drift, in grams or milliliters, a rendered total may have from
/// the running sum. Rendered totals are parsed again on the next merge.
const RENDER_TOLERANCE: f64 = 0.01;

/// Units a total may be shown in, largest first, per kitchen scale.
const STEP_DOWN: &[&[Unit]] = &[
    &[Unit::Kilogram, Unit::Gram, Unit::Milligram],
    &[Unit::Pound, Unit::Ounce],
    &[Unit::Gallon, Unit::Quart, Unit::Pint, Unit::Cup, Unit::Tablespoon, Unit::Teaspoon],
    &[Unit::FluidOunce, Unit::Tablespoon, Unit::Teaspoon],
    &[Unit::Liter, Unit::Deciliter, Unit::Centiliter, Unit::Milliliter],
];

/// One line of a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedItem {
    pub name: String,
    /// Total amount; the whole joined total when parts could not be summed.
    pub quantity: String,
    /// Unit of a single-part total, empty otherwise.
    pub unit: String,
    pub source_recipes: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct Counted {
    unit: Option<Unit>,
    /// Smallest spelling seen, for units outside the tables.
    written: String,
    value: f64,
}

#[derive(Debug, Clone)]
struct Measured {
    /// Largest unit seen.
    unit: Unit,
    /// Total in the family's base unit (ml or g).
    base: f64,
}

/// A running total of amounts for one ingredient.
#[derive(Debug, Clone, Default)]
struct Total {
    counted: BTreeMap<String, Counted>,
    measured: BTreeMap<UnitFamily, Measured>,
    texts: BTreeMap<String, String>,
}

fn singular_key(text: &str) -> String {
    let key = normalize_key(text);
    match key.strip_suffix('s') {
        Some(stem) if stem.chars().count() > 1 => stem.to_string(),
        _ => key,
    }
}

fn join_amount(amount: &str, unit: &str) -> String {
    match (amount.is_empty(), unit.is_empty()) {
        (_, true) => amount.to_string(),
        (true, false) => unit.to_string(),
        (false, false) => format!("{} {}", amount, unit),
    }
}

impl Measured {
    /// Unit the total would ideally be shown in.
    fn preferred_unit(&self) -> Unit {
        let factor = self.unit.base_factor().unwrap_or(1.0);

        if matches!(self.unit, Unit::Milligram | Unit::Gram) && self.base >= 1000.0 {
            Unit::Kilogram
        } else if self.unit == Unit::Cup && self.base / factor < 0.1 {
            let tablespoons = convert_within_family(self.base / factor, Unit::Cup, Unit::Tablespoon)
                .unwrap_or(0.0);
            if tablespoons >= 1.0 {
                Unit::Tablespoon
            } else {
                Unit::Teaspoon
            }
        } else {
            self.unit
        }
    }

    /// Display unit and value after re-bucketing.
    ///
    /// A unit is only used when its rendering reads back as the same total.
    /// Otherwise the total steps down through the smaller units of its scale
    /// and ends in the family's base unit.
    fn bucketed(&self) -> (f64, Unit) {
        let preferred = self.preferred_unit();
        let candidates = STEP_DOWN
            .iter()
            .find_map(|chain| {
                let start = chain.iter().position(|unit| *unit == preferred)?;
                Some(&chain[start..])
            })
            .unwrap_or(&[]);

        for &unit in candidates {
            let factor = unit.base_factor().unwrap_or(1.0);
            let value = self.base / factor;
            let shown = parse_quantity(&format_quantity(value)).value;
            if shown.is_some_and(|v| (v * factor - self.base).abs() <= RENDER_TOLERANCE) {
                return (value, unit);
            }
        }

        let base_unit = if preferred.is_weight() {
            Unit::Gram
        } else {
            Unit::Milliliter
        };
        trace!("Showing {} total in {}", self.base, base_unit);
        (self.base, base_unit)
    }
}

impl Total {
    fn add(&mut self, engine: &IngredientEngine, total: &str) {
        let separator = engine.config.merge_separator.trim();
        let pieces: Vec<&str> = if separator.is_empty() {
            vec![total]
        } else {
            total.split(separator).collect()
        };
        for piece in pieces {
            self.add_piece(engine, piece.trim());
        }
    }

    fn add_piece(&mut self, engine: &IngredientEngine, piece: &str) {
        if piece.is_empty() {
            return;
        }

        let numeric = split_leading_quantity(piece)
            .and_then(|(amount, rest)| parse_quantity(amount).value.map(|v| (v, rest.trim())));

        let Some((value, unit_text)) = numeric else {
            trace!("Keeping '{}' as text", piece);
            self.texts
                .entry(normalize_key(piece))
                .and_modify(|t| {
                    if piece < t.as_str() {
                        *t = piece.to_string();
                    }
                })
                .or_insert_with(|| piece.to_string());
            return;
        };

        match engine.normalize_unit(unit_text) {
            Some(unit) if !unit.is_count() => {
                let base = value * unit.base_factor().unwrap_or(1.0);
                self.measured
                    .entry(unit.family())
                    .and_modify(|m| {
                        m.base += base;
                        if unit.base_factor() > m.unit.base_factor() {
                            m.unit = unit;
                        }
                    })
                    .or_insert(Measured { unit, base });
            }
            recognized => {
                let key = match recognized {
                    Some(unit) => unit.token().to_string(),
                    None => singular_key(unit_text),
                };
                self.counted
                    .entry(key)
                    .and_modify(|c| {
                        c.value += value;
                        if unit_text < c.written.as_str() {
                            c.written = unit_text.to_string();
                        }
                    })
                    .or_insert_with(|| Counted {
                        unit: recognized,
                        written: unit_text.to_string(),
                        value,
                    });
            }
        }
    }

    /// Rendered parts in canonical order: counted, measured, text.
    fn parts(&self) -> Vec<(String, String)> {
        let mut parts = Vec::new();

        for counted in self.counted.values() {
            let label = match counted.unit {
                Some(unit) => unit.label(counted.value),
                None => counted.written.clone(),
            };
            parts.push((format_quantity(counted.value), label));
        }

        for measured in self.measured.values() {
            let (value, unit) = measured.bucketed();
            parts.push((format_quantity(value), unit.label(value)));
        }

        for text in self.texts.values() {
            parts.push((text.clone(), String::new()));
        }

        parts
    }

    fn render(&self, separator: &str) -> String {
        self.parts()
            .iter()
            .map(|(amount, unit)| join_amount(amount, unit))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl IngredientEngine {
    /// Add `incoming` to an `existing` total for one ingredient.
    ///
    /// Identical units sum, units of one family sum in the larger unit, and
    /// everything else is joined with the merge separator. The result does
    /// not depend on argument order.
    pub fn combine_quantities(
        &self,
        existing: &str,
        incoming: &str,
        ingredient_name: &str,
    ) -> String {
        let mut total = Total::default();
        total.add(self, existing);
        total.add(self, incoming);

        let combined = total.render(&self.config.merge_separator);
        trace!(
            "Combined '{}' and '{}' for '{}' into '{}'",
            existing,
            incoming,
            ingredient_name,
            combined
        );
        combined
    }
}

#[derive(Debug, Clone)]
struct Contribution {
    key: String,
    name: String,
    amount: String,
}

/// A shopping list built from several recipes.
///
/// Ingredients are grouped by normalized name. Adding a recipe that is
/// already present replaces its earlier contribution.
#[derive(Debug, Clone)]
pub struct ShoppingList<'a> {
    engine: &'a IngredientEngine,
    recipes: BTreeMap<String, Vec<Contribution>>,
}

impl<'a> ShoppingList<'a> {
    pub fn new(engine: &'a IngredientEngine) -> Self {
        Self {
            engine,
            recipes: BTreeMap::new(),
        }
    }

    /// Record the (already scaled) ingredients of a recipe.
    ///
    /// Headers and unnamed entries are ignored. `use_variant` selects the
    /// second amount where one exists.
    pub fn add_recipe(
        &mut self,
        recipe_id: &str,
        ingredients: &[ParsedIngredient],
        use_variant: bool,
    ) {
        let contributions: Vec<Contribution> = ingredients
            .iter()
            .filter(|i| !i.is_header && i.is_usable())
            .map(|ingredient| {
                let (amount, unit) = ingredient.amount_for(use_variant);
                Contribution {
                    key: normalize_key(&ingredient.name),
                    name: ingredient.name.trim().to_string(),
                    amount: join_amount(&amount.display, unit.trim()),
                }
            })
            .collect();

        debug!(
            "Recipe '{}' contributes {} ingredients",
            recipe_id,
            contributions.len()
        );
        if self
            .recipes
            .insert(recipe_id.to_string(), contributions)
            .is_some()
        {
            debug!("Replaced earlier contribution of recipe '{}'", recipe_id);
        }
    }

    pub fn remove_recipe(&mut self, recipe_id: &str) -> bool {
        self.recipes.remove(recipe_id).is_some()
    }

    /// Fold in a list built separately (for example on another thread).
    pub fn merge(&mut self, other: ShoppingList<'_>) {
        self.recipes.extend(other.recipes);
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Aggregated items, sorted by normalized name.
    pub fn items(&self) -> Vec<AggregatedItem> {
        let mut grouped: BTreeMap<&str, (String, Total, BTreeSet<String>)> = BTreeMap::new();

        for (recipe_id, contributions) in &self.recipes {
            for contribution in contributions {
                let (_, total, sources) =
                    grouped.entry(contribution.key.as_str()).or_insert_with(|| {
                        (contribution.name.clone(), Total::default(), BTreeSet::new())
                    });
                total.add(self.engine, &contribution.amount);
                sources.insert(recipe_id.clone());
            }
        }

        grouped
            .into_values()
            .map(|(name, total, source_recipes)| {
                let parts = total.parts();
                let (quantity, unit) = match parts.as_slice() {
                    [(amount, unit)] => (amount.clone(), unit.clone()),
                    _ => (total.render(&self.engine.config.merge_separator), String::new()),
                };
                AggregatedItem {
                    name,
                    quantity,
                    unit,
                    source_recipes,
                }
            })
            .collect()
    }
}
