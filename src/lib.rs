//! # Ingredient Scaler
//!
//! Interprets free-form recipe ingredient lines ("1 ½ cups flour",
//! "200 g de azúcar (1 taza)"), scales them to a different number of
//! servings, converts them between metric and American units, links
//! ingredients to the instruction steps that mention them and merges
//! several recipes into one shopping list.
//!
//! Everything hangs off an [`IngredientEngine`] built from lookup
//! [`Tables`]. The free functions below use a shared engine with the
//! built-in tables.

pub mod aggregate;
pub mod convert;
pub mod engine;
pub mod import;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod quantity;
pub mod scale;
pub mod tables;
pub mod text;
pub mod translate;
pub mod units;
pub mod variants;

pub use aggregate::{AggregatedItem, ShoppingList};
pub use convert::{ConversionResult, DisplayAmount, DisplayMode};
pub use engine::{default_engine, DensitySource, EngineConfig, IngredientEngine};
pub use import::ParsedRecipe;
pub use matcher::{EnrichedPart, Mention};
pub use model::{AlternativeIngredient, Instruction, ParsedIngredient, VariantSlot};
pub use quantity::{format_quantity, parse_quantity, Quantity};
pub use scale::{
    portion_multiplier, scale_amount, scale_for_portions, scale_ingredient, Portions, ServingModel,
};
pub use tables::{Tables, TablesError, TablesOverlay};
pub use translate::{RecoveryConfig, ResilientTranslator, TranslateError, Translator};
pub use units::{Unit, UnitFamily, UnitSystem};

/// Parse one ingredient line with the built-in tables.
pub fn parse_ingredient_line(line: &str) -> ParsedIngredient {
    default_engine().parse_ingredient_line(line)
}

/// Parse a newline-separated ingredient list with the built-in tables.
pub fn parse_ingredient_list(text: &str) -> Vec<ParsedIngredient> {
    default_engine().parse_ingredient_list(text)
}

/// Merge two parsed variant blocks with the built-in tables.
pub fn merge_variant_blocks(
    first: &[ParsedIngredient],
    second: &[ParsedIngredient],
) -> Vec<ParsedIngredient> {
    default_engine().merge_variant_blocks(first, second)
}

pub fn normalize_unit(unit: &str) -> Option<Unit> {
    default_engine().normalize_unit(unit)
}

pub fn is_volume_unit(unit: &str) -> bool {
    default_engine().is_volume_unit(unit)
}

pub fn is_weight_unit(unit: &str) -> bool {
    default_engine().is_weight_unit(unit)
}

/// Convert an amount between two units, using ingredient density across
/// volume and weight.
pub fn convert_ingredient(
    amount: &str,
    from_unit: &str,
    to_unit: &str,
    ingredient_name: &str,
) -> ConversionResult {
    default_engine().convert_ingredient(amount, from_unit, to_unit, ingredient_name)
}

pub fn convert_for_display(
    amount: &str,
    unit: &str,
    ingredient_name: &str,
    mode: DisplayMode,
) -> DisplayAmount {
    default_engine().convert_for_display(amount, unit, ingredient_name, mode)
}

/// Sum two shopping-list quantities for the same ingredient.
pub fn combine_quantities(existing: &str, incoming: &str, ingredient_name: &str) -> String {
    default_engine().combine_quantities(existing, incoming, ingredient_name)
}

/// Split a step into text and ingredient parts, annotated through the
/// caller's scaling and conversion functions.
pub fn enrich_step_with_ingredients<S, C>(
    step_text: &str,
    ingredients: &[ParsedIngredient],
    scale: S,
    use_variant: bool,
    convert: C,
) -> Vec<EnrichedPart>
where
    S: Fn(&str) -> String,
    C: Fn(&str, &str, &str) -> DisplayAmount,
{
    default_engine().enrich_step_with_ingredients(
        step_text,
        ingredients,
        scale,
        use_variant,
        convert,
    )
}
