//! # Lookup Tables
//!
//! Immutable configuration data injected into [`crate::engine::IngredientEngine`]:
//! unit synonyms, ingredient densities, matcher stop-words and the keyword
//! lists the parser uses for headers, alternatives and variant blocks.
//!
//! The built-in tables cover English and Spanish (plus the common French
//! spoon and weight terms). Extra locales are added with a JSON overlay:
//!
//! ```rust
//! use ingredient_scaler::tables::Tables;
//!
//! let overlay = r#"{ "unit_synonyms": [{ "token": "colher de sopa", "unit": "tablespoon" }] }"#;
//! let tables = Tables::default().with_overlay_json(overlay)?;
//! assert!(tables.unit_synonyms.iter().any(|s| s.token == "colher de sopa"));
//! # Ok::<(), ingredient_scaler::tables::TablesError>(())
//! ```

use lazy_static::lazy_static;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::units::{Unit, ML_PER_CUP};

/// Errors raised while loading table overlays.
#[derive(Error, Debug)]
pub enum TablesError {
    #[error("Failed to read tables file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tables JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid table entry: {0}")]
    Invalid(String),
}

/// A spelling of a unit, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSynonym {
    pub token: String,
    pub unit: Unit,
}

/// Grams per US cup for ingredients whose name contains `ingredient_name_pattern`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityEntry {
    pub ingredient_name_pattern: String,
    pub grams_per_cup: f64,
}

/// Complete set of lookup tables used by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    pub unit_synonyms: Vec<UnitSynonym>,
    pub densities: Vec<DensityEntry>,
    /// Density used when nothing else matches (water: 1 g per ml).
    pub default_grams_per_cup: f64,
    /// Names containing one of these fall back to `dry_goods_grams_per_cup`.
    pub dry_goods_keywords: Vec<String>,
    pub dry_goods_grams_per_cup: f64,
    /// Words never used on their own to find an ingredient in instruction text.
    pub stop_words: Vec<String>,
    /// Leading words of a section header ("for the", "para la").
    pub header_prefixes: Vec<String>,
    /// Words introducing a substitute ingredient ("or", "o").
    pub alternative_separators: Vec<String>,
    /// Connectors dropped from the start of a name ("of", "de").
    pub name_connectors: Vec<String>,
    /// Container words that mark a variant block label ("mold", "molde").
    pub variant_keywords: Vec<String>,
}

/// Additions layered on top of existing tables. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesOverlay {
    pub unit_synonyms: Vec<UnitSynonym>,
    pub densities: Vec<DensityEntry>,
    pub default_grams_per_cup: Option<f64>,
    pub dry_goods_keywords: Vec<String>,
    pub dry_goods_grams_per_cup: Option<f64>,
    pub stop_words: Vec<String>,
    pub header_prefixes: Vec<String>,
    pub alternative_separators: Vec<String>,
    pub name_connectors: Vec<String>,
    pub variant_keywords: Vec<String>,
}

const UNIT_SYNONYMS: &[(&str, Unit)] = &[
    // Volume units
    ("tsp", Unit::Teaspoon),
    ("tsps", Unit::Teaspoon),
    ("teaspoon", Unit::Teaspoon),
    ("teaspoons", Unit::Teaspoon),
    ("cucharadita", Unit::Teaspoon),
    ("cucharaditas", Unit::Teaspoon),
    ("cdta", Unit::Teaspoon),
    ("cdtas", Unit::Teaspoon),
    ("cdita", Unit::Teaspoon),
    ("cditas", Unit::Teaspoon),
    ("cuillère à café", Unit::Teaspoon),
    ("cuillères à café", Unit::Teaspoon),
    ("tbsp", Unit::Tablespoon),
    ("tbsps", Unit::Tablespoon),
    ("tbs", Unit::Tablespoon),
    ("tablespoon", Unit::Tablespoon),
    ("tablespoons", Unit::Tablespoon),
    ("cucharada", Unit::Tablespoon),
    ("cucharadas", Unit::Tablespoon),
    ("cucharada sopera", Unit::Tablespoon),
    ("cucharadas soperas", Unit::Tablespoon),
    ("cda", Unit::Tablespoon),
    ("cdas", Unit::Tablespoon),
    ("cuillère à soupe", Unit::Tablespoon),
    ("cuillères à soupe", Unit::Tablespoon),
    ("cup", Unit::Cup),
    ("cups", Unit::Cup),
    ("taza", Unit::Cup),
    ("tazas", Unit::Cup),
    ("tasse", Unit::Cup),
    ("tasses", Unit::Cup),
    ("fl oz", Unit::FluidOunce),
    ("fl. oz", Unit::FluidOunce),
    ("fluid ounce", Unit::FluidOunce),
    ("fluid ounces", Unit::FluidOunce),
    ("pint", Unit::Pint),
    ("pints", Unit::Pint),
    ("pt", Unit::Pint),
    ("quart", Unit::Quart),
    ("quarts", Unit::Quart),
    ("qt", Unit::Quart),
    ("gallon", Unit::Gallon),
    ("gallons", Unit::Gallon),
    ("gal", Unit::Gallon),
    ("ml", Unit::Milliliter),
    ("milliliter", Unit::Milliliter),
    ("milliliters", Unit::Milliliter),
    ("millilitre", Unit::Milliliter),
    ("millilitres", Unit::Milliliter),
    ("mililitro", Unit::Milliliter),
    ("mililitros", Unit::Milliliter),
    ("cc", Unit::Milliliter),
    ("cl", Unit::Centiliter),
    ("dl", Unit::Deciliter),
    ("l", Unit::Liter),
    ("liter", Unit::Liter),
    ("liters", Unit::Liter),
    ("litre", Unit::Liter),
    ("litres", Unit::Liter),
    ("litro", Unit::Liter),
    ("litros", Unit::Liter),
    // Weight units
    ("mg", Unit::Milligram),
    ("g", Unit::Gram),
    ("gr", Unit::Gram),
    ("grs", Unit::Gram),
    ("gram", Unit::Gram),
    ("grams", Unit::Gram),
    ("gramo", Unit::Gram),
    ("gramos", Unit::Gram),
    ("gramme", Unit::Gram),
    ("grammes", Unit::Gram),
    ("kg", Unit::Kilogram),
    ("kgs", Unit::Kilogram),
    ("kilo", Unit::Kilogram),
    ("kilos", Unit::Kilogram),
    ("kilogram", Unit::Kilogram),
    ("kilograms", Unit::Kilogram),
    ("kilogramo", Unit::Kilogram),
    ("kilogramos", Unit::Kilogram),
    ("oz", Unit::Ounce),
    ("ounce", Unit::Ounce),
    ("ounces", Unit::Ounce),
    ("onza", Unit::Ounce),
    ("onzas", Unit::Ounce),
    ("lb", Unit::Pound),
    ("lbs", Unit::Pound),
    ("pound", Unit::Pound),
    ("pounds", Unit::Pound),
    ("libra", Unit::Pound),
    ("libras", Unit::Pound),
    // Count units
    ("piece", Unit::Piece),
    ("pieces", Unit::Piece),
    ("pieza", Unit::Piece),
    ("piezas", Unit::Piece),
    ("unidad", Unit::Piece),
    ("unidades", Unit::Piece),
    ("clove", Unit::Clove),
    ("cloves", Unit::Clove),
    ("diente", Unit::Clove),
    ("dientes", Unit::Clove),
    ("gousse", Unit::Clove),
    ("gousses", Unit::Clove),
    ("bulb", Unit::Bulb),
    ("bulbs", Unit::Bulb),
    ("head", Unit::Bulb),
    ("heads", Unit::Bulb),
    ("cabeza", Unit::Bulb),
    ("cabezas", Unit::Bulb),
    ("pinch", Unit::Pinch),
    ("pinches", Unit::Pinch),
    ("pizca", Unit::Pinch),
    ("pizcas", Unit::Pinch),
    ("pincée", Unit::Pinch),
    ("pincées", Unit::Pinch),
    ("dash", Unit::Dash),
    ("dashes", Unit::Dash),
    ("chorrito", Unit::Dash),
    ("chorritos", Unit::Dash),
    ("can", Unit::Can),
    ("cans", Unit::Can),
    ("lata", Unit::Can),
    ("latas", Unit::Can),
    ("slice", Unit::Slice),
    ("slices", Unit::Slice),
    ("rebanada", Unit::Slice),
    ("rebanadas", Unit::Slice),
    ("loncha", Unit::Slice),
    ("lonchas", Unit::Slice),
    ("package", Unit::Package),
    ("packages", Unit::Package),
    ("pkg", Unit::Package),
    ("packet", Unit::Package),
    ("packets", Unit::Package),
    ("paquete", Unit::Package),
    ("paquetes", Unit::Package),
    ("sobre", Unit::Package),
    ("sobres", Unit::Package),
    ("sachet", Unit::Package),
    ("sachets", Unit::Package),
    ("bunch", Unit::Bunch),
    ("bunches", Unit::Bunch),
    ("manojo", Unit::Bunch),
    ("manojos", Unit::Bunch),
    ("handful", Unit::Handful),
    ("handfuls", Unit::Handful),
    ("puñado", Unit::Handful),
    ("puñados", Unit::Handful),
    ("stick", Unit::Stick),
    ("sticks", Unit::Stick),
    ("rama", Unit::Sprig),
    ("ramas", Unit::Sprig),
    ("ramita", Unit::Sprig),
    ("ramitas", Unit::Sprig),
    ("sprig", Unit::Sprig),
    ("sprigs", Unit::Sprig),
];

const DENSITIES: &[(&str, f64)] = &[
    ("all-purpose flour", 125.0),
    ("almond flour", 96.0),
    ("harina de almendra", 96.0),
    ("whole wheat flour", 120.0),
    ("harina integral", 120.0),
    ("flour", 125.0),
    ("harina", 125.0),
    ("farine", 125.0),
    ("powdered sugar", 120.0),
    ("icing sugar", 120.0),
    ("azucar glas", 120.0),
    ("azucar glass", 120.0),
    ("brown sugar", 213.0),
    ("azucar moreno", 213.0),
    ("sugar", 200.0),
    ("azucar", 200.0),
    ("sucre", 200.0),
    ("butter", 227.0),
    ("mantequilla", 227.0),
    ("beurre", 227.0),
    ("olive oil", 216.0),
    ("aceite", 216.0),
    ("oil", 218.0),
    ("honey", 340.0),
    ("miel", 340.0),
    ("maple syrup", 315.0),
    ("milk", 245.0),
    ("leche", 245.0),
    ("lait", 245.0),
    ("heavy cream", 238.0),
    ("cream", 240.0),
    ("nata", 240.0),
    ("water", 237.0),
    ("agua", 237.0),
    ("yogurt", 245.0),
    ("yogur", 245.0),
    ("rice", 185.0),
    ("arroz", 185.0),
    ("rolled oats", 90.0),
    ("oats", 90.0),
    ("avena", 90.0),
    ("cocoa", 85.0),
    ("cacao", 85.0),
    ("salt", 288.0),
    ("sal", 288.0),
    ("cornstarch", 128.0),
    ("maicena", 128.0),
    ("baking powder", 192.0),
    ("baking soda", 220.0),
    ("chocolate chips", 170.0),
    ("grated cheese", 100.0),
    ("queso rallado", 100.0),
    ("breadcrumbs", 108.0),
    ("pan rallado", 108.0),
    ("walnuts", 120.0),
    ("nueces", 120.0),
    ("almonds", 143.0),
    ("almendras", 143.0),
];

const DRY_GOODS_KEYWORDS: &[&str] = &[
    "flour", "harina", "sugar", "azucar", "meal", "starch", "almidon", "semolina", "semola",
    "polenta", "cornmeal", "bran", "salvado", "powder", "polvo", "grain", "grano",
];

const STOP_WORDS: &[&str] = &[
    // Articles and connectors
    "the", "and", "with", "for", "from", "into", "los", "las", "del", "con", "una", "unos",
    "unas", "para", "por", "les", "des", "une",
    // Quantity and size adjectives
    "small", "medium", "large", "big", "extra", "fresh", "whole", "some", "more", "half",
    "grande", "grandes", "mediano", "mediana", "medianos", "medianas", "pequeno", "pequena",
    "pequenos", "pequenas", "fresco", "fresca", "frescos", "frescas", "entero", "entera",
    // Cooking verbs and preparation words
    "bake", "baking", "chop", "chopped", "cut", "mix", "add", "stir", "cook", "boil", "heat",
    "pour", "slice", "sliced", "diced", "minced", "grated", "melted", "beaten", "ground",
    "hornear", "picar", "picado", "picada", "cortar", "mezclar", "anadir", "cocinar",
    "hervir", "calentar", "rallado", "rallada", "derretido", "derretida", "batido", "batida",
    "molido", "molida",
    // Measures and qualifiers
    "cup", "cups", "taste", "optional", "gusto", "opcional",
];

const HEADER_PREFIXES: &[&str] = &[
    "for the", "for", "para el", "para la", "para los", "para las", "para", "pour le",
    "pour la", "pour les", "pour",
];

const ALTERNATIVE_SEPARATORS: &[&str] = &["or", "o", "ou"];

const NAME_CONNECTORS: &[&str] = &["of", "de", "del", "d'", "du", "des"];

const VARIANT_KEYWORDS: &[&str] = &[
    "mold", "mould", "pan", "tin", "tray", "dish", "ramekin", "molde", "bandeja", "fuente",
    "aro", "moule", "plaque",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

lazy_static! {
    static ref DEFAULT_TABLES: Tables = Tables {
        unit_synonyms: UNIT_SYNONYMS
            .iter()
            .map(|(token, unit)| UnitSynonym {
                token: token.to_string(),
                unit: *unit,
            })
            .collect(),
        densities: DENSITIES
            .iter()
            .map(|(pattern, grams)| DensityEntry {
                ingredient_name_pattern: pattern.to_string(),
                grams_per_cup: *grams,
            })
            .collect(),
        default_grams_per_cup: ML_PER_CUP,
        dry_goods_keywords: strings(DRY_GOODS_KEYWORDS),
        dry_goods_grams_per_cup: 150.0,
        stop_words: strings(STOP_WORDS),
        header_prefixes: strings(HEADER_PREFIXES),
        alternative_separators: strings(ALTERNATIVE_SEPARATORS),
        name_connectors: strings(NAME_CONNECTORS),
        variant_keywords: strings(VARIANT_KEYWORDS),
    };
}

impl Default for Tables {
    fn default() -> Self {
        DEFAULT_TABLES.clone()
    }
}

impl Tables {
    /// Layer an overlay on top of these tables.
    ///
    /// Overlay entries are placed first so they win over built-in entries
    /// with the same token or pattern.
    pub fn with_overlay(mut self, overlay: TablesOverlay) -> Result<Self, TablesError> {
        overlay.validate()?;

        debug!(
            "Applying tables overlay: {} unit synonyms, {} densities",
            overlay.unit_synonyms.len(),
            overlay.densities.len()
        );

        prepend(&mut self.unit_synonyms, overlay.unit_synonyms);
        let mut seen = std::collections::HashSet::new();
        self.unit_synonyms
            .retain(|s| seen.insert(s.token.to_lowercase()));

        prepend(&mut self.densities, overlay.densities);
        if let Some(grams) = overlay.default_grams_per_cup {
            self.default_grams_per_cup = grams;
        }
        prepend(&mut self.dry_goods_keywords, overlay.dry_goods_keywords);
        if let Some(grams) = overlay.dry_goods_grams_per_cup {
            self.dry_goods_grams_per_cup = grams;
        }
        self.stop_words.extend(overlay.stop_words);
        self.header_prefixes.extend(overlay.header_prefixes);
        self.alternative_separators
            .extend(overlay.alternative_separators);
        self.name_connectors.extend(overlay.name_connectors);
        self.variant_keywords.extend(overlay.variant_keywords);

        Ok(self)
    }

    /// Parse a JSON overlay and layer it on top of these tables.
    pub fn with_overlay_json(self, json: &str) -> Result<Self, TablesError> {
        let overlay: TablesOverlay = serde_json::from_str(json)?;
        self.with_overlay(overlay)
    }

    /// Built-in tables extended by the JSON overlay stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TablesError> {
        let path = path.as_ref();
        info!("Loading tables overlay from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::default().with_overlay_json(&json)
    }
}

impl TablesOverlay {
    fn validate(&self) -> Result<(), TablesError> {
        if let Some(s) = self.unit_synonyms.iter().find(|s| s.token.trim().is_empty()) {
            return Err(TablesError::Invalid(format!(
                "empty unit synonym for {:?}",
                s.unit
            )));
        }
        for entry in &self.densities {
            if entry.ingredient_name_pattern.trim().is_empty() {
                return Err(TablesError::Invalid("empty density pattern".to_string()));
            }
            if !(entry.grams_per_cup.is_finite() && entry.grams_per_cup > 0.0) {
                return Err(TablesError::Invalid(format!(
                    "density for '{}' must be positive",
                    entry.ingredient_name_pattern
                )));
            }
        }
        for grams in [self.default_grams_per_cup, self.dry_goods_grams_per_cup]
            .into_iter()
            .flatten()
        {
            if !(grams.is_finite() && grams > 0.0) {
                return Err(TablesError::Invalid(format!(
                    "default density {} must be positive",
                    grams
                )));
            }
        }
        Ok(())
    }
}

fn prepend<T>(target: &mut Vec<T>, mut front: Vec<T>) {
    front.append(target);
    *target = front;
}
