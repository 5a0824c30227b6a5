//! # Ingredient Engine
//!
//! [`IngredientEngine`] owns the lookup tables and configuration every other
//! component reads. It holds no mutable state, so one engine can be shared
//! across threads and requests.
//!
//! The parsing, conversion, matching and aggregation operations are
//! implemented on the engine in their own modules; this module builds the
//! precomputed indexes they share (folded unit tokens, stop-words, compiled
//! header and alternative patterns) and answers unit and density lookups.
//!
//! ```rust
//! use ingredient_scaler::engine::{EngineConfig, IngredientEngine};
//! use ingredient_scaler::tables::Tables;
//!
//! let engine = IngredientEngine::with_config(Tables::default(), EngineConfig::default())?;
//! assert!(engine.is_volume_unit("cucharadas"));
//! # Ok::<(), regex::Error>(())
//! ```

use lazy_static::lazy_static;
use log::{debug, info, trace};
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::tables::Tables;
use crate::text::{contains_word, fold, FoldedText};
use crate::units::Unit;

/// Tunable behavior that is not lookup data.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Strip connectors ("of", "de") and stray punctuation from parsed names.
    pub enable_ingredient_postprocessing: bool,
    /// Parsed names longer than this are cut at a word boundary.
    pub max_ingredient_length: usize,
    /// Single words shorter than this are never used as mention keywords.
    pub min_keyword_length: usize,
    /// Joins incompatible quantities in an aggregated total.
    pub merge_separator: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_ingredient_postprocessing: true,
            max_ingredient_length: 100,
            min_keyword_length: 3,
            merge_separator: " + ".to_string(),
        }
    }
}

/// Where a density came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DensitySource {
    Table,
    DryGoods,
    Default,
}

/// The ingredient interpretation engine.
#[derive(Debug, Clone)]
pub struct IngredientEngine {
    pub(crate) tables: Tables,
    pub(crate) config: EngineConfig,
    /// Folded unit tokens, longest first.
    unit_tokens: Vec<(String, Unit)>,
    unit_index: HashMap<String, Unit>,
    stop_words: HashSet<String>,
    /// Folded density patterns with their grams per cup, longest first.
    densities: Vec<(String, f64)>,
    dry_goods: Vec<String>,
    pub(crate) variant_keywords: Vec<String>,
    pub(crate) header_pattern: Regex,
    pub(crate) alternative_pattern: Regex,
    pub(crate) connector_pattern: Regex,
}

lazy_static! {
    static ref DEFAULT_ENGINE: IngredientEngine = IngredientEngine::default();
}

/// Shared engine built from the default tables.
pub fn default_engine() -> &'static IngredientEngine {
    &DEFAULT_ENGINE
}

fn alternation(words: &[String]) -> String {
    let mut words: Vec<String> = words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()));
    words.dedup();
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

impl IngredientEngine {
    /// Create an engine over the given tables with the default configuration.
    pub fn new(tables: Tables) -> Result<Self, regex::Error> {
        Self::with_config(tables, EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(tables: Tables, config: EngineConfig) -> Result<Self, regex::Error> {
        let mut unit_tokens: Vec<(String, Unit)> = Vec::new();
        let mut unit_index = HashMap::new();
        for synonym in &tables.unit_synonyms {
            let token = fold(synonym.token.trim());
            if token.is_empty() || unit_index.contains_key(&token) {
                continue;
            }
            unit_index.insert(token.clone(), synonym.unit);
            unit_tokens.push((token, synonym.unit));
        }
        unit_tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut densities: Vec<(String, f64)> = tables
            .densities
            .iter()
            .map(|d| (fold(d.ingredient_name_pattern.trim()), d.grams_per_cup))
            .collect();
        densities.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let header_pattern = Regex::new(&format!(
            r"(?i)^(?:{})\s+\S.*$",
            alternation(&tables.header_prefixes)
        ))?;
        let alternative_pattern = Regex::new(&format!(
            r"(?i)\s+(?:{})\s+",
            alternation(&tables.alternative_separators)
        ))?;
        let (elided, words): (Vec<String>, Vec<String>) = tables
            .name_connectors
            .iter()
            .cloned()
            .partition(|c| c.ends_with('\'') || c.ends_with('’'));
        let connector_pattern = match (words.is_empty(), elided.is_empty()) {
            (true, true) => Regex::new(r"^\b\B")?,
            (false, true) => Regex::new(&format!(r"(?i)^(?:{})\s+", alternation(&words)))?,
            (true, false) => Regex::new(&format!(r"(?i)^(?:{})", alternation(&elided)))?,
            (false, false) => Regex::new(&format!(
                r"(?i)^(?:(?:{})\s+|(?:{}))",
                alternation(&words),
                alternation(&elided)
            ))?,
        };

        info!(
            "Creating IngredientEngine: {} unit tokens, {} densities, {} stop words",
            unit_tokens.len(),
            densities.len(),
            tables.stop_words.len()
        );

        Ok(Self {
            stop_words: tables.stop_words.iter().map(|w| fold(w.trim())).collect(),
            dry_goods: tables.dry_goods_keywords.iter().map(|w| fold(w.trim())).collect(),
            variant_keywords: tables.variant_keywords.iter().map(|w| fold(w.trim())).collect(),
            unit_tokens,
            unit_index,
            densities,
            header_pattern,
            alternative_pattern,
            connector_pattern,
            tables,
            config,
        })
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Canonicalize a unit spelling (`"Cucharadas"`, `"tbsp."` → [`Unit::Tablespoon`]).
    pub fn normalize_unit(&self, unit: &str) -> Option<Unit> {
        let token = fold(unit.trim().trim_end_matches('.').trim());
        if token.is_empty() {
            return None;
        }
        if let Some(unit) = self.unit_index.get(&token) {
            return Some(*unit);
        }
        // Try without pluralization
        let singular = token.strip_suffix('s').filter(|s| !s.is_empty())?;
        self.unit_index.get(singular).copied()
    }

    pub fn is_volume_unit(&self, unit: &str) -> bool {
        self.normalize_unit(unit).is_some_and(|u| u.is_volume())
    }

    pub fn is_weight_unit(&self, unit: &str) -> bool {
        self.normalize_unit(unit).is_some_and(|u| u.is_weight())
    }

    /// Match a unit token at the start of `text`.
    ///
    /// The token must end at a word boundary, so "large" never matches "l".
    /// Returns the byte length consumed in `text` (a trailing abbreviation
    /// period included) and the unit.
    pub fn match_unit_prefix(&self, text: &str) -> Option<(usize, Unit)> {
        let folded = FoldedText::new(text);
        let haystack = folded.folded();

        for (token, unit) in &self.unit_tokens {
            if !haystack.starts_with(token.as_str()) {
                continue;
            }
            let rest = &haystack[token.len()..];
            if rest.chars().next().is_some_and(|c| c.is_alphanumeric()) {
                continue;
            }
            let (_, mut end) = folded.original_span(0, token.len())?;
            if text[end..].starts_with('.') {
                end += 1;
            }
            trace!("Matched unit token '{}' as {:?}", &text[..end], unit);
            return Some((end, *unit));
        }
        None
    }

    pub fn is_stop_word(&self, folded_word: &str) -> bool {
        self.stop_words.contains(folded_word)
    }

    /// Grams per US cup for an ingredient, with where the figure came from.
    ///
    /// The longest table pattern found as a whole word in the folded name wins.
    /// Without a table hit, dry goods get the dry default and everything else
    /// is treated like water.
    pub fn density_for(&self, ingredient_name: &str) -> (f64, DensitySource) {
        let name = fold(ingredient_name);

        if let Some((pattern, grams)) = self
            .densities
            .iter()
            .find(|(pattern, _)| contains_word(&name, pattern))
        {
            trace!("Density for '{}' from pattern '{}'", ingredient_name, pattern);
            return (*grams, DensitySource::Table);
        }

        if self.dry_goods.iter().any(|k| contains_word(&name, k)) {
            debug!("No density entry for '{}', using dry goods default", ingredient_name);
            return (self.tables.dry_goods_grams_per_cup, DensitySource::DryGoods);
        }

        debug!("No density entry for '{}', using default density", ingredient_name);
        (self.tables.default_grams_per_cup, DensitySource::Default)
    }

    /// Whether a folded line contains one of the variant container keywords.
    pub(crate) fn mentions_variant_keyword(&self, folded_line: &str) -> bool {
        self.variant_keywords
            .iter()
            .any(|k| contains_word(folded_line, k))
    }
}

impl Default for IngredientEngine {
    fn default() -> Self {
        Self::new(Tables::default()).expect("Default tables should compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unit_variants() {
        let engine = IngredientEngine::default();
        assert_eq!(engine.normalize_unit("cucharada"), Some(Unit::Tablespoon));
        assert_eq!(engine.normalize_unit("Tbsp."), Some(Unit::Tablespoon));
        assert_eq!(engine.normalize_unit("TAZAS"), Some(Unit::Cup));
        assert_eq!(engine.normalize_unit("cuillère à soupe"), Some(Unit::Tablespoon));
        assert_eq!(engine.normalize_unit("puñado"), Some(Unit::Handful));
        assert_eq!(engine.normalize_unit("grams"), Some(Unit::Gram));
        assert_eq!(engine.normalize_unit("sprinkle"), None);
        assert_eq!(engine.normalize_unit(""), None);
    }

    #[test]
    fn test_unit_predicates() {
        let engine = IngredientEngine::default();
        assert!(engine.is_volume_unit("cups"));
        assert!(engine.is_volume_unit("ml"));
        assert!(!engine.is_volume_unit("g"));
        assert!(engine.is_weight_unit("kilos"));
        assert!(!engine.is_weight_unit("cloves"));
        assert!(!engine.is_weight_unit("whatever"));
    }

    #[test]
    fn test_match_unit_prefix_respects_word_boundaries() {
        let engine = IngredientEngine::default();
        assert_eq!(engine.match_unit_prefix("cups flour"), Some((4, Unit::Cup)));
        assert_eq!(engine.match_unit_prefix("g butter"), Some((1, Unit::Gram)));
        assert_eq!(engine.match_unit_prefix("tbsp. oil"), Some((5, Unit::Tablespoon)));
        assert_eq!(
            engine.match_unit_prefix("cucharadas soperas de aceite"),
            Some((18, Unit::Tablespoon))
        );
        assert_eq!(engine.match_unit_prefix("large eggs"), None);
        assert_eq!(engine.match_unit_prefix("lemons"), None);
        assert_eq!(engine.match_unit_prefix("cupboard"), None);
    }

    #[test]
    fn test_density_lookup() {
        let engine = IngredientEngine::default();
        assert_eq!(engine.density_for("Brown Sugar"), (213.0, DensitySource::Table));
        assert_eq!(engine.density_for("sugar"), (200.0, DensitySource::Table));
        assert_eq!(engine.density_for("Azúcar moreno"), (213.0, DensitySource::Table));
        assert_eq!(engine.density_for("semolina"), (150.0, DensitySource::DryGoods));
        assert_eq!(engine.density_for("salmon").1, DensitySource::Default);
        assert_eq!(engine.density_for("mystery broth").1, DensitySource::Default);
    }

    #[test]
    fn test_engine_with_overlay_tables() {
        let tables = Tables::default()
            .with_overlay_json(r#"{ "unit_synonyms": [{ "token": "xícara", "unit": "cup" }] }"#)
            .unwrap();
        let engine = IngredientEngine::new(tables).unwrap();
        assert_eq!(engine.normalize_unit("xicaras"), Some(Unit::Cup));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IngredientEngine>();
    }
}
