//! # Variant Blocks
//!
//! Some recipes list their ingredients twice, once per mold or pan size:
//!
//! ```text
//! For a 20 cm mold:
//! 200 g flour
//! 3 eggs
//! For a 26 cm mold:
//! 300 g flour
//! 5 eggs
//! ```
//!
//! The two blocks are merged into one list: block 1 supplies `amount`/`unit`,
//! block 2 supplies `amount2`/`unit2`. Entries are matched by their
//! normalized name, and only within the section (header) they belong to.
//! Headers themselves never merge, even when they read the same.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::engine::IngredientEngine;
use crate::model::{ParsedIngredient, VariantSlot};
use crate::text::{fold, normalize_key};

/// One labeled block of raw ingredient lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBlock {
    pub label: String,
    pub lines: Vec<String>,
}

/// The result of splitting a raw list into two variant blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBlocks {
    /// Lines before the first label, common to both variants.
    pub shared: Vec<String>,
    pub first: VariantBlock,
    pub second: VariantBlock,
}

/// Section key of every entry: the normalized name of the closest header above it.
fn section_keys(ingredients: &[ParsedIngredient]) -> Vec<Option<String>> {
    let mut current = None;
    ingredients
        .iter()
        .map(|ingredient| {
            if ingredient.is_header {
                current = Some(normalize_key(&ingredient.name));
            }
            current.clone()
        })
        .collect()
}

impl IngredientEngine {
    /// Label text when `line` introduces a variant block.
    fn variant_label(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if !self.mentions_variant_keyword(&fold(line)) {
            return None;
        }
        match self.header_label(line) {
            Some(label) => Some(label),
            None if line.ends_with(':') => Some(line.trim_end_matches(':').trim().to_string()),
            None => None,
        }
    }

    /// Split raw lines into two labeled variant blocks.
    ///
    /// Returns `None` unless exactly two label lines are found.
    pub fn detect_variant_blocks<S: AsRef<str>>(&self, lines: &[S]) -> Option<VariantBlocks> {
        let labels: Vec<(usize, String)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| self.variant_label(line.as_ref()).map(|label| (i, label)))
            .collect();

        if labels.len() != 2 {
            trace!("Found {} variant labels, expected 2", labels.len());
            return None;
        }

        let collect = |range: std::ops::Range<usize>| -> Vec<String> {
            lines[range]
                .iter()
                .map(|l| l.as_ref().trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        };

        let (first_at, first_label) = labels[0].clone();
        let (second_at, second_label) = labels[1].clone();
        debug!(
            "Detected variant blocks '{}' and '{}'",
            first_label, second_label
        );

        Some(VariantBlocks {
            shared: collect(0..first_at),
            first: VariantBlock {
                label: first_label,
                lines: collect(first_at + 1..second_at),
            },
            second: VariantBlock {
                label: second_label,
                lines: collect(second_at + 1..lines.len()),
            },
        })
    }

    /// Merge two parsed variant blocks into a single list.
    ///
    /// The output holds every block-1 entry in order (matched ones gain
    /// `amount2`/`unit2`), followed by the block-2 headers and the block-2
    /// entries that found no partner. Those carry their amount in the
    /// second slot only.
    pub fn merge_variant_blocks(
        &self,
        first: &[ParsedIngredient],
        second: &[ParsedIngredient],
    ) -> Vec<ParsedIngredient> {
        let mut merged: Vec<ParsedIngredient> = first.to_vec();
        let first_sections = section_keys(first);
        let first_keys: Vec<String> = first.iter().map(|i| normalize_key(&i.name)).collect();
        let mut matched = vec![false; first.len()];
        let mut leftovers = Vec::new();

        for (entry, section) in second.iter().zip(section_keys(second)) {
            if entry.is_header || !entry.is_usable() {
                leftovers.push(entry.clone());
                continue;
            }

            let key = normalize_key(&entry.name);
            let partner = (0..first.len()).find(|&i| {
                !matched[i]
                    && !first[i].is_header
                    && first_sections[i] == section
                    && first_keys[i] == key
            });

            match partner {
                Some(i) => {
                    matched[i] = true;
                    merged[i].set_variant_amount(
                        VariantSlot::Secondary,
                        &entry.amount.display,
                        &entry.unit,
                    );
                }
                None => {
                    trace!("No block 1 partner for '{}'", entry.name);
                    let mut only_second = ParsedIngredient {
                        amount: Default::default(),
                        unit: String::new(),
                        ..entry.clone()
                    };
                    only_second.set_variant_amount(
                        VariantSlot::Secondary,
                        &entry.amount.display,
                        &entry.unit,
                    );
                    leftovers.push(only_second);
                }
            }
        }

        merged.extend(leftovers);
        merged
    }

    /// Detect, parse and merge a two-block list in one call.
    ///
    /// Shared lines come first. Returns `None` when the text has no two
    /// labeled blocks.
    pub fn parse_variant_list(&self, text: &str) -> Option<Vec<ParsedIngredient>> {
        let lines: Vec<&str> = text.lines().collect();
        let blocks = self.detect_variant_blocks(&lines)?;

        let mut result = self.parse_ingredient_list(&blocks.shared.join("\n"));
        let first = self.parse_ingredient_list(&blocks.first.lines.join("\n"));
        let second = self.parse_ingredient_list(&blocks.second.lines.join("\n"));
        result.extend(self.merge_variant_blocks(&first, &second));
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(engine: &IngredientEngine, lines: &[&str]) -> Vec<ParsedIngredient> {
        lines.iter().map(|l| engine.parse_ingredient_line(l)).collect()
    }

    #[test]
    fn test_merge_matches_by_normalized_name() {
        let engine = IngredientEngine::default();
        let first = parse(&engine, &["200 g Azúcar", "3 eggs"]);
        let second = parse(&engine, &["300 g  azucar", "5 eggs"]);

        let merged = engine.merge_variant_blocks(&first, &second);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Azúcar");
        assert_eq!(merged[0].amount.value, Some(200.0));
        assert_eq!(merged[0].amount2.as_ref().and_then(|q| q.value), Some(300.0));
        assert_eq!(merged[0].unit2.as_deref(), Some("g"));
        assert_eq!(merged[1].amount2.as_ref().and_then(|q| q.value), Some(5.0));
    }

    #[test]
    fn test_unmatched_entries_keep_their_own_amounts() {
        let engine = IngredientEngine::default();
        let first = parse(&engine, &["200 g flour", "1 tsp vanilla"]);
        let second = parse(&engine, &["300 g flour", "1 pinch salt"]);

        let merged = engine.merge_variant_blocks(&first, &second);
        assert_eq!(merged.len(), 3);

        let vanilla = &merged[1];
        assert_eq!(vanilla.amount.value, Some(1.0));
        assert!(vanilla.amount2.is_none());

        let salt = &merged[2];
        assert_eq!(salt.name, "salt");
        assert!(salt.amount.is_empty());
        assert_eq!(salt.amount2.as_ref().and_then(|q| q.value), Some(1.0));
        assert_eq!(salt.unit2.as_deref(), Some("pinch"));
    }

    #[test]
    fn test_headers_never_merge() {
        let engine = IngredientEngine::default();
        let first = parse(&engine, &["**Base**", "100 g butter", "**Topping**", "50 g butter"]);
        let second = parse(&engine, &["**Base**", "150 g butter", "**Topping**", "80 g butter"]);

        let merged = engine.merge_variant_blocks(&first, &second);
        let headers: Vec<&str> = merged
            .iter()
            .filter(|i| i.is_header)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(headers, vec!["Base", "Topping", "Base", "Topping"]);

        // Each butter pairs with the butter of its own section
        assert_eq!(merged[1].amount2.as_ref().and_then(|q| q.value), Some(150.0));
        assert_eq!(merged[3].amount2.as_ref().and_then(|q| q.value), Some(80.0));
        assert!(merged.iter().filter(|i| i.is_header).all(|h| h.amount2.is_none()));
    }

    #[test]
    fn test_detect_variant_blocks() {
        let engine = IngredientEngine::default();
        let lines = vec![
            "1 pinch salt",
            "For a 20 cm mold:",
            "200 g flour",
            "",
            "Molde de 26 cm:",
            "300 g flour",
        ];
        let blocks = engine.detect_variant_blocks(&lines).unwrap();
        assert_eq!(blocks.shared, vec!["1 pinch salt"]);
        assert_eq!(blocks.first.label, "For a 20 cm mold");
        assert_eq!(blocks.first.lines, vec!["200 g flour"]);
        assert_eq!(blocks.second.label, "Molde de 26 cm");
        assert_eq!(blocks.second.lines, vec!["300 g flour"]);
    }

    #[test]
    fn test_detect_requires_exactly_two_labels() {
        let engine = IngredientEngine::default();
        assert!(engine.detect_variant_blocks(&["200 g flour", "3 eggs"]).is_none());
        let three_pans = [
            "Small pan:",
            "1 egg",
            "Medium pan:",
            "2 eggs",
            "Large pan:",
            "3 eggs",
        ];
        assert!(engine.detect_variant_blocks(&three_pans).is_none());
        // A pan mentioned in an ingredient line is not a label
        assert!(engine
            .detect_variant_blocks(&["1 tbsp butter for the pan", "200 g flour"])
            .is_none());
    }

    #[test]
    fn test_parse_variant_list() {
        let engine = IngredientEngine::default();
        let text = "Para el molde de 20 cm:\n200 g harina\n2 huevos\n\
                    Para el molde de 24 cm:\n300 g harina\n3 huevos";
        let merged = engine.parse_variant_list(text).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "harina");
        assert_eq!(merged[0].amount.value, Some(200.0));
        assert_eq!(merged[0].amount2.as_ref().and_then(|q| q.value), Some(300.0));

        assert!(engine.parse_variant_list("200 g harina").is_none());
    }
}
