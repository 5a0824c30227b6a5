//! # Ingredient Mention Matcher
//!
//! Finds the recipe's ingredients inside free-text instructions so a step
//! can show live quantities next to each mention.
//!
//! Matching is accent- and case-insensitive and works on whole words: a
//! keyword may be followed by a short plural suffix ("egg" finds "eggs"), but
//! never matches inside another word ("sal" does not find "salmon"). Spans
//! are reported against the original text, so the concatenated parts of an
//! enriched step always reproduce the step exactly.
//!
//! The matcher does no numeric work of its own: scaling and unit conversion
//! are supplied by the caller as closures.

use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::convert::{DisplayAmount, DisplayMode};
use crate::engine::IngredientEngine;
use crate::model::{Instruction, ParsedIngredient};
use crate::scale::scale_amount;
use crate::text::{normalize_key, FoldedText};

/// Longest suffix a keyword may be extended by (plural "s"/"es").
const MAX_SUFFIX_CHARS: usize = 2;

/// One segment of an enriched step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EnrichedPart {
    Text {
        content: String,
    },
    Ingredient {
        content: String,
        /// Position of the ingredient in the recipe's list.
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        formatted_quantity: Option<String>,
    },
}

impl EnrichedPart {
    pub fn content(&self) -> &str {
        match self {
            EnrichedPart::Text { content } | EnrichedPart::Ingredient { content, .. } => content,
        }
    }
}

/// An ingredient found in a text, as a byte span of the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn keyword_regex(keyword: &str) -> Result<Regex, regex::Error> {
    let starts_word = keyword.chars().next().is_some_and(is_word_char);
    let ends_word = keyword.chars().next_back().is_some_and(is_word_char);
    Regex::new(&format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(keyword),
        if ends_word {
            format!(r"\w{{0,{}}}\b", MAX_SUFFIX_CHARS)
        } else {
            String::new()
        }
    ))
}

/// Other spellings of `word` that let singular and plural forms find each
/// other once the plural suffix is allowed.
///
/// "cherries" gives "cherry", and "cherry" gives "cherri" (which finds
/// "cherries"). Spanish "nueces" and "nuez" pair up the same way.
fn word_stems(word: &str) -> Vec<String> {
    let mut stems: Vec<String> = ["es", "s"]
        .iter()
        .filter_map(|suffix| word.strip_suffix(suffix))
        .map(str::to_string)
        .collect();

    if let Some(stem) = word.strip_suffix("ies") {
        stems.push(format!("{}y", stem));
    }
    if let Some(stem) = word.strip_suffix("ces") {
        stems.push(format!("{}z", stem));
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().next_back().is_some_and(|c| c.is_alphabetic() && !"aeiou".contains(c)) {
            stems.push(format!("{}i", stem));
        }
    }
    if let Some(stem) = word.strip_suffix('z') {
        stems.push(format!("{}c", stem));
    }
    stems
}

impl IngredientEngine {
    /// Search keywords for an ingredient name, longest first.
    ///
    /// The full normalized name, every significant word of it, and the
    /// singular or plural stems of those words.
    pub fn ingredient_keywords(&self, name: &str) -> Vec<String> {
        let full = normalize_key(name);
        if full.is_empty() {
            return Vec::new();
        }

        let min = self.config.min_keyword_length;
        let mut keywords = vec![full.clone()];

        for word in full.split(|c: char| !is_word_char(c)) {
            if word.chars().count() < min || self.is_stop_word(word) {
                continue;
            }
            keywords.push(word.to_string());

            for stem in word_stems(word) {
                if stem.chars().count() >= min && !self.is_stop_word(&stem) {
                    keywords.push(stem);
                }
            }
        }

        keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        keywords.dedup();
        keywords
    }

    /// Locate ingredient mentions in `text`, sorted by position.
    ///
    /// `candidates` restricts the search to the given ingredient positions;
    /// `None` scans the whole list. Headers and unnamed entries are skipped.
    /// Each ingredient is reported at most once, and earlier ingredients claim
    /// overlapping text first.
    pub fn find_mentions(
        &self,
        text: &str,
        ingredients: &[ParsedIngredient],
        candidates: Option<&[usize]>,
    ) -> Vec<Mention> {
        let folded = FoldedText::new(text);
        let haystack = folded.folded();
        let all: Vec<usize> = (0..ingredients.len()).collect();
        let candidates = candidates.unwrap_or(&all);

        let mut taken: Vec<(usize, usize)> = Vec::new();
        let mut mentions = Vec::new();

        for &index in candidates {
            let Some(ingredient) = ingredients.get(index) else {
                trace!("Ignoring out-of-range ingredient index {}", index);
                continue;
            };
            if ingredient.is_header || !ingredient.is_usable() {
                continue;
            }

            'keywords: for keyword in self.ingredient_keywords(&ingredient.name) {
                let pattern = match keyword_regex(&keyword) {
                    Ok(pattern) => pattern,
                    Err(e) => {
                        debug!("Skipping keyword '{}': {}", keyword, e);
                        continue;
                    }
                };

                for found in pattern.find_iter(haystack) {
                    let (start, end) = (found.start(), found.end());
                    if taken.iter().any(|&(s, e)| start < e && s < end) {
                        continue;
                    }
                    let Some((orig_start, orig_end)) = folded.original_span(start, end) else {
                        continue;
                    };

                    trace!(
                        "Found '{}' for ingredient {} ('{}')",
                        &text[orig_start..orig_end],
                        index,
                        ingredient.name
                    );
                    taken.push((start, end));
                    mentions.push(Mention {
                        index,
                        start: orig_start,
                        end: orig_end,
                    });
                    break 'keywords;
                }
            }
        }

        mentions.sort_by_key(|m| (m.start, m.end));
        mentions
    }

    /// Split a step into text and ingredient segments.
    ///
    /// `scale` receives the ingredient's amount text (the variant amount when
    /// `use_variant` is set and present); `convert` receives the scaled
    /// amount, the unit and the ingredient name. Ingredients without an
    /// amount are annotated without a quantity.
    pub fn enrich_step_with_ingredients<S, C>(
        &self,
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
        let mentions = self.find_mentions(step_text, ingredients, None);
        build_parts(step_text, &mentions, ingredients, &scale, use_variant, &convert)
    }

    /// Enrich an [`Instruction`], honoring its `ingredient_indices` when present.
    pub fn enrich_instruction<S, C>(
        &self,
        instruction: &Instruction,
        ingredients: &[ParsedIngredient],
        scale: S,
        use_variant: bool,
        convert: C,
    ) -> Vec<EnrichedPart>
    where
        S: Fn(&str) -> String,
        C: Fn(&str, &str, &str) -> DisplayAmount,
    {
        if instruction.is_header {
            return vec![EnrichedPart::Text {
                content: instruction.text.clone(),
            }];
        }

        let candidates = (!instruction.ingredient_indices.is_empty())
            .then_some(instruction.ingredient_indices.as_slice());
        let mentions = self.find_mentions(&instruction.text, ingredients, candidates);
        build_parts(
            &instruction.text,
            &mentions,
            ingredients,
            &scale,
            use_variant,
            &convert,
        )
    }

    /// Enrich a step with this engine's own scaling and display conversion.
    pub fn enrich_step_for_display(
        &self,
        step_text: &str,
        ingredients: &[ParsedIngredient],
        multiplier: f64,
        use_variant: bool,
        mode: DisplayMode,
    ) -> Vec<EnrichedPart> {
        self.enrich_step_with_ingredients(
            step_text,
            ingredients,
            |amount| scale_amount(amount, multiplier),
            use_variant,
            |amount, unit, name| self.convert_for_display(amount, unit, name, mode),
        )
    }
}

fn formatted_quantity<S, C>(
    ingredient: &ParsedIngredient,
    scale: &S,
    use_variant: bool,
    convert: &C,
) -> Option<String>
where
    S: Fn(&str) -> String,
    C: Fn(&str, &str, &str) -> DisplayAmount,
{
    let (amount, unit) = ingredient.amount_for(use_variant);
    if amount.is_empty() {
        return None;
    }

    let scaled = scale(&amount.display);
    let shown = convert(&scaled, unit, &ingredient.name);
    let text = [shown.amount.as_str(), shown.unit.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn build_parts<S, C>(
    text: &str,
    mentions: &[Mention],
    ingredients: &[ParsedIngredient],
    scale: &S,
    use_variant: bool,
    convert: &C,
) -> Vec<EnrichedPart>
where
    S: Fn(&str) -> String,
    C: Fn(&str, &str, &str) -> DisplayAmount,
{
    let mut parts = Vec::new();
    let mut cursor = 0;

    for mention in mentions {
        if mention.start < cursor {
            continue;
        }
        if mention.start > cursor {
            parts.push(EnrichedPart::Text {
                content: text[cursor..mention.start].to_string(),
            });
        }
        parts.push(EnrichedPart::Ingredient {
            content: text[mention.start..mention.end].to_string(),
            index: mention.index,
            formatted_quantity: formatted_quantity(
                &ingredients[mention.index],
                scale,
                use_variant,
                convert,
            ),
        });
        cursor = mention.end;
    }

    if cursor < text.len() {
        parts.push(EnrichedPart::Text {
            content: text[cursor..].to_string(),
        });
    }
    parts
}
