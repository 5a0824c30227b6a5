//! # Recipe Import
//!
//! Turns already-extracted recipe data into parsed ingredients and
//! instructions: raw ingredient strings, and `recipeInstructions` from
//! schema.org JSON-LD in any of its common shapes:
//!
//! - a single string (one step per line)
//! - an array of strings
//! - `HowToStep` objects (`text`, falling back to `description` or `name`)
//! - `HowToSection` objects, whose `name` becomes a header instruction
//!   followed by the steps of its `itemListElement`
//!
//! Each instruction is linked to the ingredients it mentions.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::IngredientEngine;
use crate::model::{Instruction, ParsedIngredient};
use crate::translate::{ResilientTranslator, Translator};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeInstructions {
    Text(String),
    Many(Vec<InstructionItem>),
    One(InstructionItem),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionItem {
    Text(String),
    Section(HowToSection),
    Step(HowToStep),
}

#[derive(Debug, Deserialize)]
struct HowToSection {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "itemListElement")]
    item_list_element: Vec<InstructionItem>,
}

#[derive(Debug, Deserialize)]
struct HowToStep {
    text: Option<String>,
    description: Option<String>,
    name: Option<String>,
}

/// Ingredients and instructions of one imported recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecipe {
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: Vec<Instruction>,
}

fn push_lines(text: &str, steps: &mut Vec<(String, bool)>) {
    steps.extend(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| (line.to_string(), false)),
    );
}

fn flatten(item: InstructionItem, steps: &mut Vec<(String, bool)>) {
    match item {
        InstructionItem::Text(text) => push_lines(&text, steps),
        InstructionItem::Section(section) => {
            let name = section.name.map(|n| n.trim().to_string());
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                steps.push((name, true));
            }
            for child in section.item_list_element {
                flatten(child, steps);
            }
        }
        InstructionItem::Step(step) => {
            let text = step
                .text
                .or(step.description)
                .or(step.name)
                .unwrap_or_default();
            push_lines(&text, steps);
        }
    }
}

/// Flatten JSON-LD `recipeInstructions` into (text, is_header) steps.
fn instruction_steps(value: &Value) -> Vec<(String, bool)> {
    let instructions = match RecipeInstructions::deserialize(value) {
        Ok(instructions) => instructions,
        Err(e) => {
            debug!("Unrecognized recipeInstructions shape: {}", e);
            return Vec::new();
        }
    };

    let mut steps = Vec::new();
    match instructions {
        RecipeInstructions::Text(text) => push_lines(&text, &mut steps),
        RecipeInstructions::Many(items) => {
            for item in items {
                flatten(item, &mut steps);
            }
        }
        RecipeInstructions::One(item) => flatten(item, &mut steps),
    }
    steps
}

impl IngredientEngine {
    /// Parse ingredient lines, merging two variant blocks when the lines
    /// contain them.
    pub fn import_ingredients<S: AsRef<str>>(&self, lines: &[S]) -> Vec<ParsedIngredient> {
        let text = lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n");

        match self.parse_variant_list(&text) {
            Some(merged) => {
                debug!("Imported ingredients as two variant blocks");
                merged
            }
            None => self.parse_ingredient_list(&text),
        }
    }

    /// Build an instruction with the indices of the ingredients it mentions.
    pub fn link_instruction(&self, text: &str, ingredients: &[ParsedIngredient]) -> Instruction {
        let mut indices: Vec<usize> = self
            .find_mentions(text, ingredients, None)
            .iter()
            .map(|m| m.index)
            .collect();
        indices.sort_unstable();
        indices.dedup();

        Instruction {
            text: text.to_string(),
            ingredient_indices: indices,
            is_header: false,
        }
    }

    /// Convert JSON-LD `recipeInstructions` into linked instructions.
    ///
    /// Unrecognized shapes yield an empty list.
    pub fn instructions_from_json_ld(
        &self,
        value: &Value,
        ingredients: &[ParsedIngredient],
    ) -> Vec<Instruction> {
        instruction_steps(value)
            .into_iter()
            .map(|(text, is_header)| {
                if is_header {
                    Instruction {
                        text,
                        ingredient_indices: Vec::new(),
                        is_header: true,
                    }
                } else {
                    self.link_instruction(&text, ingredients)
                }
            })
            .collect()
    }

    /// Import a recipe from extracted ingredient strings and JSON-LD instructions.
    pub fn import_recipe<S: AsRef<str>>(
        &self,
        ingredient_lines: &[S],
        instructions: &Value,
    ) -> ParsedRecipe {
        let ingredients = self.import_ingredients(ingredient_lines);
        let instructions = self.instructions_from_json_ld(instructions, &ingredients);
        info!(
            "Imported recipe with {} ingredients and {} instructions",
            ingredients.len(),
            instructions.len()
        );
        ParsedRecipe {
            ingredients,
            instructions,
        }
    }

    /// Import a recipe, translating every ingredient line and step first.
    ///
    /// Lines the translator cannot handle are imported as written.
    pub async fn import_translated<S, T>(
        &self,
        ingredient_lines: &[S],
        instructions: &Value,
        translator: &ResilientTranslator<T>,
    ) -> ParsedRecipe
    where
        S: AsRef<str>,
        T: Translator + ?Sized,
    {
        let mut translated_lines = Vec::with_capacity(ingredient_lines.len());
        for line in ingredient_lines {
            translated_lines.push(translator.translate_or_original(line.as_ref()).await);
        }
        let ingredients = self.import_ingredients(&translated_lines);

        let mut linked = Vec::new();
        for (text, is_header) in instruction_steps(instructions) {
            let text = translator.translate_or_original(&text).await;
            if is_header {
                linked.push(Instruction {
                    text,
                    ingredient_indices: Vec::new(),
                    is_header: true,
                });
            } else {
                linked.push(self.link_instruction(&text, &ingredients));
            }
        }

        ParsedRecipe {
            ingredients,
            instructions: linked,
        }
    }
}
