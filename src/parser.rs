//! # Ingredient Line Parser
//!
//! Turns a raw ingredient line into a [`ParsedIngredient`]. The parser is a
//! heuristic: it never fails, and in the worst case the whole line becomes
//! the name with no amount or unit.
//!
//! Order of work for one line:
//!
//! 1. Section headers (`**Filling**`, `For the base:`, short lines ending in ':')
//! 2. An "or" substitute whose right-hand side starts with a quantity
//! 3. A trailing parenthesized clause, kept as a second measurement when it
//!    starts with a quantity and as a note otherwise
//! 4. Leading quantity + unit + name, then quantity + name, then name only
//!
//! ```rust
//! use ingredient_scaler::engine::default_engine;
//!
//! let parsed = default_engine().parse_ingredient_line("100 g flour (⅔ cup)");
//! assert_eq!(parsed.amount.display, "100");
//! assert_eq!(parsed.unit, "g");
//! assert_eq!(parsed.name, "flour");
//! assert_eq!(parsed.amount2.unwrap().display, "2/3");
//! assert_eq!(parsed.unit2.as_deref(), Some("cup"));
//! ```

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::Regex;

use crate::engine::IngredientEngine;
use crate::model::{stored_quantity, ParsedIngredient};
use crate::quantity::split_leading_quantity;

/// Longest line, in words, still treated as a colon-terminated header.
const MAX_HEADER_WORDS: usize = 6;

lazy_static! {
    static ref BOLD_HEADER: Regex =
        Regex::new(r"^(?:\*\*(?P<star>[^*]+)\*\*|__(?P<under>[^_]+)__)\s*:?\s*$").unwrap();
    static ref TRAILING_PAREN: Regex =
        Regex::new(r"^(?P<head>.*?\S)\s*\((?P<inner>[^()]*)\)\s*[.,;]?\s*$").unwrap();
    static ref LIST_BULLET: Regex = Regex::new(r"^(?:[-•·▪]|\*(?:\s|$))").unwrap();
}

/// Strip a list bullet ("- ", "• ", "* ").
fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    match LIST_BULLET.find(trimmed) {
        Some(m) => trimmed[m.end()..].trim(),
        None => trimmed,
    }
}

/// Bracket nesting depth at byte `position` of `text`.
fn depth_at(text: &str, position: usize) -> i32 {
    text[..position].chars().fold(0, |depth, c| match c {
        '(' | '[' => depth + 1,
        ')' | ']' => depth - 1,
        _ => depth,
    })
}

impl IngredientEngine {
    /// Parse a single ingredient line.
    pub fn parse_ingredient_line(&self, line: &str) -> ParsedIngredient {
        let line = strip_bullet(line);
        if line.is_empty() {
            return ParsedIngredient::default();
        }

        if let Some(label) = self.header_label(line) {
            trace!("Header line: '{}'", label);
            return ParsedIngredient::header(&label);
        }

        if let Some(parsed) = self.parse_with_alternative(line) {
            return parsed;
        }

        self.parse_measured(line)
    }

    /// Parse a block of text line by line, dropping blank and unusable lines.
    pub fn parse_ingredient_list(&self, text: &str) -> Vec<ParsedIngredient> {
        let ingredients: Vec<ParsedIngredient> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.parse_ingredient_line(line))
            .filter(|parsed| parsed.is_usable())
            .collect();

        debug!("Parsed {} ingredient entries", ingredients.len());
        ingredients
    }

    /// Return the label when `line` is a section header.
    pub(crate) fn header_label(&self, line: &str) -> Option<String> {
        let line = line.trim();

        if let Some(caps) = BOLD_HEADER.captures(line) {
            let inner = caps.name("star").or_else(|| caps.name("under"))?;
            let label = inner.as_str().trim().trim_end_matches(':').trim();
            return (!label.is_empty()).then(|| label.to_string());
        }

        if split_leading_quantity(line).is_some() {
            return None;
        }

        let label = line.trim_end_matches(':').trim();
        if label.is_empty() {
            return None;
        }

        if self.header_pattern.is_match(line) {
            return Some(label.to_string());
        }

        if line.ends_with(':') && label.split_whitespace().count() <= MAX_HEADER_WORDS {
            return Some(label.to_string());
        }

        None
    }

    /// Split "X or Y" where Y starts with a quantity and X has a usable name.
    fn parse_with_alternative(&self, line: &str) -> Option<ParsedIngredient> {
        let split = self.alternative_pattern.find_iter(line).find(|m| {
            depth_at(line, m.start()) == 0 && split_leading_quantity(&line[m.end()..]).is_some()
        })?;

        let mut primary = self.parse_measured(&line[..split.start()]);
        if !primary.is_usable() {
            trace!("Left side of '{}' has no name, keeping the line whole", line);
            return None;
        }

        let alternative = self.parse_measured(&line[split.end()..]);
        if alternative.is_usable() {
            debug!(
                "Split alternative: '{}' or '{}'",
                primary.name, alternative.name
            );
            primary.alternative = Some(alternative.into());
        }
        Some(primary)
    }

    /// Steps 3-5: trailing parenthesis, then quantity/unit/name.
    fn parse_measured(&self, text: &str) -> ParsedIngredient {
        let mut text = text.trim();
        let mut secondary = None;
        let mut note = None;

        if let Some(caps) = TRAILING_PAREN.captures(text) {
            let inner = caps["inner"].trim();
            if let Some((amount, rest)) = split_leading_quantity(inner) {
                let unit = self
                    .match_unit_prefix(rest)
                    .map(|(len, _)| rest[..len].trim_end_matches('.').to_string())
                    .unwrap_or_default();
                secondary = Some((stored_quantity(amount), unit));
            } else if !inner.is_empty() {
                note = Some(inner.to_string());
            }
            if let Some(head) = caps.name("head") {
                text = head.as_str();
            }
        }

        let mut parsed = match split_leading_quantity(text) {
            Some((amount, rest)) => {
                let mut parsed = ParsedIngredient {
                    amount: stored_quantity(amount),
                    ..Default::default()
                };
                let name = match self.match_unit_prefix(rest) {
                    Some((len, unit)) => {
                        trace!("Unit '{}' resolved to {:?}", &rest[..len], unit);
                        parsed.unit = rest[..len].trim_end_matches('.').to_string();
                        &rest[len..]
                    }
                    None => rest,
                };
                parsed.name = self.clean_name(name, true);
                parsed
            }
            None => {
                trace!("No leading quantity in '{}', using the line as name", text);
                ParsedIngredient::named(&self.clean_name(text, false))
            }
        };

        if let Some((amount2, unit2)) = secondary {
            parsed.amount2 = Some(amount2);
            parsed.unit2 = Some(unit2);
        }
        parsed.note = note;
        parsed
    }

    /// Tidy an extracted name: trailing punctuation, one leading connector,
    /// length limit, whitespace.
    pub(crate) fn clean_name(&self, raw_name: &str, strip_connector: bool) -> String {
        let collapsed = raw_name.split_whitespace().collect::<Vec<_>>().join(" ");
        if !self.config.enable_ingredient_postprocessing || collapsed.is_empty() {
            return collapsed;
        }

        let original_name = collapsed.clone();
        let mut name = collapsed
            .trim_end_matches(|c: char| {
                !c.is_alphanumeric() && c != ' ' && c != '-' && c != '\'' && c != ')'
            })
            .trim_start_matches(|c: char| c == ',' || c == ';' || c == ':' || c == '-')
            .trim()
            .to_string();

        if strip_connector {
            if let Some(m) = self.connector_pattern.find(&name) {
                if m.end() < name.len() {
                    name = name[m.end()..].trim_start().to_string();
                    trace!("Removed connector from '{}' -> '{}'", original_name, name);
                }
            }
        }

        let limit = self.config.max_ingredient_length;
        if name.len() > limit {
            let mut cut = limit;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            let truncated = &name[..cut];
            // Try to cut at word boundary
            let truncated = match truncated.rfind(' ') {
                Some(last_space) if last_space > 0 => &truncated[..last_space],
                _ => truncated,
            };
            warn!(
                "Ingredient name truncated due to length limit ({} > {}): '{}' -> '{}'",
                name.len(),
                limit,
                original_name,
                truncated
            );
            name = truncated.trim_end().to_string();
        }

        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::tables::Tables;

    fn engine() -> IngredientEngine {
        IngredientEngine::default()
    }

    #[test]
    fn test_quantity_unit_name() {
        let engine = engine();
        let test_cases = vec![
            ("2 cups flour", "2", "cups", "flour"),
            ("1½ tazas de harina", "1 1/2", "tazas", "harina"),
            ("500g butter", "500", "g", "butter"),
            ("2 tbsp. olive oil", "2", "tbsp", "olive oil"),
            ("3 cucharadas soperas de aceite", "3", "cucharadas soperas", "aceite"),
            ("1 1/2 cups of milk", "1 1/2", "cups", "milk"),
            ("250 ml d'eau", "250", "ml", "eau"),
            ("2-3 cloves garlic", "2-3", "cloves", "garlic"),
            ("1,5 kg patatas", "1,5", "kg", "patatas"),
        ];

        for (input, amount, unit, name) in test_cases {
            let parsed = engine.parse_ingredient_line(input);
            assert_eq!(parsed.amount.display, amount, "amount for '{}'", input);
            assert_eq!(parsed.unit, unit, "unit for '{}'", input);
            assert_eq!(parsed.name, name, "name for '{}'", input);
            assert!(!parsed.is_header);
        }
    }

    #[test]
    fn test_unit_must_end_at_word_boundary() {
        let engine = engine();
        let parsed = engine.parse_ingredient_line("2 large eggs");
        assert_eq!(parsed.amount.value, Some(2.0));
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "large eggs");

        let parsed = engine.parse_ingredient_line("3 lemons");
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "lemons");
    }

    #[test]
    fn test_name_only_lines() {
        let engine = engine();
        let parsed = engine.parse_ingredient_line("Salt and pepper to taste");
        assert!(parsed.amount.is_empty());
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "Salt and pepper to taste");

        let parsed = engine.parse_ingredient_line("de todo un poco");
        assert_eq!(parsed.name, "de todo un poco");
    }

    #[test]
    fn test_secondary_measurement_in_parentheses() {
        let engine = engine();
        let parsed = engine.parse_ingredient_line("100 g flour (⅔ cup)");
        assert_eq!(parsed.amount.display, "100");
        assert_eq!(parsed.unit, "g");
        assert_eq!(parsed.name, "flour");
        assert_eq!(parsed.amount2.as_ref().map(|q| q.display.as_str()), Some("2/3"));
        assert_eq!(parsed.unit2.as_deref(), Some("cup"));
        assert!(parsed.note.is_none());

        let parsed = engine.parse_ingredient_line("2 eggs (3 large)");
        assert_eq!(parsed.amount2.as_ref().and_then(|q| q.value), Some(3.0));
        assert_eq!(parsed.unit2.as_deref(), Some(""));
    }

    #[test]
    fn test_parenthetical_note() {
        let engine = engine();
        let parsed = engine.parse_ingredient_line("1 cup walnuts (optional)");
        assert_eq!(parsed.name, "walnuts");
        assert_eq!(parsed.note.as_deref(), Some("optional"));
        assert!(parsed.amount2.is_none());
    }

    #[test]
    fn test_headers() {
        let engine = engine();
        let test_cases = vec![
            ("**Filling**", "Filling"),
            ("__Para la masa__", "Para la masa"),
            ("For the base:", "For the base"),
            ("Para el relleno", "Para el relleno"),
            ("Topping:", "Topping"),
        ];

        for (input, label) in test_cases {
            let parsed = engine.parse_ingredient_line(input);
            assert!(parsed.is_header, "'{}' should be a header", input);
            assert_eq!(parsed.name, label);
            assert!(parsed.amount.is_empty());
            assert!(parsed.unit.is_empty());
        }

        assert!(!engine.parse_ingredient_line("2 cups sugar:").is_header);
        assert!(!engine.parse_ingredient_line("flour").is_header);
    }

    #[test]
    fn test_alternative_ingredient() {
        let engine = engine();
        let parsed = engine.parse_ingredient_line("30 g butter or 2 tbsp olive oil");
        assert_eq!(parsed.name, "butter");
        assert_eq!(parsed.unit, "g");
        let alternative = parsed.alternative.expect("alternative");
        assert_eq!(alternative.name, "olive oil");
        assert_eq!(alternative.amount.value, Some(2.0));
        assert_eq!(alternative.unit, "tbsp");

        let parsed = engine.parse_ingredient_line("1 taza de leche o 240 ml de agua");
        assert_eq!(parsed.name, "leche");
        assert_eq!(parsed.alternative.map(|a| a.name), Some("agua".to_string()));
    }

    #[test]
    fn test_or_without_quantity_stays_in_name() {
        let engine = engine();
        let parsed = engine.parse_ingredient_line("2 or 3 eggs");
        assert_eq!(parsed.amount.display, "2 or 3");
        assert_eq!(parsed.name, "eggs");
        assert!(parsed.alternative.is_none());

        let parsed = engine.parse_ingredient_line("1 cup milk or cream");
        assert_eq!(parsed.name, "milk or cream");
        assert!(parsed.alternative.is_none());
    }

    #[test]
    fn test_empty_name_sentinel() {
        let engine = engine();
        assert!(!engine.parse_ingredient_line("   ").is_usable());
        assert!(!engine.parse_ingredient_line("2 cups").is_usable());
    }

    #[test]
    fn test_parse_ingredient_list() {
        let engine = engine();
        let text = [
            "**Base**",
            "200 g flour",
            "",
            "- 2 eggs",
            "3",
            "• 1 tsp salt",
            "For the glaze:",
            "100 g sugar",
        ]
        .join("\n");
        let list = engine.parse_ingredient_list(&text);
        let names: Vec<&str> = list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Base", "flour", "eggs", "salt", "For the glaze", "sugar"]);
        assert!(list[0].is_header);
        assert!(list[4].is_header);
    }

    #[test]
    fn test_name_length_limit() {
        let config = EngineConfig {
            max_ingredient_length: 20,
            ..Default::default()
        };
        let engine = IngredientEngine::with_config(Tables::default(), config).unwrap();
        let line = "1 cup very finely chopped fresh flat leaf parsley";
        let parsed = engine.parse_ingredient_line(line);
        assert!(parsed.name.len() <= 20);
        assert_eq!(parsed.name, "very finely chopped");
    }

    #[test]
    fn test_postprocessing_disabled() {
        let config = EngineConfig {
            enable_ingredient_postprocessing: false,
            ..Default::default()
        };
        let engine = IngredientEngine::with_config(Tables::default(), config).unwrap();
        let parsed = engine.parse_ingredient_line("2 cups of flour");
        assert_eq!(parsed.name, "of flour");
    }
}
