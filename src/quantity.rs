//! # Quantity Model
//!
//! Canonical representation of a cooking amount. A [`Quantity`] keeps the resolved
//! decimal magnitude next to the human-readable text it came from, so callers can
//! always fall back to what the recipe author actually wrote.
//!
//! ## Accepted forms
//!
//! - Integers and decimals: `"2"`, `"1.5"`, `"1,5"`
//! - Thousands groups: `"1,000"`, `"12,500.5"`
//! - Simple fractions: `"3/4"`, `"3⁄4"`
//! - Vulgar fraction glyphs: `"½"`, `"⅔"`, ...
//! - Mixed numbers: `"1½"`, `"1 ½"`, `"1 1/2"`
//!
//! ## Usage
//!
//! ```rust
//! use ingredient_scaler::quantity::{format_quantity, parse_quantity};
//!
//! let qty = parse_quantity("1½");
//! assert_eq!(qty.value, Some(1.5));
//! assert_eq!(format_quantity(0.75), "¾");
//! ```

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute tolerance used when snapping a value to a fraction glyph.
pub const GLYPH_TOLERANCE: f64 = 0.01;

/// Every vulgar fraction glyph the parser understands, as (glyph, numerator, denominator).
pub const VULGAR_FRACTIONS: &[(char, u32, u32)] = &[
    ('¼', 1, 4),
    ('½', 1, 2),
    ('¾', 3, 4),
    ('⅓', 1, 3),
    ('⅔', 2, 3),
    ('⅛', 1, 8),
    ('⅜', 3, 8),
    ('⅝', 5, 8),
    ('⅞', 7, 8),
    ('⅕', 1, 5),
    ('⅖', 2, 5),
    ('⅗', 3, 5),
    ('⅘', 4, 5),
    ('⅙', 1, 6),
    ('⅚', 5, 6),
];

/// Glyphs the formatter emits, in priority order: quarters, halves, thirds, eighths, sixths.
const FORMAT_GLYPHS: &[(f64, char)] = &[
    (0.25, '¼'),
    (0.75, '¾'),
    (0.5, '½'),
    (1.0 / 3.0, '⅓'),
    (2.0 / 3.0, '⅔'),
    (0.125, '⅛'),
    (1.0 / 6.0, '⅙'),
];

/// A single amount token: mixed ASCII fraction, fraction, glyph (optionally mixed) or decimal.
const AMOUNT_TOKEN: &str = concat!(
    r"(?:\d+\s+\d+\s*[/⁄]\s*\d+|\d+\s*[/⁄]\s*\d+",
    r"|\d*\s?[¼½¾⅓⅔⅛⅜⅝⅞⅕⅖⅗⅘⅙⅚]",
    r"|\d+(?:,\d{3})*(?:[.,]\d+)?|[.,]\d+)"
);

lazy_static! {
    static ref MIXED_FRACTION: Regex = Regex::new(r"^(\d+)\s+(\d+)\s*[/⁄]\s*(\d+)$").unwrap();
    static ref SIMPLE_FRACTION: Regex = Regex::new(r"^(\d+)\s*[/⁄]\s*(\d+)$").unwrap();
    static ref GLYPH_AMOUNT: Regex =
        Regex::new(r"^(\d+)?\s*([¼½¾⅓⅔⅛⅜⅝⅞⅕⅖⅗⅘⅙⅚])$").unwrap();
    static ref DECIMAL: Regex = Regex::new(r"^(?:\d+(?:[.,]\d+)?|[.,]\d+)$").unwrap();
    static ref THOUSANDS: Regex = Regex::new(r"^\d{1,3}(?:,\d{3})+(?:\.\d+)?$").unwrap();
    static ref LEADING_AMOUNT: Regex = Regex::new(&format!(
        r"^\s*({token}(?:\s*(?:-|–|—|\bto\b|\bor\b|\ba\b|\bo\b)\s*{token})?)",
        token = AMOUNT_TOKEN
    ))
    .unwrap();
    static ref RANGE: Regex = Regex::new(
        r"^(?P<low>.+?)(?P<sep>\s*(?:-|–|—|\bto\b|\bor\b|\ba\b|\bo\b)\s*)(?P<high>.+)$"
    )
    .unwrap();
}

/// A numeric cooking amount.
///
/// `value` is `None` when the text could not be resolved to a number
/// (e.g. "to taste"); `display` always holds the trimmed original text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Option<f64>,
    pub display: String,
}

impl Quantity {
    /// The "no amount" quantity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a quantity from a magnitude, formatting it for display.
    pub fn from_value(value: f64) -> Self {
        Self {
            value: Some(value),
            display: format_quantity(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.display.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

/// Look up the magnitude of a vulgar fraction glyph.
pub fn glyph_value(glyph: char) -> Option<f64> {
    VULGAR_FRACTIONS
        .iter()
        .find(|(g, _, _)| *g == glyph)
        .map(|(_, n, d)| *n as f64 / *d as f64)
}

/// Parse a quantity string. Never fails: unparseable text yields `value: None`.
pub fn parse_quantity(text: &str) -> Quantity {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Quantity::empty();
    }

    let value = parse_number(trimmed);
    if value.is_none() {
        trace!("Quantity '{}' has no numeric reading", trimmed);
    }

    Quantity {
        value,
        display: trimmed.to_string(),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    if let Some(caps) = MIXED_FRACTION.captures(text) {
        let whole: f64 = caps[1].parse().ok()?;
        return fraction(&caps[2], &caps[3]).map(|f| whole + f);
    }

    if let Some(caps) = SIMPLE_FRACTION.captures(text) {
        return fraction(&caps[1], &caps[2]);
    }

    if let Some(caps) = GLYPH_AMOUNT.captures(text) {
        let whole: f64 = match caps.get(1) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0.0,
        };
        let glyph = caps[2].chars().next()?;
        return glyph_value(glyph).map(|f| whole + f);
    }

    // "1,000" groups thousands, "1,5" is a decimal comma
    if THOUSANDS.is_match(text) {
        return text.replace(',', "").parse().ok();
    }

    if DECIMAL.is_match(text) {
        return text.replace(',', ".").parse().ok();
    }

    None
}

fn fraction(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Format a magnitude for display.
///
/// Whole numbers drop their decimals, common fractions become glyphs
/// (`1.5` → `"1½"`), everything else is rounded to two decimals with
/// trailing zeros stripped.
pub fn format_quantity(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value < 0.0 {
        return format!("-{}", format_quantity(-value));
    }

    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        return format!("{}", rounded as i64);
    }

    let whole = value.trunc();
    let frac = value - whole;
    for &(target, glyph) in FORMAT_GLYPHS {
        if (frac - target).abs() <= GLYPH_TOLERANCE {
            return if whole >= 1.0 {
                format!("{}{}", whole as i64, glyph)
            } else {
                glyph.to_string()
            };
        }
    }

    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Rewrite every vulgar fraction glyph as ASCII `n/d` (`"1½"` → `"1 1/2"`).
pub fn normalize_fraction_glyphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if let Some((_, n, d)) = VULGAR_FRACTIONS.iter().find(|(g, _, _)| *g == c) {
            if out.chars().last().is_some_and(|p| p.is_ascii_digit()) {
                out.push(' ');
            }
            out.push_str(&format!("{}/{}", n, d));
        } else if c == '⁄' {
            out.push('/');
        } else {
            out.push(c);
        }
    }
    out
}

/// Split the leading amount (including ranges such as `"2-3"`) off a string.
///
/// Returns the amount text and the remainder, both trimmed, or `None` when
/// the string does not start with a number.
pub fn split_leading_quantity(text: &str) -> Option<(&str, &str)> {
    let caps = LEADING_AMOUNT.captures(text)?;
    let whole = caps.get(0)?;
    let amount = caps.get(1)?.as_str().trim();
    Some((amount, text[whole.end()..].trim()))
}

/// Byte span of the leading amount in `text`, ranges included.
pub fn leading_quantity_span(text: &str) -> Option<(usize, usize)> {
    let amount = LEADING_AMOUNT.captures(text)?.get(1)?;
    let raw = amount.as_str();
    let start = amount.start() + (raw.len() - raw.trim_start().len());
    let end = amount.start() + raw.trim_end().len();
    (start < end).then_some((start, end))
}

/// Apply `f` to a numeric amount, or to both ends of a range, and format
/// the result. `None` when the text has no numeric reading.
pub fn map_amount(text: &str, f: impl Fn(f64) -> f64) -> Option<String> {
    if let Some(value) = parse_quantity(text).value {
        return Some(format_quantity(f(value)));
    }
    let range = parse_range(text)?;
    Some(format!(
        "{}{}{}",
        format_quantity(f(range.low)),
        range.separator,
        format_quantity(f(range.high))
    ))
}

/// A range amount such as `"2-3"` or `"2 to 3"`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeAmount<'a> {
    pub low: f64,
    pub high: f64,
    /// The separator exactly as written, surrounding spaces included.
    pub separator: &'a str,
}

/// Parse a range amount. Both ends must be numeric.
pub fn parse_range(text: &str) -> Option<RangeAmount<'_>> {
    let caps = RANGE.captures(text.trim())?;
    let low = parse_quantity(caps.name("low")?.as_str()).value?;
    let high = parse_quantity(caps.name("high")?.as_str()).value?;
    Some(RangeAmount {
        low,
        high,
        separator: caps.name("sep")?.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a numeric value");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {} got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_parse_integer_and_decimal() {
        assert_close(parse_quantity("2").value, 2.0);
        assert_close(parse_quantity("1.5").value, 1.5);
        assert_close(parse_quantity("1,5").value, 1.5);
        assert_close(parse_quantity(".5").value, 0.5);
    }

    #[test]
    fn test_parse_comma_readings() {
        let test_cases = vec![
            ("1,000", 1000.0),
            ("12,500", 12500.0),
            ("1,000,000", 1_000_000.0),
            ("2,500.5", 2500.5),
            ("1,5", 1.5),
            ("0,25", 0.25),
            ("1,0005", 1.0005),
            ("1234,567", 1234.567),
        ];

        for (input, expected) in test_cases {
            assert_close(parse_quantity(input).value, expected);
        }

        assert_eq!(split_leading_quantity("1,000 g flour"), Some(("1,000", "g flour")));
        assert_eq!(map_amount("1,000", |v| v * 2.0), Some("2000".to_string()));
    }

    #[test]
    fn test_parse_fractions() {
        assert_close(parse_quantity("3/4").value, 0.75);
        assert_close(parse_quantity("3⁄4").value, 0.75);
        assert_close(parse_quantity("1 1/2").value, 1.5);
    }

    #[test]
    fn test_parse_glyphs() {
        assert_close(parse_quantity("½").value, 0.5);
        assert_close(parse_quantity("⅔").value, 2.0 / 3.0);
        assert_close(parse_quantity("1½").value, 1.5);
        assert_close(parse_quantity("2 ¼").value, 2.25);
        assert_close(parse_quantity("⅚").value, 5.0 / 6.0);
    }

    #[test]
    fn test_parse_unparseable() {
        let qty = parse_quantity("  to taste ");
        assert_eq!(qty.value, None);
        assert_eq!(qty.display, "to taste");

        assert_eq!(parse_quantity("1/0").value, None);
        assert!(parse_quantity("   ").is_empty());
    }

    #[test]
    fn test_format_whole_and_decimal() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(1.999), "2");
        assert_eq!(format_quantity(1.4), "1.4");
        assert_eq!(format_quantity(0.1), "0.1");
        assert_eq!(format_quantity(2.456), "2.46");
    }

    #[test]
    fn test_format_glyphs() {
        assert_eq!(format_quantity(0.5), "½");
        assert_eq!(format_quantity(1.5), "1½");
        assert_eq!(format_quantity(0.25), "¼");
        assert_eq!(format_quantity(2.75), "2¾");
        assert_eq!(format_quantity(1.0 / 3.0), "⅓");
        assert_eq!(format_quantity(2.0 / 3.0), "⅔");
        assert_eq!(format_quantity(0.125), "⅛");
        assert_eq!(format_quantity(1.0 / 6.0), "⅙");
        assert_eq!(format_quantity(0.335), "⅓");
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let samples = [
            "2", "1.5", "3/4", "1/3", "2/3", "1 1/2", "½", "1½", "⅛", "⅙", "0.2", "7.77",
            "2.33", "10", "0.05", "⅜", "⅝",
        ];
        for sample in samples {
            let original = parse_quantity(sample).value.unwrap();
            let formatted = format_quantity(original);
            let reparsed = parse_quantity(&formatted).value.unwrap();
            assert!(
                (original - reparsed).abs() <= GLYPH_TOLERANCE,
                "{} -> {} -> {}",
                sample,
                formatted,
                reparsed
            );
        }
    }

    #[test]
    fn test_normalize_fraction_glyphs() {
        assert_eq!(normalize_fraction_glyphs("⅔"), "2/3");
        assert_eq!(normalize_fraction_glyphs("1½"), "1 1/2");
        assert_eq!(normalize_fraction_glyphs("1 ½ cups"), "1 1/2 cups");
        assert_eq!(normalize_fraction_glyphs("3⁄4"), "3/4");
    }

    #[test]
    fn test_split_leading_quantity() {
        assert_eq!(split_leading_quantity("2 cups flour"), Some(("2", "cups flour")));
        assert_eq!(split_leading_quantity("500g butter"), Some(("500", "g butter")));
        assert_eq!(split_leading_quantity("1 1/2 cup milk"), Some(("1 1/2", "cup milk")));
        assert_eq!(split_leading_quantity("2-3 eggs"), Some(("2-3", "eggs")));
        assert_eq!(split_leading_quantity("2 to 3 tbsp oil"), Some(("2 to 3", "tbsp oil")));
        assert_eq!(split_leading_quantity("2 tomatoes"), Some(("2", "tomatoes")));
        assert_eq!(split_leading_quantity("salt to taste"), None);
    }

    #[test]
    fn test_parse_range() {
        let range = parse_range("2-3").unwrap();
        assert_eq!((range.low, range.high, range.separator), (2.0, 3.0, "-"));

        let range = parse_range("1 1/2 to 2").unwrap();
        assert_eq!((range.low, range.high, range.separator), (1.5, 2.0, " to "));

        assert!(parse_range("2").is_none());
        assert!(parse_range("a few").is_none());
    }

    #[test]
    fn test_leading_quantity_span() {
        assert_eq!(leading_quantity_span("1/2 cup"), Some((0, 3)));
        assert_eq!(leading_quantity_span("  200g"), Some((2, 5)));
        assert_eq!(leading_quantity_span("2 - 3 eggs"), Some((0, 5)));
        assert_eq!(leading_quantity_span("a pinch"), None);
    }

    #[test]
    fn test_map_amount() {
        assert_eq!(map_amount("1/2", |v| v * 3.0), Some("1½".to_string()));
        assert_eq!(map_amount("2-3", |v| v * 2.0), Some("4-6".to_string()));
        assert_eq!(map_amount("1 to 2", |v| v / 2.0), Some("½ to 1".to_string()));
        assert_eq!(map_amount("to taste", |v| v * 2.0), None);
    }
}
