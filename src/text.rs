//! # Text Folding
//!
//! Accent- and case-insensitive text utilities shared by the parser, the
//! variant merger and the mention matcher.
//!
//! [`FoldedText`] lower-cases and strips diacritics from a string while
//! remembering, for every byte of the folded form, which character of the
//! original it came from. Searches run on the folded form; spans are reported
//! against the original so accents and casing survive for display.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a single character into its lower-cased, accent-free form.
fn fold_char(c: char, out: &mut String) {
    for decomposed in c.nfd() {
        if is_combining_mark(decomposed) {
            continue;
        }
        for lower in decomposed.to_lowercase() {
            if !is_combining_mark(lower) {
                out.push(lower);
            }
        }
    }
}

/// Lower-case a string and strip its diacritics (`"Calabacín"` → `"calabacin"`).
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        fold_char(c, &mut out);
    }
    out
}

/// Normalized matching key: folded, trimmed, inner whitespace collapsed.
pub fn normalize_key(text: &str) -> String {
    fold(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `needle` occurs in `haystack` as a whole word, allowing a plural
/// `s`/`es` suffix. Both arguments are expected to be folded already.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let starts_word = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let rest = &haystack[start + needle.len()..];
        let rest = rest
            .strip_prefix("es")
            .or_else(|| rest.strip_prefix('s'))
            .filter(|r| r.chars().next().map_or(true, |c| !c.is_alphanumeric()))
            .unwrap_or(rest);
        starts_word && rest.chars().next().map_or(true, |c| !c.is_alphanumeric())
    })
}

/// A folded string with a byte-level map back to the original.
#[derive(Debug, Clone)]
pub struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    /// For each byte of `folded`: the (start, end) byte span of its source character.
    origin: Vec<(usize, usize)>,
}

impl<'a> FoldedText<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len());
        let mut scratch = String::new();

        for (start, c) in original.char_indices() {
            let end = start + c.len_utf8();
            scratch.clear();
            fold_char(c, &mut scratch);
            folded.push_str(&scratch);
            origin.extend(std::iter::repeat((start, end)).take(scratch.len()));
        }

        Self {
            original,
            folded,
            origin,
        }
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Map a non-empty byte span of the folded text back onto the original.
    ///
    /// The returned span always lies on character boundaries of the original
    /// and covers every source character touched by the folded span.
    pub fn original_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end || end > self.origin.len() {
            return None;
        }
        Some((self.origin[start].0, self.origin[end - 1].1))
    }
}
