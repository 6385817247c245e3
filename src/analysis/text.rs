//! Text normalization and noise checks shared by the analysis stages.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref URL: Regex = Regex::new(r"(?i)\b(https?://|www\.)\S+").unwrap();
    static ref EMAIL: Regex = Regex::new(r"\S+@\S+\.\S+").unwrap();
    // A word ending a sentence, then the capitalized start of the next one
    static ref SENTENCE_BREAK: Regex = Regex::new(r"\p{Ll}{2,}[.!?]\s+\p{Lu}").unwrap();
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Key used to compare texts: NFKC, lowercase, whitespace-collapsed.
pub fn normalize_for_match(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    collapse_whitespace(&folded)
}

/// Number of characters (not bytes) in `text`.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Text that cannot be a heading whatever it looks like.
///
/// Covers bare numbers and symbol runs (page numbers, rules), URLs and
/// e-mail addresses.
pub fn is_noise(text: &str) -> bool {
    !text.chars().any(char::is_alphabetic) || URL.is_match(text) || EMAIL.is_match(text)
}

/// Whether `text` reads as running prose of more than one sentence.
pub fn is_multi_sentence(text: &str) -> bool {
    SENTENCE_BREAK.is_match(text)
}

/// Truncate to at most `max_chars` characters at a word boundary.
///
/// A single word longer than the limit is kept whole rather than split.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if char_count(text) <= max_chars {
        return text.to_string();
    }

    let mut result = String::new();
    for word in text.split_whitespace() {
        let extra = if result.is_empty() { 0 } else { 1 };
        if char_count(&result) + extra + char_count(word) > max_chars {
            break;
        }
        if extra == 1 {
            result.push(' ');
        }
        result.push_str(word);
    }

    if result.is_empty() {
        text.split_whitespace().next().unwrap_or_default().to_string()
    } else {
        result
    }
}
