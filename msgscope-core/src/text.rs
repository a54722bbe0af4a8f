use std::collections::HashSet;

use once_cell::sync::OnceCell;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Lowercased vocabulary tokens: URLs stripped, alphabetic runs only, longer
/// than two characters, stop words removed.
pub(crate) fn vocabulary_tokens(text: &str, stop: &HashSet<String>) -> Vec<String> {
    let stripped = url_re().replace_all(text, "");
    let lowered = stripped.to_lowercase();
    word_re()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 2 && !stop.contains(*w))
        .map(str::to_string)
        .collect()
}

/// Alphabetic tokens with their original casing.
pub(crate) fn alphabetic_words(text: &str) -> impl Iterator<Item = &str> {
    word_re().find_iter(text).map(|m| m.as_str())
}

pub(crate) fn emoticons(text: &str) -> impl Iterator<Item = &str> {
    emoticon_re().find_iter(text).map(|m| m.as_str())
}

pub(crate) fn has_link(text: &str) -> bool {
    link_re().is_match(text)
}

pub(crate) fn extract_urls(text: &str) -> Vec<String> {
    url_re()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Number of characters, the unit every length metric uses.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max` graphemes of `text`, with `...` appended when something was cut.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// First `max` graphemes without an ellipsis.
pub(crate) fn clip(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}

fn word_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\b[a-zA-ZáéíóúñÁÉÍÓÚÑ]+\b").expect("word regex"))
}

fn url_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"https?://").expect("link regex"))
}

fn emoticon_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[:;]['`\-]?[)(PD/\\]").expect("emoticon regex"))
}
