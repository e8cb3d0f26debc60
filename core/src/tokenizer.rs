use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r"[^\w\s-]").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the","a","an","and","or","but","in","on","at","to","for",
            "of","with","by","is","are","was","were","be","been","have",
            "has","had","do","does","did","will","would","could","should",
        ];
        words.iter().copied().collect()
    };
}

/// Minimum token length is three characters; shorter words carry no signal.
const MIN_TOKEN_CHARS: usize = 3;

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// NFKC-normalized, lowercased text. Tokens are substrings of this form.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Extract searchable words: NFKC normalization, lowercase, punctuation other than
/// hyphens replaced by spaces, tokens shorter than three characters and stopwords dropped.
///
/// Repeated words are kept in order of appearance.
pub fn extract_words(text: &str) -> Vec<String> {
    if text.is_empty() { return Vec::new(); }
    let normalized = normalize(text);
    let cleaned = PUNCT.replace_all(&normalized, " ");
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|w| !is_stopword(w))
        .map(str::to_string)
        .collect()
}

/// Like [`extract_words`] but keeps only the first occurrence of each word.
pub fn extract_unique_words(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    extract_words(text)
        .into_iter()
        .filter(|w| seen.insert(w.clone()))
        .collect()
}
