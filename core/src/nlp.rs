//! Lightweight text analysis: keyword frequencies, lexicon sentiment, language.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
}

const POSITIVE: &[&str] = &["good", "excellent", "great", "satisfactory", "compliant"];
const NEGATIVE: &[&str] = &["bad", "poor", "violation", "non-compliant", "overdue"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Frequency of every word longer than three characters.
pub fn keyword_frequencies(text: &str) -> BTreeMap<String, usize> {
    let lowered = text.to_lowercase();
    let mut freq = BTreeMap::new();
    for word in NON_WORD.replace_all(&lowered, " ").split_whitespace() {
        if word.chars().count() > 3 {
            *freq.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    freq
}

pub fn detect_sentiment(text: &str) -> Sentiment {
    let lowered = text.to_lowercase();
    let score: i64 = lowered
        .split_whitespace()
        .map(|w| {
            if POSITIVE.contains(&w) {
                1
            } else if NEGATIVE.contains(&w) {
                -1
            } else {
                0
            }
        })
        .sum();
    match score {
        s if s > 0 => Sentiment::Positive,
        s if s < 0 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// Only English content is expected.
pub fn detect_language(_text: &str) -> &'static str { "en" }
