// copyguard-core/src/domain/quality/lexicon.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CLICHES: &str = "cliches";
pub const CTA_PHRASES: &str = "cta_phrases";
pub const BANNED_PHRASES: &str = "banned_phrases";
pub const SENTENCE_ENDINGS: &str = "sentence_endings";
pub const ABBREVIATIONS: &str = "abbreviations";

/// Named phrase lists. The content is locale-specific configuration; nothing in the
/// evaluator depends on what the lists contain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lexicons {
    entries: BTreeMap<String, Vec<String>>,
}

impl Lexicons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, words: &[&str]) -> Self {
        self.insert(name, words.iter().map(|w| w.to_string()).collect());
        self
    }

    pub fn insert(&mut self, name: &str, words: Vec<String>) {
        self.entries.insert(name.to_string(), words);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Missing lexicons read as empty lists.
    pub fn words(&self, name: &str) -> &[String] {
        self.get(name).unwrap_or(&[])
    }

    /// Appends words from `other`, skipping entries already present. Order is kept.
    pub fn extend(&mut self, other: Lexicons) {
        for (name, words) in other.entries {
            let list = self.entries.entry(name).or_default();
            for word in words {
                if !list.contains(&word) {
                    list.push(word);
                }
            }
        }
    }
}

/// Total literal occurrences of every lexicon entry inside `text`.
pub fn count_occurrences(text: &str, words: &[String]) -> usize {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| text.matches(w.as_str()).count())
        .sum()
}

/// Number of distinct entries present at least once.
pub fn count_distinct_present(text: &str, words: &[String]) -> usize {
    words
        .iter()
        .filter(|w| !w.is_empty() && text.contains(w.as_str()))
        .count()
}
