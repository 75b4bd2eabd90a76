// copyguard-core/src/domain/quality/sentence.rs

use std::collections::HashSet;

/// Tokens that end with a period without ending the sentence ("Dr. Kim", "No. 5").
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "no", "dr", "mr", "mrs", "ms", "prof", "st", "vs", "etc", "inc", "co", "jr", "sr",
];

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | '…')
}

fn is_closer(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '\u{201D}' | '\u{2019}' | ')' | ']' | '」' | '』'
    )
}

/// Sentence boundary detection that tolerates abbreviations.
///
/// The `regex` crate has no look-behind, so instead of a split pattern we scan once and
/// check the token preceding each single period against a finite abbreviation list.
/// A terminator only closes a sentence when followed by whitespace or the end of text,
/// which keeps `No.1` and `3.5` intact. Newlines always close a sentence.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    abbreviations: HashSet<String>,
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_ABBREVIATIONS.iter().copied())
    }
}

impl SentenceSplitter {
    pub fn new<I, S>(abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            abbreviations: abbreviations
                .into_iter()
                .map(|a| a.as_ref().trim_end_matches('.').to_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    /// Returns trimmed, non-empty sentences borrowed from `text`.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (idx, c) = chars[i];

            if c == '\n' || c == '\r' {
                push_trimmed(&mut sentences, &text[start..idx]);
                start = idx + c.len_utf8();
                i += 1;
                continue;
            }

            if is_terminator(c) {
                let mut j = i + 1;
                while j < chars.len() && (is_terminator(chars[j].1) || is_closer(chars[j].1)) {
                    j += 1;
                }
                let end = chars.get(j).map_or(text.len(), |(pos, _)| *pos);
                let at_boundary = chars.get(j).is_none_or(|(_, next)| next.is_whitespace());
                let single_period = c == '.' && j == i + 1;

                if at_boundary && !(single_period && self.is_abbreviation(&text[start..idx])) {
                    push_trimmed(&mut sentences, &text[start..end]);
                    start = end;
                }
                i = j;
                continue;
            }

            i += 1;
        }

        push_trimmed(&mut sentences, &text[start..]);
        sentences
    }

    fn is_abbreviation(&self, before_period: &str) -> bool {
        let token: String = before_period
            .chars()
            .rev()
            .take_while(|c| c.is_alphabetic())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        !token.is_empty() && self.abbreviations.contains(&token.to_lowercase())
    }
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

pub fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

/// The sentence without its closing punctuation, quotes and brackets.
pub fn sentence_body(sentence: &str) -> &str {
    sentence
        .trim_end_matches(|c: char| is_terminator(c) || is_closer(c) || c.is_whitespace())
}

pub fn ends_with_any(sentence: &str, endings: &[String]) -> bool {
    let body = sentence_body(sentence);
    endings
        .iter()
        .any(|e| !e.is_empty() && body.ends_with(e.as_str()))
}

/// Length of the longest run of consecutive sentences satisfying `pred`.
pub fn longest_run<F>(sentences: &[&str], pred: F) -> usize
where
    F: Fn(&str) -> bool,
{
    let mut best = 0;
    let mut current = 0;
    for &sentence in sentences {
        if pred(sentence) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}
