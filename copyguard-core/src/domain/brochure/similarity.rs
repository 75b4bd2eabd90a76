// copyguard-core/src/domain/brochure/similarity.rs

use std::collections::HashMap;

/// Lowercase, drop punctuation and quotes, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn trigrams(normalized: &str) -> HashMap<[char; 3], usize> {
    let chars: Vec<char> = normalized.chars().collect();
    let mut counts = HashMap::new();
    for window in chars.windows(3) {
        *counts.entry([window[0], window[1], window[2]]).or_insert(0) += 1;
    }
    counts
}

/// Dice coefficient over character-trigram multisets: `2·|A∩B| / (|A|+|B|)`.
///
/// Symmetric and bounded to `[0, 1]`. Identical non-empty texts score 1 even when too short
/// to have a trigram; otherwise trigram-less input scores 0.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let (na, nb) = (normalize(a), normalize(b));
    if !na.is_empty() && na == nb {
        return 1.0;
    }

    let (ta, tb) = (trigrams(&na), trigrams(&nb));
    let total: usize = ta.values().sum::<usize>() + tb.values().sum::<usize>();
    if total == 0 {
        return 0.0;
    }

    let shared: usize = ta
        .iter()
        .filter_map(|(gram, n)| tb.get(gram).map(|m| (*n).min(*m)))
        .sum();
    (2 * shared) as f64 / total as f64
}
