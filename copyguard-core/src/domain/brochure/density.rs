// copyguard-core/src/domain/brochure/density.rs

use crate::domain::quality::sentence::{SentenceSplitter, longest_run};

/// Longest run of consecutive sentences at least `min_chars` characters long.
/// Same heuristic as the `long_sentence_run` detection, applied to a whole page.
pub fn long_sentence_run(text: &str, splitter: &SentenceSplitter, min_chars: usize) -> usize {
    let sentences = splitter.split(text);
    longest_run(&sentences, |s| s.chars().count() >= min_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_reset_on_short_sentences() {
        let splitter = SentenceSplitter::default();
        let long = "가".repeat(50);
        let text = format!("{long}. {long}. 짧다. {long}. {long}. {long}.");
        assert_eq!(long_sentence_run(&text, &splitter, 45), 3);
        assert_eq!(long_sentence_run(&text, &splitter, 60), 0);
        assert_eq!(long_sentence_run("", &splitter, 45), 0);
    }
}
