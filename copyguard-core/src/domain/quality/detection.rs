// copyguard-core/src/domain/quality/detection.rs

use regex::{Regex, RegexBuilder};

use crate::domain::error::DomainError;
use crate::domain::quality::lexicon::{
    CTA_PHRASES, Lexicons, SENTENCE_ENDINGS, count_distinct_present, count_occurrences,
};
use crate::domain::quality::rule::DetectionSpec;
use crate::domain::quality::sentence::{self, SentenceSplitter};

/// A text prepared once per evaluation: sentence splitting is shared by every rule.
#[derive(Debug)]
pub struct AnalyzedText<'a> {
    pub text: &'a str,
    pub sentences: Vec<&'a str>,
}

impl<'a> AnalyzedText<'a> {
    pub fn new(text: &'a str, splitter: &SentenceSplitter) -> Self {
        Self {
            text,
            sentences: splitter.split(text),
        }
    }
}

/// Compiled detection expression.
/// Regexes and lexicon references are resolved at registry load, so evaluation is pure
/// and cannot fail.
#[derive(Debug, Clone)]
pub enum Detection {
    RegexAny(Vec<Regex>),
    RegexNone(Vec<Regex>),
    LexiconCountGte { words: Vec<String>, threshold: usize },
    CtaOverused { phrases: Vec<String>, max_allowed: usize },
    CtaAbsent { phrases: Vec<String> },
    SentenceWordCountGt { threshold: usize },
    LongSentenceRun { min_chars: usize, min_run: usize },
    EndingRepetitionGte { endings: Vec<String>, min_run: usize },
    All(Vec<Detection>),
    Any(Vec<Detection>),
}

impl Detection {
    pub fn compile(
        spec: &DetectionSpec,
        rule_id: &str,
        lexicons: &Lexicons,
    ) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidRule {
            rule_id: rule_id.to_string(),
            reason: reason.to_string(),
        };
        let lookup = |name: &str| {
            lexicons
                .get(name)
                .map(<[String]>::to_vec)
                .ok_or_else(|| DomainError::UnknownLexicon {
                    rule_id: rule_id.to_string(),
                    lexicon: name.to_string(),
                })
        };

        let detection = match spec {
            DetectionSpec::RegexAny { patterns } => {
                Self::RegexAny(compile_patterns(patterns, rule_id)?)
            }
            DetectionSpec::RegexNone { patterns } => {
                Self::RegexNone(compile_patterns(patterns, rule_id)?)
            }
            DetectionSpec::LexiconCountGte { lexicon, threshold } => {
                if *threshold == 0 {
                    return Err(invalid("lexicon_count_gte threshold must be at least 1"));
                }
                Self::LexiconCountGte {
                    words: lookup(lexicon)?,
                    threshold: *threshold,
                }
            }
            DetectionSpec::CtaOverused { max_allowed } => Self::CtaOverused {
                phrases: lookup(CTA_PHRASES)?,
                max_allowed: *max_allowed,
            },
            DetectionSpec::CtaAbsent => Self::CtaAbsent {
                phrases: lookup(CTA_PHRASES)?,
            },
            DetectionSpec::SentenceWordCountGt { threshold } => Self::SentenceWordCountGt {
                threshold: *threshold,
            },
            DetectionSpec::LongSentenceRun { min_chars, min_run } => {
                if *min_run == 0 {
                    return Err(invalid("long_sentence_run min_run must be at least 1"));
                }
                Self::LongSentenceRun {
                    min_chars: *min_chars,
                    min_run: *min_run,
                }
            }
            DetectionSpec::EndingRepetitionGte { min_run, endings } => {
                if *min_run == 0 {
                    return Err(invalid("ending_repetition_gte min_run must be at least 1"));
                }
                let endings = match endings {
                    Some(list) => list.clone(),
                    None => lookup(SENTENCE_ENDINGS)?,
                };
                if endings.iter().all(|e| e.is_empty()) {
                    return Err(invalid("ending_repetition_gte needs at least one ending"));
                }
                Self::EndingRepetitionGte {
                    endings,
                    min_run: *min_run,
                }
            }
            DetectionSpec::CompositeAll { all } => {
                if all.is_empty() {
                    return Err(invalid("composite_all must contain at least one detection"));
                }
                Self::All(
                    all.iter()
                        .map(|d| Self::compile(d, rule_id, lexicons))
                        .collect::<Result<_, _>>()?,
                )
            }
            DetectionSpec::CompositeAny { any } => {
                if any.is_empty() {
                    return Err(invalid("composite_any must contain at least one detection"));
                }
                Self::Any(
                    any.iter()
                        .map(|d| Self::compile(d, rule_id, lexicons))
                        .collect::<Result<_, _>>()?,
                )
            }
        };
        Ok(detection)
    }

    pub fn detect(&self, input: &AnalyzedText<'_>) -> bool {
        match self {
            Self::RegexAny(patterns) => patterns.iter().any(|re| re.is_match(input.text)),
            Self::RegexNone(patterns) => !patterns.iter().any(|re| re.is_match(input.text)),
            Self::LexiconCountGte { words, threshold } => {
                count_occurrences(input.text, words) >= *threshold
            }
            Self::CtaOverused {
                phrases,
                max_allowed,
            } => count_distinct_present(input.text, phrases) > *max_allowed,
            Self::CtaAbsent { phrases } => count_distinct_present(input.text, phrases) == 0,
            Self::SentenceWordCountGt { threshold } => input
                .sentences
                .iter()
                .any(|s| sentence::word_count(s) > *threshold),
            Self::LongSentenceRun { min_chars, min_run } => {
                sentence::longest_run(&input.sentences, |s| s.chars().count() >= *min_chars)
                    >= *min_run
            }
            Self::EndingRepetitionGte { endings, min_run } => {
                sentence::longest_run(&input.sentences, |s| sentence::ends_with_any(s, endings))
                    >= *min_run
            }
            Self::All(parts) => parts.iter().all(|d| d.detect(input)),
            Self::Any(parts) => parts.iter().any(|d| d.detect(input)),
        }
    }

    /// Convenience for one-off checks outside the engine.
    pub fn detect_text(&self, text: &str, splitter: &SentenceSplitter) -> bool {
        self.detect(&AnalyzedText::new(text, splitter))
    }
}

fn compile_patterns(patterns: &[String], rule_id: &str) -> Result<Vec<Regex>, DomainError> {
    if patterns.is_empty() {
        return Err(DomainError::InvalidRule {
            rule_id: rule_id.to_string(),
            reason: "regex detection needs at least one pattern".to_string(),
        });
    }

    // Pre-allocate vector to avoid reallocations during initialization
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DomainError::InvalidPattern {
                rule_id: rule_id.to_string(),
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        compiled.push(regex);
    }
    Ok(compiled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::quality::lexicon::CLICHES;
    use anyhow::Result;

    fn lexicons() -> Lexicons {
        Lexicons::new()
            .with(CLICHES, &["최고의", "프리미엄", "차별화된"])
            .with(CTA_PHRASES, &["지금 바로", "문의하세요", "예약하세요"])
            .with(SENTENCE_ENDINGS, &["합니다", "됩니다", "있습니다"])
    }

    fn compile_yaml(yaml: &str) -> Result<Detection> {
        let spec: DetectionSpec = serde_yaml::from_str(yaml)?;
        Ok(Detection::compile(&spec, "TEST", &lexicons())?)
    }

    fn detect(d: &Detection, text: &str) -> bool {
        d.detect_text(text, &SentenceSplitter::default())
    }

    #[test]
    fn test_regex_any_and_none_are_complementary() -> Result<()> {
        let any = compile_yaml("{type: regex_any, patterns: ['guarantee', '무조건']}")?;
        let none = compile_yaml("{type: regex_none, patterns: ['guarantee', '무조건']}")?;
        for text in ["We GUARANTEE it", "무조건 드립니다", "평범한 문장"] {
            assert_ne!(detect(&any, text), detect(&none, text), "{text}");
        }
        assert!(detect(&any, "We GUARANTEE it"));
        Ok(())
    }

    #[test]
    fn test_lexicon_threshold_counts_occurrences() -> Result<()> {
        let d = compile_yaml("{type: lexicon_count_gte, lexicon: cliches, threshold: 2}")?;
        assert!(detect(&d, "최고의 맛, 최고의 서비스"));
        assert!(detect(&d, "최고의 프리미엄"));
        assert!(!detect(&d, "프리미엄 원두"));
        Ok(())
    }

    #[test]
    fn test_cta_polarity() -> Result<()> {
        let absent = compile_yaml("{type: cta_absent}")?;
        let overused = compile_yaml("{type: cta_overused, max_allowed: 1}")?;

        assert!(detect(&absent, "맛있는 커피가 있습니다."));
        assert!(!detect(&overused, "맛있는 커피가 있습니다."));

        assert!(!detect(&absent, "지금 바로 문의하세요."));
        assert!(detect(&overused, "지금 바로 문의하세요."));

        assert!(!detect(&absent, "문의하세요."));
        assert!(!detect(&overused, "문의하세요. 문의하세요."));
        Ok(())
    }

    #[test]
    fn test_sentence_based_primitives() -> Result<()> {
        let words = compile_yaml("{type: sentence_word_count_gt, threshold: 4}")?;
        assert!(detect(&words, "하나 둘 셋 넷 다섯. 짧다."));
        assert!(!detect(&words, "Dr. Kim 추천 제품입니다."));

        let endings = compile_yaml("{type: ending_repetition_gte, min_run: 3}")?;
        assert!(detect(&endings, "준비합니다. 완료됩니다. 기다리고 있습니다."));
        assert!(!detect(&endings, "준비합니다. 좋아요! 완료됩니다. 있습니다."));

        let long = compile_yaml("{type: long_sentence_run, min_chars: 10, min_run: 2}")?;
        assert!(detect(&long, "0123456789 길다. 0123456789 또 길다."));
        assert!(!detect(&long, "0123456789 길다. 짧다. 0123456789 또 길다."));
        Ok(())
    }

    #[test]
    fn test_composites() -> Result<()> {
        let d = compile_yaml(
            r#"
type: composite_all
all:
  - { type: regex_any, patterns: ['1위'] }
  - type: composite_any
    any:
      - { type: regex_none, patterns: ['인증', '수상'] }
      - { type: cta_overused, max_allowed: 2 }
"#,
        )?;
        assert!(detect(&d, "업계 1위 브랜드"));
        assert!(!detect(&d, "업계 1위, 2024 수상"));
        assert!(!detect(&d, "좋은 브랜드"));
        Ok(())
    }

    #[test]
    fn test_compile_errors_fail_fast() {
        let bad_regex: DetectionSpec =
            serde_yaml::from_str("{type: regex_any, patterns: ['(unclosed']}").unwrap();
        assert!(matches!(
            Detection::compile(&bad_regex, "R1", &lexicons()),
            Err(DomainError::InvalidPattern { .. })
        ));

        let unknown: DetectionSpec =
            serde_yaml::from_str("{type: lexicon_count_gte, lexicon: nope, threshold: 1}")
                .unwrap();
        assert!(matches!(
            Detection::compile(&unknown, "R2", &lexicons()),
            Err(DomainError::UnknownLexicon { .. })
        ));

        let empty: DetectionSpec = serde_yaml::from_str("{type: composite_any, any: []}").unwrap();
        assert!(matches!(
            Detection::compile(&empty, "R3", &lexicons()),
            Err(DomainError::InvalidRule { .. })
        ));

        let nested_bad: DetectionSpec = serde_yaml::from_str(
            "{type: composite_all, all: [{type: regex_none, patterns: ['[a-']}]}",
        )
        .unwrap();
        assert!(Detection::compile(&nested_bad, "R4", &lexicons()).is_err());
    }
}
