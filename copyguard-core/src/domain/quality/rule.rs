// copyguard-core/src/domain/quality/rule.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

use crate::domain::quality::dimension::{Dimension, RuleSeverity};

/// Module key matching every module.
pub const WILDCARD_MODULE: &str = "*";

pub const DEFAULT_LONG_SENTENCE_CHARS: usize = 45;
pub const DEFAULT_LONG_SENTENCE_RUN: usize = 3;

/// Bounds on a single rule's penalty and bonus. Keeps totals far from `i32` limits.
pub const MIN_PENALTY: i32 = -1000;
pub const MAX_BONUS: i32 = 1000;
/// Bound on a single rule's per-dimension delta.
pub const MAX_DIMENSION_DELTA: i32 = 100;

// --- CONFIGURATION STRUCTS ---

/// A declarative content rule, as written in a registry YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RuleSpec {
    #[validate(length(min = 1, message = "Rule id cannot be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "Rule name cannot be empty"))]
    pub name: String,

    pub category: Dimension,
    pub severity: RuleSeverity,

    #[validate(length(min = 1, message = "A rule must target at least one module (or '*')"))]
    #[validate(custom(function = "validate_module_keys"))]
    pub modules: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_intents: Option<Vec<String>>,

    pub detection: DetectionSpec,

    #[validate(nested)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<RuleScore>,

    #[validate(length(min = 1, message = "Rule message cannot be empty"))]
    pub message: String,
}

/// Additive effects of a triggered rule. Penalties are negative, bonuses positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RuleScore {
    #[serde(default)]
    #[validate(range(min = MIN_PENALTY, max = 0, message = "Penalty must lie in -1000..=0"))]
    pub penalty: i32,

    #[serde(default)]
    #[validate(range(min = 0, max = MAX_BONUS, message = "Bonus must lie in 0..=1000"))]
    pub bonus: i32,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[validate(custom(function = "validate_dimension_deltas"))]
    pub dimension_delta: BTreeMap<Dimension, i32>,
}

/// Detection expression. `type` selects the primitive; composites nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectionSpec {
    RegexAny {
        patterns: Vec<String>,
    },
    RegexNone {
        patterns: Vec<String>,
    },
    LexiconCountGte {
        lexicon: String,
        threshold: usize,
    },
    /// Fires when more than `max_allowed` distinct CTA phrases are present.
    #[serde(alias = "cta_count")]
    CtaOverused {
        max_allowed: usize,
    },
    /// Fires when no CTA phrase is present at all.
    CtaAbsent,
    SentenceWordCountGt {
        threshold: usize,
    },
    LongSentenceRun {
        #[serde(default = "default_long_sentence_chars")]
        min_chars: usize,
        #[serde(default = "default_long_sentence_run")]
        min_run: usize,
    },
    EndingRepetitionGte {
        min_run: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endings: Option<Vec<String>>,
    },
    CompositeAll {
        all: Vec<DetectionSpec>,
    },
    CompositeAny {
        any: Vec<DetectionSpec>,
    },
}

fn default_long_sentence_chars() -> usize {
    DEFAULT_LONG_SENTENCE_CHARS
}

fn default_long_sentence_run() -> usize {
    DEFAULT_LONG_SENTENCE_RUN
}

fn validate_module_keys(modules: &[String]) -> Result<(), ValidationError> {
    if modules.iter().any(|m| m.trim().is_empty()) {
        return Err(ValidationError::new("empty_module_key"));
    }
    Ok(())
}

fn validate_dimension_deltas(deltas: &BTreeMap<Dimension, i32>) -> Result<(), ValidationError> {
    let allowed = -MAX_DIMENSION_DELTA..=MAX_DIMENSION_DELTA;
    if deltas.values().any(|d| !allowed.contains(d)) {
        return Err(ValidationError::new("dimension_delta_out_of_range"));
    }
    Ok(())
}

impl RuleSpec {
    pub fn penalty(&self) -> i32 {
        self.score.as_ref().map_or(0, |s| s.penalty)
    }

    pub fn bonus(&self) -> i32 {
        self.score.as_ref().map_or(0, |s| s.bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_rule_deserialization() -> Result<()> {
        let yaml = r#"
id: VOC-501
name: Cliché stacking
category: voice_fit
severity: MEDIUM
modules: ["*"]
detection:
  type: lexicon_count_gte
  lexicon: cliches
  threshold: 2
score:
  penalty: -6
  dimension_delta:
    voice_fit: -2
message: Too many stock phrases.
"#;
        let rule: RuleSpec = serde_yaml::from_str(yaml)?;
        assert_eq!(rule.severity, RuleSeverity::Medium);
        assert_eq!(rule.penalty(), -6);
        assert_eq!(rule.bonus(), 0);
        assert_eq!(
            rule.detection,
            DetectionSpec::LexiconCountGte {
                lexicon: "cliches".into(),
                threshold: 2
            }
        );
        assert!(rule.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_nested_composite_and_aliases() -> Result<()> {
        let yaml = r#"
type: composite_any
any:
  - type: cta_absent
  - type: cta_count
    max_allowed: 3
  - type: long_sentence_run
"#;
        let spec: DetectionSpec = serde_yaml::from_str(yaml)?;
        let DetectionSpec::CompositeAny { any } = spec else {
            anyhow::bail!("expected composite_any");
        };
        assert_eq!(any[0], DetectionSpec::CtaAbsent);
        assert_eq!(any[1], DetectionSpec::CtaOverused { max_allowed: 3 });
        assert_eq!(
            any[2],
            DetectionSpec::LongSentenceRun {
                min_chars: 45,
                min_run: 3
            }
        );
        Ok(())
    }

    #[test]
    fn test_positive_penalty_rejected() -> Result<()> {
        let yaml = r#"
id: BAD-1
name: Bad
category: clarity
severity: LOW
modules: ["GENERAL", " "]
detection: { type: cta_absent }
score: { penalty: 5 }
message: x
"#;
        let rule: RuleSpec = serde_yaml::from_str(yaml)?;
        let errors = rule.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(errors.contains("penalty"));
        assert!(errors.contains("modules"));
        Ok(())
    }

    #[test]
    fn test_score_effects_are_bounded() -> Result<()> {
        for score in [
            "{ bonus: 2147483647 }",
            "{ penalty: -2147483648 }",
            "{ bonus: 1001 }",
            "{ dimension_delta: { clarity: 2147483647 } }",
            "{ dimension_delta: { clarity: -2147483648 } }",
        ] {
            let yaml = format!(
                "id: BIG-1\nname: Big\ncategory: clarity\nseverity: LOW\nmodules: [\"*\"]\n\
                 detection: {{ type: cta_absent }}\nscore: {score}\nmessage: x\n"
            );
            let rule: RuleSpec = serde_yaml::from_str(&yaml)?;
            assert!(rule.validate().is_err(), "{score} should be rejected");
        }

        let hard: RuleSpec = serde_yaml::from_str(
            "id: HF\nname: n\ncategory: clarity\nseverity: HARD_FAIL\nmodules: [\"*\"]\n\
             detection: { type: cta_absent }\nscore: { penalty: -999, bonus: 1000 }\nmessage: x\n",
        )?;
        assert!(hard.validate().is_ok());
        Ok(())
    }
}
