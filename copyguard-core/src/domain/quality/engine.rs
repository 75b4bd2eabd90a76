// copyguard-core/src/domain/quality/engine.rs

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::quality::detection::AnalyzedText;
use crate::domain::quality::dimension::{DIMENSION_MAX, Dimension};
use crate::domain::quality::registry::RuleRegistry;
use crate::domain::quality::scorecard::{Finding, QualityScorecard};

/// Score every evaluation starts from.
pub const BASE_SCORE: i32 = 100;

/// Stateless evaluator over a shared, immutable registry.
/// Cloning is cheap; one engine serves any number of concurrent evaluations.
#[derive(Debug, Clone)]
pub struct QualityEngine {
    registry: Arc<RuleRegistry>,
}

impl QualityEngine {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Applies every rule relevant to `module_key` (and `intent`, for intent-scoped rules).
    /// Never fails: bad copy is the expected input, reported as findings.
    pub fn evaluate(&self, text: &str, module_key: &str, intent: Option<&str>) -> QualityScorecard {
        let analyzed = AnalyzedText::new(text, self.registry.splitter());

        let mut total = BASE_SCORE;
        let mut hard_fail = false;
        let mut deltas: BTreeMap<Dimension, i32> = BTreeMap::new();
        let mut findings = Vec::new();

        for rule in self.registry.applicable(module_key, intent) {
            if !rule.detection.detect(&analyzed) {
                continue;
            }
            let spec = &rule.spec;
            let score_delta = spec.penalty() + spec.bonus();

            hard_fail |= spec.severity.is_hard_fail();
            total = total.saturating_add(score_delta);
            if let Some(score) = &spec.score {
                for (dimension, delta) in &score.dimension_delta {
                    let entry = deltas.entry(*dimension).or_default();
                    *entry = entry.saturating_add(*delta);
                }
            }

            findings.push(Finding {
                rule_id: spec.id.clone(),
                name: spec.name.clone(),
                category: spec.category,
                severity: spec.severity,
                message: spec.message.clone(),
                score_delta,
            });
        }

        // Deterministic ordering: registry order must not leak into the report
        findings.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        let triggered_rule_ids = findings.iter().map(|f| f.rule_id.clone()).collect();

        let dimension_scores = Dimension::ALL
            .iter()
            .map(|d| {
                let delta = deltas.get(d).copied().unwrap_or_default();
                (*d, DIMENSION_MAX.saturating_add(delta).clamp(0, DIMENSION_MAX))
            })
            .collect();

        let cutoff = self.registry.cutoff_for(module_key);
        let pass = !hard_fail && total >= cutoff;
        let total_score = total.max(0);

        debug!(
            module = module_key,
            intent = intent.unwrap_or("-"),
            score = total_score,
            cutoff,
            pass,
            hard_fail,
            "Copy evaluated"
        );

        QualityScorecard {
            module_key: module_key.to_string(),
            intent: intent.map(str::to_string),
            total_score,
            cutoff,
            pass,
            hard_fail,
            dimension_scores,
            triggered_rule_ids,
            findings,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::quality::registry::RegistryConfig;
    use crate::domain::quality::rule::RuleSpec;
    use anyhow::Result;
    use proptest::prelude::*;

    fn builtin_engine() -> Result<QualityEngine> {
        Ok(QualityEngine::new(Arc::new(RuleRegistry::builtin()?)))
    }

    #[test]
    fn test_absolute_guarantee_is_hard_fail() -> Result<()> {
        let engine = builtin_engine()?;
        let card = engine.evaluate(
            "우리는 100% 무조건 보장합니다. 실패는 절대 없습니다.",
            "GENERAL",
            None,
        );
        assert!(card.hard_fail);
        assert!(!card.pass);
        assert_eq!(card.total_score, 0);
        assert!(card.is_triggered("CRD-101"));
        assert!(card.dimension(Dimension::CredibilitySafety) < DIMENSION_MAX);
        Ok(())
    }

    #[test]
    fn test_rank_claim_needs_evidence() -> Result<()> {
        let engine = builtin_engine()?;
        let card = engine.evaluate("우리는 업계 1위 유일한 브랜드입니다.", "GENERAL", None);
        assert!(card.hard_fail);
        assert!(card.is_triggered("CRD-102"));

        let backed = engine.evaluate(
            "2024 소비자 만족도 조사 기준 업계 1위 브랜드입니다. 지금 바로 방문하세요.",
            "GENERAL",
            None,
        );
        assert!(!backed.is_triggered("CRD-102"));
        assert!(!backed.hard_fail);
        Ok(())
    }

    #[test]
    fn test_pricing_without_conditions() -> Result<()> {
        let engine = builtin_engine()?;
        let card = engine.evaluate("가격은 10만원입니다.", "PRICING", None);
        assert!(card.hard_fail);
        assert!(card.is_triggered("PRC-301"));
        assert_eq!(card.cutoff, 88);

        // Same text outside the pricing module: the pricing rule does not apply
        let general = engine.evaluate("가격은 10만원입니다.", "GENERAL", None);
        assert!(!general.is_triggered("PRC-301"));

        let with_terms = engine.evaluate("가격은 10만원(부가세 포함)입니다.", "PRICING", None);
        assert!(!with_terms.hard_fail);
        assert!(with_terms.is_triggered("PRC-302"));
        Ok(())
    }

    #[test]
    fn test_cliche_stacking_lowers_voice_fit() -> Result<()> {
        let engine = builtin_engine()?;
        let card = engine.evaluate(
            "최고의 품질과 차별화된 서비스로 모십니다. 지금 바로 문의하세요.",
            "GENERAL",
            None,
        );
        assert!(card.is_triggered("VOC-501"));
        assert!(card.dimension(Dimension::VoiceFit) < DIMENSION_MAX);
        assert!(!card.hard_fail);
        Ok(())
    }

    #[test]
    fn test_abbreviations_keep_sentence_boundaries() -> Result<()> {
        let engine = builtin_engine()?;
        let card = engine.evaluate(
            "삼성 No.1 브랜드입니다. Dr. Kim 추천 제품입니다.",
            "GENERAL",
            None,
        );
        assert!(!card.is_triggered("RHY-203"));
        assert!(!card.is_triggered("RHY-202"));

        // A false split on "Dr." would break this run of three "-입니다" endings
        let run = engine.evaluate(
            "A 제품입니다. Dr. Kim 추천 제품입니다. B 제품입니다.",
            "GENERAL",
            None,
        );
        assert!(run.is_triggered("RHY-201"));
        Ok(())
    }

    #[test]
    fn test_clean_copy_passes_with_bonus() -> Result<()> {
        let engine = builtin_engine()?;
        let card = engine.evaluate(
            "매장 면적 40평, 좌석 30개. 지금 바로 예약하세요.",
            "GENERAL",
            None,
        );
        assert_eq!(card.triggered_rule_ids, vec!["SPC-110"]);
        assert_eq!(card.total_score, BASE_SCORE + 3);
        assert!(card.pass);
        // Bonuses never push a dimension above the ceiling
        assert_eq!(card.dimension(Dimension::Specificity), DIMENSION_MAX);
        assert_eq!(card.dimension_scores.len(), Dimension::ALL.len());
        Ok(())
    }

    #[test]
    fn test_intent_scoped_rule() -> Result<()> {
        let engine = builtin_engine()?;
        let text = "봄맞이 할인 행사를 엽니다. 지금 바로 방문하세요.";

        assert!(engine.evaluate(text, "GENERAL", Some("event_promo")).is_triggered("STR-201"));
        assert!(!engine.evaluate(text, "GENERAL", None).is_triggered("STR-201"));

        let dated = "3월 1일부터 7일까지 봄맞이 할인 행사를 엽니다. 지금 바로 방문하세요.";
        assert!(!engine.evaluate(dated, "GENERAL", Some("event_promo")).is_triggered("STR-201"));
        Ok(())
    }

    #[test]
    fn test_cta_rules_by_module() -> Result<()> {
        let engine = builtin_engine()?;
        let silent = engine.evaluate("따뜻한 라떼를 준비했습니다.", "CTA", None);
        assert!(silent.is_triggered("CNV-401"));
        assert_eq!(silent.cutoff, 80);

        let noisy = engine.evaluate(
            "지금 바로 문의하세요. 예약하세요. 방문하세요.",
            "GENERAL",
            None,
        );
        assert!(noisy.is_triggered("CNV-402"));
        assert!(!noisy.is_triggered("CNV-401"));
        Ok(())
    }

    fn scoring_registry(hard_fail_penalty: i32) -> Result<RuleRegistry> {
        let yaml = format!(
            r#"
lexicons:
  cta_phrases: ["문의하세요"]
rules:
  - id: HF-1
    name: forbidden token
    category: credibility_safety
    severity: HARD_FAIL
    modules: ["*"]
    detection: {{ type: regex_any, patterns: ["XX"] }}
    score: {{ penalty: {hard_fail_penalty} }}
    message: forbidden
  - id: BONUS-1
    name: anything
    category: clarity
    severity: LOW
    modules: ["*"]
    detection: {{ type: regex_any, patterns: ["."] }}
    score: {{ bonus: 50, dimension_delta: {{ clarity: 9 }} }}
    message: bonus
"#
        );
        Ok(RuleRegistry::compile(RegistryConfig::from_yaml_str(&yaml)?)?)
    }

    #[test]
    fn test_hard_fail_dominates_a_high_score() -> Result<()> {
        let engine = QualityEngine::new(Arc::new(scoring_registry(0)?));
        let card = engine.evaluate("XX marks the spot", "GENERAL", None);
        assert_eq!(card.total_score, 150);
        assert!(card.hard_fail);
        assert!(!card.pass);
        assert_eq!(card.dimension(Dimension::Clarity), DIMENSION_MAX);
        Ok(())
    }

    #[test]
    fn test_lone_hard_fail_scores_zero_at_any_cutoff() -> Result<()> {
        let yaml = r#"
rules:
  - id: HF-1
    name: forbidden token
    category: credibility_safety
    severity: HARD_FAIL
    modules: ["*"]
    detection: { type: regex_any, patterns: ["XX"] }
    score: { penalty: -999 }
    message: forbidden
"#;
        for cutoff in [0, 50, 100] {
            let registry =
                RuleRegistry::compile(RegistryConfig::from_yaml_str(yaml)?)?.with_default_cutoff(cutoff);
            let card = QualityEngine::new(Arc::new(registry)).evaluate("XX", "GENERAL", None);
            assert_eq!(card.triggered_rule_ids, vec!["HF-1"]);
            assert_eq!(card.total_score, 0, "cutoff {cutoff}");
            assert!(card.hard_fail);
            assert!(!card.pass, "cutoff {cutoff}");
        }
        Ok(())
    }

    #[test]
    fn test_oversized_score_effect_rejected_at_load() -> Result<()> {
        let yaml = r#"
rules:
  - id: BIG-1
    name: huge bonus
    category: clarity
    severity: LOW
    modules: ["*"]
    detection: { type: regex_any, patterns: ["x"] }
    score: { bonus: 2147483647 }
    message: bonus
"#;
        assert!(matches!(
            RuleRegistry::compile(RegistryConfig::from_yaml_str(yaml)?),
            Err(DomainError::InvalidRule { rule_id, .. }) if rule_id == "BIG-1"
        ));
        Ok(())
    }

    fn builtin_rules() -> Vec<RuleSpec> {
        RegistryConfig::builtin().expect("builtin registry").rules
    }

    const SAMPLES: &[&str] = &[
        "우리는 100% 무조건 보장합니다. 실패는 절대 없습니다.",
        "가격은 10만원입니다.",
        "최고의 품질과 차별화된 서비스로 모십니다. 지금 바로 문의하세요. 예약하세요. 방문하세요.",
        "A 제품입니다. Dr. Kim 추천 제품입니다. B 제품입니다.",
        "2024 디자인 어워드 수상! 매장 면적 40평, 좌석 30개입니다.",
        "",
    ];

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_rule_order_does_not_change_scorecard(
            shuffled in Just(builtin_rules()).prop_shuffle(),
            sample in 0..SAMPLES.len(),
            module in prop::sample::select(vec!["GENERAL", "PRICING", "CTA", "OFFER", "PROOF"]),
        ) {
            let base = QualityEngine::new(Arc::new(RuleRegistry::builtin().expect("builtin")));
            let mut config = RegistryConfig::builtin().expect("builtin");
            config.rules = shuffled;
            let permuted = QualityEngine::new(Arc::new(RuleRegistry::compile(config).expect("compile")));

            let a = base.evaluate(SAMPLES[sample], module, Some("event_promo"));
            let b = permuted.evaluate(SAMPLES[sample], module, Some("event_promo"));
            prop_assert_eq!(a.triggered_rule_ids, b.triggered_rule_ids);
            prop_assert_eq!(a.total_score, b.total_score);
            prop_assert_eq!(a.pass, b.pass);
            prop_assert_eq!(a.dimension_scores, b.dimension_scores);
            prop_assert_eq!(a.findings, b.findings);
        }

        #[test]
        fn prop_hard_fail_always_fails(
            prefix in "[a-z가-힣 ]{0,40}",
            suffix in "[a-z가-힣 ]{0,40}",
            penalty in -999i32..=0,
        ) {
            let engine = QualityEngine::new(Arc::new(scoring_registry(penalty).expect("registry")));
            let card = engine.evaluate(&format!("{prefix}XX{suffix}"), "GENERAL", None);
            prop_assert!(card.hard_fail);
            prop_assert!(!card.pass);
            prop_assert!(card.total_score >= 0);
        }

        #[test]
        fn prop_dimensions_stay_in_range(text in "\\PC{0,120}") {
            let engine = builtin_engine().expect("builtin");
            let card = engine.evaluate(&text, "GENERAL", None);
            for score in card.dimension_scores.values() {
                prop_assert!((0..=DIMENSION_MAX).contains(score));
            }
            prop_assert_eq!(card.pass, !card.hard_fail && card.total_score >= card.cutoff);
        }
    }
}
