// copyguard-core/src/application/evaluate.rs

use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::domain::quality::engine::QualityEngine;
use crate::domain::quality::scorecard::QualityScorecard;

/// Scores one piece of copy, with a span and timing around the pure engine call.
#[instrument(skip(engine, text), fields(chars = text.chars().count()))]
pub fn evaluate_text(
    engine: &QualityEngine,
    text: &str,
    module_key: &str,
    intent: Option<&str>,
) -> QualityScorecard {
    let start = Instant::now();
    let scorecard = engine.evaluate(text, module_key, intent);
    let duration = start.elapsed();

    if scorecard.hard_fail {
        warn!(
            rules = ?scorecard.triggered_rule_ids,
            "Hard-fail rule triggered"
        );
    }
    debug!(
        score = scorecard.total_score,
        pass = scorecard.pass,
        duration_ms = duration.as_millis() as u64,
        "Evaluation done"
    );
    scorecard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quality::registry::RuleRegistry;
    use anyhow::Result;
    use std::sync::Arc;

    #[test]
    fn test_wrapper_matches_engine() -> Result<()> {
        let engine = QualityEngine::new(Arc::new(RuleRegistry::builtin()?));
        let text = "가격은 10만원입니다.";
        let card = evaluate_text(&engine, text, "PRICING", None);
        let direct = engine.evaluate(text, "PRICING", None);
        assert_eq!(card.triggered_rule_ids, direct.triggered_rule_ids);
        assert_eq!(card.total_score, direct.total_score);
        assert!(card.hard_fail);
        Ok(())
    }
}
