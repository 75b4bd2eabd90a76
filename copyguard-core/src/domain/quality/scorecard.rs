// copyguard-core/src/domain/quality/scorecard.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::quality::dimension::{Dimension, RuleSeverity};

/// One triggered rule, as reported to callers and fed back to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub name: String,
    pub category: Dimension,
    pub severity: RuleSeverity,
    pub message: String,
    /// Net contribution to the total (penalty + bonus).
    pub score_delta: i32,
}

impl Finding {
    /// Bonus rules trigger too; only penalizing findings call for a rewrite.
    pub fn is_corrective(&self) -> bool {
        self.severity.is_hard_fail() || self.score_delta < 0
    }
}

/// Result of evaluating one piece of text against one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScorecard {
    pub module_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Floored at 0 for reporting. Pass/fail uses the unfloored sum.
    pub total_score: i32,
    pub cutoff: i32,
    pub pass: bool,
    pub hard_fail: bool,
    pub dimension_scores: BTreeMap<Dimension, i32>,
    pub triggered_rule_ids: Vec<String>,
    pub findings: Vec<Finding>,
    pub timestamp: DateTime<Utc>,
}

impl QualityScorecard {
    pub fn is_triggered(&self, rule_id: &str) -> bool {
        self.triggered_rule_ids
            .binary_search_by(|id| id.as_str().cmp(rule_id))
            .is_ok()
    }

    pub fn hard_fail_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity.is_hard_fail())
    }

    pub fn dimension(&self, dimension: Dimension) -> i32 {
        self.dimension_scores
            .get(&dimension)
            .copied()
            .unwrap_or_default()
    }

    /// Corrective messages, hard failures first.
    pub fn feedback_lines(&self) -> Vec<String> {
        let mut findings: Vec<&Finding> = self.findings.iter().filter(|f| f.is_corrective()).collect();
        findings.sort_by_key(|f| (!f.severity.is_hard_fail(), f.rule_id.as_str()));
        findings
            .into_iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect()
    }
}
