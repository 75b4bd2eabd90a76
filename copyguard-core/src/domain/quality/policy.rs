// copyguard-core/src/domain/quality/policy.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Score a module must reach when no policy overrides it.
pub const DEFAULT_CUTOFF: i32 = 84;

/// Per-module business policy. Read-only configuration, looked up by module key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ModulePolicy {
    #[serde(default = "default_cutoff")]
    #[validate(range(min = 0, max = 100, message = "Cutoff must lie in 0..=100"))]
    pub cutoff: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_evidence: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_structures: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 5, message = "Specificity is scored on 0..=5"))]
    pub min_specificity: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ctas: Option<usize>,
}

fn default_cutoff() -> i32 {
    DEFAULT_CUTOFF
}

impl Default for ModulePolicy {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            required_evidence: vec![],
            required_structures: vec![],
            min_specificity: None,
            max_ctas: None,
        }
    }
}

impl ModulePolicy {
    /// Human-readable requirement lines, used as corrective feedback when regenerating.
    pub fn requirements(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.required_evidence.is_empty() {
            lines.push(format!(
                "Include evidence: {}",
                self.required_evidence.join(", ")
            ));
        }
        if !self.required_structures.is_empty() {
            lines.push(format!(
                "Cover these elements: {}",
                self.required_structures.join(", ")
            ));
        }
        if let Some(min) = self.min_specificity {
            lines.push(format!("Be concrete (specificity ≥ {}/5): use figures and units", min));
        }
        if let Some(max) = self.max_ctas {
            lines.push(format!("Use at most {} call(s) to action", max));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_policy_defaults() -> Result<()> {
        let policy: ModulePolicy = serde_yaml::from_str("max_ctas: 1")?;
        assert_eq!(policy.cutoff, DEFAULT_CUTOFF);
        assert_eq!(policy.max_ctas, Some(1));
        assert_eq!(policy.requirements(), vec!["Use at most 1 call(s) to action"]);
        Ok(())
    }

    #[test]
    fn test_policy_validation() -> Result<()> {
        let policy: ModulePolicy = serde_yaml::from_str("cutoff: 140\nmin_specificity: 9")?;
        let err = policy.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("cutoff"));
        assert!(err.contains("min_specificity"));
        Ok(())
    }
}
