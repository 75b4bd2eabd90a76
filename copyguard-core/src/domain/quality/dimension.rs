// copyguard-core/src/domain/quality/dimension.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Baseline (and ceiling) of every dimension score.
pub const DIMENSION_MAX: i32 = 5;

/// The seven fixed quality axes a rule can move.
/// Declaration order is the reporting order (BTreeMap keys follow `Ord`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Clarity,
    Specificity,
    Structure,
    VoiceFit,
    ReadabilityRhythm,
    CredibilitySafety,
    Conversion,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Self::Clarity,
        Self::Specificity,
        Self::Structure,
        Self::VoiceFit,
        Self::ReadabilityRhythm,
        Self::CredibilitySafety,
        Self::Conversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clarity => "clarity",
            Self::Specificity => "specificity",
            Self::Structure => "structure",
            Self::VoiceFit => "voice_fit",
            Self::ReadabilityRhythm => "readability_rhythm",
            Self::CredibilitySafety => "credibility_safety",
            Self::Conversion => "conversion",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown quality dimension: {}", s))
    }
}

/// Rule severity. Only `HardFail` changes caller-visible behavior; the others are
/// informational and ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleSeverity {
    Low,
    Medium,
    High,
    HardFail,
}

impl RuleSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::HardFail => "HARD_FAIL",
        }
    }

    pub fn is_hard_fail(&self) -> bool {
        matches!(self, Self::HardFail)
    }
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
