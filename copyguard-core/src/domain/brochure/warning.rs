// copyguard-core/src/domain/brochure/warning.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    /// Blocks publishing.
    Error,
    /// Advisory.
    Warn,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
        }
    }
}

/// Fixed taxonomy of gate findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    ModuleUnknown,
    SlotRequiredMissing,
    SlotCharLimitExceeded,
    SlotItemsExceeded,
    PlaceholderFound,
    BannedClaim,
    FactsMissingBrand,
    BrandNotOnCover,
    PhoneInconsistent,
    PageDuplication,
    DensityLongSentences,
    DensityTooManyBullets,
    NarrativeBulletSpam,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModuleUnknown => "MODULE_UNKNOWN",
            Self::SlotRequiredMissing => "SLOT_REQUIRED_MISSING",
            Self::SlotCharLimitExceeded => "SLOT_CHAR_LIMIT_EXCEEDED",
            Self::SlotItemsExceeded => "SLOT_ITEMS_EXCEEDED",
            Self::PlaceholderFound => "PLACEHOLDER_FOUND",
            Self::BannedClaim => "BANNED_CLAIM",
            Self::FactsMissingBrand => "FACTS_MISSING_BRAND",
            Self::BrandNotOnCover => "BRAND_NOT_ON_COVER",
            Self::PhoneInconsistent => "PHONE_INCONSISTENT",
            Self::PageDuplication => "PAGE_DUPLICATION",
            Self::DensityLongSentences => "DENSITY_LONG_SENTENCES",
            Self::DensityTooManyBullets => "DENSITY_TOO_MANY_BULLETS",
            Self::NarrativeBulletSpam => "NARRATIVE_BULLET_SPAM",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityWarning {
    pub severity: WarningSeverity,
    pub code: WarningCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl QualityWarning {
    pub fn new(severity: WarningSeverity, code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            page_id: None,
            module_id: None,
            slot_key: None,
            detail: None,
        }
    }

    pub fn error(code: WarningCode, message: impl Into<String>) -> Self {
        Self::new(WarningSeverity::Error, code, message)
    }

    pub fn warn(code: WarningCode, message: impl Into<String>) -> Self {
        Self::new(WarningSeverity::Warn, code, message)
    }

    pub fn page(mut self, page_id: &str) -> Self {
        self.page_id = Some(page_id.to_string());
        self
    }

    pub fn module(mut self, module_id: &str) -> Self {
        self.module_id = Some(module_id.to_string());
        self
    }

    pub fn slot(mut self, slot_key: &str) -> Self {
        self.slot_key = Some(slot_key.to_string());
        self
    }

    pub fn detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == WarningSeverity::Error
    }
}
