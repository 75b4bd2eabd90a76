// copyguard-core/src/domain/brochure/document.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::slots::ModuleInstance;

/// Document-level claim strictness. `Strict` escalates banned claims to errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimPolicy {
    #[default]
    Standard,
    Strict,
}

impl ClaimPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }
}

impl ClaimPolicy {
    /// The stricter of two policies.
    pub fn at_least(self, floor: ClaimPolicy) -> Self {
        match (self, floor) {
            (Self::Standard, Self::Standard) => Self::Standard,
            _ => Self::Strict,
        }
    }
}

impl fmt::Display for ClaimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClaimPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "strict" => Ok(Self::Strict),
            other => Err(DomainError::RegistryError(format!(
                "Unknown claim policy '{}' (expected 'standard' or 'strict')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRole {
    Cover,
    Narrative,
    Detail,
    Contact,
    #[default]
    #[serde(other)]
    Other,
}

/// Single source of truth for facts repeated across pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facts {
    #[serde(default, alias = "brandName", skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, alias = "contactPhone", skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

impl Facts {
    /// Brand name, if present and not blank.
    pub fn brand(&self) -> Option<&str> {
        self.brand_name
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub role: PageRole,
    #[serde(default)]
    pub modules: Vec<ModuleInstance>,
}

impl Page {
    /// All string content of the page, one slot string per line.
    pub fn text(&self) -> String {
        self.modules
            .iter()
            .map(ModuleInstance::flatten_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total list items (bullets, key/value rows, metrics) across the page.
    pub fn bullet_count(&self) -> usize {
        self.modules.iter().map(ModuleInstance::item_count).sum()
    }
}

/// An assembled multi-page brochure, as submitted to the gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrochureDocument {
    #[serde(default)]
    pub facts: Facts,
    #[serde(default, alias = "claimPolicy")]
    pub claim_policy: ClaimPolicy,
    /// Campaign intent (e.g. `event_promo`), forwarded to intent-scoped rules.
    #[serde(default, alias = "intentId", skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_document_deserialization() -> Result<()> {
        let doc: BrochureDocument = serde_json::from_value(json!({
            "facts": {"brandName": "카페 모아", "contactPhone": "010-1234-5678"},
            "claimPolicy": "strict",
            "pages": [
                {"id": "p1", "role": "cover", "modules": [
                    {"moduleId": "HERO", "slots": {"headline": "카페 모아 오픈", "bullets": ["a", "b"]}}
                ]},
                {"id": "p2", "role": "appendix"}
            ]
        }))?;
        assert_eq!(doc.claim_policy, ClaimPolicy::Strict);
        assert_eq!(doc.facts.brand(), Some("카페 모아"));
        assert_eq!(doc.pages[0].role, PageRole::Cover);
        assert_eq!(doc.pages[1].role, PageRole::Other);
        assert_eq!(doc.pages[0].bullet_count(), 2);
        assert!(doc.pages[0].text().contains("카페 모아 오픈"));
        assert!(doc.pages[1].text().is_empty());
        Ok(())
    }

    #[test]
    fn test_claim_policy_parsing() {
        assert_eq!("STRICT".parse::<ClaimPolicy>().ok(), Some(ClaimPolicy::Strict));
        assert!("lenient".parse::<ClaimPolicy>().is_err());
        assert_eq!(ClaimPolicy::Standard.at_least(ClaimPolicy::Strict), ClaimPolicy::Strict);
        assert_eq!(ClaimPolicy::Strict.at_least(ClaimPolicy::Standard), ClaimPolicy::Strict);
        assert_eq!(ClaimPolicy::Standard.at_least(ClaimPolicy::Standard), ClaimPolicy::Standard);
        assert_eq!(Facts { brand_name: Some("  ".into()), contact_phone: None }.brand(), None);
    }
}
