// copyguard-core/src/domain/slots/placeholder.rs

use regex::Regex;

use crate::domain::error::DomainError;

/// Filler an LLM leaves behind when it has nothing to say: ellipses, TODO/TBD,
/// `[bracketed]` prompts, "미정" (undecided) and ○○ blanks.
pub const DEFAULT_PLACEHOLDER_PATTERNS: &[&str] = &[
    r"\.{3,}",
    r"…",
    r"(?i)\bTODO\b",
    r"(?i)\bTBD\b",
    r"(?i)lorem ipsum",
    r"\[[^\[\]]*\]",
    r"미정",
    r"○{2,}",
];

/// Compiled placeholder patterns, shared by the sanitizer (scrub) and the gate (detect).
#[derive(Debug, Clone)]
pub struct PlaceholderPatterns {
    patterns: Vec<Regex>,
}

impl PlaceholderPatterns {
    pub fn new() -> Result<Self, DomainError> {
        Self::from_patterns(DEFAULT_PLACEHOLDER_PATTERNS)
    }

    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, DomainError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(pattern.as_ref()).map_err(|e| DomainError::InvalidPattern {
                rule_id: "placeholder".to_string(),
                pattern: pattern.as_ref().to_string(),
                reason: e.to_string(),
            })?;
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    /// First placeholder found in `text`, if any.
    pub fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.patterns
            .iter()
            .filter_map(|re| re.find(text))
            .min_by_key(|m| m.start())
            .map(|m| m.as_str())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }

    /// Replaces every placeholder with a space. Whitespace is left for the caller to collapse.
    pub fn scrub(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.patterns {
            if re.is_match(&out) {
                out = re.replace_all(&out, " ").into_owned();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_detects_and_scrubs_placeholders() -> Result<()> {
        let p = PlaceholderPatterns::new()?;
        for text in ["가격 미정", "준비 중...", "곧 공개…", "TODO: 문구", "tbd", "[매장명] 오픈", "○○동 123"] {
            assert!(p.contains(text), "{text}");
        }
        assert!(!p.contains("No.1 브랜드. 3.5% 적립"));
        assert!(!p.contains("TODOS 리스트"));
        assert_eq!(p.find("오픈 [날짜] 미정"), Some("[날짜]"));
        assert_eq!(p.scrub("[매장명] 오픈 미정"), "  오픈  ");
        Ok(())
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        assert!(matches!(
            PlaceholderPatterns::from_patterns(&["(open"]),
            Err(DomainError::InvalidPattern { .. })
        ));
    }
}
