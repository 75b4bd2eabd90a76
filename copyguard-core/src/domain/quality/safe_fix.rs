// copyguard-core/src/domain/quality/safe_fix.rs

use serde::Serialize;

use crate::domain::quality::scorecard::QualityScorecard;

/// Prefix of every review label. Used to recognise text that was already annotated.
pub const REVIEW_LABEL_PREFIX: &str = "[검토 필요]";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafeFixOutput {
    pub text: String,
    pub labels: Vec<String>,
    pub annotated: bool,
}

/// Flags hard-fail findings for a human reviewer. The copy itself is never rewritten.
pub fn annotate(text: &str, scorecard: &QualityScorecard) -> SafeFixOutput {
    let labels: Vec<String> = scorecard
        .hard_fail_findings()
        .map(|f| format!("{} {}: {}", REVIEW_LABEL_PREFIX, f.name, f.message))
        .collect();

    if labels.is_empty() {
        return SafeFixOutput {
            text: text.to_string(),
            labels,
            annotated: false,
        };
    }

    let body = strip_labels(text);
    let text = format!("{}\n\n{}", labels.join("\n"), body);
    SafeFixOutput {
        text,
        labels,
        annotated: true,
    }
}

/// Returns `text` without a leading block of review labels (and its blank separator line).
pub fn strip_labels(text: &str) -> &str {
    let mut rest = text;
    while rest.starts_with(REVIEW_LABEL_PREFIX) {
        rest = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => "",
        };
    }
    if rest.len() == text.len() {
        return text;
    }
    rest.strip_prefix('\n').unwrap_or(rest)
}
