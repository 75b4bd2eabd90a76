// copyguard-core/src/domain/brochure/gate.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::domain::brochure::density::long_sentence_run;
use crate::domain::brochure::document::{BrochureDocument, ClaimPolicy, PageRole};
use crate::domain::brochure::similarity::trigram_similarity;
use crate::domain::brochure::warning::{QualityWarning, WarningCode, WarningSeverity};
use crate::domain::error::DomainError;
use crate::domain::quality::lexicon::BANNED_PHRASES;
use crate::domain::quality::registry::RuleRegistry;
use crate::domain::quality::sentence::SentenceSplitter;
use crate::domain::slots::placeholder::PlaceholderPatterns;
use crate::domain::slots::sanitizer::is_empty_value;
use crate::domain::slots::spec::{ModuleCatalog, ModuleInstance, ModuleSlotSpec, collect_strings};

// Landline, mobile and +82 forms ("02-123-4567", "010 1234 5678", "+82 10-1234-5678"),
// plus 8-digit representative numbers ("1588-1234").
// Separators never span a line: each slot string sits on its own line of the page text.
const PHONE_PATTERN: &str =
    r"(?:\+\d{1,3}[-. ]?)?\(?\b\d{2,4}\)?[-. ]?\d{3,4}[-. ]\d{4}\b|\b1\d{3}-\d{4}\b";

/// Thresholds of the cross-page checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GateConfig {
    #[validate(range(min = 0.0, max = 1.0, message = "Similarity threshold must lie in 0..=1"))]
    pub similarity_threshold: f64,
    pub max_bullets_per_page: usize,
    pub max_bullets_narrative: usize,
    #[validate(range(min = 1))]
    pub long_sentence_chars: usize,
    #[validate(range(min = 1))]
    pub long_sentence_run: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.78,
            max_bullets_per_page: 9,
            max_bullets_narrative: 6,
            long_sentence_chars: 45,
            long_sentence_run: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateReport {
    pub ok: bool,
    pub errors: Vec<QualityWarning>,
    pub warnings: Vec<QualityWarning>,
}

impl GateReport {
    pub fn from_findings(findings: Vec<QualityWarning>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(QualityWarning::is_error);
        Self {
            ok: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn findings(&self) -> impl Iterator<Item = &QualityWarning> {
        self.errors.iter().chain(&self.warnings)
    }

    pub fn has_code(&self, code: WarningCode) -> bool {
        self.findings().any(|w| w.code == code)
    }

    pub fn count(&self, code: WarningCode) -> usize {
        self.findings().filter(|w| w.code == code).count()
    }
}

/// Cross-page validation of an assembled brochure.
///
/// Every check always runs; the report is the union of their findings so a reviewer sees
/// the complete picture in one pass.
#[derive(Debug, Clone)]
pub struct QualityGate {
    catalog: Arc<ModuleCatalog>,
    banned_phrases: Vec<String>,
    placeholders: PlaceholderPatterns,
    splitter: SentenceSplitter,
    phone: Regex,
    config: GateConfig,
}

impl QualityGate {
    pub fn new(
        catalog: Arc<ModuleCatalog>,
        registry: &RuleRegistry,
        config: GateConfig,
    ) -> Result<Self, DomainError> {
        config.validate().map_err(|e| DomainError::RegistryError(e.to_string()))?;
        let phone = Regex::new(PHONE_PATTERN).map_err(|e| DomainError::InvalidPattern {
            rule_id: "phone".to_string(),
            pattern: PHONE_PATTERN.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            catalog,
            banned_phrases: registry.lexicons().words(BANNED_PHRASES).to_vec(),
            placeholders: PlaceholderPatterns::new()?,
            splitter: registry.splitter().clone(),
            phone,
            config,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn check(&self, doc: &BrochureDocument) -> GateReport {
        let mut findings = Vec::new();

        self.check_structure(doc, &mut findings);
        self.check_banned_claims(doc, &mut findings);
        self.check_facts(doc, &mut findings);
        self.check_duplication(doc, &mut findings);
        self.check_density(doc, &mut findings);

        let report = GateReport::from_findings(findings);
        debug!(
            pages = doc.pages.len(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            ok = report.ok,
            "Brochure gate finished"
        );
        report
    }

    // 1. Module ids, slot contracts and placeholders
    fn check_structure(&self, doc: &BrochureDocument, out: &mut Vec<QualityWarning>) {
        for page in &doc.pages {
            for module in &page.modules {
                match self.catalog.get(&module.module_id) {
                    Some(spec) => {
                        for slot in &spec.slots {
                            check_slot(slot, module, &page.id, out);
                        }
                    }
                    None => out.push(
                        QualityWarning::error(
                            WarningCode::ModuleUnknown,
                            format!("Module '{}' is not in the catalog", module.module_id),
                        )
                        .page(&page.id)
                        .module(&module.module_id),
                    ),
                }

                for (key, value) in &module.slots {
                    let mut strings = Vec::new();
                    collect_strings(value, &mut strings);
                    if let Some(found) = strings.iter().find_map(|s| self.placeholders.find(s)) {
                        out.push(
                            QualityWarning::error(
                                WarningCode::PlaceholderFound,
                                format!("Placeholder '{}' left in generated content", found),
                            )
                            .page(&page.id)
                            .module(&module.module_id)
                            .slot(key)
                            .detail(json!({ "match": found })),
                        );
                    }
                }
            }
        }
    }

    // 2. Overclaims
    fn check_banned_claims(&self, doc: &BrochureDocument, out: &mut Vec<QualityWarning>) {
        let severity = match doc.claim_policy {
            ClaimPolicy::Strict => WarningSeverity::Error,
            ClaimPolicy::Standard => WarningSeverity::Warn,
        };
        for page in &doc.pages {
            let text = page.text();
            for phrase in self.banned_phrases.iter().filter(|p| !p.is_empty()) {
                if text.contains(phrase.as_str()) {
                    out.push(
                        QualityWarning::new(
                            severity,
                            WarningCode::BannedClaim,
                            format!("Banned claim '{}' on page '{}'", phrase, page.id),
                        )
                        .page(&page.id)
                        .detail(json!({ "phrase": phrase })),
                    );
                }
            }
        }
    }

    // 3. Brand and phone consistency against the facts
    fn check_facts(&self, doc: &BrochureDocument, out: &mut Vec<QualityWarning>) {
        match doc.facts.brand() {
            None => out.push(QualityWarning::error(
                WarningCode::FactsMissingBrand,
                "Document facts carry no brand name",
            )),
            Some(brand) => {
                let needle = squash(brand);
                for page in doc.pages.iter().filter(|p| p.role == PageRole::Cover) {
                    if !squash(&page.text()).contains(&needle) {
                        out.push(
                            QualityWarning::warn(
                                WarningCode::BrandNotOnCover,
                                format!("Cover page does not mention '{}'", brand),
                            )
                            .page(&page.id),
                        );
                    }
                }
            }
        }

        let Some(expected) = doc.facts.contact_phone.as_deref() else {
            return;
        };
        let expected_digits = phone_digits(expected);
        if expected_digits.is_empty() {
            return;
        }

        for page in &doc.pages {
            let text = page.text();
            let mut reported = BTreeSet::new();
            for found in self.phone.find_iter(&text).map(|m| m.as_str().trim()) {
                let digits = phone_digits(found);
                let consistent =
                    digits.contains(&expected_digits) || expected_digits.contains(&digits);
                if !consistent && reported.insert(digits) {
                    out.push(
                        QualityWarning::warn(
                            WarningCode::PhoneInconsistent,
                            format!("Phone '{}' differs from '{}'", found, expected),
                        )
                        .page(&page.id)
                        .detail(json!({ "expected": expected, "found": found })),
                    );
                }
            }
        }
    }

    // 4. Near-duplicate pages
    fn check_duplication(&self, doc: &BrochureDocument, out: &mut Vec<QualityWarning>) {
        let texts: Vec<String> = doc.pages.iter().map(|p| p.text()).collect();
        for (i, a) in doc.pages.iter().enumerate() {
            for (j, b) in doc.pages.iter().enumerate().skip(i + 1) {
                let score = trigram_similarity(&texts[i], &texts[j]);
                if score >= self.config.similarity_threshold {
                    out.push(
                        QualityWarning::warn(
                            WarningCode::PageDuplication,
                            format!("Pages '{}' and '{}' are near-duplicates", a.id, b.id),
                        )
                        .page(&a.id)
                        .detail(json!({
                            "pages": [a.id, b.id],
                            "similarity": (score * 1000.0).round() / 1000.0,
                        })),
                    );
                }
            }
        }
    }

    // 5. Bullet overuse and walls of long sentences
    fn check_density(&self, doc: &BrochureDocument, out: &mut Vec<QualityWarning>) {
        let cfg = &self.config;
        for page in &doc.pages {
            let bullets = page.bullet_count();
            if bullets > cfg.max_bullets_per_page {
                out.push(
                    QualityWarning::warn(
                        WarningCode::DensityTooManyBullets,
                        format!("{} list items on one page (max {})", bullets, cfg.max_bullets_per_page),
                    )
                    .page(&page.id)
                    .detail(json!({ "count": bullets, "max": cfg.max_bullets_per_page })),
                );
            } else if page.role == PageRole::Narrative && bullets > cfg.max_bullets_narrative {
                out.push(
                    QualityWarning::warn(
                        WarningCode::NarrativeBulletSpam,
                        format!(
                            "Narrative page reads as a list: {} items (max {})",
                            bullets, cfg.max_bullets_narrative
                        ),
                    )
                    .page(&page.id)
                    .detail(json!({ "count": bullets, "max": cfg.max_bullets_narrative })),
                );
            }

            let run = long_sentence_run(&page.text(), &self.splitter, cfg.long_sentence_chars);
            if run >= cfg.long_sentence_run {
                out.push(
                    QualityWarning::warn(
                        WarningCode::DensityLongSentences,
                        format!(
                            "{} consecutive sentences of {}+ characters",
                            run, cfg.long_sentence_chars
                        ),
                    )
                    .page(&page.id)
                    .detail(json!({ "run": run })),
                );
            }
        }
    }
}

fn check_slot(
    slot: &ModuleSlotSpec,
    module: &ModuleInstance,
    page_id: &str,
    out: &mut Vec<QualityWarning>,
) {
    let value = module.slots.get(&slot.key).unwrap_or(&Value::Null);
    let located = |w: QualityWarning| w.page(page_id).module(&module.module_id).slot(&slot.key);

    if slot.required && is_empty_value(value) {
        out.push(located(QualityWarning::warn(
            WarningCode::SlotRequiredMissing,
            format!("Required slot '{}' is empty", slot.key),
        )));
    }

    if let Some(max) = slot.max_chars {
        let longest = match value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0),
            _ => 0,
        };
        if longest > max {
            out.push(located(
                QualityWarning::warn(
                    WarningCode::SlotCharLimitExceeded,
                    format!("Slot '{}' has {} characters (max {})", slot.key, longest, max),
                )
                .detail(json!({ "max": max, "actual": longest })),
            ));
        }
    }

    if let (Some(max), Value::Array(items)) = (slot.max_items, value)
        && items.len() > max
    {
        out.push(located(
            QualityWarning::warn(
                WarningCode::SlotItemsExceeded,
                format!("Slot '{}' has {} items (max {})", slot.key, items.len(), max),
            )
            .detail(json!({ "max": max, "actual": items.len() })),
        ));
    }
}

/// Lowercased, whitespace-free form for brand matching.
fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Digits only, with a `+82` country prefix folded into the domestic leading zero.
fn phone_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix("82") {
        Some(rest) if raw.trim_start().starts_with('+') => format!("0{}", rest),
        _ => digits,
    }
}
