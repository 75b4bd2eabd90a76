// copyguard-core/src/application/review.rs

use serde::Serialize;
use std::borrow::Cow;
use std::time::Instant;
use tracing::{info, instrument};

use crate::domain::brochure::document::{BrochureDocument, ClaimPolicy};
use crate::domain::brochure::gate::{GateReport, QualityGate};
use crate::domain::quality::engine::QualityEngine;
use crate::domain::quality::scorecard::QualityScorecard;
use crate::domain::slots::spec::ModuleCatalog;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleScore {
    pub page_id: String,
    pub module_id: String,
    pub scorecard: QualityScorecard,
}

/// Gate report plus one scorecard per module instance with copy in it.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReview {
    pub gate: GateReport,
    pub module_scores: Vec<ModuleScore>,
    /// No gate error and every scored module passes.
    pub publishable: bool,
}

impl DocumentReview {
    pub fn failing_modules(&self) -> impl Iterator<Item = &ModuleScore> {
        self.module_scores.iter().filter(|m| !m.scorecard.pass)
    }
}

/// Runs the brochure gate and scores every module's flattened copy.
///
/// Modules are scored under their catalog `quality_key` (unknown modules under their id).
/// Modules without any text are left to the gate's required-slot check.
/// `claim_floor` raises the document's claim policy (project-wide strictness).
#[instrument(skip_all, fields(pages = doc.pages.len()))]
pub fn review_document(
    gate: &QualityGate,
    engine: &QualityEngine,
    catalog: &ModuleCatalog,
    doc: &BrochureDocument,
    claim_floor: ClaimPolicy,
) -> DocumentReview {
    let start = Instant::now();

    let effective = doc.claim_policy.at_least(claim_floor);
    let doc: Cow<'_, BrochureDocument> = if effective == doc.claim_policy {
        Cow::Borrowed(doc)
    } else {
        Cow::Owned(BrochureDocument {
            claim_policy: effective,
            ..doc.clone()
        })
    };

    let gate_report = gate.check(&doc);

    let mut module_scores = Vec::new();
    for page in &doc.pages {
        for module in &page.modules {
            let text = module.flatten_text();
            if text.trim().is_empty() {
                continue;
            }
            let key = catalog
                .get(&module.module_id)
                .map_or(module.module_id.as_str(), |spec| spec.quality_key());
            module_scores.push(ModuleScore {
                page_id: page.id.clone(),
                module_id: module.module_id.clone(),
                scorecard: engine.evaluate(&text, key, doc.intent.as_deref()),
            });
        }
    }

    let publishable = gate_report.ok && module_scores.iter().all(|m| m.scorecard.pass);
    info!(
        errors = gate_report.errors.len(),
        warnings = gate_report.warnings.len(),
        modules = module_scores.len(),
        publishable,
        duration_ms = start.elapsed().as_millis() as u64,
        "Document reviewed"
    );

    DocumentReview {
        gate: gate_report,
        module_scores,
        publishable,
    }
}
