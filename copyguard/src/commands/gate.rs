// copyguard/src/commands/gate.rs
//
// USE CASE: Pre-publication review of an assembled brochure.

use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use copyguard_core::application::{DocumentReview, review_document};
use copyguard_core::domain::brochure::{BrochureDocument, QualityGate, QualityWarning};
use copyguard_core::domain::quality::QualityEngine;
use copyguard_core::infrastructure::fs::write_json;

use crate::cli::OutputFormat;
use crate::commands::{load_config, new_table};

pub fn execute(
    project_dir: PathBuf,
    document: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    // 1. Load Config & build the shared registry/catalog
    let config = load_config(&project_dir)?;
    let registry = Arc::new(config.build_registry()?);
    let catalog = Arc::new(config.build_catalog()?);
    let gate = QualityGate::new(catalog.clone(), &registry, config.gate_config())?;
    let engine = QualityEngine::new(registry);

    // 2. Parse the document
    let body = fs::read_to_string(&document)
        .with_context(|| format!("Failed to read document {}", document.display()))?;
    let doc: BrochureDocument = serde_json::from_str(&body)
        .with_context(|| format!("Invalid brochure document {}", document.display()))?;

    // 3. Review
    let review = review_document(&gate, &engine, &catalog, &doc, config.quality.claim_policy);

    // 4. Output Report
    if let Some(path) = &output {
        write_json(path, &review)?;
    }
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&review)?),
        OutputFormat::Table => {
            println!("🚦 Reviewing '{}' ({} pages)", document.display(), doc.pages.len());
            print_review(&review);
            if let Some(path) = &output {
                println!("📄 JSON report saved to {}", path.display());
            }
        }
    }

    // 5. Verdict
    if !review.publishable {
        if format == OutputFormat::Table {
            eprintln!(
                "\n❌ NOT PUBLISHABLE. {} gate error(s), {} failing module(s).",
                review.gate.errors.len(),
                review.failing_modules().count()
            );
        }
        std::process::exit(1);
    }
    if format == OutputFormat::Table {
        println!("\n✨ Publishable.");
    }
    Ok(())
}

fn location(w: &QualityWarning) -> String {
    [w.page_id.as_deref(), w.module_id.as_deref(), w.slot_key.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / ")
}

fn print_review(review: &DocumentReview) {
    let findings: Vec<&QualityWarning> = review.gate.findings().collect();
    if findings.is_empty() {
        println!("   ✅ Gate: no findings.");
    } else {
        let mut table = new_table(["Severity", "Code", "Where", "Message"]);
        for w in findings {
            table.add_row(vec![
                w.severity.to_string(),
                w.code.to_string(),
                location(w),
                w.message.clone(),
            ]);
        }
        println!("{table}");
    }

    let mut scores = new_table(["Page", "Module", "Key", "Score", "Cutoff", "Result", "Rules"]);
    for m in &review.module_scores {
        let card = &m.scorecard;
        let result = match (card.pass, card.hard_fail) {
            (true, _) => "✅",
            (false, true) => "❌ hard fail",
            (false, false) => "❌",
        };
        scores.add_row(vec![
            m.page_id.clone(),
            m.module_id.clone(),
            card.module_key.clone(),
            card.total_score.to_string(),
            card.cutoff.to_string(),
            result.to_string(),
            card.triggered_rule_ids.join(", "),
        ]);
    }
    println!("{scores}");
}
