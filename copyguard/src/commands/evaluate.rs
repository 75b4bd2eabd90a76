// copyguard/src/commands/evaluate.rs
//
// USE CASE: Score one piece of copy for a module key.

use anyhow::Context;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use copyguard_core::application::evaluate_text;
use copyguard_core::domain::quality::safe_fix::annotate;
use copyguard_core::domain::quality::{QualityEngine, QualityScorecard};

use crate::cli::OutputFormat;
use crate::commands::{load_config, new_table};

pub struct EvaluateArgs {
    pub project_dir: PathBuf,
    pub module: String,
    pub intent: Option<String>,
    pub file: Option<PathBuf>,
    pub text: Option<String>,
    pub format: OutputFormat,
    pub annotate: bool,
}

pub fn execute(args: EvaluateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.project_dir)?;
    let registry = Arc::new(config.build_registry()?);
    let engine = QualityEngine::new(registry);

    let copy = read_copy(args.file, args.text)?;
    let scorecard = evaluate_text(&engine, &copy, &args.module, args.intent.as_deref());
    let safe_fix = args.annotate.then(|| annotate(&copy, &scorecard));

    match args.format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&scorecard)?;
            if let (Some(fix), Some(obj)) = (&safe_fix, value.as_object_mut()) {
                obj.insert("safe_fix".to_string(), serde_json::to_value(fix)?);
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            print_scorecard(&scorecard);
            if let Some(fix) = safe_fix.as_ref().filter(|f| f.annotated) {
                println!("\n🏷️  Copy for review:\n{}", fix.text);
            }
        }
    }

    if !scorecard.pass {
        if args.format == OutputFormat::Table {
            eprintln!(
                "\n❌ FAILURE. Score {} below cutoff {}{}",
                scorecard.total_score,
                scorecard.cutoff,
                if scorecard.hard_fail { " (hard fail)" } else { "" }
            );
        }
        // Exit with error code for CI/CD
        std::process::exit(1);
    }
    Ok(())
}

fn read_copy(file: Option<PathBuf>, text: Option<String>) -> anyhow::Result<String> {
    match (file, text) {
        (Some(path), _) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read copy from {}", path.display())),
        (None, Some(text)) => Ok(text),
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read copy from stdin")?;
            Ok(buf)
        }
    }
}

fn print_scorecard(scorecard: &QualityScorecard) {
    println!(
        "📝 Module: {}{}",
        scorecard.module_key,
        scorecard
            .intent
            .as_deref()
            .map(|i| format!(" (intent: {})", i))
            .unwrap_or_default()
    );
    let verdict = match (scorecard.pass, scorecard.hard_fail) {
        (true, _) => "✅ PASS",
        (false, true) => "❌ HARD FAIL",
        (false, false) => "❌ FAIL",
    };
    println!(
        "   Score: {} / cutoff {}  {}",
        scorecard.total_score, scorecard.cutoff, verdict
    );

    if scorecard.findings.is_empty() {
        println!("   No rule triggered.");
    } else {
        let mut table = new_table(["Rule", "Severity", "Δ", "Message"]);
        for f in &scorecard.findings {
            table.add_row(vec![
                f.rule_id.clone(),
                f.severity.to_string(),
                format!("{:+}", f.score_delta),
                f.message.clone(),
            ]);
        }
        println!("{table}");
    }

    let mut dims = new_table(["Dimension", "Score"]);
    for (dimension, score) in &scorecard.dimension_scores {
        dims.add_row(vec![dimension.to_string(), format!("{}/5", score)]);
    }
    println!("{dims}");
}
