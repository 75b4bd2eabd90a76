// copyguard/src/commands/rules.rs
//
// USE CASE: Show what the compiled registry will enforce.

use std::path::PathBuf;

use copyguard_core::domain::quality::CompiledRule;
use copyguard_core::domain::quality::rule::WILDCARD_MODULE;

use crate::commands::{load_config, new_table};

pub fn execute(project_dir: PathBuf, module: Option<String>) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let registry = config.build_registry()?;

    let rules: Vec<&CompiledRule> = match module.as_deref() {
        // Intent-scoped rules are listed too: they apply once an intent is given
        Some(key) => registry
            .rules()
            .iter()
            .filter(|r| r.spec.modules.iter().any(|m| m == WILDCARD_MODULE || m == key))
            .collect(),
        None => registry.rules().iter().collect(),
    };

    println!(
        "📋 {} rule(s) for project '{}'{}",
        rules.len(),
        config.name,
        module
            .as_deref()
            .map(|m| format!(" (module {}, cutoff {})", m, registry.cutoff_for(m)))
            .unwrap_or_default()
    );

    let mut table = new_table(["Rule", "Name", "Severity", "Modules", "Intents", "Δ"]);
    for rule in rules {
        let spec = &rule.spec;
        table.add_row(vec![
            spec.id.clone(),
            spec.name.clone(),
            spec.severity.to_string(),
            spec.modules.join(", "),
            spec.target_intents
                .as_ref()
                .map(|t| t.join(", "))
                .unwrap_or_else(|| "-".to_string()),
            format!("{:+}", spec.penalty() + spec.bonus()),
        ]);
    }
    println!("{table}");
    Ok(())
}
