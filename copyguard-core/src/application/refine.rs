// copyguard-core/src/application/refine.rs

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::application::evaluate::evaluate_text;
use crate::domain::quality::engine::QualityEngine;
use crate::domain::quality::policy::ModulePolicy;
use crate::domain::quality::safe_fix::{SafeFixOutput, annotate};
use crate::domain::quality::scorecard::QualityScorecard;
use crate::domain::slots::sanitizer::{SlotSanitizer, missing_required};
use crate::domain::slots::spec::{ModuleCatalog, ModuleInstance, ModuleSpec};
use crate::error::CopyguardError;
use crate::infrastructure::extraction::extract_json_object;
use crate::ports::generator::ContentGenerator;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Everything the loop reads. Shared, immutable.
#[derive(Debug, Clone)]
pub struct RefineContext {
    pub engine: QualityEngine,
    pub sanitizer: SlotSanitizer,
    pub catalog: Arc<ModuleCatalog>,
}

impl RefineContext {
    pub fn new(engine: QualityEngine, sanitizer: SlotSanitizer, catalog: Arc<ModuleCatalog>) -> Self {
        Self {
            engine,
            sanitizer,
            catalog,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefineOptions {
    pub max_attempts: usize,
    pub intent: Option<String>,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            intent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefineOutcome {
    pub module: ModuleInstance,
    pub scorecard: QualityScorecard,
    pub safe_fix: SafeFixOutput,
    /// Required slots still empty in the kept attempt.
    pub missing_slots: Vec<String>,
    pub attempts: usize,
    /// 1-based index of the kept attempt.
    pub best_attempt: usize,
    pub passed: bool,
}

struct Attempt {
    index: usize,
    module: ModuleInstance,
    text: String,
    scorecard: QualityScorecard,
    missing_slots: Vec<String>,
}

impl Attempt {
    fn accepted(&self) -> bool {
        self.scorecard.pass && self.missing_slots.is_empty()
    }

    // Accepted first, then complete, then score. Ties keep the earlier attempt.
    fn outranks(&self, other: &Attempt) -> bool {
        let key = |a: &Attempt| (a.accepted(), a.missing_slots.is_empty(), a.scorecard.total_score);
        key(self) > key(other)
    }
}

/// Prompt asking for one module as a JSON object of its slots.
pub fn module_prompt(spec: &ModuleSpec, brief: &str) -> String {
    let mut prompt = format!(
        "{}\n\nWrite the '{}' block. Answer with a single JSON object with these keys:\n",
        brief.trim(),
        spec.id
    );
    for slot in &spec.slots {
        let mut line = format!("- {} ({})", slot.key, slot.slot_type);
        if let Some(max) = slot.max_chars {
            line.push_str(&format!(", max {} chars", max));
        }
        if let Some(max) = slot.max_items {
            line.push_str(&format!(", max {} items", max));
        }
        if slot.required {
            line.push_str(", required");
        }
        prompt.push_str(&line);
        prompt.push('\n');
    }
    prompt
}

fn corrective_prompt(base_prompt: &str, attempt: &Attempt, requirements: &[String]) -> String {
    let mut lines = attempt.scorecard.feedback_lines();
    if !attempt.missing_slots.is_empty() {
        lines.push(format!("Fill the required slot(s): {}", attempt.missing_slots.join(", ")));
    }
    lines.extend(requirements.iter().cloned());

    let mut prompt = format!(
        "{}\n\nThe previous draft failed the quality check. Rewrite it and fix:\n",
        base_prompt.trim_end()
    );
    for line in lines {
        prompt.push_str("- ");
        prompt.push_str(&line);
        prompt.push('\n');
    }
    prompt
}

/// Generates `module_id` until it passes or `max_attempts` is spent.
///
/// Each reply goes through JSON extraction, slot sanitization and scoring; an unusable
/// reply is just an attempt with empty slots. The best attempt is returned with its
/// review annotation. Generator errors abort the loop.
#[instrument(skip(generator, ctx, base_prompt, options), fields(max_attempts = options.max_attempts))]
pub async fn refine_module(
    generator: &dyn ContentGenerator,
    ctx: &RefineContext,
    module_id: &str,
    base_prompt: &str,
    options: &RefineOptions,
) -> Result<RefineOutcome, CopyguardError> {
    let spec = ctx.catalog.require(module_id)?;
    let module_key = spec.quality_key();
    let requirements = ctx
        .engine
        .registry()
        .policy(module_key)
        .map(ModulePolicy::requirements)
        .unwrap_or_default();
    let max_attempts = options.max_attempts.max(1);

    let mut prompt = base_prompt.to_string();
    let mut best: Option<Attempt> = None;
    let mut attempts = 0;

    for index in 1..=max_attempts {
        attempts = index;
        let reply = generator.generate(&prompt).await?;
        let raw = extract_json_object(&reply).unwrap_or_else(|| {
            debug!(attempt = index, "No JSON object in reply");
            Value::Object(Map::new())
        });

        let slots = ctx.sanitizer.sanitize_generated(spec, &raw);
        let missing_slots = missing_required(spec, &slots);
        let module = ModuleInstance {
            module_id: spec.id.clone(),
            slots,
        };
        let text = module.flatten_text();
        let scorecard = evaluate_text(&ctx.engine, &text, module_key, options.intent.as_deref());
        let current = Attempt {
            index,
            module,
            text,
            scorecard,
            missing_slots,
        };

        debug!(
            attempt = index,
            score = current.scorecard.total_score,
            accepted = current.accepted(),
            "Attempt scored"
        );

        if current.accepted() {
            best = Some(current);
            break;
        }
        if index < max_attempts {
            prompt = corrective_prompt(base_prompt, &current, &requirements);
        }
        if best.as_ref().is_none_or(|b| current.outranks(b)) {
            best = Some(current);
        }
    }

    let best = best.ok_or_else(|| CopyguardError::InternalError("no attempt was made".to_string()))?;
    let passed = best.accepted();
    if passed {
        info!(attempts, score = best.scorecard.total_score, "Module accepted");
    } else {
        warn!(
            attempts,
            best_attempt = best.index,
            score = best.scorecard.total_score,
            "Module still failing after all attempts"
        );
    }

    Ok(RefineOutcome {
        safe_fix: annotate(&best.text, &best.scorecard),
        module: best.module,
        scorecard: best.scorecard,
        missing_slots: best.missing_slots,
        attempts,
        best_attempt: best.index,
        passed,
    })
}

/// Refines several modules concurrently, each from `module_prompt(spec, brief)`.
/// Results follow the order of `module_ids`; the first error wins.
pub async fn refine_modules<S: AsRef<str>>(
    generator: &dyn ContentGenerator,
    ctx: &RefineContext,
    module_ids: &[S],
    brief: &str,
    options: &RefineOptions,
) -> Result<Vec<RefineOutcome>, CopyguardError> {
    let prompts = module_ids
        .iter()
        .map(|id| {
            let spec = ctx.catalog.require(id.as_ref())?;
            Ok((spec.id.clone(), module_prompt(spec, brief)))
        })
        .collect::<Result<Vec<_>, CopyguardError>>()?;

    let tasks = prompts
        .iter()
        .map(|(id, prompt)| refine_module(generator, ctx, id, prompt, options));
    try_join_all(tasks).await
}
