// copyguard-core/src/domain/quality/mod.rs

pub mod detection;
pub mod dimension;
pub mod engine;
pub mod lexicon;
pub mod policy;
pub mod registry;
pub mod rule;
pub mod safe_fix;
pub mod scorecard;
pub mod sentence;

// Re-exports
pub use detection::{AnalyzedText, Detection};
pub use dimension::{DIMENSION_MAX, Dimension, RuleSeverity};
pub use engine::QualityEngine;
pub use lexicon::Lexicons;
pub use policy::{DEFAULT_CUTOFF, ModulePolicy};
pub use registry::{CompiledRule, RegistryConfig, RuleRegistry};
pub use rule::{DetectionSpec, RuleScore, RuleSpec};
pub use safe_fix::{SafeFixOutput, annotate};
pub use scorecard::{Finding, QualityScorecard};
pub use sentence::SentenceSplitter;
