// copyguard-core/src/domain/brochure/mod.rs

pub mod density;
pub mod document;
pub mod gate;
pub mod similarity;
pub mod warning;

// Re-exports
pub use document::{BrochureDocument, ClaimPolicy, Facts, Page, PageRole};
pub use gate::{GateConfig, GateReport, QualityGate};
pub use similarity::trigram_similarity;
pub use warning::{QualityWarning, WarningCode, WarningSeverity};
