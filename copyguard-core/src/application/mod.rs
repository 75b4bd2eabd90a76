// copyguard-core/src/application/mod.rs

pub mod evaluate;
pub mod refine;
pub mod review;

pub use evaluate::evaluate_text;
pub use refine::{RefineContext, RefineOptions, RefineOutcome, refine_module, refine_modules};
pub use review::{DocumentReview, ModuleScore, review_document};
