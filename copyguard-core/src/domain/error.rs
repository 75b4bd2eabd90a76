// copyguard-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Rule '{rule_id}' has an invalid pattern '{pattern}': {reason}")]
    #[diagnostic(
        code(copyguard::domain::pattern),
        help("Patterns use the `regex` crate syntax (no look-around). Escape literal dots and brackets.")
    )]
    InvalidPattern {
        rule_id: String,
        pattern: String,
        reason: String,
    },

    #[error("Rule '{rule_id}' is invalid: {reason}")]
    #[diagnostic(code(copyguard::domain::rule))]
    InvalidRule { rule_id: String, reason: String },

    #[error("Duplicate rule id '{0}' in registry")]
    #[diagnostic(
        code(copyguard::domain::duplicate_rule),
        help("Rule ids must be unique across the built-in registry and every rule pack.")
    )]
    DuplicateRule(String),

    #[error("Rule '{rule_id}' references unknown lexicon '{lexicon}'")]
    #[diagnostic(
        code(copyguard::domain::lexicon),
        help("Declare the lexicon under `lexicons:` before referencing it.")
    )]
    UnknownLexicon { rule_id: String, lexicon: String },

    #[error("Module policy '{module}' is invalid: {reason}")]
    #[diagnostic(code(copyguard::domain::policy))]
    InvalidPolicy { module: String, reason: String },

    #[error("Module spec '{module}' is invalid: {reason}")]
    #[diagnostic(code(copyguard::domain::module_spec))]
    InvalidModuleSpec { module: String, reason: String },

    #[error("Module '{0}' not found in catalog")]
    #[diagnostic(code(copyguard::domain::module_not_found))]
    ModuleNotFound(String),

    #[error("Registry loading Error: {0}")]
    #[diagnostic(code(copyguard::domain::registry))]
    RegistryError(String),
}
