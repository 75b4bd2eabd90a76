// copyguard-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(copyguard::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error in '{path}': {source}")]
    #[diagnostic(
        code(copyguard::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    // --- PAYLOADS / REPORTS ---
    #[error("JSON Error: {0}")]
    #[diagnostic(code(copyguard::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(copyguard::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found: {0}")]
    #[diagnostic(
        code(copyguard::infra::config_missing),
        help("Create a copyguard.yaml at the project root, or pass --project-dir.")
    )]
    ConfigNotFound(String),
}
