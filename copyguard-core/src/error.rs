// copyguard-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyguardError {
    // --- DOMAIN ERRORS (registry, catalog) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, Parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- EXTERNAL COLLABORATORS ---
    #[error("Content generation failed: {0}")]
    Generation(String),

    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for CopyguardError {
    fn from(err: std::io::Error) -> Self {
        CopyguardError::Infrastructure(InfrastructureError::Io(err))
    }
}
