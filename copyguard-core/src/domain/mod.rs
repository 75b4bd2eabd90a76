// copyguard-core/src/domain/mod.rs

pub mod brochure;
pub mod error;
pub mod project;
pub mod quality;
pub mod slots;

// Handy re-exports to keep imports short elsewhere
pub use error::DomainError;
pub use project::ProjectConfig;
