// copyguard-core/src/infrastructure/mod.rs

pub mod config;
pub mod error;
pub mod extraction;
pub mod fs;

pub use error::InfrastructureError;
