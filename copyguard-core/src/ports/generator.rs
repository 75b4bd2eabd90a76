// copyguard-core/src/ports/generator.rs

// What the refinement loop needs from a language model, without knowing which one.
// Provider SDKs, retries and timeouts live in the adapter, not here.

use crate::error::CopyguardError;
use async_trait::async_trait;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns the raw model reply for `prompt`. Expected to contain a JSON object of slots,
    /// but nothing is assumed: extraction and sanitization absorb malformed replies.
    async fn generate(&self, prompt: &str) -> Result<String, CopyguardError>;
}
