// copyguard-core/src/lib.rs

#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// The LLM is an external collaborator: we only know its shape.
pub mod ports;

// 2. Domain
// Rules, detection, scoring, slot contracts, brochure gate.
// Depends on nothing else (no infra, no app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Config files, rule pack discovery, JSON extraction, filesystem.
pub mod infrastructure;

// 4. Application (Use Cases)
// Evaluate, review, refine.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::CopyguardError;
