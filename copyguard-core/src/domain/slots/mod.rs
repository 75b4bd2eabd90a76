// copyguard-core/src/domain/slots/mod.rs

pub mod placeholder;
pub mod sanitizer;
pub mod spec;

// Re-exports
pub use placeholder::PlaceholderPatterns;
pub use sanitizer::SlotSanitizer;
pub use spec::{ModuleCatalog, ModuleInstance, ModuleSlotSpec, ModuleSpec, SlotType};
