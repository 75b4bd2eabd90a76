// copyguard-core/src/infrastructure/config/mod.rs

pub mod project;
pub mod rule_packs;

pub use crate::domain::project::ProjectConfig;
pub use project::{apply_env_overrides, load_project_config, load_project_config_or_default};
pub use rule_packs::{discover_rule_packs, load_rule_packs};
