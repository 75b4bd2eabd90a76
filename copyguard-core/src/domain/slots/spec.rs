// copyguard-core/src/domain/slots/spec.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use validator::Validate;

use crate::domain::error::DomainError;

const BUILTIN_CATALOG: &str = include_str!("../../../assets/modules.yaml");

/// Shape of one slot. Unknown type names deserialize to `Other` and pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringList,
    #[serde(rename = "kv_list")]
    KvList,
    #[serde(rename = "metric_list")]
    MetricList,
    #[serde(rename = "other", other)]
    Other,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::StringList => "string[]",
            Self::KvList => "kv_list",
            Self::MetricList => "metric_list",
            Self::Other => "other",
        }
    }

    /// Type-appropriate empty value.
    pub fn empty_value(&self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::StringList | Self::KvList | Self::MetricList => Value::Array(vec![]),
            Self::Other => Value::Null,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ModuleSlotSpec {
    #[validate(length(min = 1, message = "Slot key cannot be empty"))]
    pub key: String,

    #[serde(rename = "type")]
    pub slot_type: SlotType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "max_chars must be at least 1"))]
    pub max_chars: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "max_items must be at least 1"))]
    pub max_items: Option<usize>,

    #[serde(default)]
    pub required: bool,
}

impl ModuleSlotSpec {
    pub fn new(key: &str, slot_type: SlotType) -> Self {
        Self {
            key: key.to_string(),
            slot_type,
            max_chars: None,
            max_items: None,
            required: false,
        }
    }

    pub fn max_chars(mut self, n: usize) -> Self {
        self.max_chars = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A content block type and its slot schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ModuleSpec {
    #[validate(length(min = 1, message = "Module id cannot be empty"))]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Rule-registry module key used when scoring this block. Defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_key: Option<String>,

    #[validate(nested)]
    #[serde(default)]
    pub slots: Vec<ModuleSlotSpec>,
}

impl ModuleSpec {
    pub fn new(id: &str, slots: Vec<ModuleSlotSpec>) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            quality_key: None,
            slots,
        }
    }

    pub fn slot(&self, key: &str) -> Option<&ModuleSlotSpec> {
        self.slots.iter().find(|s| s.key == key)
    }

    pub fn quality_key(&self) -> &str {
        self.quality_key.as_deref().unwrap_or(&self.id)
    }

    pub fn check(&self) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidModuleSpec {
            module: self.id.clone(),
            reason,
        };
        self.validate().map_err(|e| invalid(e.to_string()))?;

        let mut keys = HashSet::with_capacity(self.slots.len());
        for slot in &self.slots {
            if !keys.insert(slot.key.as_str()) {
                return Err(invalid(format!("slot '{}' is declared twice", slot.key)));
            }
        }
        Ok(())
    }
}

/// One module placed in a document: its id and (possibly unsanitized) slot values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleInstance {
    #[serde(alias = "moduleId", alias = "id")]
    pub module_id: String,
    #[serde(default)]
    pub slots: Map<String, Value>,
}

impl ModuleInstance {
    /// Every string in the slot values, in key order, joined by newlines.
    pub fn flatten_text(&self) -> String {
        let mut parts = Vec::new();
        for value in self.slots.values() {
            collect_strings(value, &mut parts);
        }
        parts.join("\n")
    }

    /// Total number of list items across all slots.
    pub fn item_count(&self) -> usize {
        self.slots
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .sum()
    }
}

pub(crate) fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    modules: Vec<ModuleSpec>,
}

/// Module specs keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: BTreeMap<String, ModuleSpec>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, DomainError> {
        let file: CatalogFile =
            serde_yaml::from_str(content).map_err(|e| DomainError::RegistryError(e.to_string()))?;
        let mut catalog = Self::new();
        for spec in file.modules {
            catalog.insert(spec)?;
        }
        Ok(catalog)
    }

    /// Brochure modules shipped with the crate.
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Adds or replaces a module spec after validating it.
    pub fn insert(&mut self, spec: ModuleSpec) -> Result<(), DomainError> {
        spec.check()?;
        self.modules.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn merge(&mut self, other: ModuleCatalog) {
        self.modules.extend(other.modules);
    }

    pub fn get(&self, id: &str) -> Option<&ModuleSpec> {
        self.modules.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&ModuleSpec, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::ModuleNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
