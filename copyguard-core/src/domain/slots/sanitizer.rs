// copyguard-core/src/domain/slots/sanitizer.rs

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::domain::error::DomainError;
use crate::domain::slots::placeholder::PlaceholderPatterns;
use crate::domain::slots::spec::{ModuleCatalog, ModuleInstance, ModuleSlotSpec, ModuleSpec, SlotType};

pub const KV_KEY_MAX_CHARS: usize = 24;
pub const KV_VALUE_MAX_CHARS: usize = 60;
pub const METRIC_LABEL_MAX_CHARS: usize = 24;
pub const METRIC_VALUE_MAX_CHARS: usize = 24;
pub const METRIC_NOTE_MAX_CHARS: usize = 60;

const MODULE_ID_FIELDS: [&str; 3] = ["id", "moduleId", "module_id"];

/// Coerces raw LLM slot values into the declared module shape.
///
/// Total and side-effect free: malformed input is absorbed (defaulted, coerced, dropped),
/// never reported as an error. Output is idempotent under re-sanitization.
#[derive(Debug, Clone)]
pub struct SlotSanitizer {
    placeholders: PlaceholderPatterns,
}

impl SlotSanitizer {
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self {
            placeholders: PlaceholderPatterns::new()?,
        })
    }

    pub fn with_placeholders(placeholders: PlaceholderPatterns) -> Self {
        Self { placeholders }
    }

    pub fn placeholders(&self) -> &PlaceholderPatterns {
        &self.placeholders
    }

    /// One entry per declared slot, in declaration order. Undeclared keys are dropped.
    pub fn sanitize_slots(&self, spec: &ModuleSpec, raw: &Value) -> Map<String, Value> {
        let mut out = Map::new();
        for slot in &spec.slots {
            let value = raw.get(&slot.key).unwrap_or(&Value::Null);
            out.insert(slot.key.clone(), self.sanitize_value(slot, value));
        }
        out
    }

    /// Slots of a single generated module. The reply may nest them (under `slots`, the
    /// module id or a `modules` list) or give them bare.
    pub fn sanitize_generated(&self, spec: &ModuleSpec, raw: &Value) -> Map<String, Value> {
        let slots = find_raw_module(raw, &spec.id).unwrap_or_else(|| slots_of(raw));
        self.sanitize_slots(spec, slots)
    }

    pub fn sanitize_value(&self, slot: &ModuleSlotSpec, raw: &Value) -> Value {
        if raw.is_null() {
            return slot.slot_type.empty_value();
        }
        match slot.slot_type {
            SlotType::String => Value::String(self.clean_text(&coerce_text(raw), slot.max_chars)),
            SlotType::StringList => {
                let items = as_items(raw)
                    .into_iter()
                    .filter(|v| v.is_string() || v.is_number())
                    .map(|v| self.clean_text(&coerce_text(v), slot.max_chars))
                    .filter(|s| !s.is_empty())
                    .map(Value::String);
                Value::Array(cap(items, slot.max_items))
            }
            SlotType::KvList => {
                let items = as_items(raw)
                    .into_iter()
                    .filter_map(|v| self.kv_entry(v));
                Value::Array(cap(items, slot.max_items))
            }
            SlotType::MetricList => {
                let items = as_items(raw)
                    .into_iter()
                    .filter_map(|v| self.metric_entry(v));
                Value::Array(cap(items, slot.max_items))
            }
            SlotType::Other => raw.clone(),
        }
    }

    /// Scrub placeholders, collapse whitespace, truncate without an ellipsis.
    /// Repeated until stable: truncation can expose a placeholder ("TODOS" cut to "TODO")
    /// and nested brackets peel one layer per pass. No pass ever lengthens the text.
    pub fn clean_text(&self, raw: &str, max_chars: Option<usize>) -> String {
        let mut current = raw.to_string();
        loop {
            let scrubbed = self.placeholders.scrub(&current);
            let collapsed = collapse_whitespace(&scrubbed);
            let next = match max_chars {
                Some(limit) => truncate_chars(&collapsed, limit),
                None => collapsed,
            };
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn kv_entry(&self, raw: &Value) -> Option<Value> {
        let (key, value) = match raw {
            Value::Object(map) => (
                field_text(map, &["key", "label", "name"]),
                field_text(map, &["value"]),
            ),
            Value::String(s) => match s.split_once(':') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (s.clone(), String::new()),
            },
            Value::Number(_) | Value::Bool(_) => (coerce_text(raw), String::new()),
            _ => return None,
        };
        let key = self.clean_text(&key, Some(KV_KEY_MAX_CHARS));
        if key.is_empty() {
            return None;
        }
        let value = self.clean_text(&value, Some(KV_VALUE_MAX_CHARS));

        let mut entry = Map::new();
        entry.insert("key".to_string(), Value::String(key));
        entry.insert("value".to_string(), Value::String(value));
        Some(Value::Object(entry))
    }

    fn metric_entry(&self, raw: &Value) -> Option<Value> {
        let (label, value, note) = match raw {
            Value::Object(map) => (
                field_text(map, &["label", "name"]),
                field_text(map, &["value"]),
                field_text(map, &["note"]),
            ),
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                (coerce_text(raw), String::new(), String::new())
            }
            _ => return None,
        };
        let label = self.clean_text(&label, Some(METRIC_LABEL_MAX_CHARS));
        if label.is_empty() {
            return None;
        }
        let value = self.clean_text(&value, Some(METRIC_VALUE_MAX_CHARS));
        let note = self.clean_text(&note, Some(METRIC_NOTE_MAX_CHARS));

        let mut entry = Map::new();
        entry.insert("label".to_string(), Value::String(label));
        entry.insert("value".to_string(), Value::String(value));
        if !note.is_empty() {
            entry.insert("note".to_string(), Value::String(note));
        }
        Some(Value::Object(entry))
    }

    /// Exactly one sanitized module per declared id, in declared order.
    /// Modules the LLM skipped come back with empty slots; ids without a spec get an empty map.
    pub fn sanitize_modules_by_spec<'c, S, F>(
        &self,
        module_ids: &[S],
        raw_modules: &Value,
        lookup: F,
    ) -> Vec<ModuleInstance>
    where
        S: AsRef<str>,
        F: Fn(&str) -> Option<&'c ModuleSpec>,
    {
        module_ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                let slots = match lookup(id) {
                    Some(spec) => {
                        let raw = find_raw_module(raw_modules, id).unwrap_or(&Value::Null);
                        self.sanitize_slots(spec, raw)
                    }
                    None => Map::new(),
                };
                ModuleInstance {
                    module_id: id.to_string(),
                    slots,
                }
            })
            .collect()
    }

    pub fn sanitize_with_catalog<S: AsRef<str>>(
        &self,
        module_ids: &[S],
        raw_modules: &Value,
        catalog: &ModuleCatalog,
    ) -> Vec<ModuleInstance> {
        self.sanitize_modules_by_spec(module_ids, raw_modules, |id| catalog.get(id))
    }
}

/// Locates the raw slot object for `id`. Accepts an array of modules (id under `id`,
/// `moduleId` or `module_id`, slots nested or inline), a map keyed by module id, or either
/// of those wrapped in a top-level `modules` field. First match wins.
fn find_raw_module<'v>(raw: &'v Value, id: &str) -> Option<&'v Value> {
    match raw {
        Value::Array(items) => items
            .iter()
            .find(|item| {
                MODULE_ID_FIELDS
                    .iter()
                    .any(|f| item.get(f).and_then(Value::as_str) == Some(id))
            })
            .map(slots_of),
        Value::Object(map) => {
            if let Some(found) = map.get(id) {
                return Some(slots_of(found));
            }
            match map.get("modules") {
                Some(inner @ (Value::Array(_) | Value::Object(_))) => find_raw_module(inner, id),
                _ => None,
            }
        }
        _ => None,
    }
}

fn slots_of(module: &Value) -> &Value {
    match module.get("slots") {
        Some(slots @ Value::Object(_)) => slots,
        _ => module,
    }
}

fn as_items(raw: &Value) -> Vec<&Value> {
    match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Null => vec![],
        other => vec![other],
    }
}

fn cap(items: impl Iterator<Item = Value>, max_items: Option<usize>) -> Vec<Value> {
    items.take(max_items.unwrap_or(usize::MAX)).collect()
}

fn field_text(map: &Map<String, Value>, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|n| map.get(*n).filter(|v| !v.is_null()))
        .map(coerce_text)
        .unwrap_or_default()
}

/// Scalars become text, arrays are joined with spaces, objects carry no usable text.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) | Value::Null => String::new(),
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character-based truncation. Never appends an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Ids of declared slots that are still empty after sanitization.
pub fn missing_required(spec: &ModuleSpec, slots: &Map<String, Value>) -> Vec<String> {
    let present: HashSet<&str> = slots
        .iter()
        .filter(|(_, v)| !is_empty_value(v))
        .map(|(k, _)| k.as_str())
        .collect();
    spec.slots
        .iter()
        .filter(|s| s.required && !present.contains(s.key.as_str()))
        .map(|s| s.key.clone())
        .collect()
}

pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
