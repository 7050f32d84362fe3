//! Schema & metadata registry
//!
//! The immutable declaration of every tunable (component, field) pair:
//! value kind, default, valid range and display metadata. Constructed once
//! at startup and passed by reference to everything that needs ranges or
//! kinds; there is no ambient global state.

pub mod value;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use value::{ParamKind, ParamValue, VALUE_EPSILON};

/// Identifier of one tunable parameter: `component` + `"."` + `field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId {
    pub component: String,
    pub field: String,
}

impl ParamId {
    pub fn new(component: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            field: field.into(),
        }
    }
}

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.component, self.field)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid param id '{0}': expected 'Component.field'")]
pub struct ParamIdError(String);

impl std::str::FromStr for ParamId {
    type Err = ParamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((comp, field)) if !comp.is_empty() && !field.is_empty() => {
                Ok(ParamId::new(comp, field))
            },
            _ => Err(ParamIdError(s.to_string())),
        }
    }
}

/// Static declaration of one tunable field
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub component: String,
    pub field: String,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub min: f64,
    pub max: f64,
    /// Human-readable name for editor surfaces
    pub display_name: String,
    pub description: String,
}

impl SchemaEntry {
    pub fn new(
        component: impl Into<String>,
        field: impl Into<String>,
        kind: ParamKind,
        default: ParamValue,
        min: f64,
        max: f64,
    ) -> Self {
        let component = component.into();
        let field = field.into();
        let display_name = field.clone();
        Self {
            component,
            field,
            kind,
            default,
            min,
            max,
            display_name,
            description: String::new(),
        }
    }

    /// Attach display metadata (builder style, used by schema tables).
    pub fn describe(mut self, display_name: &str, description: &str) -> Self {
        self.display_name = display_name.to_string();
        self.description = description.to_string();
        self
    }

    pub fn id(&self) -> ParamId {
        ParamId::new(self.component.clone(), self.field.clone())
    }

    /// Clamp a candidate value into this entry's declared range.
    pub fn clamp(&self, value: ParamValue) -> ParamValue {
        self.kind.clamp(value, self.min, self.max)
    }
}

/// Immutable registry of all schema entries, in declaration order.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    entries: Vec<SchemaEntry>,
    index: HashMap<(String, String), usize>,
}

impl SchemaRegistry {
    /// Build the registry. Later duplicates of a (component, field) pair
    /// replace earlier ones; the declaration order of first appearance is
    /// kept for iteration.
    pub fn new(entries: Vec<SchemaEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            let key = (entry.component.clone(), entry.field.clone());
            match registry.index.get(&key) {
                Some(&i) => registry.entries[i] = entry,
                None => {
                    registry.index.insert(key, registry.entries.len());
                    registry.entries.push(entry);
                },
            }
        }
        registry
    }

    pub fn get(&self, component: &str, field: &str) -> Option<&SchemaEntry> {
        self.index
            .get(&(component.to_string(), field.to_string()))
            .map(|&i| &self.entries[i])
    }

    pub fn get_id(&self, id: &ParamId) -> Option<&SchemaEntry> {
        self.get(&id.component, &id.field)
    }

    /// Declared `(min, max)` range for a parameter, if it is in the schema.
    pub fn range(&self, id: &ParamId) -> Option<(f64, f64)> {
        self.get_id(id).map(|e| (e.min, e.max))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> SchemaRegistry {
        SchemaRegistry::new(vec![
            SchemaEntry::new(
                "Suspension",
                "stiffness",
                ParamKind::Float,
                ParamValue::Float(5.0),
                0.0,
                10.0,
            )
            .describe("Stiffness", "Spring stiffness"),
            SchemaEntry::new(
                "Engine",
                "launch_ctrl",
                ParamKind::Bool,
                ParamValue::Bool(false),
                0.0,
                1.0,
            ),
        ])
    }

    #[test]
    fn test_param_id_round_trip() {
        let id: ParamId = "Suspension.stiffness".parse().unwrap();
        assert_eq!(id.component, "Suspension");
        assert_eq!(id.field, "stiffness");
        assert_eq!(id.to_string(), "Suspension.stiffness");
    }

    #[test]
    fn test_param_id_rejects_malformed() {
        assert!("nosuchthing".parse::<ParamId>().is_err());
        assert!(".field".parse::<ParamId>().is_err());
        assert!("Comp.".parse::<ParamId>().is_err());
    }

    #[test]
    fn test_registry_lookup_and_range() {
        let reg = sample_registry();
        assert_eq!(reg.len(), 2);
        let entry = reg.get("Suspension", "stiffness").unwrap();
        assert_eq!(entry.display_name, "Stiffness");
        assert_eq!(
            reg.range(&ParamId::new("Suspension", "stiffness")),
            Some((0.0, 10.0))
        );
        assert!(reg.get("Suspension", "missing").is_none());
    }

    #[test]
    fn test_registry_duplicate_replaces() {
        let reg = SchemaRegistry::new(vec![
            SchemaEntry::new("A", "x", ParamKind::Float, ParamValue::Float(1.0), 0.0, 1.0),
            SchemaEntry::new("A", "x", ParamKind::Float, ParamValue::Float(2.0), 0.0, 5.0),
        ]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("A", "x").unwrap().default, ParamValue::Float(2.0));
    }

    #[test]
    fn test_entry_clamp_uses_declared_range() {
        let reg = sample_registry();
        let entry = reg.get("Suspension", "stiffness").unwrap();
        assert_eq!(entry.clamp(ParamValue::Float(15.0)), ParamValue::Float(10.0));
        assert_eq!(entry.clamp(ParamValue::Float(-3.0)), ParamValue::Float(0.0));
    }
}
