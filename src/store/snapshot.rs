//! Snapshot type - a full mapping of parameter values
//!
//! Serialized shape is a plain `component -> field -> value` mapping where
//! values are numbers, booleans, or `null` for the unavailable sentinel.
//! Unknown keys on load are preserved, not rejected, so older snapshots
//! survive schema growth and newer snapshots survive schema shrinkage.

use crate::schema::{ParamId, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from component name to field name to value.
///
/// BTreeMaps keep the serialized form stable, which makes snapshot and
/// preset files diffable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<String, BTreeMap<String, ParamValue>>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, component: &str, field: &str) -> Option<ParamValue> {
        self.0.get(component).and_then(|fields| fields.get(field)).copied()
    }

    pub fn insert(&mut self, component: &str, field: &str, value: ParamValue) {
        self.0
            .entry(component.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }

    /// Iterate every (id, value) pair in key order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, ParamValue)> + '_ {
        self.0.iter().flat_map(|(component, fields)| {
            fields
                .iter()
                .map(move |(field, value)| (ParamId::new(component.clone(), field.clone()), *value))
        })
    }

    /// Total number of (component, field) keys.
    pub fn len(&self) -> usize {
        self.0.values().map(|fields| fields.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
