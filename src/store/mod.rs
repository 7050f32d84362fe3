//! Parameter store - original/current snapshots and mediated writes
//!
//! Owns the two per-session snapshots (`original`, captured once at bind
//! time; `current`, mutated by everything afterwards) and implements the
//! clamp-then-commit pipeline every write goes through. Physical pushes go
//! through the accessor cache and are always best-effort: one field
//! failing never fails the bulk operation.

pub mod history;
pub mod snapshot;

use crate::binding::AccessorCache;
use crate::schema::{ParamValue, SchemaEntry, SchemaRegistry, VALUE_EPSILON};
use tracing::{debug, info};

pub use history::{ChangeLog, ChangeRecord};
pub use snapshot::Snapshot;

/// Outcome of staging a value into `current`.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Value changed; the record still needs history/notify/apply handling
    Committed(ChangeRecord),
    /// Clamped value equals the stored one (within epsilon)
    Unchanged,
    /// Entry is an unavailable placeholder; writes to it are no-ops
    Unavailable,
}

/// Holds `original` and `current` parameter snapshots for one session.
#[derive(Debug, Default)]
pub struct ParamStore {
    original: Snapshot,
    current: Snapshot,
    epsilon: f64,
}

impl ParamStore {
    pub fn new() -> Self {
        Self {
            original: Snapshot::new(),
            current: Snapshot::new(),
            epsilon: VALUE_EPSILON,
        }
    }

    /// Capture both snapshots from the live target at bind time.
    ///
    /// Every schema entry gets a key in both snapshots; entries whose
    /// binding did not resolve hold the unavailable sentinel, which keeps
    /// the original/current key invariant for the whole session.
    pub fn populate<T>(&mut self, schema: &SchemaRegistry, cache: &AccessorCache<T>) {
        let mut captured = Snapshot::new();
        for entry in schema.iter() {
            captured.insert(&entry.component, &entry.field, cache.read(&entry.component, &entry.field));
        }
        info!("Captured {} parameter values from target", captured.len());
        self.original = captured.clone();
        self.current = captured;
    }

    /// Value from `current`, or `None` if the key is absent.
    pub fn get(&self, component: &str, field: &str) -> Option<ParamValue> {
        self.current.get(component, field)
    }

    /// Stage a value into `current`: clamp to the schema range, compare
    /// against the stored value with a small epsilon, and update on a real
    /// change. Recording history, notifying and the live-apply push are the
    /// caller's job (see `TunerEngine::set`).
    pub fn stage(&mut self, entry: &SchemaEntry, value: ParamValue) -> StageOutcome {
        let old = match self.current.get(&entry.component, &entry.field) {
            Some(ParamValue::Unavailable) => {
                debug!("{}.{} is unavailable; set ignored", entry.component, entry.field);
                return StageOutcome::Unavailable;
            },
            Some(v) => v,
            None => entry.default,
        };

        let clamped = entry.clamp(value);
        if !clamped.is_available() {
            debug!(
                "{}.{} rejected {value}: not coercible to {}",
                entry.component, entry.field, entry.kind
            );
            return StageOutcome::Unavailable;
        }
        if clamped.approx_eq(&old, self.epsilon) {
            return StageOutcome::Unchanged;
        }

        self.current.insert(&entry.component, &entry.field, clamped);
        StageOutcome::Committed(ChangeRecord {
            id: entry.id(),
            old,
            new: clamped,
        })
    }

    /// Overwrite a value without clamping or change detection. Used by
    /// undo/redo, which re-applies values that already went through `stage`.
    pub fn restore(&mut self, component: &str, field: &str, value: ParamValue) {
        self.current.insert(component, field, value);
    }

    /// Push every entry of `current` to the target, best-effort per field.
    pub fn apply<T>(&self, cache: &AccessorCache<T>) {
        let mut pushed = 0usize;
        for (id, value) in self.current.iter() {
            if value.is_available() {
                cache.write(&id.component, &id.field, value);
                pushed += 1;
            }
        }
        debug!("Applied {pushed} parameters to target");
    }

    /// Push `original` to the target and overwrite `current` with it, so
    /// displayed values and stored values stay consistent after a revert.
    pub fn revert<T>(&mut self, cache: &AccessorCache<T>) {
        for (id, value) in self.original.iter() {
            if value.is_available() {
                cache.write(&id.component, &id.field, value);
            }
        }
        self.reset_to_original();
    }

    /// Overwrite `current` with `original` without touching the target.
    /// The store-side half of a revert; used on its own when no target is
    /// bound.
    pub fn reset_to_original(&mut self) {
        self.current = self.original.clone();
        info!("Reverted parameters to bind-time originals");
    }

    /// Merge an externally supplied snapshot into `current`.
    ///
    /// Keys known to the schema are clamped to their declared range; keys
    /// the schema does not know are stored as-is (forward/backward format
    /// drift tolerance). Pushing to the target is the caller's `apply`.
    pub fn merge(&mut self, schema: &SchemaRegistry, snapshot: &Snapshot) {
        let mut merged = 0usize;
        for (id, value) in snapshot.iter() {
            let value = match schema.get_id(&id) {
                Some(entry) => {
                    let clamped = entry.clamp(value);
                    if clamped.is_available() { clamped } else { value }
                },
                None => value,
            };
            self.current.insert(&id.component, &id.field, value);
            merged += 1;
        }
        info!("Merged {merged} values from snapshot");
    }

    /// Deep copy of `current`, suitable for serialization.
    pub fn export(&self) -> Snapshot {
        self.current.clone()
    }

    /// The bind-time `original` snapshot.
    pub fn original(&self) -> &Snapshot {
        &self.original
    }
}
