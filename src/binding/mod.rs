//! Accessor cache - resolved read/write bindings against a live target
//!
//! Resolves the schema against a target object graph at bind time and
//! mediates every physical read/write afterwards. The cache never owns the
//! target: it holds a weak reference, and every operation degrades to a
//! silent no-op once the graph is torn down. Binding failures are logged
//! once per bind and are never fatal.

pub mod descriptor;

use crate::schema::{ParamId, ParamValue, SchemaRegistry};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

pub use descriptor::{composite_channels, AccessorDescriptor, Candidate, DescriptorTable};

/// Resolution outcome for one schema entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindState {
    /// Resolved through the candidate at this index (0 = primary name)
    Bound { candidate: usize },
    /// No descriptor, or no candidate probed successfully
    Unbound,
    /// Declared unsupported physical type; permanent no-op placeholder
    Unsupported,
}

/// Resolved binding table for one bound session.
pub struct AccessorCache<T> {
    target: Weak<RefCell<T>>,
    table: Rc<DescriptorTable<T>>,
    bindings: HashMap<ParamId, BindState>,
}

impl<T> AccessorCache<T> {
    /// Resolve every schema entry against `target`.
    ///
    /// Candidates are probed in declaration order (primary name first,
    /// then aliases); the first successful read wins. Rebuilding against a
    /// new graph produces a fresh cache with no bindings into the old one.
    pub fn build(
        schema: &SchemaRegistry,
        table: Rc<DescriptorTable<T>>,
        target: &Rc<RefCell<T>>,
    ) -> Self {
        let mut bindings = HashMap::with_capacity(schema.len());

        for entry in schema.iter() {
            let id = entry.id();
            let state = match table.get(&entry.component, &entry.field) {
                None => {
                    warn!("No accessor descriptor for {id}; entry stays unbound");
                    BindState::Unbound
                },
                Some(desc) if desc.is_unsupported() => {
                    warn!("Unsupported type for {id}; reads/writes are no-ops");
                    BindState::Unsupported
                },
                Some(desc) => {
                    let graph = target.borrow();
                    let resolved = desc
                        .candidates
                        .iter()
                        .position(|c| (c.read)(&graph).is_some());
                    match resolved {
                        Some(0) => BindState::Bound { candidate: 0 },
                        Some(i) => {
                            warn!(
                                "Resolved {id} through alias '{}' (primary '{}' not present)",
                                desc.candidates[i].name, desc.candidates[0].name
                            );
                            BindState::Bound { candidate: i }
                        },
                        None => {
                            warn!("No candidate of {id} resolved on this target; unbound");
                            BindState::Unbound
                        },
                    }
                },
            };
            bindings.insert(id, state);
        }

        debug!("Accessor cache built: {} entries", bindings.len());
        Self {
            target: Rc::downgrade(target),
            table,
            bindings,
        }
    }

    /// Whether the entry resolved to a live member at bind time.
    pub fn is_bound(&self, component: &str, field: &str) -> bool {
        matches!(
            self.bindings.get(&ParamId::new(component, field)),
            Some(BindState::Bound { .. })
        )
    }

    /// Whether the backing target graph is still alive.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Read the physical value. Returns the sentinel if unbound, the
    /// target is gone, or the read itself fails; read errors are swallowed.
    pub fn read(&self, component: &str, field: &str) -> ParamValue {
        let id = ParamId::new(component, field);
        let Some(BindState::Bound { candidate }) = self.bindings.get(&id) else {
            return ParamValue::Unavailable;
        };
        let Some(graph) = self.target.upgrade() else {
            return ParamValue::Unavailable;
        };
        // descriptor presence is guaranteed by build()
        let Some(desc) = self.table.get(component, field) else {
            return ParamValue::Unavailable;
        };
        let guard = graph.borrow();
        match (desc.candidates[*candidate].read)(&guard) {
            Some(v) => v,
            None => {
                debug!("Read of {id} failed on live target; reporting unavailable");
                ParamValue::Unavailable
            },
        }
    }

    /// Write a value through the resolved binding.
    ///
    /// Silently returns when unbound, incapable, or the target is gone.
    /// The value is coerced to the candidate's physical kind first; a
    /// coercion failure drops the write (logged), leaving the target as-is.
    pub fn write(&self, component: &str, field: &str, value: ParamValue) {
        let id = ParamId::new(component, field);
        let Some(BindState::Bound { candidate }) = self.bindings.get(&id) else {
            return;
        };
        let Some(graph) = self.target.upgrade() else {
            return;
        };
        let Some(desc) = self.table.get(component, field) else {
            return;
        };
        let cand = &desc.candidates[*candidate];
        let Some(write) = cand.write.as_ref() else {
            debug!("{id} is read-only; write dropped");
            return;
        };
        let Some(coerced) = value.coerce(cand.kind) else {
            warn!("Cannot coerce {value} to {} for {id}; write dropped", cand.kind);
            return;
        };
        if !write(&mut graph.borrow_mut(), coerced) {
            warn!("Physical write of {id} failed; target member unreachable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ParamKind, SchemaEntry};

    struct Probe {
        gain: f64,
        // legacy spelling kept by some target builds
        legacy_trim: f64,
        modern_trim: Option<f64>,
    }

    fn probe_schema() -> SchemaRegistry {
        SchemaRegistry::new(vec![
            SchemaEntry::new("Probe", "gain", ParamKind::Float, ParamValue::Float(1.0), 0.0, 10.0),
            SchemaEntry::new("Probe", "trim", ParamKind::Float, ParamValue::Float(0.0), -1.0, 1.0),
            SchemaEntry::new("Probe", "label", ParamKind::Float, ParamValue::Float(0.0), 0.0, 1.0),
            SchemaEntry::new("Ghost", "missing", ParamKind::Float, ParamValue::Float(0.0), 0.0, 1.0),
        ])
    }

    fn probe_table() -> DescriptorTable<Probe> {
        let mut table = DescriptorTable::new();
        table.register(
            AccessorDescriptor::new("Probe", "gain").candidate(
                "gain",
                ParamKind::Float,
                |p: &Probe| Some(ParamValue::Float(p.gain)),
                |p: &mut Probe, v| {
                    p.gain = v.as_f64().unwrap_or(p.gain);
                    true
                },
            ),
        );
        // primary member is absent on this build; alias resolves
        table.register(
            AccessorDescriptor::new("Probe", "trim")
                .candidate(
                    "modern_trim",
                    ParamKind::Float,
                    |p: &Probe| p.modern_trim.map(ParamValue::Float),
                    |p: &mut Probe, v| {
                        match p.modern_trim.as_mut() {
                            Some(t) => {
                                *t = v.as_f64().unwrap_or(*t);
                                true
                            },
                            None => false,
                        }
                    },
                )
                .candidate(
                    "legacy_trim",
                    ParamKind::Float,
                    |p: &Probe| Some(ParamValue::Float(p.legacy_trim)),
                    |p: &mut Probe, v| {
                        p.legacy_trim = v.as_f64().unwrap_or(p.legacy_trim);
                        true
                    },
                ),
        );
        table.register(AccessorDescriptor::unsupported("Probe", "label"));
        table
    }

    fn bind_probe() -> (Rc<RefCell<Probe>>, AccessorCache<Probe>) {
        let rig = Rc::new(RefCell::new(Probe {
            gain: 2.5,
            legacy_trim: 0.25,
            modern_trim: None,
        }));
        let cache = AccessorCache::build(&probe_schema(), Rc::new(probe_table()), &rig);
        (rig, cache)
    }

    #[test]
    fn test_primary_resolution_and_write() {
        let (rig, cache) = bind_probe();
        assert!(cache.is_bound("Probe", "gain"));
        assert_eq!(cache.read("Probe", "gain"), ParamValue::Float(2.5));

        cache.write("Probe", "gain", ParamValue::Float(7.0));
        assert_eq!(rig.borrow().gain, 7.0);
    }

    #[test]
    fn test_alias_fallback_first_success_wins() {
        let (rig, cache) = bind_probe();
        assert!(cache.is_bound("Probe", "trim"));
        assert_eq!(cache.read("Probe", "trim"), ParamValue::Float(0.25));

        cache.write("Probe", "trim", ParamValue::Float(-0.5));
        assert_eq!(rig.borrow().legacy_trim, -0.5);
        assert!(rig.borrow().modern_trim.is_none());
    }

    #[test]
    fn test_unbound_and_unsupported_are_noops() {
        let (_rig, cache) = bind_probe();
        assert!(!cache.is_bound("Ghost", "missing"));
        assert_eq!(cache.read("Ghost", "missing"), ParamValue::Unavailable);
        assert_eq!(cache.read("Probe", "label"), ParamValue::Unavailable);
        // must not panic
        cache.write("Ghost", "missing", ParamValue::Float(1.0));
        cache.write("Probe", "label", ParamValue::Float(1.0));
    }

    #[test]
    fn test_dead_target_degrades_to_noop() {
        let (rig, cache) = bind_probe();
        drop(rig);
        assert!(!cache.is_alive());
        assert_eq!(cache.read("Probe", "gain"), ParamValue::Unavailable);
        cache.write("Probe", "gain", ParamValue::Float(9.0)); // silent
    }

    #[test]
    fn test_rebuild_does_not_retain_old_graph() {
        let schema = probe_schema();
        let table = Rc::new(probe_table());
        let first = Rc::new(RefCell::new(Probe {
            gain: 1.0,
            legacy_trim: 0.0,
            modern_trim: None,
        }));
        let cache = AccessorCache::build(&schema, table.clone(), &first);
        drop(cache);

        let second = Rc::new(RefCell::new(Probe {
            gain: 2.0,
            legacy_trim: 0.0,
            modern_trim: None,
        }));
        let cache = AccessorCache::build(&schema, table, &second);
        drop(first);
        // bindings must point at the new graph only
        assert_eq!(cache.read("Probe", "gain"), ParamValue::Float(2.0));
    }

    #[test]
    fn test_coercion_failure_drops_write() {
        let (rig, cache) = bind_probe();
        cache.write("Probe", "gain", ParamValue::Bool(true));
        assert_eq!(rig.borrow().gain, 2.5); // unchanged
    }
}
