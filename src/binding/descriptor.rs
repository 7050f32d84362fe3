//! Capability descriptor table
//!
//! The build-time-registered replacement for runtime member discovery:
//! each (component, field) pair of the schema gets an ordered list of
//! typed accessor candidates against the concrete target type `T`. The
//! first candidate that probes successfully at bind time wins, which is
//! how renamed/legacy members ("aliases") are tolerated.

use crate::schema::{ParamKind, ParamValue};
use std::collections::HashMap;

/// Typed read capability against the target graph.
/// `None` means the member is not reachable on this particular target.
pub type ReadFn<T> = Box<dyn Fn(&T) -> Option<ParamValue>>;

/// Typed write capability. Returns `false` when the member is not
/// reachable; the caller logs and drops the write.
pub type WriteFn<T> = Box<dyn Fn(&mut T, ParamValue) -> bool>;

/// One resolvable member candidate (primary name or alias).
pub struct Candidate<T> {
    /// Member name this candidate targets, for logging only
    pub name: String,
    /// Physical kind on the target; writes are coerced to this
    pub kind: ParamKind,
    pub read: ReadFn<T>,
    pub write: Option<WriteFn<T>>,
}

/// Accessor declaration for one schema entry.
pub struct AccessorDescriptor<T> {
    pub component: String,
    pub field: String,
    /// Ordered candidates; empty means "member exists but its physical
    /// type is unsupported" and the entry binds as a no-op placeholder.
    pub candidates: Vec<Candidate<T>>,
    unsupported: bool,
}

impl<T> AccessorDescriptor<T> {
    pub fn new(component: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            field: field.into(),
            candidates: Vec::new(),
            unsupported: false,
        }
    }

    /// Declare an entry whose physical type is not {Float,Int,Bool,Enum}-
    /// compatible. It stays in the store as a placeholder; reads and
    /// writes on it are no-ops.
    pub fn unsupported(component: impl Into<String>, field: impl Into<String>) -> Self {
        let mut d = Self::new(component, field);
        d.unsupported = true;
        d
    }

    pub fn is_unsupported(&self) -> bool {
        self.unsupported
    }

    /// Add a read/write candidate (builder style).
    pub fn candidate(
        mut self,
        name: &str,
        kind: ParamKind,
        read: impl Fn(&T) -> Option<ParamValue> + 'static,
        write: impl Fn(&mut T, ParamValue) -> bool + 'static,
    ) -> Self {
        self.candidates.push(Candidate {
            name: name.to_string(),
            kind,
            read: Box::new(read),
            write: Some(Box::new(write)),
        });
        self
    }

    /// Add a read-only candidate.
    pub fn candidate_read_only(
        mut self,
        name: &str,
        kind: ParamKind,
        read: impl Fn(&T) -> Option<ParamValue> + 'static,
    ) -> Self {
        self.candidates.push(Candidate {
            name: name.to_string(),
            kind,
            read: Box::new(read),
            write: None,
        });
        self
    }
}

/// Synthesize one descriptor per channel of a composite value (e.g. a
/// 4-channel color bound to one physical property). Channel reads
/// decompose the composite; channel writes re-read the whole composite,
/// replace the one channel and write it back (read-modify-write).
pub fn composite_channels<T, R, W>(
    component: &str,
    channels: &[&str],
    read_all: R,
    write_all: W,
) -> Vec<AccessorDescriptor<T>>
where
    R: Fn(&T) -> Option<Vec<f64>> + Clone + 'static,
    W: Fn(&mut T, Vec<f64>) -> bool + Clone + 'static,
{
    channels
        .iter()
        .enumerate()
        .map(|(idx, channel)| {
            let read = read_all.clone();
            let read_for_write = read_all.clone();
            let write = write_all.clone();
            AccessorDescriptor::new(component, *channel).candidate(
                channel,
                ParamKind::Float,
                move |t: &T| read(t).and_then(|c| c.get(idx).copied()).map(ParamValue::Float),
                move |t: &mut T, v: ParamValue| {
                    let Some(mut composite) = read_for_write(t) else {
                        return false;
                    };
                    let Some(value) = v.as_f64() else {
                        return false;
                    };
                    if idx >= composite.len() {
                        return false;
                    }
                    composite[idx] = value;
                    write(t, composite)
                },
            )
        })
        .collect()
}

/// All registered descriptors for one target type.
pub struct DescriptorTable<T> {
    map: HashMap<(String, String), AccessorDescriptor<T>>,
}

impl<T> Default for DescriptorTable<T> {
    fn default() -> Self {
        Self { map: HashMap::new() }
    }
}

impl<T> DescriptorTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: AccessorDescriptor<T>) {
        let key = (descriptor.component.clone(), descriptor.field.clone());
        self.map.insert(key, descriptor);
    }

    pub fn register_all(&mut self, descriptors: Vec<AccessorDescriptor<T>>) {
        for d in descriptors {
            self.register(d);
        }
    }

    pub fn get(&self, component: &str, field: &str) -> Option<&AccessorDescriptor<T>> {
        self.map.get(&(component.to_string(), field.to_string()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
