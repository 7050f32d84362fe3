//! Tuner engine - orchestrator for one tuning session
//!
//! Owns the schema registry, descriptor table, accessor cache, snapshots,
//! history, debounce controller and notifier, and exposes the public
//! operation surface (get/set/apply/revert/load/export/undo/redo). All
//! operations run synchronously on the host's update tick; nothing here
//! blocks, and no failure in the pipeline is fatal to the caller.

use crate::binding::{AccessorCache, DescriptorTable};
use crate::commit::{CommitController, EditEvent};
use crate::config::EngineConfig;
use crate::events::{Notifier, SubscriptionId, PARAMETER_CHANGED};
use crate::schema::{ParamId, ParamValue, SchemaRegistry};
use crate::store::{ChangeLog, ParamStore, Snapshot, StageOutcome};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Live parameter-tuning engine bound to a target graph of type `T`.
pub struct TunerEngine<T> {
    schema: SchemaRegistry,
    table: Rc<DescriptorTable<T>>,
    cache: Option<AccessorCache<T>>,
    store: ParamStore,
    history: ChangeLog,
    commit: CommitController,
    notifier: Notifier,
    live_apply: bool,
}

impl<T> TunerEngine<T> {
    pub fn new(schema: SchemaRegistry, table: DescriptorTable<T>, config: &EngineConfig) -> Self {
        Self {
            schema,
            table: Rc::new(table),
            cache: None,
            store: ParamStore::new(),
            history: ChangeLog::new(),
            commit: CommitController::new(Duration::from_millis(config.debounce_ms), config.step),
            notifier: Notifier::new(),
            live_apply: config.live_apply,
        }
    }

    // ------------------------------------------------------------------
    // Bind lifecycle
    // ------------------------------------------------------------------

    /// (Re)bind to a live target graph: rebuild the accessor cache,
    /// recapture both snapshots, and discard history and pending debounce
    /// state from any prior session.
    pub fn bind(&mut self, target: &Rc<RefCell<T>>) {
        info!("Binding to target graph ({} schema entries)", self.schema.len());
        let cache = AccessorCache::build(&self.schema, self.table.clone(), target);
        self.store.populate(&self.schema, &cache);
        self.cache = Some(cache);
        self.history.clear();
        self.commit.reset();
    }

    /// Tear down bindings when the target graph disappears. Stored values
    /// stay readable; every physical operation becomes a no-op.
    pub fn unbind(&mut self) {
        if self.cache.take().is_some() {
            info!("Unbound from target graph");
        }
        self.commit.reset();
    }

    pub fn is_bound(&self) -> bool {
        self.cache.as_ref().map(|c| c.is_alive()).unwrap_or(false)
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    // ------------------------------------------------------------------
    // Store operations
    // ------------------------------------------------------------------

    /// Current value of a parameter. Falls back to the schema default when
    /// the key is absent, and to the sentinel for unknown parameters.
    pub fn get(&self, component: &str, field: &str) -> ParamValue {
        if let Some(value) = self.store.get(component, field) {
            return value;
        }
        self.schema
            .get(component, field)
            .map(|e| e.default)
            .unwrap_or(ParamValue::Unavailable)
    }

    /// Commit a value: clamp, stage, record history, notify, and (with
    /// live-apply on) push straight to the target. Returns whether the
    /// stored value actually changed.
    pub fn set(&mut self, component: &str, field: &str, value: ParamValue) -> bool {
        let Some(entry) = self.schema.get(component, field) else {
            warn!("Set on unknown parameter {component}.{field}; ignored");
            return false;
        };
        match self.store.stage(entry, value) {
            StageOutcome::Committed(record) => {
                self.history.record(record.clone());
                self.notifier.dispatch(PARAMETER_CHANGED, &record.id, record.new);
                if self.live_apply {
                    if let Some(cache) = &self.cache {
                        cache.write(component, field, record.new);
                    }
                }
                true
            },
            StageOutcome::Unchanged | StageOutcome::Unavailable => false,
        }
    }

    /// Push every current value to the target (bulk sync, best-effort).
    pub fn apply(&self) {
        if let Some(cache) = &self.cache {
            self.store.apply(cache);
        }
    }

    /// Restore the bind-time originals on both the target and `current`.
    /// The snapshot copy happens even while unbound; only the physical
    /// pushes need a live target. History referencing post-revert values
    /// would be misleading, so both stacks are cleared.
    pub fn revert(&mut self) {
        match &self.cache {
            Some(cache) => self.store.revert(cache),
            None => self.store.reset_to_original(),
        }
        self.history.clear();
    }

    /// Merge an external snapshot into `current` (unknown keys accepted)
    /// and push the result to the target.
    pub fn load(&mut self, snapshot: &Snapshot) {
        self.store.merge(&self.schema, snapshot);
        self.apply();
    }

    /// Deep copy of `current` for serialization.
    pub fn export(&self) -> Snapshot {
        self.store.export()
    }

    /// The snapshot captured at the most recent bind.
    pub fn original(&self) -> &Snapshot {
        self.store.original()
    }

    /// Declared `(min, max)` range of a parameter.
    pub fn get_range(&self, id: &ParamId) -> Option<(f64, f64)> {
        self.schema.range(id)
    }

    /// Toggle live-apply. When off, `set` only stages values in `current`
    /// until the next bulk `apply`.
    pub fn set_live_apply(&mut self, enabled: bool) {
        debug!("Live apply {}", if enabled { "enabled" } else { "disabled" });
        self.live_apply = enabled;
    }

    pub fn live_apply(&self) -> bool {
        self.live_apply
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    /// Undo the last committed change. Returns the parameter that moved.
    pub fn undo(&mut self) -> Option<ParamId> {
        let record = self.history.undo()?;
        self.reapply(&record.id, record.old);
        Some(record.id)
    }

    /// Redo the last undone change. Returns the parameter that moved.
    pub fn redo(&mut self) -> Option<ParamId> {
        let record = self.history.redo()?;
        self.reapply(&record.id, record.new);
        Some(record.id)
    }

    /// Apply a historical value without touching history again.
    fn reapply(&mut self, id: &ParamId, value: ParamValue) {
        self.store.restore(&id.component, &id.field, value);
        self.notifier.dispatch(PARAMETER_CHANGED, id, value);
        if self.live_apply {
            if let Some(cache) = &self.cache {
                cache.write(&id.component, &id.field, value);
            }
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    // ------------------------------------------------------------------
    // Interactive edits (debounced commit path)
    // ------------------------------------------------------------------

    /// Queue a discrete press/release event from the host input layer.
    pub fn push_edit(&mut self, event: EditEvent) {
        self.commit.push_event(event);
    }

    /// Advance the interactive edit state by one host tick.
    pub fn tick(&mut self, now: Instant) {
        let store = &self.store;
        self.commit
            .tick(now, &self.schema, |id| store.get(&id.component, &id.field));
    }

    /// Fire the debounced commit if its quiet window has elapsed.
    /// Returns the number of parameters that actually changed.
    pub fn poll_commits(&mut self, now: Instant) -> usize {
        match self.commit.take_ready(now) {
            Some(staged) => self.commit_staged(staged),
            None => 0,
        }
    }

    /// Commit every staged preview immediately, bypassing the debounce.
    pub fn flush_now(&mut self) -> usize {
        let staged = self.commit.flush_now();
        self.commit_staged(staged)
    }

    /// Display-layer preview value for a parameter being edited.
    pub fn preview(&self, id: &ParamId) -> Option<ParamValue> {
        self.commit.preview(id)
    }

    fn commit_staged(&mut self, staged: Vec<(ParamId, ParamValue)>) -> usize {
        let mut changed = 0usize;
        for (id, value) in staged {
            if self.set(&id.component, &id.field, value) {
                changed += 1;
            }
        }
        if changed > 0 {
            debug!("Debounced commit applied {changed} parameter(s)");
        }
        changed
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn subscribe(
        &mut self,
        event: &str,
        listener: impl Fn(&ParamId, ParamValue) -> Result<()> + 'static,
    ) -> SubscriptionId {
        self.notifier.subscribe(event, listener)
    }

    pub fn unsubscribe(&mut self, event: &str, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(event, id)
    }
}
