//! Debounced commit controller
//!
//! Converts a stream of interactive preview edits (press-and-hold
//! increment/decrement) into discrete, rate-limited commits. The host
//! delivers discrete `Pressed`/`Released` events; while a control is held,
//! every tick steps a display-layer preview value without touching the
//! store, the target, or history. A release arms a wall-clock debounce
//! window that restarts on every further release and is contested by any
//! still-held control; once it elapses uncontested, all staged previews
//! are handed back for a single bulk commit.

use crate::schema::{ParamId, ParamKind, ParamValue, SchemaRegistry, VALUE_EPSILON};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default quiet period after the last release before a commit fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Default per-tick increment for float parameters.
pub const DEFAULT_STEP: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Discrete edit events delivered by the host input layer.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    Pressed { id: ParamId, direction: StepDirection },
    Released { id: ParamId },
}

/// Transient per-parameter preview state. Never persisted.
#[derive(Debug)]
struct PreviewState {
    value: ParamValue,
    initial: ParamValue,
    held: Option<StepDirection>,
    kind: ParamKind,
    min: f64,
    max: f64,
}

impl PreviewState {
    fn dirty(&self) -> bool {
        !self.value.approx_eq(&self.initial, VALUE_EPSILON)
    }
}

/// Per-session debounce state machine.
pub struct CommitController {
    window: Duration,
    step: f64,
    queue: VecDeque<EditEvent>,
    previews: HashMap<ParamId, PreviewState>,
    pending_since: Option<Instant>,
}

impl CommitController {
    pub fn new(window: Duration, step: f64) -> Self {
        Self {
            window,
            step,
            queue: VecDeque::new(),
            previews: HashMap::new(),
            pending_since: None,
        }
    }

    /// Queue an edit event for the next tick.
    pub fn push_event(&mut self, event: EditEvent) {
        self.queue.push_back(event);
    }

    /// Discard all pending previews and timers. Called on every bind so
    /// prior-session interaction cannot leak into the new one.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.previews.clear();
        self.pending_since = None;
    }

    /// Display-layer preview value for a parameter, if one is staged.
    pub fn preview(&self, id: &ParamId) -> Option<ParamValue> {
        self.previews.get(id).map(|p| p.value)
    }

    pub fn any_held(&self) -> bool {
        self.previews.values().any(|p| p.held.is_some())
    }

    pub fn commit_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Process queued events and advance held previews by one step.
    ///
    /// `current` supplies the stored value a preview starts from on the
    /// first press (falling back to the schema default when the store has
    /// no usable value).
    pub fn tick(
        &mut self,
        now: Instant,
        schema: &SchemaRegistry,
        current: impl Fn(&ParamId) -> Option<ParamValue>,
    ) {
        while let Some(event) = self.queue.pop_front() {
            match event {
                EditEvent::Pressed { id, direction } => {
                    let Some(entry) = schema.get_id(&id) else {
                        warn!("Edit event for unknown parameter {id}; ignored");
                        continue;
                    };
                    let preview = self.previews.entry(id.clone()).or_insert_with(|| {
                        let start = match current(&id) {
                            Some(v) if v.is_available() => v,
                            _ => entry.default,
                        };
                        PreviewState {
                            value: start,
                            initial: start,
                            held: None,
                            kind: entry.kind,
                            min: entry.min,
                            max: entry.max,
                        }
                    });
                    preview.held = Some(direction);
                    // booleans have no ramp; a press sets the staged value
                    if preview.kind == ParamKind::Bool {
                        preview.value = ParamValue::Bool(direction == StepDirection::Up);
                    }
                },
                EditEvent::Released { id } => {
                    if let Some(preview) = self.previews.get_mut(&id) {
                        preview.held = None;
                        self.pending_since = Some(now);
                        debug!("{id} released; commit pending (debounce)");
                    }
                },
            }
        }

        // one step per tick for every held numeric control
        let step = self.step;
        for (id, preview) in self.previews.iter_mut() {
            let Some(direction) = preview.held else { continue };
            let Some(value) = preview.value.as_f64() else { continue };
            let delta = match preview.kind {
                ParamKind::Float => step,
                ParamKind::Int | ParamKind::Enum => step.max(1.0),
                ParamKind::Bool => continue,
            };
            let next = match direction {
                StepDirection::Up => value + delta,
                StepDirection::Down => value - delta,
            };
            let stepped = preview.kind.clamp(ParamValue::Float(next), preview.min, preview.max);
            if stepped.is_available() && stepped != preview.value {
                debug!("Preview {id} -> {stepped}");
                preview.value = stepped;
            }
        }
    }

    /// Hand back every staged preview once the debounce window has
    /// elapsed uncontested. Returns `None` while the window is still open,
    /// contested by a held control, or nothing is pending.
    pub fn take_ready(&mut self, now: Instant) -> Option<Vec<(ParamId, ParamValue)>> {
        let since = self.pending_since?;
        if self.any_held() || now.duration_since(since) < self.window {
            return None;
        }
        Some(self.drain_staged())
    }

    /// Commit-all-now: bypass the debounce and flush every staged value.
    pub fn flush_now(&mut self) -> Vec<(ParamId, ParamValue)> {
        self.drain_staged()
    }

    fn drain_staged(&mut self) -> Vec<(ParamId, ParamValue)> {
        self.pending_since = None;
        let mut staged: Vec<(ParamId, ParamValue)> = Vec::new();
        for (id, preview) in self.previews.drain() {
            if !preview.dirty() {
                continue;
            }
            // enum and other kinds have no interactive ramp; drop at commit
            match preview.kind {
                ParamKind::Float | ParamKind::Int | ParamKind::Bool => {
                    staged.push((id, preview.value));
                },
                other => warn!("Dropping staged value for {id}: kind {other} not committable"),
            }
        }
        staged.sort_by(|(a, _), (b, _)| a.cmp(b));
        staged
    }
}

impl Default for CommitController {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaEntry, SchemaRegistry};

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new(vec![
            SchemaEntry::new(
                "Suspension",
                "stiffness",
                ParamKind::Float,
                ParamValue::Float(5.0),
                0.0,
                10.0,
            ),
            SchemaEntry::new(
                "Engine",
                "rev_limit",
                ParamKind::Int,
                ParamValue::Int(8000),
                1000.0,
                12000.0,
            ),
            SchemaEntry::new(
                "Engine",
                "launch_ctrl",
                ParamKind::Bool,
                ParamValue::Bool(false),
                0.0,
                1.0,
            ),
            SchemaEntry::new(
                "Engine",
                "map_select",
                ParamKind::Enum,
                ParamValue::Int(0),
                0.0,
                3.0,
            ),
        ])
    }

    fn stiffness_id() -> ParamId {
        ParamId::new("Suspension", "stiffness")
    }

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_hold_steps_preview_only() {
        let mut ctl = CommitController::new(DEFAULT_DEBOUNCE, 0.1);
        let schema = schema();
        let t0 = Instant::now();

        ctl.push_event(EditEvent::Pressed {
            id: stiffness_id(),
            direction: StepDirection::Up,
        });
        for i in 0..5 {
            ctl.tick(at(t0, i), &schema, |_| Some(ParamValue::Float(5.0)));
        }

        let preview = ctl.preview(&stiffness_id()).unwrap();
        assert!(preview.approx_eq(&ParamValue::Float(5.5), VALUE_EPSILON));
        // nothing committed while held
        assert!(ctl.take_ready(at(t0, 10_000)).is_none());
    }

    #[test]
    fn test_release_then_quiet_window_commits_once() {
        let mut ctl = CommitController::new(Duration::from_millis(200), 0.1);
        let schema = schema();
        let t0 = Instant::now();

        ctl.push_event(EditEvent::Pressed {
            id: stiffness_id(),
            direction: StepDirection::Up,
        });
        for i in 0..10 {
            ctl.tick(at(t0, i * 16), &schema, |_| Some(ParamValue::Float(5.0)));
        }
        ctl.push_event(EditEvent::Released { id: stiffness_id() });
        ctl.tick(at(t0, 200), &schema, |_| Some(ParamValue::Float(5.0)));

        // window not elapsed yet
        assert!(ctl.take_ready(at(t0, 300)).is_none());

        let staged = ctl.take_ready(at(t0, 400)).unwrap();
        assert_eq!(staged.len(), 1);
        assert!(staged[0].1.approx_eq(&ParamValue::Float(6.0), VALUE_EPSILON));

        // drained: a second poll yields nothing
        assert!(ctl.take_ready(at(t0, 500)).is_none());
    }

    #[test]
    fn test_window_restarts_on_every_release() {
        let mut ctl = CommitController::new(Duration::from_millis(200), 0.1);
        let schema = schema();
        let t0 = Instant::now();
        let current = |_: &ParamId| Some(ParamValue::Float(5.0));

        // first press/release
        ctl.push_event(EditEvent::Pressed {
            id: stiffness_id(),
            direction: StepDirection::Up,
        });
        ctl.tick(at(t0, 0), &schema, current);
        ctl.push_event(EditEvent::Released { id: stiffness_id() });
        ctl.tick(at(t0, 16), &schema, current);

        // rapid second press/release 100ms later restarts the window
        ctl.push_event(EditEvent::Pressed {
            id: stiffness_id(),
            direction: StepDirection::Up,
        });
        ctl.tick(at(t0, 116), &schema, current);
        ctl.push_event(EditEvent::Released { id: stiffness_id() });
        ctl.tick(at(t0, 132), &schema, current);

        // 216ms: past the first release's window, inside the second's
        assert!(ctl.take_ready(at(t0, 216)).is_none());
        // the burst coalesces into one commit
        let staged = ctl.take_ready(at(t0, 340)).unwrap();
        assert_eq!(staged.len(), 1);
        assert!(staged[0].1.approx_eq(&ParamValue::Float(5.2), VALUE_EPSILON));
    }

    #[test]
    fn test_held_control_contests_the_window() {
        let mut ctl = CommitController::new(Duration::from_millis(200), 0.1);
        let schema = schema();
        let t0 = Instant::now();
        let current = |_: &ParamId| Some(ParamValue::Float(5.0));

        ctl.push_event(EditEvent::Pressed {
            id: stiffness_id(),
            direction: StepDirection::Up,
        });
        ctl.tick(at(t0, 0), &schema, current);
        ctl.push_event(EditEvent::Released { id: stiffness_id() });
        ctl.tick(at(t0, 16), &schema, current);

        // another control goes down before the window closes
        ctl.push_event(EditEvent::Pressed {
            id: ParamId::new("Engine", "rev_limit"),
            direction: StepDirection::Down,
        });
        ctl.tick(at(t0, 100), &schema, |_| Some(ParamValue::Int(8000)));

        assert!(ctl.take_ready(at(t0, 400)).is_none());
    }

    #[test]
    fn test_flush_now_bypasses_window() {
        let mut ctl = CommitController::new(Duration::from_millis(200), 0.1);
        let schema = schema();
        let t0 = Instant::now();

        ctl.push_event(EditEvent::Pressed {
            id: stiffness_id(),
            direction: StepDirection::Down,
        });
        ctl.tick(t0, &schema, |_| Some(ParamValue::Float(5.0)));
        ctl.push_event(EditEvent::Released { id: stiffness_id() });
        ctl.tick(at(t0, 16), &schema, |_| Some(ParamValue::Float(5.0)));

        let staged = ctl.flush_now();
        assert_eq!(staged.len(), 1);
        assert!(!ctl.commit_pending());
    }

    #[test]
    fn test_int_steps_whole_units_and_clamps() {
        let mut ctl = CommitController::new(DEFAULT_DEBOUNCE, 0.01);
        let schema = schema();
        let id = ParamId::new("Engine", "rev_limit");
        let t0 = Instant::now();

        ctl.push_event(EditEvent::Pressed {
            id: id.clone(),
            direction: StepDirection::Up,
        });
        for i in 0..3 {
            ctl.tick(at(t0, i), &schema, |_| Some(ParamValue::Int(11999)));
        }
        // steps of 1, clamped at the declared max
        assert_eq!(ctl.preview(&id), Some(ParamValue::Int(12000)));
    }

    #[test]
    fn test_bool_press_stages_without_ramp() {
        let mut ctl = CommitController::default();
        let schema = schema();
        let id = ParamId::new("Engine", "launch_ctrl");
        let t0 = Instant::now();

        ctl.push_event(EditEvent::Pressed {
            id: id.clone(),
            direction: StepDirection::Up,
        });
        ctl.tick(t0, &schema, |_| Some(ParamValue::Bool(false)));
        ctl.push_event(EditEvent::Released { id: id.clone() });
        ctl.tick(at(t0, 16), &schema, |_| Some(ParamValue::Bool(false)));

        let staged = ctl.take_ready(at(t0, 400)).unwrap();
        assert_eq!(staged, vec![(id, ParamValue::Bool(true))]);
    }

    #[test]
    fn test_enum_staged_values_dropped_at_commit() {
        let mut ctl = CommitController::new(DEFAULT_DEBOUNCE, 1.0);
        let schema = schema();
        let id = ParamId::new("Engine", "map_select");
        let t0 = Instant::now();

        ctl.push_event(EditEvent::Pressed {
            id: id.clone(),
            direction: StepDirection::Up,
        });
        ctl.tick(t0, &schema, |_| Some(ParamValue::Int(0)));
        ctl.push_event(EditEvent::Released { id });
        ctl.tick(at(t0, 16), &schema, |_| Some(ParamValue::Int(0)));

        let staged = ctl.take_ready(at(t0, 400)).unwrap();
        assert!(staged.is_empty());
    }

    #[test]
    fn test_unknown_param_event_ignored() {
        let mut ctl = CommitController::default();
        let schema = schema();
        ctl.push_event(EditEvent::Pressed {
            id: ParamId::new("Nope", "nothing"),
            direction: StepDirection::Up,
        });
        ctl.tick(Instant::now(), &schema, |_| None);
        assert!(ctl.preview(&ParamId::new("Nope", "nothing")).is_none());
    }

    #[test]
    fn test_reset_discards_pending_state() {
        let mut ctl = CommitController::default();
        let schema = schema();
        let t0 = Instant::now();

        ctl.push_event(EditEvent::Pressed {
            id: stiffness_id(),
            direction: StepDirection::Up,
        });
        ctl.tick(t0, &schema, |_| Some(ParamValue::Float(5.0)));
        ctl.push_event(EditEvent::Released { id: stiffness_id() });
        ctl.tick(at(t0, 16), &schema, |_| Some(ParamValue::Float(5.0)));

        ctl.reset();
        assert!(!ctl.commit_pending());
        assert!(ctl.take_ready(at(t0, 10_000)).is_none());
    }
}
