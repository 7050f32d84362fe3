//! Undo/redo history - two ordered stacks of committed changes

use crate::schema::{ParamId, ParamValue};
use tracing::debug;

/// One committed value change. Created only when a committed write
/// actually changed the stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub id: ParamId,
    pub old: ParamValue,
    pub new: ParamValue,
}

/// Linear undo/redo over parameter changes.
///
/// Standard two-stack design: `record` pushes to undo and invalidates
/// redo; `undo`/`redo` move one record between the stacks and hand it to
/// the caller, which is responsible for applying `old`/`new` respectively.
#[derive(Debug, Default)]
pub struct ChangeLog {
    undo_stack: Vec<ChangeRecord>,
    redo_stack: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed change. Any new change invalidates the redo stack.
    pub fn record(&mut self, record: ChangeRecord) {
        debug!("Recorded change: {} {} -> {}", record.id, record.old, record.new);
        self.undo_stack.push(record);
        self.redo_stack.clear();
    }

    /// Pop the last change for undoing. Returns `None` on an empty stack.
    pub fn undo(&mut self) -> Option<ChangeRecord> {
        let record = self.undo_stack.pop()?;
        debug!("Undo: {} => revert to {}", record.id, record.old);
        self.redo_stack.push(record.clone());
        Some(record)
    }

    /// Pop the last undone change for redoing. Returns `None` on an empty stack.
    pub fn redo(&mut self) -> Option<ChangeRecord> {
        let record = self.redo_stack.pop()?;
        debug!("Redo: {} => apply {}", record.id, record.new);
        self.undo_stack.push(record.clone());
        Some(record)
    }

    /// Drop all history (used on bind and on revert).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(field: &str, old: f64, new: f64) -> ChangeRecord {
        ChangeRecord {
            id: ParamId::new("Suspension", field),
            old: ParamValue::Float(old),
            new: ParamValue::Float(new),
        }
    }

    #[test]
    fn test_undo_redo_moves_single_record() {
        let mut log = ChangeLog::new();
        log.record(change("stiffness", 0.0, 7.0));

        let undone = log.undo().unwrap();
        assert_eq!(undone.old, ParamValue::Float(0.0));
        assert_eq!(log.undo_depth(), 0);
        assert_eq!(log.redo_depth(), 1);

        let redone = log.redo().unwrap();
        assert_eq!(redone.new, ParamValue::Float(7.0));
        assert_eq!(log.undo_depth(), 1);
        assert_eq!(log.redo_depth(), 0);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut log = ChangeLog::new();
        log.record(change("stiffness", 0.0, 7.0));
        log.undo().unwrap();
        assert_eq!(log.redo_depth(), 1);

        log.record(change("damping", 1.0, 2.0));
        assert_eq!(log.redo_depth(), 0);
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_underflow_is_noop() {
        let mut log = ChangeLog::new();
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_lifo_order() {
        let mut log = ChangeLog::new();
        log.record(change("stiffness", 0.0, 7.0));
        log.record(change("stiffness", 7.0, 2.0));

        assert_eq!(log.undo().unwrap().old, ParamValue::Float(7.0));
        assert_eq!(log.undo().unwrap().old, ParamValue::Float(0.0));
        assert_eq!(log.redo().unwrap().new, ParamValue::Float(7.0));
        assert_eq!(log.redo().unwrap().new, ParamValue::Float(2.0));
    }
}
