//! Change notifier - named-event publish/subscribe
//!
//! Tells interested listeners "this parameter changed to this value"
//! without coupling them to the engine. Dispatch is synchronous and in
//! subscription order; a failing subscriber is logged and never prevents
//! the remaining subscribers from running.

use crate::schema::{ParamId, ParamValue};
use anyhow::Result;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

/// Event name fired on every committed parameter change.
pub const PARAMETER_CHANGED: &str = "OnParameterChanged";

/// Subscriber callback: receives the parameter id and its new value.
pub type ListenerFn = Rc<dyn Fn(&ParamId, ParamValue) -> Result<()>>;

/// Handle for unsubscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Simple named-event dispatcher.
#[derive(Default)]
pub struct Notifier {
    listeners: HashMap<String, Vec<(SubscriptionId, ListenerFn)>>,
    next_id: u64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for `event`. Returns a handle for `unsubscribe`.
    pub fn subscribe(
        &mut self,
        event: &str,
        listener: impl Fn(&ParamId, ParamValue) -> Result<()> + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a subscription. Returns whether anything was removed.
    pub fn unsubscribe(&mut self, event: &str, id: SubscriptionId) -> bool {
        match self.listeners.get_mut(event) {
            Some(subs) => {
                let before = subs.len();
                subs.retain(|(sub_id, _)| *sub_id != id);
                subs.len() != before
            },
            None => false,
        }
    }

    /// Invoke every subscriber of `event` synchronously, in subscription
    /// order. Errors are isolated per subscriber.
    pub fn dispatch(&self, event: &str, param: &ParamId, value: ParamValue) {
        let Some(subs) = self.listeners.get(event) else {
            return;
        };
        // clone the Rc list so a listener may subscribe/unsubscribe re-entrantly
        let subs: Vec<ListenerFn> = subs.iter().map(|(_, l)| l.clone()).collect();
        for listener in subs {
            if let Err(e) = listener(param, value) {
                warn!("Subscriber error for '{event}' ({param}): {e:#}");
            }
        }
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(|s| s.len()).unwrap_or(0)
    }
}
