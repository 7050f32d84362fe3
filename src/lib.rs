//! livetune - live parameter tuning for running targets
//!
//! A tick-driven tuning engine that binds a declarative parameter schema
//! to a live object graph, stages clamped edits with undo/redo history,
//! debounces interactive press-and-hold edits into coalesced commits, and
//! round-trips the whole state through JSON snapshots and named presets.

pub mod binding;
pub mod commit;
pub mod config;
pub mod demo;
pub mod engine;
pub mod events;
pub mod persist;
pub mod schema;
pub mod store;

pub use binding::{AccessorCache, AccessorDescriptor, DescriptorTable};
pub use commit::{CommitController, EditEvent, StepDirection};
pub use config::EngineConfig;
pub use engine::TunerEngine;
pub use events::{Notifier, SubscriptionId, PARAMETER_CHANGED};
pub use schema::{ParamId, ParamKind, ParamValue, SchemaEntry, SchemaRegistry};
pub use store::{ChangeRecord, ParamStore, Snapshot};
