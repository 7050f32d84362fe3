//! Demo target: a simulated snowmobile rig
//!
//! The schema table and descriptor table for a small vehicle model, used
//! by the binary for a scripted session and by integration-style tests.
//! It deliberately exercises the awkward cases: an optional sub-component,
//! a renamed member with a legacy alias, a composite color bound per
//! channel, an unsupported physical type and a schema entry with no
//! descriptor at all.

use crate::binding::{composite_channels, AccessorDescriptor, DescriptorTable};
use crate::schema::{ParamKind, ParamValue, SchemaEntry, SchemaRegistry};
use once_cell::sync::Lazy;

#[derive(Debug)]
pub struct Suspension {
    pub stiffness: f64,
    pub damping: f64,
    pub travel: f64,
    pub auto_level: bool,
}

#[derive(Debug)]
pub struct EngineBlock {
    pub power: f64,
    pub rev_limit: i64,
    pub launch_ctrl: bool,
    pub map_select: i64,
}

/// Newer rigs expose `damping`; older ones only carry `legacy_damping`.
#[derive(Debug)]
pub struct Stabilizer {
    pub damping: Option<f64>,
    pub legacy_damping: f64,
}

#[derive(Debug)]
pub struct Headlamp {
    /// RGBA, each channel in `[0, 1]`
    pub color: Vec<f64>,
}

#[derive(Debug)]
pub struct DemoRig {
    pub suspension: Suspension,
    pub engine: EngineBlock,
    /// Absent on rigs without the optional stabilizer module.
    pub stabilizer: Option<Stabilizer>,
    pub headlamp: Headlamp,
    pub firmware: String,
}

impl DemoRig {
    /// Factory-fresh rig with a legacy stabilizer (alias path exercised).
    pub fn factory() -> Self {
        Self {
            suspension: Suspension {
                stiffness: 5.0,
                damping: 0.5,
                travel: 0.3,
                auto_level: false,
            },
            engine: EngineBlock {
                power: 120_000.0,
                rev_limit: 8250,
                launch_ctrl: false,
                map_select: 0,
            },
            stabilizer: Some(Stabilizer {
                damping: None,
                legacy_damping: 0.35,
            }),
            headlamp: Headlamp {
                color: vec![1.0, 0.95, 0.8, 1.0],
            },
            firmware: "2.4.1".to_string(),
        }
    }
}

static DEMO_SCHEMA: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(vec![
        SchemaEntry::new(
            "Suspension",
            "stiffness",
            ParamKind::Float,
            ParamValue::Float(5.0),
            0.0,
            10.0,
        )
        .describe("Stiffness", "Spring stiffness of the rear suspension"),
        SchemaEntry::new(
            "Suspension",
            "damping",
            ParamKind::Float,
            ParamValue::Float(0.5),
            0.0,
            1.0,
        )
        .describe("Damping", "Rebound damping coefficient"),
        SchemaEntry::new(
            "Suspension",
            "travel",
            ParamKind::Float,
            ParamValue::Float(0.3),
            0.05,
            0.6,
        )
        .describe("Travel", "Usable suspension travel in meters"),
        SchemaEntry::new(
            "Suspension",
            "auto_level",
            ParamKind::Bool,
            ParamValue::Bool(false),
            0.0,
            1.0,
        )
        .describe("Auto level", "Self-leveling assist"),
        SchemaEntry::new(
            "Engine",
            "power",
            ParamKind::Float,
            ParamValue::Float(120_000.0),
            0.0,
            300_000.0,
        )
        .describe("Power", "Peak engine power in watts"),
        SchemaEntry::new(
            "Engine",
            "rev_limit",
            ParamKind::Int,
            ParamValue::Int(8250),
            1000.0,
            12000.0,
        )
        .describe("Rev limit", "Soft limiter in RPM"),
        SchemaEntry::new(
            "Engine",
            "launch_ctrl",
            ParamKind::Bool,
            ParamValue::Bool(false),
            0.0,
            1.0,
        )
        .describe("Launch control", "Hold revs at standstill"),
        SchemaEntry::new(
            "Engine",
            "map_select",
            ParamKind::Enum,
            ParamValue::Int(0),
            0.0,
            3.0,
        )
        .describe("Engine map", "0=eco 1=sport 2=race 3=custom"),
        SchemaEntry::new(
            "Stabilizer",
            "damping",
            ParamKind::Float,
            ParamValue::Float(0.35),
            0.0,
            1.0,
        )
        .describe("Stabilizer damping", "Steering stabilizer damping"),
        SchemaEntry::new("Headlamp", "r", ParamKind::Float, ParamValue::Float(1.0), 0.0, 1.0),
        SchemaEntry::new("Headlamp", "g", ParamKind::Float, ParamValue::Float(1.0), 0.0, 1.0),
        SchemaEntry::new("Headlamp", "b", ParamKind::Float, ParamValue::Float(1.0), 0.0, 1.0),
        SchemaEntry::new("Headlamp", "a", ParamKind::Float, ParamValue::Float(1.0), 0.0, 1.0),
        SchemaEntry::new(
            "Firmware",
            "version",
            ParamKind::Float,
            ParamValue::Unavailable,
            0.0,
            0.0,
        )
        .describe("Firmware", "Installed firmware version"),
        SchemaEntry::new(
            "Telemetry",
            "sample_rate",
            ParamKind::Int,
            ParamValue::Int(60),
            1.0,
            240.0,
        )
        .describe("Telemetry rate", "Samples per second"),
    ])
});

pub fn demo_schema() -> SchemaRegistry {
    DEMO_SCHEMA.clone()
}

/// Accessor descriptors binding the demo schema to [`DemoRig`].
/// `Telemetry.sample_rate` is intentionally left out so the unbound path
/// stays observable in a live session.
pub fn demo_table() -> DescriptorTable<DemoRig> {
    let mut table = DescriptorTable::new();

    table.register(AccessorDescriptor::new("Suspension", "stiffness").candidate(
        "stiffness",
        ParamKind::Float,
        |r: &DemoRig| Some(ParamValue::Float(r.suspension.stiffness)),
        |r: &mut DemoRig, v| match v.as_f64() {
            Some(f) => {
                r.suspension.stiffness = f;
                true
            },
            None => false,
        },
    ));
    table.register(AccessorDescriptor::new("Suspension", "damping").candidate(
        "damping",
        ParamKind::Float,
        |r: &DemoRig| Some(ParamValue::Float(r.suspension.damping)),
        |r: &mut DemoRig, v| match v.as_f64() {
            Some(f) => {
                r.suspension.damping = f;
                true
            },
            None => false,
        },
    ));
    table.register(AccessorDescriptor::new("Suspension", "travel").candidate(
        "travel",
        ParamKind::Float,
        |r: &DemoRig| Some(ParamValue::Float(r.suspension.travel)),
        |r: &mut DemoRig, v| match v.as_f64() {
            Some(f) => {
                r.suspension.travel = f;
                true
            },
            None => false,
        },
    ));
    table.register(AccessorDescriptor::new("Suspension", "auto_level").candidate(
        "auto_level",
        ParamKind::Bool,
        |r: &DemoRig| Some(ParamValue::Bool(r.suspension.auto_level)),
        |r: &mut DemoRig, v| match v.as_bool() {
            Some(b) => {
                r.suspension.auto_level = b;
                true
            },
            None => false,
        },
    ));

    table.register(AccessorDescriptor::new("Engine", "power").candidate(
        "power",
        ParamKind::Float,
        |r: &DemoRig| Some(ParamValue::Float(r.engine.power)),
        |r: &mut DemoRig, v| match v.as_f64() {
            Some(f) => {
                r.engine.power = f;
                true
            },
            None => false,
        },
    ));
    table.register(AccessorDescriptor::new("Engine", "rev_limit").candidate(
        "rev_limit",
        ParamKind::Int,
        |r: &DemoRig| Some(ParamValue::Int(r.engine.rev_limit)),
        |r: &mut DemoRig, v| match v.as_f64() {
            Some(f) => {
                r.engine.rev_limit = f as i64;
                true
            },
            None => false,
        },
    ));
    table.register(AccessorDescriptor::new("Engine", "launch_ctrl").candidate(
        "launch_ctrl",
        ParamKind::Bool,
        |r: &DemoRig| Some(ParamValue::Bool(r.engine.launch_ctrl)),
        |r: &mut DemoRig, v| match v.as_bool() {
            Some(b) => {
                r.engine.launch_ctrl = b;
                true
            },
            None => false,
        },
    ));
    table.register(AccessorDescriptor::new("Engine", "map_select").candidate(
        "map_select",
        ParamKind::Enum,
        |r: &DemoRig| Some(ParamValue::Int(r.engine.map_select)),
        |r: &mut DemoRig, v| match v.as_f64() {
            Some(f) => {
                r.engine.map_select = f as i64;
                true
            },
            None => false,
        },
    ));

    // renamed member: probe the modern name first, fall back to the alias
    table.register(
        AccessorDescriptor::new("Stabilizer", "damping")
            .candidate(
                "damping",
                ParamKind::Float,
                |r: &DemoRig| {
                    r.stabilizer
                        .as_ref()
                        .and_then(|s| s.damping)
                        .map(ParamValue::Float)
                },
                |r: &mut DemoRig, v| match (&mut r.stabilizer, v.as_f64()) {
                    (Some(s), Some(f)) if s.damping.is_some() => {
                        s.damping = Some(f);
                        true
                    },
                    _ => false,
                },
            )
            .candidate(
                "legacy_damping",
                ParamKind::Float,
                |r: &DemoRig| {
                    r.stabilizer
                        .as_ref()
                        .map(|s| ParamValue::Float(s.legacy_damping))
                },
                |r: &mut DemoRig, v| match (&mut r.stabilizer, v.as_f64()) {
                    (Some(s), Some(f)) => {
                        s.legacy_damping = f;
                        true
                    },
                    _ => false,
                },
            ),
    );

    table.register_all(composite_channels(
        "Headlamp",
        &["r", "g", "b", "a"],
        |r: &DemoRig| Some(r.headlamp.color.clone()),
        |r: &mut DemoRig, c| {
            r.headlamp.color = c;
            true
        },
    ));

    // string-typed member, no tunable representation
    table.register(AccessorDescriptor::unsupported("Firmware", "version"));

    table
}
