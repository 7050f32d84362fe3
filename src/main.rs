//! livetune - live parameter tuning engine
//!
//! Binary entry point: runs a scripted tuning session against the demo
//! rig, exercising interactive debounced edits, undo/redo, snapshots and
//! presets.

use anyhow::Result;
use clap::Parser;
use livetune::commit::{EditEvent, StepDirection};
use livetune::demo::{demo_schema, demo_table, DemoRig};
use livetune::persist::{presets, save_snapshot, FileStore};
use livetune::schema::{ParamId, ParamValue};
use livetune::{EngineConfig, TunerEngine, PARAMETER_CHANGED};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Live parameter tuning - demo session against a simulated rig
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "livetune.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Load this preset before the session starts
    #[arg(long)]
    preset: Option<String>,

    /// Save the end-of-session state under this preset name
    #[arg(long)]
    save_preset: Option<String>,

    /// List stored presets and exit
    #[arg(long)]
    list_presets: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting livetune...");
    info!("Configuration file: {}", args.config);

    let config = EngineConfig::load_or_default(&args.config).await?;
    let store = FileStore::new(config.data_dir());
    info!("Data directory: {}", store.root().display());

    if args.list_presets {
        let names = presets::list_presets(&store).await?;
        if names.is_empty() {
            println!("No presets stored.");
        }
        for name in names {
            println!("{name}");
        }
        return Ok(());
    }

    let rig = Rc::new(RefCell::new(DemoRig::factory()));
    let mut engine = TunerEngine::new(demo_schema(), demo_table(), &config);
    engine.bind(&rig);

    engine.subscribe(PARAMETER_CHANGED, |id, value| {
        info!("Changed {id} -> {value}");
        Ok(())
    });

    if let Some(name) = &args.preset {
        match presets::load_preset(&store, name).await? {
            Some(snapshot) => {
                engine.load(&snapshot);
                info!("Preset '{name}' loaded");
            },
            None => info!("Preset '{name}' not found; starting from rig values"),
        }
    }

    run_session(&mut engine).await;

    report(&engine, &rig);

    save_snapshot(&store, "autosave.json", &engine.export()).await?;
    if let Some(name) = &args.save_preset {
        presets::save_preset(&store, name, &engine.export()).await?;
    }

    info!("Session complete");
    Ok(())
}

/// Scripted interaction: hold the stiffness control for ~30 frames,
/// release, let the debounce window elapse, then demonstrate direct sets
/// and undo/redo.
async fn run_session(engine: &mut TunerEngine<DemoRig>) {
    let stiffness = ParamId::new("Suspension", "stiffness");

    info!("Holding {stiffness} up for 30 frames...");
    engine.push_edit(EditEvent::Pressed {
        id: stiffness.clone(),
        direction: StepDirection::Up,
    });
    for _ in 0..30 {
        engine.tick(Instant::now());
        if let Some(preview) = engine.preview(&stiffness) {
            tracing::debug!("Preview {stiffness} = {preview}");
        }
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
    engine.push_edit(EditEvent::Released { id: stiffness.clone() });
    engine.tick(Instant::now());

    // keep ticking until the quiet window elapses and the commit fires
    loop {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let now = Instant::now();
        engine.tick(now);
        if engine.poll_commits(now) > 0 {
            break;
        }
    }

    info!("Direct edits with clamping...");
    engine.set("Engine", "power", ParamValue::Float(500_000.0)); // clamps
    engine.set("Engine", "launch_ctrl", ParamValue::Bool(true));
    engine.set("Headlamp", "b", ParamValue::Float(0.2));

    info!("Undo twice, redo once...");
    engine.undo();
    engine.undo();
    engine.redo();
}

fn report(engine: &TunerEngine<DemoRig>, rig: &Rc<RefCell<DemoRig>>) {
    for entry in engine.schema().iter() {
        let value = engine.get(&entry.component, &entry.field);
        info!("{:28} = {}", entry.id().to_string(), value);
    }
    let rig = rig.borrow();
    info!(
        "Rig physical state: stiffness={:.2} power={:.0} launch_ctrl={} color={:?}",
        rig.suspension.stiffness, rig.engine.power, rig.engine.launch_ctrl, rig.headlamp.color
    );
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
