//! crossing: agents spaced around a ring fly to the opposite side.
//!
//! Every straight path passes through the centre, so the run exercises
//! shadow overlap, replanning and (at higher densities) stalls.
//!
//! ```text
//! crossing [CONFIG.json] [OUTPUT_DIR]
//! ```
//!
//! `CONFIG.json` holds any subset of `SimConfig` fields; missing ones take
//! their defaults.  Logging is controlled by `RUST_LOG` (default `info`).
//!
//! Output goes to CSV files in `OUTPUT_DIR`, or to `OUTPUT_DIR/output.db`
//! when built with the `sqlite` feature.

use std::f64::consts::TAU;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ps_core::{AgentId, SimConfig, SimRng, Vec3};
use ps_output::SimOutputObserver;
#[cfg(not(feature = "sqlite"))]
use ps_output::CsvWriter;
#[cfg(feature = "sqlite")]
use ps_output::SqliteWriter;
use ps_sim::SimBuilder;

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:    u32 = 8;
const RING_RADIUS:    f64 = 30.0;
const CRUISE_ALT:     f64 = 20.0;
/// Uniform jitter applied to each start bearing, in radians.
const BEARING_JITTER: f64 = 0.05;
/// Uniform jitter applied to each start and goal altitude, in metres.
const ALT_JITTER:     f64 = 1.0;

// ── Scenario ──────────────────────────────────────────────────────────────────

fn load_config(path: Option<&str>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening config {path}"))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {path}"))
}

/// `(id, start, goal)` for each agent on the ring.
fn ring(config: &SimConfig) -> Vec<(AgentId, Vec3, Vec3)> {
    let mut rng = SimRng::new(config.seed);
    (0..AGENT_COUNT)
        .map(|i| {
            let id = AgentId(i);
            let mut agent_rng = rng.for_agent(id);
            let bearing = TAU * i as f64 / AGENT_COUNT as f64
                + agent_rng.gen_range(-BEARING_JITTER..=BEARING_JITTER);
            let (s, c) = bearing.sin_cos();
            let start = Vec3::new(
                RING_RADIUS * c,
                RING_RADIUS * s,
                CRUISE_ALT + agent_rng.gen_range(-ALT_JITTER..=ALT_JITTER),
            );
            let goal = Vec3::new(
                -RING_RADIUS * c,
                -RING_RADIUS * s,
                CRUISE_ALT + agent_rng.gen_range(-ALT_JITTER..=ALT_JITTER),
            );
            (id, start, goal)
        })
        .collect()
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().as_deref())?;
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("output/crossing"));

    info!(
        agents = AGENT_COUNT,
        steps = config.prediction_steps,
        threshold = config.collision_threshold,
        safe_distance = config.safe_distance,
        seed = config.seed,
        "crossing scenario"
    );

    // 1. Build sim.
    let mut builder = SimBuilder::new(config.clone());
    for (id, start, goal) in ring(&config) {
        builder = builder.agent(id, start, goal);
    }
    let mut sim = builder.build()?;

    // 2. Set up output.
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    #[cfg(not(feature = "sqlite"))]
    let writer = CsvWriter::new(&out_dir)?;
    #[cfg(feature = "sqlite")]
    let writer = SqliteWriter::new(&out_dir)?;
    let mut obs = SimOutputObserver::new(writer, &config);

    // 3. Run.
    let t0 = Instant::now();
    let outcome = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    info!(
        reason = ?outcome.reason,
        ticks = outcome.ticks_run,
        wall_secs = elapsed.as_secs_f64(),
        output = %out_dir.display(),
        "simulation complete"
    );

    // 4. Summary.
    let (_, summary) = obs.into_parts();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
