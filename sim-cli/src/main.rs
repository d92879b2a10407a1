//! Headless frame driver for the attractor gravity toy.
//!
//! Loads a YAML scenario, replays its scripted input between ticks, calls
//! [`World::tick`] once per frame and logs progress. With `--json` the final
//! attractor state is printed to stdout.

mod scenario;

use anyhow::Result;
use clap::Parser;
use gravity_core::{AttractorBody, World};
use rand::{Rng, SeedableRng, rngs::StdRng};
use scenario::Scenario;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const BUILTIN_SCENARIO: &str = include_str!("../scenarios/binary.yaml");

/// Run the attractor gravity simulation without a display
#[derive(Parser, Debug)]
#[command(name = "gravity-toy", long_about = None)]
struct Args {
    /// Scenario YAML file (defaults to the built-in binary-star scenario)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Override the number of ticks to run
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Override the particle placement seed
    #[arg(long)]
    seed: Option<u64>,

    /// Debug-level logging (ignored when RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,

    /// Print the final state as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    ticks: u64,
    seed: u64,
    merges: usize,
    removed: usize,
    total_power: f64,
    particles: usize,
    attractors: &'a [AttractorBody],
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::parse(BUILTIN_SCENARIO)?,
    };

    let seed = args
        .seed
        .or(scenario.seed)
        .unwrap_or_else(|| rand::rng().random());
    let ticks = args.ticks.unwrap_or(scenario.ticks);
    info!(seed, ticks, bodies = scenario.attractors.len(), "starting simulation");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = scenario.build_world(&mut rng)?;

    let (merges, removed) = run(&mut world, &scenario, ticks);

    info!(
        ticks = world.tick_count(),
        merges,
        removed,
        bodies = world.attractors().len(),
        total_power = world.total_power(),
        "simulation finished"
    );

    if args.json {
        let summary = Summary {
            ticks: world.tick_count(),
            seed,
            merges,
            removed,
            total_power: world.total_power(),
            particles: world.particles().len(),
            attractors: world.attractors(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Drives `ticks` frames, applying scripted events before the tick they name.
///
/// Returns the number of merges and settled removals seen.
fn run(world: &mut World, scenario: &Scenario, ticks: u64) -> (usize, usize) {
    let mut events = scenario.events.iter().peekable();
    let (mut merges, mut removed) = (0, 0);

    for tick in 1..=ticks {
        while let Some(event) = events.next_if(|e| e.tick <= tick) {
            scenario::apply(world, &event.action);
        }

        let report = world.tick();
        merges += report.merges.len();
        removed += report.removed.len();

        if scenario.report_every > 0 && tick % scenario.report_every == 0 {
            info!(
                tick,
                bodies = world.attractors().len(),
                total_power = world.total_power(),
                merges,
                removed,
                "progress"
            );
        }
    }

    (merges, removed)
}
