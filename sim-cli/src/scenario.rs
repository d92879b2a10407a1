//! YAML scenarios for the headless driver.
//!
//! A scenario describes the world configuration, the bodies present before
//! the first tick, and a script of input events replayed between ticks:
//!
//! ```yaml
//! ticks: 600
//! report_every: 60
//! seed: 7
//! config:
//!   particle_count: 2000
//! attractors:
//!   - pos: [320.0, 240.0]
//!     r: 12.0
//!     power: 10.0
//! events:
//!   - tick: 120
//!     action: detonate
//!     at: [320.0, 240.0]
//! ```

use anyhow::{Context, Result};
use glam::DVec2;
use gravity_core::{Config, World};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Log a progress line every this many ticks; `0` disables it.
    #[serde(default = "default_report_every")]
    pub report_every: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub attractors: Vec<AttractorSpec>,
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

fn default_ticks() -> u64 {
    600
}

fn default_report_every() -> u64 {
    60
}

/// Initial body; missing radius and power fall back to the config defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct AttractorSpec {
    pub pos: DVec2,
    pub r: Option<f64>,
    pub power: Option<f64>,
    #[serde(default)]
    pub fixed: bool,
}

/// An input event applied right before tick number `tick` runs.
#[derive(Clone, Debug, Deserialize)]
pub struct ScriptedEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// Input actions, addressed by position the way a pointer would be.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Spawn {
        pos: DVec2,
        r: Option<f64>,
        power: Option<f64>,
        #[serde(default)]
        fixed: bool,
    },
    Detonate {
        at: DVec2,
    },
    Drag {
        from: DVec2,
        to: DVec2,
    },
    Release,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.events.sort_by_key(|e| e.tick);
        Ok(scenario)
    }

    /// Builds the world and inserts the initial bodies.
    pub fn build_world(&self, rng: &mut impl rand::Rng) -> Result<World> {
        let mut world = World::new(self.config, rng).context("invalid world config")?;
        for spec in &self.attractors {
            spawn(&mut world, spec.pos, spec.r, spec.power, spec.fixed);
        }
        Ok(world)
    }
}

fn spawn(world: &mut World, pos: DVec2, r: Option<f64>, power: Option<f64>, fixed: bool) {
    let cfg = world.config();
    let r = r.unwrap_or(cfg.default_radius);
    let power = power.unwrap_or(cfg.default_power);
    if world.spawn(pos, r, power, fixed).is_none() {
        warn!(x = pos.x, y = pos.y, r, power, "spawn: non-finite attractor skipped");
    }
}

/// Applies one scripted input action.
///
/// Actions that address an empty spot are logged and skipped.
pub fn apply(world: &mut World, action: &Action) {
    match *action {
        Action::Spawn {
            pos,
            r,
            power,
            fixed,
        } => spawn(world, pos, r, power, fixed),

        Action::Detonate { at } => match world.body_at(at) {
            Some(id) => {
                world.detonate(id);
            }
            None => warn!(x = at.x, y = at.y, "detonate: no attractor under pointer"),
        },

        Action::Drag { from, to } => match world.body_at(from) {
            Some(id) => {
                if world.drag(id, to) {
                    debug!(id, x = to.x, y = to.y, "dragged attractor");
                } else {
                    warn!(id, x = to.x, y = to.y, "drag: non-finite target ignored");
                }
            }
            None => warn!(x = from.x, y = from.y, "drag: no attractor under pointer"),
        },

        Action::Release => world.release_drag(),
    }
}
