//! The simulation world: owns the attractors and particles and runs ticks.
//!
//! External collaborators talk to the world through two surfaces:
//! - the frame driver calls [`World::tick`] once per frame;
//! - the input collaborator calls [`World::spawn`], [`World::drag`],
//!   [`World::release_drag`], [`World::detonate`] and [`World::body_at`].
//!
//! All of these take `&mut self`, so input is always applied between ticks
//! and never in the middle of a pass.

use crate::{
    attractor::{AttractorBody, AttractorSet},
    config::Config,
    error::ConfigError,
    particle::{Particle, ParticleSet},
    phases::{self, MergeEvent, Removal},
    types::BodyId,
};
use glam::DVec2;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

/// What happened to the attractors during one [`World::tick`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1 for the first tick.
    pub tick: u64,
    /// Bodies dropped after their removal animation settled.
    pub removed: Vec<Removal>,
    /// Absorptions resolved in the merge pass.
    pub merges: Vec<MergeEvent>,
}

#[derive(Debug)]
pub struct World {
    attractors: AttractorSet,
    particles: ParticleSet,
    cfg: Config,
    held: Option<BodyId>,
    ticks: u64,
}

impl World {
    /// Builds a world with `cfg.particle_count` particles scattered over the
    /// canvas and no attractors.
    ///
    /// ### Errors
    /// Returns the first [`ConfigError`] found by [`Config::validate`].
    pub fn new(cfg: Config, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let particles = ParticleSet::random_in_canvas(
            cfg.particle_count,
            cfg.canvas,
            cfg.particle_radius_min,
            cfg.particle_radius_max,
            rng,
        );
        Ok(Self::assemble(cfg, particles))
    }

    /// Builds a world around an explicit particle population.
    ///
    /// `cfg.particle_count` is ignored; the canvas extent is taken from
    /// `cfg.canvas`.
    pub fn with_particles(cfg: Config, particles: Vec<Particle>) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let particles = ParticleSet {
            particles,
            extent: cfg.canvas,
        };
        Ok(Self::assemble(cfg, particles))
    }

    fn assemble(cfg: Config, particles: ParticleSet) -> Self {
        debug!(
            particles = particles.len(),
            width = cfg.canvas.x,
            height = cfg.canvas.y,
            "world created"
        );
        Self {
            attractors: AttractorSet::new(),
            particles,
            cfg,
            held: None,
            ticks: 0,
        }
    }

    /// Advances the simulation by one discrete step.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;

        let removed = phases::growth_phase(&mut self.attractors);
        phases::attraction_phase(&mut self.attractors, &self.cfg, self.held);
        let merges = phases::merge_phase(&mut self.attractors, &self.cfg);
        phases::particle_phase(&mut self.particles, &self.attractors, &self.cfg);

        if let Some(id) = self.held
            && self.attractors.get(id).is_none()
        {
            debug!(id, "held attractor is gone, releasing drag");
            self.held = None;
        }

        trace!(
            tick = self.ticks,
            bodies = self.attractors.len(),
            merges = merges.len(),
            removed = removed.len(),
            "tick"
        );

        TickReport {
            tick: self.ticks,
            removed,
            merges,
        }
    }

    /// Inserts a body that starts growing from a zero display radius.
    ///
    /// Returns `None` and inserts nothing if `pos`, `r` or `power` is not
    /// finite.
    pub fn spawn(&mut self, pos: DVec2, r: f64, power: f64, fixed: bool) -> Option<BodyId> {
        let Some(id) = self.attractors.spawn(pos, r, power, fixed, &self.cfg) else {
            debug!(x = pos.x, y = pos.y, r, power, "rejected non-finite spawn");
            return None;
        };
        debug!(id, x = pos.x, y = pos.y, r, power, fixed, "attractor spawned");
        Some(id)
    }

    /// Spawns a free body with the configured default radius and power.
    pub fn spawn_default(&mut self, pos: DVec2) -> Option<BodyId> {
        self.spawn(pos, self.cfg.default_radius, self.cfg.default_power, false)
    }

    /// Marks a body for removal after one last, larger growth pulse.
    ///
    /// Returns `false` and does nothing if `id` is not a live body.
    pub fn detonate(&mut self, id: BodyId) -> bool {
        let increment = self.cfg.detonate_increment;
        let Some(body) = self.attractors.get_mut(id) else {
            return false;
        };
        body.detonate(increment);
        debug!(id, r = body.r, "attractor detonated");
        true
    }

    /// Moves a body to `pos` and holds it there.
    ///
    /// A held body is skipped by the attraction pass until
    /// [`World::release_drag`] is called or another body is dragged. It still
    /// pulls other bodies and particles and can still merge.
    ///
    /// Returns `false` and does nothing if `id` is not a live body or `pos`
    /// is not finite.
    pub fn drag(&mut self, id: BodyId, pos: DVec2) -> bool {
        if !pos.is_finite() {
            return false;
        }
        let Some(body) = self.attractors.get_mut(id) else {
            return false;
        };
        body.pos = pos;
        self.held = Some(id);
        true
    }

    pub fn release_drag(&mut self) {
        self.held = None;
    }

    /// The body currently under direct control, if any.
    pub fn held(&self) -> Option<BodyId> {
        self.held
    }

    /// First body whose disc of radius `r` contains `point`.
    pub fn body_at(&self, point: DVec2) -> Option<BodyId> {
        self.attractors.body_at(point)
    }

    pub fn body(&self, id: BodyId) -> Option<&AttractorBody> {
        self.attractors.get(id)
    }

    pub fn attractors(&self) -> &[AttractorBody] {
        &self.attractors.bodies
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles.particles
    }

    /// Sum of `power` over the live bodies.
    pub fn total_power(&self) -> f64 {
        self.attractors.total_power()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
