use crate::{attractor::AttractorBody, config::Config};
use glam::DVec2;
use rand::Rng;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

/// A massless trace particle pulled around by the attractors.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Particle {
    pub pos: DVec2,
    /// Position before the last integration step, for drawing trails.
    pub old_pos: DVec2,
    pub vel: DVec2,
    /// Recomputed from scratch every tick.
    pub acc: DVec2,
    pub radius: f64,
}

impl Particle {
    pub fn new(pos: DVec2, radius: f64) -> Self {
        Self {
            pos,
            old_pos: pos,
            vel: DVec2::ZERO,
            acc: DVec2::ZERO,
            radius,
        }
    }

    /// Resets the acceleration and sums the pull of every attractor.
    pub fn accumulate(&mut self, attractors: &[AttractorBody], pull: f64) {
        self.acc = DVec2::ZERO;
        for a in attractors {
            self.acc += pull_towards(a.pos - self.pos, a.power * pull);
        }
    }

    /// Applies the current acceleration, clamps speed, moves, and bounces.
    ///
    /// Each velocity axis is clamped on its own to `max_speed`. An axis whose
    /// new coordinate lies outside `[0, extent + 2 * radius]` has its velocity
    /// reversed and scaled by `bounce`; the position itself is not pulled
    /// back inside.
    pub fn integrate(&mut self, max_speed: f64, bounce: f64, extent: DVec2) {
        self.vel += self.acc;
        self.vel.x = clamp_axis(self.vel.x, max_speed);
        self.vel.y = clamp_axis(self.vel.y, max_speed);

        self.old_pos = self.pos;
        self.pos += self.vel;

        let upper = extent + DVec2::splat(2.0 * self.radius);
        if self.pos.x < 0.0 || self.pos.x > upper.x {
            self.vel.x = -self.vel.x * bounce;
        }
        if self.pos.y < 0.0 || self.pos.y > upper.y {
            self.vel.y = -self.vel.y * bounce;
        }
    }
}

/// Acceleration contributed by one attractor at offset `c` from a particle.
///
/// The direction comes from the single-argument `atan(cx / cy)` with the
/// signs restored per axis, so the magnitudes are `|power * sin|` and
/// `|power * cos|` of that angle. When `cy == 0` the angle is taken as
/// `π/2` (pure horizontal pull); a particle sitting exactly on the attractor
/// receives nothing.
pub fn pull_towards(c: DVec2, power: f64) -> DVec2 {
    if c == DVec2::ZERO {
        return DVec2::ZERO;
    }

    let angle = if c.y == 0.0 {
        FRAC_PI_2
    } else {
        (c.x / c.y).atan()
    };
    let lax = (power * angle.sin()).abs();
    let lay = (power * angle.cos()).abs();

    DVec2::new(
        if c.x > 0.0 { lax } else { -lax },
        if c.y > 0.0 { lay } else { -lay },
    )
}

#[inline]
fn clamp_axis(v: f64, max: f64) -> f64 {
    if v.abs() > max { max.copysign(v) } else { v }
}

/// The fixed particle population and the canvas it lives on.
#[derive(Debug, Default)]
pub struct ParticleSet {
    pub particles: Vec<Particle>,
    pub extent: DVec2,
}

impl ParticleSet {
    pub fn from_positions(positions: Vec<DVec2>, radius: f64, extent: DVec2) -> Self {
        let particles = positions
            .into_iter()
            .map(|pos| Particle::new(pos, radius))
            .collect();

        Self { particles, extent }
    }

    /// Scatters `count` resting particles uniformly over the canvas.
    pub fn random_in_canvas(
        count: usize,
        extent: DVec2,
        radius_min: f64,
        radius_max: f64,
        rng: &mut impl Rng,
    ) -> Self {
        let particles = (0..count)
            .map(|_| {
                let x = rng.random_range(0.0..=extent.x);
                let y = rng.random_range(0.0..=extent.y);
                let radius = rng.random_range(radius_min..=radius_max);
                Particle::new(DVec2::new(x, y), radius)
            })
            .collect();

        Self { particles, extent }
    }

    /// One force-accumulation and integration step for every particle.
    pub fn update(&mut self, attractors: &[AttractorBody], cfg: &Config) {
        let extent = self.extent;
        for p in &mut self.particles {
            p.accumulate(attractors, cfg.particle_pull);
            p.integrate(cfg.max_speed, cfg.bounce, extent);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
