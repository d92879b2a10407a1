//! Per-tick passes over the attractor and particle collections.
//!
//! [`crate::world::World::tick`] runs them in this order:
//! 1. [`growth_phase`]: advance every body's display-radius animation and
//!    drop bodies whose pending removal has settled.
//! 2. [`attraction_phase`]: every smaller (or equal) body drifts toward every
//!    larger one.
//! 3. [`merge_phase`]: engulfed bodies are absorbed; losers are removed after
//!    the full scan.
//! 4. [`particle_phase`]: particles are pulled by the surviving bodies.

use crate::{
    attractor::{AttractorSet, Survivor, merge_pair},
    config::Config,
    particle::ParticleSet,
    types::BodyId,
};
use glam::DVec2;
use serde::Serialize;
use tracing::debug;

/// A body dropped by [`growth_phase`], with the power it carried.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Removal {
    pub id: BodyId,
    pub power: f64,
}

/// One absorption performed by [`merge_phase`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MergeEvent {
    pub winner: BodyId,
    pub loser: BodyId,
    /// Power moved from the loser into the winner.
    pub absorbed_power: f64,
    /// Winner's radius after the merge.
    pub radius: f64,
}

/// Advances every body's growth animation by one tick.
///
/// Bodies that were pending removal and have settled back on `r` are
/// dropped from the set and returned.
pub fn growth_phase(attractors: &mut AttractorSet) -> Vec<Removal> {
    let mut removed = Vec::new();
    for b in &mut attractors.bodies {
        if b.advance_growth() {
            removed.push(Removal {
                id: b.id,
                power: b.power,
            });
        }
    }

    if !removed.is_empty() {
        for r in &removed {
            debug!(id = r.id, power = r.power, "attractor settled and removed");
        }
        let ids: Vec<BodyId> = removed.iter().map(|r| r.id).collect();
        attractors.remove_ids(&ids);
    }
    removed
}

/// Moves every body toward every body at least as large as itself.
///
/// For each ordered pair `(a, b)` of distinct bodies, in index order:
///
/// 1. Skips the pair if either body is fixed, if `a` is the `held` body,
///    or if `b` is smaller than `a`.
/// 2. Skips the pair if the two centers coincide.
/// 3. Computes `power = (b.r - a.r) * cfg.attraction_gain / dist +
///    cfg.attraction_bias` and splits it across the axes by the direction
///    cosines of `b.pos - a.pos`.
/// 4. Moves `a` by that amount toward `b` on each axis.
///
/// Positions are updated in place, so later pairs see earlier moves.
///
/// ### Parameters
/// - `attractors` - Bodies to move; only `pos` is written.
/// - `cfg` - Supplies `attraction_gain` and `attraction_bias`.
/// - `held` - Body under direct control, if any. It is never moved here but
///   still pulls the others.
pub fn attraction_phase(attractors: &mut AttractorSet, cfg: &Config, held: Option<BodyId>) {
    let n = attractors.bodies.len();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }

            let (a, b) = (&attractors.bodies[i], &attractors.bodies[j]);
            if a.fixed || b.fixed || held == Some(a.id) || b.r < a.r {
                continue;
            }

            let c = b.pos - a.pos;
            let dist = c.length();
            if dist == 0.0 {
                continue;
            }

            let power = (b.r - a.r) * cfg.attraction_gain / dist + cfg.attraction_bias;
            let lax = (power * c.x / dist).abs();
            let lay = (power * c.y / dist).abs();

            attractors.bodies[i].pos += DVec2::new(
                if c.x > 0.0 { lax } else { -lax },
                if c.y > 0.0 { lay } else { -lay },
            );
        }
    }
}

/// Resolves engulf merges for every unordered pair once.
///
/// For each pair `(i, j)` with `i < j`, in index order:
///
/// 1. Stops scanning row `i` once body `i` has lost a merge, and skips `j`
///    if body `j` already lost one.
/// 2. Hands the pair to [`merge_pair`], which decides whether one body
///    engulfs the other and, if so, updates the winner in place.
/// 3. Marks the loser as lost and records a [`MergeEvent`].
///
/// A winner's new radius and display radius are seen by later pairs in the
/// same scan. Losers are removed from the set only after the scan completes.
///
/// ### Parameters
/// - `attractors` - Bodies to merge; losers are removed on return.
/// - `cfg` - Supplies `merge_slack` and `critical_radius`.
///
/// ### Returns
/// One [`MergeEvent`] per absorption, in the order they happened.
pub fn merge_phase(attractors: &mut AttractorSet, cfg: &Config) -> Vec<MergeEvent> {
    let n = attractors.bodies.len();
    let mut lost = vec![false; n];
    let mut events = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            if lost[i] {
                break;
            }
            if lost[j] {
                continue;
            }

            let (a, b) = attractors.pair_mut(i, j);
            let Some(survivor) = merge_pair(a, b, cfg.merge_slack, cfg.critical_radius) else {
                continue;
            };

            let (winner, loser, loser_idx) = match survivor {
                Survivor::First => (a, b, j),
                Survivor::Second => (b, a, i),
            };
            lost[loser_idx] = true;

            debug!(
                winner = winner.id,
                loser = loser.id,
                radius = winner.r,
                power = winner.power,
                pending_removal = winner.pending_removal,
                "attractors merged"
            );
            events.push(MergeEvent {
                winner: winner.id,
                loser: loser.id,
                absorbed_power: loser.power,
                radius: winner.r,
            });
        }
    }

    let losers: Vec<BodyId> = events.iter().map(|e| e.loser).collect();
    attractors.remove_ids(&losers);
    events
}

/// Pulls every particle toward the current attractors and integrates it.
pub fn particle_phase(particles: &mut ParticleSet, attractors: &AttractorSet, cfg: &Config) {
    particles.update(&attractors.bodies, cfg);
}
