use crate::{config::Config, types::BodyId};
use glam::DVec2;
use serde::Serialize;

/// A gravitating body that pulls particles and absorbs smaller bodies.
///
/// `r` is the physics radius: it drives body-body attraction and the merge
/// test. `display_radius` is animated independently (see
/// [`AttractorBody::advance_growth`]) and gates both removal timing and the
/// merge prefilter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttractorBody {
    pub id: BodyId,
    pub pos: DVec2,
    pub r: f64,
    pub display_radius: f64,
    /// `true` while the display radius ramps up, `false` while it settles.
    pub growing: bool,
    pub power: f64,
    /// Fixed bodies take no part in the mutual attraction pass.
    pub fixed: bool,
    pub pending_removal: bool,
    /// Display radius change per tick.
    pub step: f64,
    /// Overshoot past `r` before the display radius starts settling.
    pub bigger: f64,
}

impl AttractorBody {
    /// Creates a body that starts its growth animation from zero.
    ///
    /// Negative `r` or `power` are clamped to zero.
    pub fn new(id: BodyId, pos: DVec2, r: f64, power: f64, fixed: bool, cfg: &Config) -> Self {
        Self {
            id,
            pos,
            r: r.max(0.0),
            display_radius: 0.0,
            growing: true,
            power: power.max(0.0),
            fixed,
            pending_removal: false,
            step: cfg.growth_step,
            bigger: cfg.growth_margin,
        }
    }

    /// Restarts the growth animation from `target`.
    pub fn animate(&mut self, target: f64) {
        self.display_radius = target.max(0.0);
        self.growing = true;
    }

    /// Advances the display radius by one tick.
    ///
    /// While growing the radius rises by `step` until it exceeds
    /// `r + bigger`; afterwards it decays by `step` but never below `r`.
    ///
    /// ### Returns
    /// `true` if the body is pending removal and its display radius has just
    /// settled at `r`, meaning it must be dropped this tick.
    pub fn advance_growth(&mut self) -> bool {
        if self.growing {
            self.display_radius += self.step;
            if self.display_radius > self.r + self.bigger {
                self.growing = false;
            }
            false
        } else {
            self.display_radius = (self.display_radius - self.step).max(self.r);
            self.pending_removal && self.display_radius == self.r
        }
    }

    /// Marks the body for removal and kicks off one last growth pulse.
    pub fn detonate(&mut self, increment: f64) {
        self.pending_removal = true;
        self.animate(self.r);
        self.r += increment;
    }

    /// Hit test used by input collaborators.
    pub fn contains(&self, point: DVec2) -> bool {
        self.pos.distance_squared(point) <= self.r * self.r
    }

    /// `true` once the animation is at rest on `r`.
    pub fn is_settled(&self) -> bool {
        !self.growing && self.display_radius == self.r
    }
}

/// Radius of the body formed by absorbing one radius into another.
///
/// Quadrature sum truncated to a whole number.
pub fn merged_radius(r1: f64, r2: f64) -> f64 {
    (r1 * r1 + r2 * r2).sqrt().floor()
}

/// Engulf test between two bodies.
///
/// A cheap bounding-box check on the summed display radii, followed by the
/// precise test that one circle lies inside the other within `slack`.
pub fn engulfs(a: &AttractorBody, b: &AttractorBody, slack: f64) -> bool {
    let d = (b.pos - a.pos).abs();
    let combined = a.display_radius + b.display_radius;
    d.x < combined && d.y < combined && d.length() <= (b.r - a.r).abs() + slack
}

/// Which body of a pair survived a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Survivor {
    First,
    Second,
}

/// Merges `a` and `b` in place if [`engulfs`] holds.
///
/// The body with the strictly larger `r` wins; on a tie the second body
/// wins. The winner takes the quadrature radius and the summed power, and
/// restarts its animation from the larger pre-merge radius. A winner whose
/// radius ends up above `critical_radius` is marked for removal.
///
/// The loser is left untouched; removing it is up to the caller.
pub fn merge_pair(
    a: &mut AttractorBody,
    b: &mut AttractorBody,
    slack: f64,
    critical_radius: f64,
) -> Option<Survivor> {
    if !engulfs(a, b, slack) {
        return None;
    }

    let (winner, loser, survivor) = if a.r > b.r {
        (a, b, Survivor::First)
    } else {
        (b, a, Survivor::Second)
    };

    let restart = loser.r.max(winner.r);
    winner.r = merged_radius(loser.r, winner.r);
    winner.power += loser.power;
    winner.animate(restart);
    if winner.r > critical_radius {
        winner.pending_removal = true;
    }

    Some(survivor)
}

/// Insertion-ordered collection of live bodies with id allocation.
#[derive(Debug, Default)]
pub struct AttractorSet {
    pub bodies: Vec<AttractorBody>,
    next_id: BodyId,
}

impl AttractorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new body and returns its id.
    ///
    /// Returns `None` without allocating an id if `pos`, `r` or `power` is
    /// not finite.
    pub fn spawn(
        &mut self,
        pos: DVec2,
        r: f64,
        power: f64,
        fixed: bool,
        cfg: &Config,
    ) -> Option<BodyId> {
        if !(pos.is_finite() && r.is_finite() && power.is_finite()) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.bodies.push(AttractorBody::new(id, pos, r, power, fixed, cfg));
        Some(id)
    }

    pub fn get(&self, id: BodyId) -> Option<&AttractorBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut AttractorBody> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// First body, in insertion order, whose disc contains `point`.
    pub fn body_at(&self, point: DVec2) -> Option<BodyId> {
        self.bodies.iter().find(|b| b.contains(point)).map(|b| b.id)
    }

    /// Drops every body whose id is listed in `ids`.
    pub fn remove_ids(&mut self, ids: &[BodyId]) {
        if ids.is_empty() {
            return;
        }
        self.bodies.retain(|b| !ids.contains(&b.id));
    }

    pub fn total_power(&self) -> f64 {
        self.bodies.iter().map(|b| b.power).sum()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Mutable access to two distinct bodies by index.
    ///
    /// Internal to the merge scan, which only ever asks for `i < j < len`.
    pub(crate) fn pair_mut(
        &mut self,
        i: usize,
        j: usize,
    ) -> (&mut AttractorBody, &mut AttractorBody) {
        debug_assert!(i < j, "pair_mut expects i < j");
        let (head, tail) = self.bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn body(id: BodyId, x: f64, y: f64, r: f64, power: f64) -> AttractorBody {
        AttractorBody::new(id, DVec2::new(x, y), r, power, false, &Config::default())
    }

    /// A body whose display radius has already been grown to `display`.
    fn grown(id: BodyId, x: f64, y: f64, r: f64, power: f64, display: f64) -> AttractorBody {
        let mut b = body(id, x, y, r, power);
        b.display_radius = display;
        b.growing = false;
        b
    }

    #[test]
    fn new_body_starts_growing_from_zero() {
        let b = body(0, 1.0, 2.0, 10.0, 3.0);
        assert_eq!(b.display_radius, 0.0);
        assert!(b.growing);
        assert!(!b.pending_removal);
        assert_eq!(b.step, 2.0);
        assert_eq!(b.bigger, 5.0);
    }

    #[test]
    fn new_body_clamps_negative_radius_and_power() {
        let b = body(0, 0.0, 0.0, -4.0, -1.0);
        assert_eq!(b.r, 0.0);
        assert_eq!(b.power, 0.0);
    }

    #[test]
    fn growth_overshoots_then_settles_on_r() {
        let mut b = body(0, 0.0, 0.0, 10.0, 1.0);

        // 0 -> 16 in steps of 2; 16 > 10 + 5 flips to settling.
        for _ in 0..8 {
            assert!(!b.advance_growth());
        }
        assert_eq!(b.display_radius, 16.0);
        assert!(!b.growing);

        // 16 -> 14 -> 12 -> 10.
        for _ in 0..3 {
            assert!(!b.advance_growth());
        }
        assert_eq!(b.display_radius, 10.0);
        assert!(b.is_settled());

        // Holds at r from then on.
        for _ in 0..20 {
            b.advance_growth();
            assert_eq!(b.display_radius, 10.0);
        }
    }

    #[test]
    fn animate_restarts_growth_from_target() {
        let mut b = grown(0, 0.0, 0.0, 10.0, 1.0, 10.0);
        b.animate(7.0);
        assert_eq!(b.display_radius, 7.0);
        assert!(b.growing);
    }

    #[test]
    fn detonated_body_is_removed_once_settled() {
        let mut b = grown(0, 0.0, 0.0, 10.0, 1.0, 10.0);
        b.detonate(5.0);

        assert!(b.pending_removal);
        assert!(b.growing);
        assert_eq!(b.display_radius, 10.0);
        assert_eq!(b.r, 15.0);

        // Grows 10 -> 22, then settles 20, 18, 16, 15.
        for tick in 1..10 {
            assert!(!b.advance_growth(), "removed too early at tick {tick}");
        }
        assert!(b.advance_growth());
        assert_eq!(b.display_radius, 15.0);
    }

    #[test]
    fn contains_uses_physics_radius() {
        let b = body(0, 10.0, 10.0, 5.0, 1.0);
        assert!(b.contains(DVec2::new(15.0, 10.0)));
        assert!(b.contains(DVec2::new(10.0, 10.0)));
        assert!(!b.contains(DVec2::new(15.1, 10.0)));
    }

    #[test]
    fn engulfed_body_merges_into_larger_one() {
        let mut a = grown(0, 0.0, 0.0, 10.0, 1.0, 20.0);
        let mut b = grown(1, 3.0, 0.0, 20.0, 2.0, 20.0);

        let survivor = merge_pair(&mut a, &mut b, 3.0, 50.0);

        assert_eq!(survivor, Some(Survivor::Second));
        assert_eq!(b.r, 22.0);
        assert_eq!(b.power, 3.0);
        assert!(!b.pending_removal);
        assert_eq!(b.display_radius, 20.0);
        assert!(b.growing);

        // Loser is left for the caller to remove.
        assert_eq!(a.r, 10.0);
        assert_eq!(a.power, 1.0);
    }

    #[test]
    fn first_body_wins_when_strictly_larger() {
        let mut a = grown(0, 0.0, 0.0, 20.0, 2.0, 20.0);
        let mut b = grown(1, 3.0, 0.0, 10.0, 1.0, 20.0);

        assert_eq!(merge_pair(&mut a, &mut b, 3.0, 50.0), Some(Survivor::First));
        assert_eq!(a.r, 22.0);
        assert_eq!(a.power, 3.0);
    }

    #[test]
    fn equal_radii_tie_goes_to_second() {
        let mut a = grown(0, 0.0, 0.0, 10.0, 1.0, 10.0);
        let mut b = grown(1, 1.0, 1.0, 10.0, 4.0, 10.0);

        assert_eq!(merge_pair(&mut a, &mut b, 3.0, 50.0), Some(Survivor::Second));
        assert_eq!(b.r, 14.0);
        assert_eq!(b.power, 5.0);
    }

    #[test]
    fn touching_circles_do_not_merge() {
        // Overlapping discs of equal size are not an engulf.
        let mut a = grown(0, 0.0, 0.0, 10.0, 1.0, 10.0);
        let mut b = grown(1, 10.0, 0.0, 10.0, 1.0, 10.0);

        assert_eq!(merge_pair(&mut a, &mut b, 3.0, 50.0), None);
        assert_eq!(a.r, 10.0);
        assert_eq!(b.r, 10.0);
    }

    #[test]
    fn ungrown_bodies_fail_the_prefilter() {
        // Same center, but display radii are still zero.
        let mut a = body(0, 0.0, 0.0, 10.0, 1.0);
        let mut b = body(1, 0.0, 0.0, 20.0, 1.0);

        assert!(!engulfs(&a, &b, 3.0));
        assert_eq!(merge_pair(&mut a, &mut b, 3.0, 50.0), None);
    }

    #[test]
    fn oversized_winner_is_marked_for_removal() {
        let mut a = grown(0, 0.0, 0.0, 40.0, 1.0, 40.0);
        let mut b = grown(1, 1.0, 0.0, 35.0, 1.0, 35.0);

        assert_eq!(merge_pair(&mut a, &mut b, 3.0, 50.0), Some(Survivor::First));
        assert_eq!(a.r, 53.0);
        assert!(a.pending_removal);
        assert_eq!(a.display_radius, 40.0);
    }

    #[test]
    fn set_assigns_increasing_ids_and_finds_bodies() {
        let cfg = Config::default();
        let mut set = AttractorSet::new();
        let a = set.spawn(DVec2::new(0.0, 0.0), 5.0, 1.0, false, &cfg).unwrap();
        let b = set.spawn(DVec2::new(3.0, 0.0), 5.0, 2.0, true, &cfg).unwrap();

        assert_eq!((a, b), (0, 1));
        assert_eq!(set.len(), 2);
        assert!(set.get(b).is_some_and(|body| body.fixed));
        assert_relative_eq!(set.total_power(), 3.0);

        // Both discs contain (2, 0); the first inserted wins.
        assert_eq!(set.body_at(DVec2::new(2.0, 0.0)), Some(a));
        assert_eq!(set.body_at(DVec2::new(7.5, 0.0)), Some(b));
        assert_eq!(set.body_at(DVec2::new(100.0, 0.0)), None);

        set.remove_ids(&[a]);
        assert!(set.get(a).is_none());
        assert_eq!(set.body_at(DVec2::new(2.0, 0.0)), Some(b));

        // Ids are not reused after removal.
        let c = set.spawn(DVec2::ZERO, 1.0, 1.0, false, &cfg);
        assert_eq!(c, Some(2));
    }

    #[test]
    fn spawn_rejects_non_finite_inputs() {
        let cfg = Config::default();
        let mut set = AttractorSet::new();

        assert_eq!(set.spawn(DVec2::new(f64::INFINITY, 50.0), 30.0, 1.0, false, &cfg), None);
        assert_eq!(set.spawn(DVec2::new(0.0, f64::NAN), 30.0, 1.0, false, &cfg), None);
        assert_eq!(set.spawn(DVec2::ZERO, f64::INFINITY, 1.0, false, &cfg), None);
        assert_eq!(set.spawn(DVec2::ZERO, 10.0, f64::NEG_INFINITY, false, &cfg), None);
        assert!(set.is_empty());

        // Rejected calls do not use up ids.
        assert_eq!(set.spawn(DVec2::ZERO, 10.0, 1.0, false, &cfg), Some(0));
    }

    #[test]
    fn pair_mut_returns_both_bodies() {
        let cfg = Config::default();
        let mut set = AttractorSet::new();
        for i in 0..3 {
            set.spawn(DVec2::splat(i as f64), 1.0, 1.0, false, &cfg);
        }
        let (x, y) = set.pair_mut(0, 2);
        assert_eq!((x.id, y.id), (0, 2));
    }

    proptest! {
        #[test]
        fn merged_radius_never_shrinks(r1 in 0u32..10_000, r2 in 0u32..10_000) {
            let (r1, r2) = (r1 as f64, r2 as f64);
            prop_assert!(merged_radius(r1, r2) >= r1.max(r2));
        }

        #[test]
        fn merge_conserves_power(
            r1 in 0u32..200,
            r2 in 0u32..200,
            p1 in 0.0f64..1_000.0,
            p2 in 0.0f64..1_000.0,
        ) {
            let (r1, r2) = (r1 as f64, r2 as f64);
            let display = r1.max(r2) + 1.0;
            let mut a = grown(0, 0.0, 0.0, r1, p1, display);
            let mut b = grown(1, 0.5, 0.0, r2, p2, display);

            let survivor = merge_pair(&mut a, &mut b, 3.0, 50.0);
            prop_assert!(survivor.is_some());

            let winner = match survivor {
                Some(Survivor::First) => &a,
                _ => &b,
            };
            prop_assert!((winner.power - (p1 + p2)).abs() <= 1e-9 * (p1 + p2).max(1.0));
        }

        #[test]
        fn display_radius_never_goes_negative(r in 0u32..100, ticks in 0usize..200) {
            let mut b = body(0, 0.0, 0.0, r as f64, 1.0);
            for _ in 0..ticks {
                b.advance_growth();
                prop_assert!(b.display_radius >= 0.0);
            }
        }
    }
}
