//! Tunable constants for the attractor/particle simulation.
//!
//! Every field has a reference default (see [`Config::default`]); scenario
//! files may override any subset because the struct deserializes with
//! `#[serde(default)]`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas width and height; particles bounce off `[0, extent + 2r]`.
    pub canvas: DVec2,
    /// Fixed particle population created with the world.
    pub particle_count: usize,
    pub particle_radius_min: f64,
    pub particle_radius_max: f64,
    /// Per-axis velocity limit for particles.
    pub max_speed: f64,
    /// Velocity retained (and reversed) on a boundary bounce.
    pub bounce: f64,
    /// Scale from attractor power to particle acceleration.
    pub particle_pull: f64,
    /// Body-body pull: `(b.r - a.r) * gain / dist + bias`.
    pub attraction_gain: f64,
    pub attraction_bias: f64,
    /// Radius and power used by [`crate::world::World::spawn_default`].
    pub default_radius: f64,
    pub default_power: f64,
    /// Display radius change per tick.
    pub growth_step: f64,
    /// How far past `r` the display radius overshoots before settling.
    pub growth_margin: f64,
    /// Extra distance tolerated by the engulf test.
    pub merge_slack: f64,
    /// Bodies that grow past this radius are marked for removal.
    pub critical_radius: f64,
    /// Radius added by a detonation.
    pub detonate_increment: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas: DVec2::new(1280.0, 720.0),
            particle_count: 4000,
            particle_radius_min: 0.5,
            particle_radius_max: 1.5,
            max_speed: 10.0,
            bounce: 0.98,
            particle_pull: 0.1,
            attraction_gain: 10.0,
            attraction_bias: 0.5,
            default_radius: 10.0,
            default_power: 10.0,
            growth_step: 2.0,
            growth_margin: 5.0,
            merge_slack: 3.0,
            critical_radius: 50.0,
            detonate_increment: 5.0,
        }
    }
}

impl Config {
    /// Checks that every field is inside the domain the simulation can handle.
    ///
    /// A zero `growth_step` would leave bodies animating forever and a
    /// zero `max_speed` would freeze every particle, so both must be strictly
    /// positive. All other scalars only need to be non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = self.canvas;
        if !(c.x.is_finite() && c.y.is_finite() && c.x > 0.0 && c.y > 0.0) {
            return Err(ConfigError::Canvas(c.x, c.y));
        }

        positive("max_speed", self.max_speed)?;
        positive("growth_step", self.growth_step)?;

        for (field, value) in [
            ("particle_radius_min", self.particle_radius_min),
            ("particle_radius_max", self.particle_radius_max),
            ("bounce", self.bounce),
            ("particle_pull", self.particle_pull),
            ("attraction_gain", self.attraction_gain),
            ("attraction_bias", self.attraction_bias),
            ("default_radius", self.default_radius),
            ("default_power", self.default_power),
            ("growth_margin", self.growth_margin),
            ("merge_slack", self.merge_slack),
            ("critical_radius", self.critical_radius),
            ("detonate_increment", self.detonate_increment),
        ] {
            non_negative(field, value)?;
        }

        if self.particle_radius_min > self.particle_radius_max {
            return Err(ConfigError::RadiusRange {
                min: self.particle_radius_min,
                max: self.particle_radius_max,
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::not_positive(field, value))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::negative(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_canvas() {
        let cfg = Config {
            canvas: DVec2::new(0.0, 600.0),
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::Canvas(0.0, 600.0)));
    }

    #[test]
    fn rejects_zero_growth_step() {
        let cfg = Config {
            growth_step: 0.0,
            ..Config::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NotPositive {
                field: "growth_step",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_negative_and_non_finite_scalars() {
        let cfg = Config {
            merge_slack: -1.0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative {
                field: "merge_slack",
                ..
            })
        ));

        let cfg = Config {
            bounce: f64::NAN,
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative { field: "bounce", .. })
        ));
    }

    #[test]
    fn rejects_inverted_radius_range() {
        let cfg = Config {
            particle_radius_min: 2.0,
            particle_radius_max: 1.0,
            ..Config::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::RadiusRange { min: 2.0, max: 1.0 })
        );
    }
}
