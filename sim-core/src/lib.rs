//! Core 2-D attractor gravity and trace-particle simulation library.
//!
//! Main components:
//! - [`attractor`] — gravitating bodies, their growth animation and merges.
//! - [`particle`] — the fixed particle swarm and its integrator.
//! - [`phases`] — the per-tick passes run by the world.
//! - [`world`] — owns everything, runs ticks, takes input.
//! - [`config`] — tunable constants with reference defaults.
//! - [`error`] — configuration errors.
//! - [`types`] — shared ids.

pub mod attractor;
pub mod config;
pub mod error;
pub mod particle;
pub mod phases;
pub mod types;
pub mod world;

pub use attractor::{AttractorBody, AttractorSet};
pub use config::Config;
pub use error::ConfigError;
pub use particle::{Particle, ParticleSet};
pub use phases::{MergeEvent, Removal};
pub use types::BodyId;
pub use world::{TickReport, World};
