//! Error types for the simulation core.

use thiserror::Error;

/// Reasons a [`crate::config::Config`] is rejected before a world is built.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Canvas extent must be positive and finite on both axes.
    #[error("canvas extent must be positive and finite, got ({0}, {1})")]
    Canvas(f64, f64),

    /// A scalar field that must be strictly positive is not.
    #[error("`{field}` must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A scalar field that must be non-negative is not.
    #[error("`{field}` must be non-negative and finite, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// The particle radius range is inverted.
    #[error("particle radius range is inverted: min {min} > max {max}")]
    RadiusRange { min: f64, max: f64 },
}

impl ConfigError {
    pub(crate) fn not_positive(field: &'static str, value: f64) -> Self {
        Self::NotPositive { field, value }
    }

    pub(crate) fn negative(field: &'static str, value: f64) -> Self {
        Self::Negative { field, value }
    }
}
