//! Error type shared by every computation in the crate.
//!
//! All routines are closed-form and total over their valid domains, so the
//! only failure mode is caller-supplied input outside that domain.

use thiserror::Error;

/// Input outside a function's mathematically valid domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// A probability argument is not strictly inside `(0, 1)`.
    #[error("{name} must lie strictly inside (0, 1), got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    /// A conversion rate derived from the inputs is not strictly inside `(0, 1)`.
    #[error("{name} must lie strictly inside (0, 1), got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    /// Sample sizing was requested for an absolute lift of exactly zero.
    #[error("absolute lift cannot be exactly zero")]
    ZeroLift,

    /// Beta shape parameters must be finite and strictly positive.
    #[error("Beta shape parameters must be positive, got alpha={alpha}, beta={beta}")]
    NonPositiveShape { alpha: f64, beta: f64 },

    /// Success/trial counts are inconsistent.
    #[error("invalid observation: {successes} successes out of {total} trials")]
    InvalidObservation { successes: u64, total: u64 },

    /// An evaluation point cannot be interpreted (NaN).
    #[error("evaluation point {0} is not a number")]
    PointOutOfRange(f64),

    /// A grid request cannot be satisfied.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A backend response violates the inference API contract.
    #[error("invalid inference response: {0}")]
    InvalidResponse(String),
}
