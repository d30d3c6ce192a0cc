//! # abtest-stats
//!
//! Statistical primitives for two-group conversion experiments
//! (control vs. variant on a binary outcome).
//!
//! The crate covers what can be computed locally and deterministically:
//! planning an experiment's size, previewing the posterior curves of the
//! observed conversion rates, and the frequentist verdict. The Bayesian
//! simulation engine lives behind a remote API whose contract is modelled
//! in [`inference`].
//!
//! ## Modules
//!
//! - [`special`]: Standard normal CDF/PDF/quantile, ln Γ, ln B
//! - [`power`]: Per-group sample size for a two-proportion z-test
//! - [`density`]: Beta posterior densities evaluated in log space
//! - [`grid`]: Evaluation grids for density previews
//! - [`observation`]: Success/trial counts and derived Beta shapes
//! - [`frequentist`]: Pooled two-proportion z-test
//! - [`inference`]: Backend request/response contract
//!
//! ## Design Philosophy
//!
//! - **Pure functions on value types**: no global state, no I/O, every
//!   call independent and safe to run in parallel
//! - **Numerical stability first**: log-space densities, tail-aware CDF
//! - **Invalid input is an error, never a NaN**: every domain violation
//!   surfaces as a [`DomainError`]
//! - **Property-based testing**: mathematical invariants verified via proptest

pub mod density;
pub mod error;
pub mod frequentist;
pub mod grid;
pub mod inference;
pub mod observation;
pub mod power;
pub mod special;

pub use error::DomainError;

/// Default confidence level of the planned test (two-sided α = 0.05).
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default statistical power of the planned test.
pub const DEFAULT_POWER: f64 = 0.80;

/// Default significance level of the z-test verdict.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Default number of points in a density preview.
pub const DEFAULT_GRID_POINTS: usize = 300;

/// Default preview margin, in posterior standard deviations.
pub const DEFAULT_WINDOW_SDS: f64 = 4.0;
