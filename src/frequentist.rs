//! Pooled two-proportion z-test.
//!
//! # Algorithm
//!
//! ```text
//! p̂₁ = k₁/n₁,  p̂₂ = k₂/n₂,  p̂ = (k₁ + k₂) / (n₁ + n₂)
//! SE = √(p̂(1−p̂)(1/n₁ + 1/n₂))
//! z  = (p̂₂ − p̂₁) / SE
//! p  = 2·(1 − Φ(|z|))
//! ```
//!
//! When both groups convert at 0% or at 100% the pooled standard error is
//! zero; the statistic is then defined as 0 (no evidence of a difference).

use serde::Serialize;

use crate::error::DomainError;
use crate::observation::ProportionObservation;
use crate::special::standard_normal_cdf;

/// Outcome of a two-sided two-proportion z-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZTestResult {
    /// Observed rate of the control group.
    pub control_rate: f64,
    /// Observed rate of the variant group.
    pub variant_rate: f64,
    /// Standardized difference `(p̂₂ − p̂₁) / SE`.
    pub z: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// `p_value < significance_level`.
    pub significant: bool,
}

/// Two-sided pooled z-test of `variant` against `control`.
///
/// # Errors
/// [`DomainError::ProbabilityOutOfRange`] if `significance_level` is
/// outside `(0, 1)`.
///
/// # Examples
/// ```
/// use abtest_stats::frequentist::two_proportion_z_test;
/// use abtest_stats::observation::ProportionObservation;
/// let a = ProportionObservation::new(100, 1000).unwrap();
/// let b = ProportionObservation::new(120, 1000).unwrap();
/// let r = two_proportion_z_test(&a, &b, 0.05).unwrap();
/// assert!((r.p_value - 0.1529).abs() < 1e-4);
/// assert!(!r.significant);
/// ```
pub fn two_proportion_z_test(
    control: &ProportionObservation,
    variant: &ProportionObservation,
    significance_level: f64,
) -> Result<ZTestResult, DomainError> {
    if !(significance_level > 0.0 && significance_level < 1.0) {
        return Err(DomainError::ProbabilityOutOfRange {
            name: "significance_level",
            value: significance_level,
        });
    }

    let p1 = control.rate();
    let p2 = variant.rate();
    let (n1, n2) = (control.total() as f64, variant.total() as f64);
    let pooled = (control.successes() + variant.successes()) as f64 / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    let z = if se > 0.0 { (p2 - p1) / se } else { 0.0 };

    // 2·(1 − Φ(|z|)) = 2·Φ(−|z|), which keeps precision for large |z|.
    let p_value = (2.0 * standard_normal_cdf(-z.abs())).min(1.0);

    Ok(ZTestResult {
        control_rate: p1,
        variant_rate: p2,
        z,
        p_value,
        significant: p_value < significance_level,
    })
}
