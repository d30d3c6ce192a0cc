//! Sample-size planning for two-proportion experiments.
//!
//! Given a baseline conversion rate and the absolute lift to be detected,
//! computes how many users each group needs for a two-sided two-proportion
//! z-test to reach the requested power at the requested confidence level.
//!
//! # Formula
//!
//! ```text
//! p₁ = baseline,  p₂ = baseline + lift,  p̄ = (p₁ + p₂) / 2
//! z_α = Φ⁻¹(1 − α/2),  z_β = Φ⁻¹(power)
//!
//!     ( z_α·√(2·p̄(1−p̄)) + z_β·√(p₁(1−p₁) + p₂(1−p₂)) )²
//! n = ────────────────────────────────────────────────────
//!                        (p₂ − p₁)²
//! ```
//!
//! Reference: Fleiss, Levin & Paik (2003), *Statistical Methods for Rates
//! and Proportions*, 3rd ed., §4.2.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::special::inverse_normal_cdf;

/// Inputs of a power analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerAnalysisInput {
    /// Control conversion rate `p₁`, in `(0, 1)`.
    pub baseline_rate: f64,
    /// Absolute change to detect; `p₂ = baseline_rate + absolute_lift`.
    /// May be negative, must not be zero.
    pub absolute_lift: f64,
    /// `1 − α` of the two-sided test, in `(0, 1)`.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Probability of detecting the lift when it exists, in `(0, 1)`.
    #[serde(default = "default_power")]
    pub power: f64,
}

fn default_confidence_level() -> f64 {
    crate::DEFAULT_CONFIDENCE_LEVEL
}

fn default_power() -> f64 {
    crate::DEFAULT_POWER
}

impl PowerAnalysisInput {
    /// Input with the default confidence level (0.95) and power (0.80).
    pub fn new(baseline_rate: f64, absolute_lift: f64) -> Self {
        Self {
            baseline_rate,
            absolute_lift,
            confidence_level: crate::DEFAULT_CONFIDENCE_LEVEL,
            power: crate::DEFAULT_POWER,
        }
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// The pair of rates `(p₁, p₂)` being compared.
    pub fn rates(&self) -> (f64, f64) {
        (self.baseline_rate, self.baseline_rate + self.absolute_lift)
    }
}

/// Required sample size for one experiment design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSizeResult {
    /// Users needed in each group (ceiling of `raw`).
    pub per_group: u64,
    /// Users needed across both groups, `2 × per_group`.
    pub total: u64,
    /// Unrounded closed-form estimate.
    pub raw: f64,
}

/// Minimum per-group sample size for a two-sided two-proportion z-test.
///
/// No upper bound is imposed: tiny lifts yield very large sizes, and
/// truncating them for display is left to the caller.
///
/// # Errors
/// - [`DomainError::ProbabilityOutOfRange`] if `confidence_level` or
///   `power` is outside `(0, 1)`.
/// - [`DomainError::ZeroLift`] if `absolute_lift == 0`, or if the lift is
///   lost when added to the baseline so that `p₁ == p₂`.
/// - [`DomainError::RateOutOfRange`] if `p₁` or `p₂` is outside `(0, 1)`.
///
/// # Examples
/// ```
/// use abtest_stats::power::{required_sample_size, PowerAnalysisInput};
/// let plan = required_sample_size(&PowerAnalysisInput::new(0.20, 0.03)).unwrap();
/// assert_eq!(plan.per_group, 2943);
/// assert_eq!(plan.total, 5886);
/// ```
pub fn required_sample_size(input: &PowerAnalysisInput) -> Result<SampleSizeResult, DomainError> {
    check_open_unit("confidence_level", input.confidence_level)?;
    check_open_unit("power", input.power)?;
    if input.absolute_lift == 0.0 {
        return Err(DomainError::ZeroLift);
    }

    let (p1, p2) = input.rates();
    check_rate("baseline_rate", p1)?;
    check_rate("baseline_rate + absolute_lift", p2)?;
    if p2 == p1 {
        return Err(DomainError::ZeroLift);
    }

    let alpha = 1.0 - input.confidence_level;
    let z_alpha = inverse_normal_cdf(1.0 - alpha / 2.0)?;
    let z_beta = inverse_normal_cdf(input.power)?;

    let pooled = (p1 + p2) / 2.0;
    let numerator = z_alpha * (2.0 * pooled * (1.0 - pooled)).sqrt()
        + z_beta * (p1 * (1.0 - p1) + p2 * (1.0 - p2)).sqrt();
    let delta = p2 - p1;
    let raw = numerator * numerator / (delta * delta);

    debug!("power analysis: p1={p1}, p2={p2}, z_alpha={z_alpha:.6}, z_beta={z_beta:.6}, n={raw:.3}");

    let per_group = raw.ceil() as u64;
    Ok(SampleSizeResult {
        per_group,
        total: per_group.saturating_mul(2),
        raw,
    })
}

fn check_open_unit(name: &'static str, value: f64) -> Result<(), DomainError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(DomainError::ProbabilityOutOfRange { name, value })
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), DomainError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(DomainError::RateOutOfRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The formula evaluated with the textbook critical values.
    fn hand_computed(p1: f64, p2: f64) -> f64 {
        let z_alpha = 1.959963984540054;
        let z_beta = 0.8416212335729143;
        let pooled = (p1 + p2) / 2.0;
        let num = z_alpha * (2.0 * pooled * (1.0 - pooled)).sqrt()
            + z_beta * (p1 * (1.0 - p1) + p2 * (1.0 - p2)).sqrt();
        num * num / ((p2 - p1) * (p2 - p1))
    }

    #[test]
    fn test_reference_design() {
        let input = PowerAnalysisInput {
            baseline_rate: 0.20,
            absolute_lift: 0.03,
            confidence_level: 0.95,
            power: 0.80,
        };
        let result = required_sample_size(&input).unwrap();
        let expected = hand_computed(0.20, 0.23);
        assert!((result.raw - expected).abs() < 1e-4, "raw = {}", result.raw);
        assert_eq!(result.per_group, expected.ceil() as u64);
        assert_eq!(result.per_group, 2943);
        assert_eq!(result.total, 2 * result.per_group);
    }

    #[test]
    fn test_negative_lift_matches_formula() {
        let result = required_sample_size(&PowerAnalysisInput::new(0.20, -0.03)).unwrap();
        assert_eq!(result.per_group, hand_computed(0.20, 0.17).ceil() as u64);
        assert_eq!(result.per_group, 2629);
    }

    #[test]
    fn test_sign_invariance_for_mirrored_designs() {
        // Same pair of rates, compared in opposite directions.
        let up = required_sample_size(&PowerAnalysisInput::new(0.20, 0.03)).unwrap();
        let down = required_sample_size(&PowerAnalysisInput::new(0.23, -0.03)).unwrap();
        assert_eq!(up.per_group, down.per_group);
        assert!((up.raw - down.raw).abs() < 1e-6);
    }

    #[test]
    fn test_zero_lift_rejected() {
        let input = PowerAnalysisInput::new(0.20, 0.0);
        assert_eq!(required_sample_size(&input), Err(DomainError::ZeroLift));
    }

    #[test]
    fn test_lift_lost_to_rounding_rejected() {
        // 0.2 + 1e-18 == 0.2 in f64
        for &(baseline, lift) in &[(0.2, 1e-18), (0.5, -1e-17), (0.9, 1e-20)] {
            let input = PowerAnalysisInput::new(baseline, lift);
            assert_eq!(input.rates().0, input.rates().1);
            assert_eq!(required_sample_size(&input), Err(DomainError::ZeroLift));
        }
    }

    #[test]
    fn test_rates_outside_unit_interval_rejected() {
        for &(baseline, lift) in &[(0.0, 0.1), (1.0, -0.1), (0.95, 0.05), (0.05, -0.06), (-0.1, 0.2)] {
            let err = required_sample_size(&PowerAnalysisInput::new(baseline, lift)).unwrap_err();
            assert!(
                matches!(err, DomainError::RateOutOfRange { .. }),
                "baseline={baseline}, lift={lift} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_confidence_and_power_validated() {
        let base = PowerAnalysisInput::new(0.2, 0.03);
        for bad in [0.0, 1.0, 1.2, f64::NAN] {
            assert!(matches!(
                required_sample_size(&base.with_confidence_level(bad)),
                Err(DomainError::ProbabilityOutOfRange { name: "confidence_level", .. })
            ));
            assert!(matches!(
                required_sample_size(&base.with_power(bad)),
                Err(DomainError::ProbabilityOutOfRange { name: "power", .. })
            ));
        }
    }

    #[test]
    fn test_tiny_lift_unbounded() {
        let result = required_sample_size(&PowerAnalysisInput::new(0.2, 1e-6)).unwrap();
        assert!(result.per_group > 1_000_000_000_000);
    }

    #[test]
    fn test_stricter_requirements_need_more_users() {
        let base = PowerAnalysisInput::new(0.1, 0.02);
        let default = required_sample_size(&base).unwrap().per_group;
        let confident = required_sample_size(&base.with_confidence_level(0.99)).unwrap().per_group;
        let powerful = required_sample_size(&base.with_power(0.9)).unwrap().per_group;
        assert!(confident > default);
        assert!(powerful > default);
    }

    #[test]
    fn test_input_deserializes_with_defaults() {
        let input: PowerAnalysisInput =
            serde_json::from_str(r#"{"baseline_rate": 0.2, "absolute_lift": 0.03}"#).unwrap();
        assert_eq!(input, PowerAnalysisInput::new(0.2, 0.03));
    }
}
