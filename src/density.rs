//! Beta density evaluation for posterior conversion-rate curves.
//!
//! With a few thousand trials the shape parameters reach the thousands,
//! where `x^(α−1)` underflows and `B(α, β)` is far below the smallest
//! positive `f64`. The density is therefore assembled in log space,
//!
//! ```text
//! ln f(x) = (α−1)·ln x + (β−1)·ln(1−x) − ln B(α, β)
//! ```
//!
//! and exponentiated once.

use serde::Serialize;

use crate::error::DomainError;
use crate::grid;
use crate::observation::{BetaShapeParameters, ProportionObservation};
use crate::special::ln_beta;

/// One evaluated grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityPoint {
    pub x: f64,
    pub y: f64,
}

/// Density values over an ordered grid, used for visualization only.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DensityCurve {
    points: Vec<DensityPoint>,
}

impl DensityCurve {
    pub fn points(&self) -> &[DensityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Point with the highest density (first one on ties).
    pub fn peak(&self) -> Option<DensityPoint> {
        self.points
            .iter()
            .copied()
            .reduce(|best, p| if p.y > best.y { p } else { best })
    }

    /// Copy scaled so that the peak equals 1.
    ///
    /// Curves with very different spreads become comparable on one chart.
    /// An all-zero or empty curve is returned unchanged.
    pub fn normalized(&self) -> Self {
        let max = self.peak().map_or(0.0, |p| p.y);
        if max <= 0.0 {
            return self.clone();
        }
        Self {
            points: self
                .points
                .iter()
                .map(|p| DensityPoint { x: p.x, y: p.y / max })
                .collect(),
        }
    }

    /// Trapezoidal integral over the grid.
    ///
    /// Partial sums use Neumaier compensation so that fine grids with
    /// hundreds of thousands of panels do not drift.
    pub fn area(&self) -> f64 {
        let mut sum = 0.0_f64;
        let mut c = 0.0_f64;
        for w in self.points.windows(2) {
            let panel = (w[1].x - w[0].x) * (w[0].y + w[1].y) / 2.0;
            let t = sum + panel;
            if sum.abs() >= panel.abs() {
                c += (sum - t) + panel;
            } else {
                c += (panel - t) + sum;
            }
            sum = t;
        }
        sum + c
    }
}

/// Density of `Beta(alpha, beta)` at a single point.
///
/// # Errors
/// [`DomainError::NonPositiveShape`] if `alpha ≤ 0` or `beta ≤ 0`;
/// [`DomainError::PointOutOfRange`] if `x` is NaN.
///
/// # Examples
/// ```
/// use abtest_stats::density::beta_pdf;
/// // Beta(2, 2) peaks at 1.5
/// assert!((beta_pdf(0.5, 2.0, 2.0).unwrap() - 1.5).abs() < 1e-10);
/// assert!(beta_pdf(0.5, 0.0, 2.0).is_err());
/// ```
pub fn beta_pdf(x: f64, alpha: f64, beta: f64) -> Result<f64, DomainError> {
    let shape = BetaShapeParameters::new(alpha, beta)?;
    if x.is_nan() {
        return Err(DomainError::PointOutOfRange(x));
    }
    Ok(density_at(x, &shape, ln_beta(alpha, beta)))
}

/// Evaluates the Beta density of `shape` at every point, preserving order.
///
/// Points outside `[0, 1]` lie outside the support and get density 0. At
/// the boundaries a negative exponent would make the density unbounded;
/// such points are reported as 0 rather than raising.
///
/// # Errors
/// [`DomainError::PointOutOfRange`] if any point is NaN.
///
/// # Examples
/// ```
/// use abtest_stats::density::evaluate_density;
/// use abtest_stats::observation::BetaShapeParameters;
/// let flat = BetaShapeParameters::uniform();
/// let curve = evaluate_density(&flat, &[0.0, 0.5, 1.0]).unwrap();
/// assert!(curve.ys().iter().all(|y| (y - 1.0).abs() < 1e-10));
/// ```
pub fn evaluate_density(
    shape: &BetaShapeParameters,
    points: &[f64],
) -> Result<DensityCurve, DomainError> {
    if let Some(&bad) = points.iter().find(|x| x.is_nan()) {
        return Err(DomainError::PointOutOfRange(bad));
    }
    let ln_b = ln_beta(shape.alpha(), shape.beta());
    let points = points
        .iter()
        .map(|&x| DensityPoint {
            x,
            y: density_at(x, shape, ln_b),
        })
        .collect();
    Ok(DensityCurve { points })
}

fn density_at(x: f64, shape: &BetaShapeParameters, ln_b: f64) -> f64 {
    if !(0.0..=1.0).contains(&x) {
        return 0.0;
    }
    let (a1, b1) = (shape.alpha() - 1.0, shape.beta() - 1.0);
    if (x == 0.0 && a1 < 0.0) || (x == 1.0 && b1 < 0.0) {
        return 0.0;
    }

    // A zero exponent contributes a factor of 1 even at the boundary,
    // where 0·ln(0) would otherwise be NaN.
    let log_term = |v: f64, exponent: f64| if exponent == 0.0 { 0.0 } else { exponent * v.ln() };
    (log_term(x, a1) + log_term(1.0 - x, b1) - ln_b).exp()
}

/// Posterior curves of both groups over one shared grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewCurves {
    pub control: DensityCurve,
    pub variant: DensityCurve,
}

impl PreviewCurves {
    /// Both curves scaled to a peak of 1.
    pub fn normalized(&self) -> Self {
        Self {
            control: self.control.normalized(),
            variant: self.variant.normalized(),
        }
    }
}

/// Flat-prior posterior curves for two groups, sampled over the preview
/// window that covers both.
///
/// # Errors
/// [`DomainError::InvalidGrid`] if `points < 2`.
pub fn preview_curves(
    control: &ProportionObservation,
    variant: &ProportionObservation,
    points: usize,
) -> Result<PreviewCurves, DomainError> {
    let a = BetaShapeParameters::from_observation(control);
    let b = BetaShapeParameters::from_observation(variant);
    let xs = grid::preview_grid(&[a, b], points)?;
    Ok(PreviewCurves {
        control: evaluate_density(&a, &xs)?,
        variant: evaluate_density(&b, &xs)?,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn density_is_finite_and_non_negative(
            x in 0.0_f64..=1.0,
            a in 0.1_f64..5e3,
            b in 0.1_f64..5e3,
        ) {
            let y = beta_pdf(x, a, b).unwrap();
            prop_assert!(y.is_finite() && y >= 0.0, "f({x}; {a}, {b}) = {y}");
        }

        #[test]
        fn reflection_symmetry(x in 0.01_f64..0.99, a in 0.5_f64..50.0, b in 0.5_f64..50.0) {
            // f(x; α, β) = f(1−x; β, α)
            let lhs = beta_pdf(x, a, b).unwrap();
            let rhs = beta_pdf(1.0 - x, b, a).unwrap();
            prop_assert!((lhs - rhs).abs() <= 1e-8 * lhs.max(1.0));
        }

        #[test]
        fn evaluation_preserves_order(xs in proptest::collection::vec(0.0_f64..=1.0, 0..50)) {
            let curve = evaluate_density(&BetaShapeParameters::new(3.0, 7.0).unwrap(), &xs).unwrap();
            prop_assert_eq!(curve.xs(), xs);
        }
    }
}
