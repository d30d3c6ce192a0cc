//! Special mathematical functions.
//!
//! The standard normal distribution (density, CDF, quantile) and the
//! log-gamma / log-beta functions that the planning and density modules
//! are built on.

use crate::error::DomainError;

/// 1/√(2π) ≈ 0.3989422804014327
const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

/// Lower/upper split point of Acklam's approximation.
const P_LOW: f64 = 0.02425;
const P_HIGH: f64 = 1.0 - P_LOW;

// ============================================================================
// Standard Normal Distribution
// ============================================================================

/// Standard normal CDF Φ(x) = P(Z ≤ x) for Z ~ N(0,1).
///
/// # Algorithm
/// Evaluated through the regularized upper incomplete gamma function,
/// since `erfc(t) = Q(½, t²)`:
///
/// ```text
/// Φ(x) = ½·Q(½, x²/2)        for x < 0
///      = 1 − ½·Q(½, x²/2)    for x ≥ 0
/// ```
///
/// `Q` is computed by series expansion near the origin and by a Lentz
/// continued fraction in the tails, so the lower tail keeps full relative
/// precision instead of suffering `1 − (1 − ε)` cancellation.
///
/// Reference: Press et al. (2007), *Numerical Recipes*, 3rd ed., §6.2.
///
/// # Accuracy
/// Absolute error below 1e-13 across the real line, well inside the error
/// of [`inverse_normal_cdf`], so the pair can be used to verify each other.
///
/// # Examples
/// ```
/// use abtest_stats::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((standard_normal_cdf(1.959963984540054) - 0.975).abs() < 1e-12);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }

    let tail = 0.5 * regularized_upper_gamma(0.5, 0.5 * x * x);
    if x < 0.0 { tail } else { 1.0 - tail }
}

/// Standard normal PDF φ(x) = (1/√(2π)) exp(-x²/2).
///
/// # Examples
/// ```
/// use abtest_stats::special::standard_normal_pdf;
/// let peak = standard_normal_pdf(0.0);
/// assert!((peak - 0.3989422804014327).abs() < 1e-15);
/// ```
pub fn standard_normal_pdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Inverse of the standard normal CDF (quantile function).
///
/// Given a probability `p ∈ (0, 1)`, returns `z` such that `Φ(z) = p`.
///
/// # Algorithm
/// Acklam's rational approximation, split into three regions by the mass
/// in each tail:
///
/// - `p < 0.02425`: `q = √(−2 ln p)`, degree 5/4 rational in `q`.
/// - `0.02425 ≤ p ≤ 0.97575`: `q = p − ½`, `r = q²`, degree 5/4 rational
///   in `r` scaled by `q`.
/// - `p > 0.97575`: the lower-tail formula applied to `1 − p`, negated.
///
/// Reference: P. J. Acklam (2003), "An algorithm for computing the inverse
/// normal cumulative distribution function".
///
/// # Accuracy
/// Relative error below 1.15 × 10⁻⁹ over the whole domain.
///
/// # Errors
/// [`DomainError::ProbabilityOutOfRange`] if `p ≤ 0`, `p ≥ 1` or `p` is NaN;
/// the quantile is unbounded there.
///
/// # Examples
/// ```
/// use abtest_stats::special::inverse_normal_cdf;
/// assert_eq!(inverse_normal_cdf(0.5).unwrap(), 0.0);
/// assert!((inverse_normal_cdf(0.975).unwrap() - 1.959964).abs() < 1e-6);
/// assert!(inverse_normal_cdf(1.0).is_err());
/// ```
pub fn inverse_normal_cdf(p: f64) -> Result<f64, DomainError> {
    // Written so that NaN falls into the error branch.
    if !(p > 0.0 && p < 1.0) {
        return Err(DomainError::ProbabilityOutOfRange {
            name: "probability",
            value: p,
        });
    }

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    // Tail branches share one rational function; its numerator is negative
    // for q > 0, which yields the negative lower-tail quantile directly.
    let tail = |q: f64| {
        let num = ((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5];
        let den = (((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0;
        num / den
    };

    let z = if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        let num = ((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5];
        let den = ((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0;
        num * q / den
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    };

    Ok(z)
}

// ============================================================================
// Gamma and Beta Functions
// ============================================================================

/// Lanczos approximation of ln Γ(x).
///
/// Reference: Lanczos (1964), "A Precision Approximation of the Gamma
/// Function", *SIAM Journal on Numerical Analysis* 1(1).
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for x > 0. Stays finite for arguments in the
/// millions, where Γ itself overflows.
///
/// # Examples
/// ```
/// use abtest_stats::special::ln_gamma;
/// // Γ(5) = 24
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// assert!(ln_gamma(5000.0).is_finite());
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        // Reflection: Γ(x)·Γ(1−x) = π/sin(πx)
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (x + i as f64 + 1.0);
    }

    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Log of the Beta function: `ln B(a, b) = ln Γ(a) + ln Γ(b) − ln Γ(a+b)`.
///
/// Working in log space keeps `B(a, b)` representable for shape parameters
/// in the thousands, where `B` itself underflows to zero.
///
/// # Examples
/// ```
/// use abtest_stats::special::ln_beta;
/// // B(1,1) = 1, so ln B(1,1) = 0
/// assert!(ln_beta(1.0, 1.0).abs() < 1e-10);
/// ```
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

// ============================================================================
// Regularized Upper Incomplete Gamma Function
// ============================================================================

/// Regularized upper incomplete gamma function Q(a, x) = Γ(a, x) / Γ(a).
///
/// Series expansion of P = 1 − Q for `x < a + 1`, continued fraction for Q
/// otherwise.
fn regularized_upper_gamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_cf(a, x)
    }
}

/// Series expansion for the regularized lower incomplete gamma P(a, x).
fn gamma_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut ap = a;
    for _ in 0..200 {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * 1e-15 {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Continued fraction for Q(a, x) (modified Lentz).
fn gamma_cf(a: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-300;

    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=200 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < 1e-15 {
            break;
        }
    }
    h * (-x + a * x.ln() - ln_gamma(a)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- standard_normal_cdf ---

    #[test]
    fn test_cdf_at_zero() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_cdf_symmetry() {
        for &x in &[0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 5.0] {
            let sum = standard_normal_cdf(x) + standard_normal_cdf(-x);
            assert!(
                (sum - 1.0).abs() < 1e-14,
                "Φ({x}) + Φ(-{x}) = {sum}, expected 1.0"
            );
        }
    }

    #[test]
    fn test_cdf_reference_values() {
        // Values from R's pnorm
        let cases = [
            (-3.0, 0.0013498980316301),
            (-1.0, 0.1586552539314571),
            (1.0, 0.8413447460685429),
            (1.644853626951472, 0.95),
            (2.0, 0.9772498680518208),
            (2.575829303548901, 0.995),
        ];
        for &(x, expected) in &cases {
            let got = standard_normal_cdf(x);
            assert!(
                (got - expected).abs() < 1e-12,
                "Φ({x}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_cdf_deep_tail_keeps_relative_precision() {
        // Φ(-8) ≈ 6.22096e-16
        let got = standard_normal_cdf(-8.0);
        assert!((got / 6.220960574271785e-16 - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_cdf_extremes() {
        assert_eq!(standard_normal_cdf(f64::INFINITY), 1.0);
        assert_eq!(standard_normal_cdf(f64::NEG_INFINITY), 0.0);
        assert!(standard_normal_cdf(f64::NAN).is_nan());
    }

    // --- inverse_normal_cdf ---

    #[test]
    fn test_inverse_cdf_at_half() {
        assert!(inverse_normal_cdf(0.5).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_inverse_cdf_critical_values() {
        assert!((inverse_normal_cdf(0.975).unwrap() - 1.959964).abs() < 1e-4);
        assert!((inverse_normal_cdf(0.95).unwrap() - 1.644854).abs() < 1e-4);
        assert!((inverse_normal_cdf(0.8).unwrap() - 0.841621).abs() < 1e-4);
        assert!((inverse_normal_cdf(0.005).unwrap() + 2.575829).abs() < 1e-4);
    }

    #[test]
    fn test_inverse_cdf_rejects_closed_endpoints_and_outside() {
        for &p in &[0.0, 1.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    inverse_normal_cdf(p),
                    Err(DomainError::ProbabilityOutOfRange { .. })
                ),
                "expected a domain error for p = {p}"
            );
        }
    }

    #[test]
    fn test_inverse_cdf_odd_symmetry() {
        for &p in &[1e-10, 0.001, 0.0243, 0.1, 0.2, 0.3, 0.4, 0.49] {
            let z1 = inverse_normal_cdf(p).unwrap();
            let z2 = inverse_normal_cdf(1.0 - p).unwrap();
            assert!(
                (z1 + z2).abs() < 1e-6,
                "Φ⁻¹({p}) + Φ⁻¹({}) = {}, expected ~0",
                1.0 - p,
                z1 + z2
            );
        }
    }

    #[test]
    fn test_inverse_cdf_strictly_increasing() {
        let ps: Vec<f64> = (1..10_000).map(|i| i as f64 * 1e-4).collect();
        for w in ps.windows(2) {
            let lo = inverse_normal_cdf(w[0]).unwrap();
            let hi = inverse_normal_cdf(w[1]).unwrap();
            assert!(lo < hi, "not increasing between p = {} and {}", w[0], w[1]);
        }
    }

    #[test]
    fn test_inverse_cdf_continuous_at_region_boundaries() {
        for &edge in &[P_LOW, P_HIGH] {
            let below = inverse_normal_cdf(edge - 1e-12).unwrap();
            let above = inverse_normal_cdf(edge + 1e-12).unwrap();
            assert!((above - below).abs() < 1e-8, "jump at p = {edge}");
        }
    }

    #[test]
    fn test_roundtrip_cdf_inverse_all_regions() {
        let ps = [
            1e-12, 1e-8, 1e-5, 0.001, 0.01, 0.02, 0.0243, 0.05, 0.25, 0.5, 0.75, 0.95, 0.9757,
            0.98, 0.99, 0.999, 1.0 - 1e-8,
        ];
        for &p in &ps {
            let z = inverse_normal_cdf(p).unwrap();
            let p_back = standard_normal_cdf(z);
            assert!(
                (p_back - p).abs() < 1e-9,
                "roundtrip failed: p={p}, z={z}, p_back={p_back}"
            );
        }
    }

    // --- standard_normal_pdf ---

    #[test]
    fn test_pdf_at_zero() {
        let peak = standard_normal_pdf(0.0);
        assert!((peak - 0.3989422804014327).abs() < 1e-14);
    }

    #[test]
    fn test_pdf_symmetry() {
        for &x in &[0.5, 1.0, 2.0, 3.0] {
            let diff = (standard_normal_pdf(x) - standard_normal_pdf(-x)).abs();
            assert!(diff < 1e-15, "PDF not symmetric at x={x}");
        }
    }

    // --- ln_gamma / ln_beta ---

    #[test]
    fn test_ln_gamma_integers() {
        // Γ(n) = (n-1)!
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!(ln_gamma(2.0).abs() < 1e-10);
        assert!((ln_gamma(3.0) - 2.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(7.0) - 720.0_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_ln_gamma_half() {
        // Γ(0.5) = √π
        let ln_sqrt_pi = 0.5 * std::f64::consts::PI.ln();
        assert!((ln_gamma(0.5) - ln_sqrt_pi).abs() < 1e-10);
    }

    #[test]
    fn test_ln_gamma_large_argument_stirling() {
        // ln Γ(1001) = ln(1000!) ≈ 5912.128178488163
        assert!((ln_gamma(1001.0) - 5912.128178488163).abs() < 1e-6);
    }

    #[test]
    fn test_ln_beta_known() {
        assert!(ln_beta(1.0, 1.0).abs() < 1e-10);
        // B(1,2) = 1/2
        assert!((ln_beta(1.0, 2.0) + 2.0_f64.ln()).abs() < 1e-10);
        assert!((ln_beta(3.0, 5.0) - ln_beta(5.0, 3.0)).abs() < 1e-10);
    }

    #[test]
    fn test_ln_beta_large_counts_finite() {
        let v = ln_beta(21.0, 981.0);
        assert!(v.is_finite() && v < 0.0);
    }

    // --- regularized_upper_gamma ---

    #[test]
    fn test_upper_gamma_exponential() {
        // Q(1, x) = exp(-x)
        for &x in &[0.5, 1.0, 2.0, 5.0] {
            let got = regularized_upper_gamma(1.0, x);
            assert!((got - (-x).exp()).abs() < 1e-12, "Q(1,{x}) = {got}");
        }
    }

    #[test]
    fn test_upper_gamma_boundary() {
        assert_eq!(regularized_upper_gamma(0.5, 0.0), 1.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn inverse_is_finite(p in 1e-300_f64..1.0) {
            let z = inverse_normal_cdf(p).unwrap();
            prop_assert!(z.is_finite(), "Φ⁻¹({p}) = {z}");
        }

        #[test]
        fn inverse_roundtrip(p in 1e-6_f64..0.999_999) {
            let z = inverse_normal_cdf(p).unwrap();
            let err = (standard_normal_cdf(z) - p).abs();
            prop_assert!(err < 1e-9, "roundtrip error {} for p={}", err, p);
        }

        #[test]
        fn inverse_is_odd(p in 1e-9_f64..0.5) {
            let sum = inverse_normal_cdf(p).unwrap() + inverse_normal_cdf(1.0 - p).unwrap();
            prop_assert!(sum.abs() < 1e-6, "odd symmetry broken by {sum} at p={p}");
        }

        #[test]
        fn inverse_is_monotonic(p1 in 1e-6_f64..0.999_999, p2 in 1e-6_f64..0.999_999) {
            prop_assume!((p1 - p2).abs() > 1e-9);
            let (lo, hi) = if p1 < p2 { (p1, p2) } else { (p2, p1) };
            prop_assert!(inverse_normal_cdf(lo).unwrap() < inverse_normal_cdf(hi).unwrap());
        }

        #[test]
        fn cdf_in_zero_one(x in -40.0_f64..40.0) {
            let c = standard_normal_cdf(x);
            prop_assert!((0.0..=1.0).contains(&c), "CDF({x}) = {c} out of [0,1]");
        }

        #[test]
        fn pdf_is_non_negative(x in -10.0_f64..10.0) {
            prop_assert!(standard_normal_pdf(x) >= 0.0);
        }
    }
}
