//! Observed conversion counts and the Beta shapes derived from them.
//!
//! A group's conversion rate is modelled as `Beta(α, β)`. Starting from a
//! prior `Beta(α₀, β₀)` and observing `k` successes in `n` trials gives
//!
//! ```text
//! α = k + α₀
//! β = (n − k) + β₀
//! ```
//!
//! With the default flat prior `Beta(1, 1)` this is Laplace smoothing.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Success/trial counts for one experiment group.
///
/// Invariant: `total > 0` and `successes ≤ total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawObservation")]
pub struct ProportionObservation {
    successes: u64,
    total: u64,
}

#[derive(Deserialize)]
struct RawObservation {
    successes: u64,
    total: u64,
}

impl TryFrom<RawObservation> for ProportionObservation {
    type Error = DomainError;

    fn try_from(raw: RawObservation) -> Result<Self, Self::Error> {
        Self::new(raw.successes, raw.total)
    }
}

impl ProportionObservation {
    /// Creates an observation of `successes` conversions out of `total` trials.
    ///
    /// # Errors
    /// [`DomainError::InvalidObservation`] if `total == 0` or
    /// `successes > total`.
    ///
    /// # Examples
    /// ```
    /// use abtest_stats::observation::ProportionObservation;
    /// let obs = ProportionObservation::new(20, 1000).unwrap();
    /// assert_eq!(obs.failures(), 980);
    /// assert!(ProportionObservation::new(5, 4).is_err());
    /// ```
    pub fn new(successes: u64, total: u64) -> Result<Self, DomainError> {
        if total == 0 || successes > total {
            return Err(DomainError::InvalidObservation { successes, total });
        }
        Ok(Self { successes, total })
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn failures(&self) -> u64 {
        self.total - self.successes
    }

    /// Observed conversion rate `successes / total`.
    pub fn rate(&self) -> f64 {
        self.successes as f64 / self.total as f64
    }
}

/// Shape parameters `(α, β)` of a Beta distribution.
///
/// Both parameters are finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawShape")]
pub struct BetaShapeParameters {
    alpha: f64,
    beta: f64,
}

#[derive(Deserialize)]
struct RawShape {
    alpha: f64,
    beta: f64,
}

impl TryFrom<RawShape> for BetaShapeParameters {
    type Error = DomainError;

    fn try_from(raw: RawShape) -> Result<Self, Self::Error> {
        Self::new(raw.alpha, raw.beta)
    }
}

impl BetaShapeParameters {
    /// Creates shape parameters after validating them.
    ///
    /// # Errors
    /// [`DomainError::NonPositiveShape`] if either parameter is `≤ 0`,
    /// infinite, or NaN.
    pub fn new(alpha: f64, beta: f64) -> Result<Self, DomainError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(alpha) || !valid(beta) {
            return Err(DomainError::NonPositiveShape { alpha, beta });
        }
        Ok(Self { alpha, beta })
    }

    /// The flat prior `Beta(1, 1)`.
    pub fn uniform() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// Shapes for `obs` under the flat prior: `α = k + 1`, `β = n − k + 1`.
    ///
    /// # Examples
    /// ```
    /// use abtest_stats::observation::{BetaShapeParameters, ProportionObservation};
    /// let obs = ProportionObservation::new(20, 1000).unwrap();
    /// let shape = BetaShapeParameters::from_observation(&obs);
    /// assert_eq!((shape.alpha(), shape.beta()), (21.0, 981.0));
    /// ```
    pub fn from_observation(obs: &ProportionObservation) -> Self {
        Self::from_observation_with_prior(obs, &Self::uniform())
    }

    /// Conjugate update of `prior` with the counts in `obs`.
    ///
    /// Always valid: the prior is positive and the counts are non-negative.
    pub fn from_observation_with_prior(obs: &ProportionObservation, prior: &Self) -> Self {
        Self {
            alpha: prior.alpha + obs.successes() as f64,
            beta: prior.beta + obs.failures() as f64,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Mean = α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Mode = (α − 1) / (α + β − 2), defined when both shapes exceed 1.
    pub fn mode(&self) -> Option<f64> {
        if self.alpha > 1.0 && self.beta > 1.0 {
            Some((self.alpha - 1.0) / (self.alpha + self.beta - 2.0))
        } else {
            None
        }
    }

    /// Variance = αβ / ((α+β)²(α+β+1)).
    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        self.alpha * self.beta / (sum * sum * (sum + 1.0))
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
