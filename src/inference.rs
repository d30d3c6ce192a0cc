//! Contract of the backend inference API.
//!
//! The Bayesian engine (posterior simulation, probability-to-be-best,
//! expected loss, smoothed distributions) runs remotely. This module holds
//! the request/response shapes it speaks, checks responses against the
//! contract before they reach a chart, and turns outcomes into the text a
//! caller shows to the user.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::observation::{BetaShapeParameters, ProportionObservation};

/// Shown when the backend is unreachable or answers without a usable detail.
pub const RETRY_PROMPT: &str =
    "Calculation failed. Check the entered values and try again.";

fn one() -> u64 {
    1
}

/// Body of a calculation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub a_success: u64,
    pub a_total: u64,
    pub b_success: u64,
    pub b_total: u64,
    #[serde(default = "one")]
    pub a_prior_alpha: u64,
    #[serde(default = "one")]
    pub a_prior_beta: u64,
    #[serde(default = "one")]
    pub b_prior_alpha: u64,
    #[serde(default = "one")]
    pub b_prior_beta: u64,
}

impl InferenceRequest {
    /// Request with flat `Beta(1, 1)` priors for both groups.
    pub fn new(control: &ProportionObservation, variant: &ProportionObservation) -> Self {
        Self {
            a_success: control.successes(),
            a_total: control.total(),
            b_success: variant.successes(),
            b_total: variant.total(),
            a_prior_alpha: 1,
            a_prior_beta: 1,
            b_prior_alpha: 1,
            b_prior_beta: 1,
        }
    }

    /// Checks the counts and priors, returning the two observations.
    ///
    /// # Errors
    /// [`DomainError::InvalidObservation`] for inconsistent counts,
    /// [`DomainError::NonPositiveShape`] for a zero prior.
    pub fn validate(&self) -> Result<(ProportionObservation, ProportionObservation), DomainError> {
        let control = ProportionObservation::new(self.a_success, self.a_total)?;
        let variant = ProportionObservation::new(self.b_success, self.b_total)?;
        self.priors()?;
        Ok((control, variant))
    }

    /// Posterior shapes the backend will derive for each group.
    pub fn posterior_shapes(&self) -> Result<(BetaShapeParameters, BetaShapeParameters), DomainError> {
        let (control, variant) = self.validate()?;
        let (prior_a, prior_b) = self.priors()?;
        Ok((
            BetaShapeParameters::from_observation_with_prior(&control, &prior_a),
            BetaShapeParameters::from_observation_with_prior(&variant, &prior_b),
        ))
    }

    fn priors(&self) -> Result<(BetaShapeParameters, BetaShapeParameters), DomainError> {
        Ok((
            BetaShapeParameters::new(self.a_prior_alpha as f64, self.a_prior_beta as f64)?,
            BetaShapeParameters::new(self.b_prior_alpha as f64, self.b_prior_beta as f64)?,
        ))
    }
}

/// Successful calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub freq_p_value: f64,
    pub freq_significant: bool,
    pub bayes_prob_b_better: f64,
    pub a_mean: f64,
    pub a_prob_best: f64,
    pub a_expected_loss: f64,
    pub b_mean: f64,
    pub b_prob_best: f64,
    pub b_expected_loss: f64,
    pub x_values: Vec<f64>,
    pub a_distribution: Vec<f64>,
    pub b_distribution: Vec<f64>,
    #[serde(default)]
    pub diff_x: Vec<f64>,
    #[serde(default)]
    pub diff_distribution: Vec<f64>,
}

/// Posterior summary of one group, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummary {
    pub mean: f64,
    pub prob_best: f64,
    pub expected_loss: f64,
}

impl InferenceResponse {
    pub fn control(&self) -> GroupSummary {
        GroupSummary {
            mean: self.a_mean,
            prob_best: self.a_prob_best,
            expected_loss: self.a_expected_loss,
        }
    }

    pub fn variant(&self) -> GroupSummary {
        GroupSummary {
            mean: self.b_mean,
            prob_best: self.b_prob_best,
            expected_loss: self.b_expected_loss,
        }
    }

    /// Strength of the evidence carried by `bayes_prob_b_better`.
    pub fn evidence(&self) -> EvidenceStrength {
        EvidenceStrength::classify(self.bayes_prob_b_better)
    }

    /// Checks the response against the API contract.
    ///
    /// # Errors
    /// [`DomainError::InvalidResponse`] if a probability leaves `[0, 1]`,
    /// a summary is not finite, or parallel arrays differ in length.
    pub fn validate(&self) -> Result<(), DomainError> {
        let probabilities = [
            ("freq_p_value", self.freq_p_value),
            ("bayes_prob_b_better", self.bayes_prob_b_better),
            ("a_prob_best", self.a_prob_best),
            ("b_prob_best", self.b_prob_best),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidResponse(format!(
                    "{name} = {value} is not a probability"
                )));
            }
        }

        let summaries = [
            ("a_mean", self.a_mean),
            ("b_mean", self.b_mean),
            ("a_expected_loss", self.a_expected_loss),
            ("b_expected_loss", self.b_expected_loss),
        ];
        if let Some((name, value)) = summaries.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DomainError::InvalidResponse(format!(
                "{name} = {value} is not finite"
            )));
        }

        let n = self.x_values.len();
        if self.a_distribution.len() != n || self.b_distribution.len() != n {
            return Err(DomainError::InvalidResponse(format!(
                "x_values has {n} points but distributions have {} and {}",
                self.a_distribution.len(),
                self.b_distribution.len()
            )));
        }
        if self.diff_x.len() != self.diff_distribution.len() {
            return Err(DomainError::InvalidResponse(format!(
                "diff_x has {} points but diff_distribution has {}",
                self.diff_x.len(),
                self.diff_distribution.len()
            )));
        }
        Ok(())
    }
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub detail: String,
}

/// Text to show for a failed calculation.
///
/// The backend's `detail` is surfaced verbatim; without one (network
/// failure, unparseable body, blank detail) the generic retry prompt is used.
///
/// # Examples
/// ```
/// use abtest_stats::inference::{failure_message, ErrorPayload, RETRY_PROMPT};
/// let payload = ErrorPayload { detail: "a_success exceeds a_total".into() };
/// assert_eq!(failure_message(Some(&payload)), "a_success exceeds a_total");
/// assert_eq!(failure_message(None), RETRY_PROMPT);
/// ```
pub fn failure_message(payload: Option<&ErrorPayload>) -> &str {
    match payload {
        Some(p) if !p.detail.trim().is_empty() => &p.detail,
        _ => RETRY_PROMPT,
    }
}

/// How decisively `P(B > A)` separates the groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStrength {
    /// Above 0.95 or below 0.05.
    VeryStrong,
    /// Above 0.9 or below 0.1.
    Strong,
    /// Above 0.8 or below 0.2.
    Moderate,
    /// Above 0.6 or below 0.4.
    Weak,
    /// Between 0.4 and 0.6 inclusive.
    Insufficient,
}

impl EvidenceStrength {
    /// Classifies the probability that the variant beats the control.
    ///
    /// The scale is symmetric: 0.02 is as decisive (for the control) as
    /// 0.98 is for the variant.
    ///
    /// # Examples
    /// ```
    /// use abtest_stats::inference::EvidenceStrength;
    /// assert_eq!(EvidenceStrength::classify(0.97), EvidenceStrength::VeryStrong);
    /// assert_eq!(EvidenceStrength::classify(0.5), EvidenceStrength::Insufficient);
    /// ```
    pub fn classify(prob_b_better: f64) -> Self {
        let beyond = |hi: f64, lo: f64| prob_b_better > hi || prob_b_better < lo;
        if beyond(0.95, 0.05) {
            EvidenceStrength::VeryStrong
        } else if beyond(0.9, 0.1) {
            EvidenceStrength::Strong
        } else if beyond(0.8, 0.2) {
            EvidenceStrength::Moderate
        } else if beyond(0.6, 0.4) {
            EvidenceStrength::Weak
        } else {
            EvidenceStrength::Insufficient
        }
    }
}

impl std::fmt::Display for EvidenceStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceStrength::VeryStrong => write!(f, "very strong evidence"),
            EvidenceStrength::Strong => write!(f, "strong evidence"),
            EvidenceStrength::Moderate => write!(f, "moderate evidence"),
            EvidenceStrength::Weak => write!(f, "weak evidence"),
            EvidenceStrength::Insufficient => write!(f, "not enough data to decide"),
        }
    }
}
