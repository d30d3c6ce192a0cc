use std::fs;
use std::path::Path;

use abtest_stats::inference::{failure_message, ErrorPayload, InferenceResponse};
use abtest_stats::power::PowerAnalysisInput;
use anyhow::{Context, Result};
use log::debug;

/// Parses a plan file body; omitted confidence and power take the defaults.
pub fn parse_plan(text: &str) -> Result<PowerAnalysisInput> {
    let input = serde_json::from_str::<PowerAnalysisInput>(text)?;
    Ok(input)
}

pub fn load_plan(path: &Path) -> Result<PowerAnalysisInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    parse_plan(&text).with_context(|| format!("could not parse {}", path.display()))
}

/// Parses a saved response body of the inference API.
///
/// A calculation result is validated against the contract. Anything else
/// becomes an error carrying the backend's `detail` when the body is an
/// error payload, and the retry prompt otherwise.
pub fn parse_response(text: &str) -> Result<InferenceResponse> {
    match serde_json::from_str::<InferenceResponse>(text) {
        Ok(response) => {
            response.validate()?;
            Ok(response)
        }
        Err(e) => {
            debug!("not a calculation result: {e}");
            let payload = serde_json::from_str::<ErrorPayload>(text).ok();
            anyhow::bail!("{}", failure_message(payload.as_ref()))
        }
    }
}

pub fn load_response(path: &Path) -> Result<InferenceResponse> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    parse_response(&text)
}
