use std::sync::Arc;

use crate::error::Result;
use crate::models::{CheckSymptomsRequest, GenerateContentRequest, GenerationConfig, SymptomReport};
use crate::prompt::build_prompt;
use crate::transport::Transport;

/// Returned verbatim when the upstream answers without any candidate text
pub const NO_RESPONSE_FALLBACK: &str = "No response from Gemini.";

/// Validates symptom reports, composes the prompt and forwards it upstream.
/// Holds no per-request state.
pub struct RelayService {
    tx: Arc<dyn Transport>,
}

impl RelayService {
    pub fn new(tx: Arc<dyn Transport>) -> Self {
        Self { tx }
    }

    /// Validate the raw request, then relay it. Missing fields are rejected
    /// before the upstream is contacted.
    pub async fn check_symptoms(&self, req: CheckSymptomsRequest) -> Result<String> {
        let report = SymptomReport::try_from(req).inspect_err(|e| {
            tracing::warn!(error = ?e, "Rejecting symptom check");
        })?;
        self.analyze(&report).await
    }

    /// Send one validated report upstream and return the raw analysis text
    pub async fn analyze(&self, report: &SymptomReport) -> Result<String> {
        tracing::info!(
            gender = %report.gender,
            severity = %report.severity,
            duration = %report.duration,
            age = ?report.age,
            "Making API call to Gemini"
        );

        let request =
            GenerateContentRequest::from_prompt(build_prompt(report), GenerationConfig::FIXED);

        let response = self.tx.generate(&request).await.inspect_err(|e| {
            tracing::error!("Gemini API error: {}", e);
        })?;

        tracing::info!(
            candidates = response.candidates.len(),
            "Gemini API response received"
        );

        Ok(response
            .first_text()
            .unwrap_or(NO_RESPONSE_FALLBACK)
            .to_string())
    }

    pub async fn list_models(&self) -> Result<serde_json::Value> {
        self.tx.list_models().await.inspect_err(|e| {
            tracing::error!("Gemini ListModels error: {}", e);
        })
    }
}
