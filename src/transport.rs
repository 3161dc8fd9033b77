use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::config::GeminiConfig;
use crate::error::{Result, SymptomCheckerError};
use crate::models::{GenerateContentRequest, GenerateContentResponse};

/// The API key travels in this header, never in the URL
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Upstream generative-language API. One call per inbound request, no retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(&self, req: &GenerateContentRequest) -> Result<GenerateContentResponse>;
    async fn list_models(&self) -> Result<serde_json::Value>;
}

// Gemini error body: {"error": {"code": 400, "message": "...", "status": "..."}}
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiTransport {
    pub fn new(cfg: &GeminiConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/v1/models/{}:generateContent", self.base_url, self.model)
    }

    fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    /// Turn a non-success response into an `Upstream` error, preferring the
    /// message from the upstream's JSON error body.
    async fn upstream_error(response: Response) -> SymptomCheckerError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<UpstreamErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    format!("Request failed with status code {}", status.as_u16())
                } else {
                    body
                }
            });
        SymptomCheckerError::Upstream {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(&self, req: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        tracing::debug!(model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(req)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        response.json().await.map_err(|e| {
            SymptomCheckerError::Decode(format!(
                "Failed to parse Gemini API response: {}",
                e.without_url()
            ))
        })
    }

    async fn list_models(&self) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(self.models_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        response.json().await.map_err(|e| {
            SymptomCheckerError::Decode(format!(
                "Failed to parse Gemini model list: {}",
                e.without_url()
            ))
        })
    }
}
