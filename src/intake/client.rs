use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::models::{CheckSymptomsResponse, SymptomReport};

/// Failures of the intake's single analysis request. `Display` is the
/// message shown to the user.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Unable to connect to the server. Please make sure the relay service is running.")]
    ConnectionRefused,

    #[error("Request timeout. The server is taking too long to respond. Please try again.")]
    Timeout,

    #[error("No response from server. Please check your internet connection and try again.")]
    NoResponse,

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to get response. Please try again.")]
    Unexpected,

    #[error("Failed to initialise HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl RequestError {
    /// Timeout is checked first: a connect that times out is still a timeout.
    fn classify(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_connect() {
            RequestError::ConnectionRefused
        } else if err.is_decode() {
            RequestError::Unexpected
        } else {
            RequestError::NoResponse
        }
    }

    /// Prefer the relay's `error`, then its `message`, then the bare status
    fn from_server(status: u16, body: Option<Value>) -> Self {
        let field = |name: &str| {
            body.as_ref()
                .and_then(|b| b.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let message = field("error")
            .or_else(|| field("message"))
            .unwrap_or_else(|| format!("Server error: {status}"));
        RequestError::Server { status, message }
    }
}

/// Fixed timeout for the single analysis request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the relay's analysis endpoint
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RequestError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, RequestError> {
        Self::new(&cfg.client.api_url)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/check-symptoms", self.base_url)
    }

    /// Issue exactly one analysis request. No retry.
    pub async fn check_symptoms(&self, report: &SymptomReport) -> Result<String, RequestError> {
        let url = self.endpoint();
        tracing::info!(%url, "Submitting symptom report");

        let response = self
            .client
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("API error: {}", e);
                RequestError::classify(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            let err = RequestError::from_server(status.as_u16(), body);
            tracing::error!(status = status.as_u16(), "Relay returned error: {}", err);
            return Err(err);
        }

        let body: CheckSymptomsResponse = response.json().await.map_err(RequestError::classify)?;
        tracing::info!("Response received");
        Ok(body.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Severity};
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::json;

    fn report() -> SymptomReport {
        SymptomReport {
            symptoms: "persistent cough for 3 days with mild headache".to_string(),
            gender: Gender::Male,
            severity: Severity::Mild,
            duration: "3 days".to_string(),
            age: Some(29),
        }
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_success_returns_result_text() {
        let router = Router::new().route(
            "/api/check-symptoms",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"result": format!("age {}", body["age"])}))
            }),
        );
        let client = RelayClient::with_timeout(&serve(router).await, Duration::from_secs(5)).unwrap();

        assert_eq!(client.check_symptoms(&report()).await.unwrap(), "age 29");
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RelayClient::with_timeout(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let err = client.check_symptoms(&report()).await.unwrap_err();
        assert!(matches!(err, RequestError::ConnectionRefused), "{err:?}");
    }

    #[tokio::test]
    async fn test_timeout() {
        let router = Router::new().route(
            "/api/check-symptoms",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"result": "too late"}))
            }),
        );
        let client = RelayClient::with_timeout(&serve(router).await, Duration::from_millis(200)).unwrap();

        let err = client.check_symptoms(&report()).await.unwrap_err();
        assert!(matches!(err, RequestError::Timeout), "{err:?}");
        assert!(err.to_string().starts_with("Request timeout."));
    }

    #[tokio::test]
    async fn test_connection_closed_without_response() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let client = RelayClient::with_timeout(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let err = client.check_symptoms(&report()).await.unwrap_err();
        assert!(matches!(err, RequestError::NoResponse), "{err:?}");
    }

    #[tokio::test]
    async fn test_server_error_prefers_upstream_message() {
        let router = Router::new().route(
            "/api/check-symptoms",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "API key not valid.",
                        "message": "Unable to process your request. Please try again later."
                    })),
                )
            }),
        );
        let client = RelayClient::with_timeout(&serve(router).await, Duration::from_secs(5)).unwrap();

        match client.check_symptoms(&report()).await.unwrap_err() {
            RequestError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_config_targets_analysis_endpoint() {
        let mut cfg = Config::default();
        cfg.client.api_url = "http://relay.local:8080/".to_string();
        let client = RelayClient::from_config(&cfg).unwrap();
        assert_eq!(client.endpoint(), "http://relay.local:8080/api/check-symptoms");
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_server_error_fallbacks() {
        let err = RequestError::from_server(502, Some(json!({"message": "Bad gateway"})));
        assert_eq!(err.to_string(), "Bad gateway");

        let err = RequestError::from_server(503, None);
        assert_eq!(err.to_string(), "Server error: 503");
    }
}
