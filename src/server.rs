use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, SymptomCheckerError};
use crate::models::{CheckSymptomsRequest, CheckSymptomsResponse, ErrorBody};
use crate::relay::RelayService;

/// Extra hint attached to upstream failures on the analysis endpoint
pub const UPSTREAM_FAILURE_HINT: &str = "Unable to process your request. Please try again later.";

impl SymptomCheckerError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for SymptomCheckerError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            message: None,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Build the relay router. Shared with tests so they hit the same routes.
pub fn router(relay: Arc<RelayService>) -> Router {
    Router::new()
        .route("/api/check-symptoms", post(check_symptoms))
        .route("/api/list-models", get(list_models))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(relay)
}

/// Bind the relay listener on the configured host and port
pub async fn bind(cfg: &Config) -> Result<TcpListener> {
    let addr = cfg.socket_addr()?;
    Ok(TcpListener::bind(addr).await?)
}

/// Serve the relay on `listener` until the process exits
pub async fn serve(listener: TcpListener, relay: Arc<RelayService>) -> Result<()> {
    axum::serve(listener, router(relay)).await?;
    Ok(())
}

async fn check_symptoms(
    State(relay): State<Arc<RelayService>>,
    payload: std::result::Result<Json<CheckSymptomsRequest>, JsonRejection>,
) -> Response {
    let span = tracing::info_span!("check_symptoms", request_id = %Uuid::new_v4());
    async move {
        let Json(req) = match payload {
            Ok(json) => json,
            Err(rejection) => {
                tracing::warn!("Malformed request body: {}", rejection.body_text());
                return SymptomCheckerError::MalformedBody(rejection.body_text()).into_response();
            }
        };
        tracing::info!("Received symptom check request");

        match relay.check_symptoms(req).await {
            Ok(result) => Json(CheckSymptomsResponse { result }).into_response(),
            Err(e) if e.is_client_error() => e.into_response(),
            Err(e) => {
                let body = ErrorBody {
                    error: e.to_string(),
                    message: Some(UPSTREAM_FAILURE_HINT.to_string()),
                };
                (e.status_code(), Json(body)).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn list_models(State(relay): State<Arc<RelayService>>) -> Response {
    match relay.list_models().await {
        Ok(models) => Json(models).into_response(),
        Err(e) => e.into_response(),
    }
}
