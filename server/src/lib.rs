//! HTTP API for the countdown deducer.
//!
//! | method | path | body |
//! |---|---|---|
//! | POST | `/sequence/create` | none |
//! | POST | `/observation/add` | `{"sequence": id, "observation": {"color": .., "numbers": [l, r]}}` |
//! | POST | `/clear` | none |
//! | GET | `/health` | none |
//!
//! Every reply is an envelope: `{"status": "ok", "response": ..}` or
//! `{"status": "error", "msg": ..}`. Domain failures are delivered with
//! HTTP 200; only storage trouble is a 5xx.

mod error;

pub use error::ApiError;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use countdown_engine::{SessionError, SessionRegistry};
use countdown_types::{Observation, RawObservation, SessionId};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub struct AppState {
    pub registry: Arc<SessionRegistry>,
}

type SharedState = Arc<AppState>;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            status: Status::Ok,
            response: Some(data),
            msg: None,
        })
    }
}

impl ApiResponse<()> {
    fn err(msg: &str) -> Json<Self> {
        Json(Self {
            status: Status::Error,
            response: None,
            msg: Some(msg.to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct SequenceCreated {
    sequence: SessionId,
}

#[derive(Debug, Serialize)]
struct Health {
    sessions: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ObservationRequest {
    #[serde(default)]
    sequence: Option<String>,
    #[serde(default)]
    observation: Option<RawObservation>,
}

// ============================================================================
// Router
// ============================================================================

pub fn router(registry: Arc<SessionRegistry>) -> Router {
    let state = Arc::new(AppState { registry });
    Router::new()
        .route("/health", get(health))
        .route("/sequence/create", post(create_sequence))
        .route("/observation/add", post(add_observation))
        .route("/clear", post(clear))
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(addr: &str, registry: Arc<SessionRegistry>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "Countdown service listening");

    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl+c: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

// ============================================================================
// Handlers
// ============================================================================

async fn health(State(state): State<SharedState>) -> Response {
    match with_registry(&state, SessionRegistry::count).await {
        Ok(sessions) => ApiResponse::ok(Health { sessions }).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn create_sequence(State(state): State<SharedState>) -> Response {
    match with_registry(&state, SessionRegistry::create).await {
        Ok(sequence) => ApiResponse::ok(SequenceCreated { sequence }).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn add_observation(
    State(state): State<SharedState>,
    payload: Result<Json<ObservationRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected observation body");
            return ApiError::BadFormat.into_response();
        }
    };

    let observation = match request
        .observation
        .ok_or(ApiError::BadFormat)
        .and_then(|raw| Observation::try_from(raw).map_err(ApiError::from))
    {
        Ok(observation) => observation,
        Err(err) => return err.into_response(),
    };

    let Some(sequence) = request.sequence else {
        return ApiError::SequenceNotFound.into_response();
    };
    let id = SessionId::new(sequence);

    match with_registry(&state, move |registry| registry.apply(&id, observation)).await {
        Ok(deduction) => ApiResponse::ok(deduction).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn clear(State(state): State<SharedState>) -> Response {
    match with_registry(&state, SessionRegistry::clear).await {
        Ok(()) => ApiResponse::ok("ok").into_response(),
        Err(err) => err.into_response(),
    }
}

/// Run registry work off the async workers; stores may block on disk.
async fn with_registry<T, F>(state: &SharedState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&SessionRegistry) -> Result<T, SessionError> + Send + 'static,
    T: Send + 'static,
{
    let registry = Arc::clone(&state.registry);
    tokio::task::spawn_blocking(move || work(&registry))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(ApiError::from)
}
