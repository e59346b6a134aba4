//! Session registration and diagnostics routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use packet_relay_core::{Relay, SessionId};

use crate::protocol::{ErrorResponse, HealthResponse, RegisterRequest, RegisterResponse, SessionStatus};

/// HTTP API state.
#[derive(Clone)]
pub struct ApiState {
    relay: Relay,
    /// Base URL consumers connect to, without trailing slash.
    public_ws_url: Arc<str>,
}

impl ApiState {
    #[must_use]
    pub fn new(relay: Relay, public_ws_url: &str) -> Self {
        Self {
            relay,
            public_ws_url: public_ws_url.trim_end_matches('/').into(),
        }
    }
}

/// Client-facing API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("UUID is required")]
    MissingUuid,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingUuid => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Announce a session id. Connecting does not require this step; it only
/// tells the caller where consumers should connect.
async fn register_session(
    State(state): State<ApiState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let uuid = payload
        .ok()
        .and_then(|Json(body)| body.uuid)
        .filter(|uuid| !uuid.is_empty())
        .ok_or(ApiError::MissingUuid)?;

    let url = format!("{}/{uuid}", state.public_ws_url);
    tracing::info!(session_id = %uuid, "UUID received. Clients can connect at {url}");

    Ok(Json(RegisterResponse {
        message: format!("WebSocket route enabled for UUID: {uuid}"),
        url,
    }))
}

async fn session_status(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Json<SessionStatus> {
    let connections = SessionId::parse(&session_id)
        .map_or(0, |id| state.relay.registry().connection_count(&id));
    Json(SessionStatus {
        session_id,
        active: connections > 0,
        connections,
    })
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.relay.registry().session_count(),
    })
}

/// Create the registration/diagnostics router.
#[must_use]
pub fn create_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/uuid", post(register_session))
        .route("/health", get(health))
        .route("/sessions/{session_id}", get(session_status))
        .with_state(state)
}
