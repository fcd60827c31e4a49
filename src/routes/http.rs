// JSON handlers: state, scan, filter, connect/secret/cancel, navigation

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;

use super::AppState;
use crate::error::ConnectionError;
use crate::presentation::AppView;
use crate::version::{NAME, VERSION};
use crate::workflow::ConnectStep;

#[derive(Debug, Deserialize)]
pub(super) struct FilterRequest {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConnectRequest {
    /// Row key from the list view; the BSSID for every row that has one.
    #[serde(alias = "bssid")]
    key: String,
}

#[derive(Deserialize)]
pub(super) struct SecretSubmission {
    token: u64,
    #[serde(default)]
    secret: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CancelRequest {
    token: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct ConnectResponse {
    step: ConnectStep,
    view: AppView,
}

/// Connection errors as `{ "error": message }` with a status the client can branch on.
pub(super) struct ApiError(ConnectionError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ConnectionError::UnknownNetwork(_) => StatusCode::NOT_FOUND,
            ConnectionError::NoPendingPrompt => StatusCode::CONFLICT,
            ConnectionError::OpenFailed(_) | ConnectionError::SecuredFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/health
pub(super) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "wsClients": state.ws_clients.load(Ordering::Relaxed),
    }))
}

/// GET /api/theme
pub(super) async fn theme_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.theme.as_ref().clone())
}

/// GET /api/state: current screen and everything needed to render it.
pub(super) async fn state_handler(State(state): State<AppState>) -> Json<AppView> {
    Json(state.view().await)
}

/// POST /api/scan: permission check then a fresh scan.
pub(super) async fn scan_handler(State(state): State<AppState>) -> Json<AppView> {
    state.session.refresh().await;
    Json(state.view().await)
}

/// PUT /api/filter: flip the SSID filter and rescan.
pub(super) async fn filter_handler(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> Json<AppView> {
    state.session.set_filter(req.enabled).await;
    Json(state.view().await)
}

/// POST /api/connect: the prefill in a `secretRequired` step is only ever sent here.
pub(super) async fn connect_handler(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let step = state.session.connect(&req.key).await.map_err(ApiError)?;
    Ok(Json(ConnectResponse {
        step,
        view: state.view().await,
    }))
}

/// POST /api/connect/secret: answer the open prompt.
pub(super) async fn secret_handler(
    State(state): State<AppState>,
    Json(req): Json<SecretSubmission>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let step = state
        .session
        .submit_secret(req.token, &req.secret)
        .await
        .map_err(ApiError)?;
    Ok(Json(ConnectResponse {
        step,
        view: state.view().await,
    }))
}

/// POST /api/connect/cancel
pub(super) async fn cancel_handler(
    State(state): State<AppState>,
    Json(req): Json<CancelRequest>,
) -> Result<StatusCode, ApiError> {
    if state.session.cancel_secret(req.token).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError(ConnectionError::NoPendingPrompt))
    }
}

/// POST /api/navigate/home: leave the confirmation screen.
pub(super) async fn navigate_home_handler(State(state): State<AppState>) -> Json<AppView> {
    state.session.back_to_home().await;
    Json(state.view().await)
}
