use super::AppState;
use super::error::ApiError;
use crate::models::{ActionPayload, ActionRequest, ActionResponse, AppMeta, VersionInfo};
use crate::services::{
    ApiTestError, ApiTestRequest, ApiTestResponse, LinkStatus, LoginResult, render_markdown,
};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

type SharedState = State<Arc<AppState>>;

/// Run blocking work on tokio's blocking pool.
async fn run_blocking<T, F>(context: &'static str, work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("{}: {}", context, e)))
}

pub async fn health(State(state): SharedState) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": format!("I.D.T.F.E Backend is running on {}", state.config.server.platform),
        "port": state.config.server.port,
    }))
}

pub async fn meta(State(state): SharedState) -> Json<AppMeta> {
    Json(state.meta.clone())
}

pub async fn version(State(state): SharedState) -> Json<VersionInfo> {
    Json(state.version.clone())
}

pub async fn api_tester(
    State(state): SharedState,
    payload: Result<Json<ApiTestRequest>, JsonRejection>,
) -> Result<Json<ApiTestResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::Validation(format!("Request failed: {}", e.body_text())))?;

    let worker = Arc::clone(&state);
    let result = run_blocking("Request failed", move || worker.api_tester.execute(&request)).await?;

    match result {
        Ok(response) => {
            state.metrics.record_proxied_request();
            Ok(Json(response))
        }
        Err(e) => {
            if matches!(e, ApiTestError::Request(_)) {
                state.metrics.record_upstream_failure();
            }
            Err(e.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub content: String,
}

pub async fn render(
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        ApiError::Validation(format!("Markdown rendering failed: {}", e.body_text()))
    })?;

    tracing::debug!("Rendering {} bytes of markdown", request.content.len());
    Ok(Json(json!({ "html": render_markdown(&request.content) })))
}

pub async fn ide_action(
    State(state): SharedState,
    payload: Result<Json<ActionPayload>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(payload) = payload
        .map_err(|e| ApiError::Validation(format!("IDE action failed: {}", e.body_text())))?;
    let request = ActionRequest::try_from(payload)?;

    let worker = Arc::clone(&state);
    let dispatched = run_blocking("IDE action failed", move || worker.ide.dispatch(&request)).await?;

    state.metrics.record_ide_action();
    if let ActionResponse::Preview(preview) = &dispatched.response {
        if let Some(detected) = &preview.detected_resources {
            state
                .metrics
                .record_resources(detected.len(), dispatched.partial_failure.skipped.len());
        }
    }

    Ok(Json(dispatched.response))
}

pub async fn github_login(State(state): SharedState) -> Response {
    let url = state.github.authorize_url();
    tracing::info!("Redirecting to GitHub authorization");
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

pub async fn github_callback(
    State(state): SharedState,
    Query(params): Query<CallbackParams>,
) -> Result<Json<LoginResult>, ApiError> {
    tracing::info!("GitHub OAuth callback received");

    let worker = Arc::clone(&state);
    let result = run_blocking("Login failed", move || {
        worker.github.complete_login(params.code.as_deref())
    })
    .await?;

    match result {
        Ok(login) => {
            state.metrics.record_login();
            Ok(Json(login))
        }
        Err(e) => {
            let err = ApiError::from(e);
            if err.is_upstream() {
                state.metrics.record_upstream_failure();
            }
            Err(err)
        }
    }
}

pub async fn github_status(State(state): SharedState) -> Result<Json<LinkStatus>, ApiError> {
    let worker = Arc::clone(&state);
    let status = run_blocking("Status check failed", move || worker.github.status()).await?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    pub token: String,
}

pub async fn github_link(
    State(state): SharedState,
    payload: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<Json<LinkStatus>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    tracing::info!("Linking GitHub token");

    let worker = Arc::clone(&state);
    let status = run_blocking("Link failed", move || worker.github.link(&request.token)).await??;

    if status.success {
        state.metrics.record_login();
    }
    Ok(Json(status))
}
