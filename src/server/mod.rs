//! HTTP surface of the dashboard backend.
//!
//! # Components
//!
//! - [`AppState`]: services, static descriptors, config and metrics shared by
//!   every handler behind an `Arc`
//! - [`build_router`]: the full route table wrapped in the CORS layer
//! - [`serve`]: runs the router on a bound listener until the shutdown future fires
//! - [`ApiError`]: maps service errors onto `400 {"error": ...}`
//!
//! # Design
//!
//! Handlers stay thin: parse the body, hand the work to a service, record
//! metrics. Services that block (outbound HTTP, directory reads) run on
//! tokio's blocking pool so the async workers never stall.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::VERSION;
use crate::config::SecretStore;
use crate::metrics::Metrics;
use crate::models::{AppConfig, AppMeta, VersionInfo};
use crate::services::{ApiTesterService, GithubOAuthService, IdeService};
use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Shared state handed to every handler.
pub struct AppState {
    pub config: AppConfig,
    pub meta: AppMeta,
    pub version: VersionInfo,
    pub ide: IdeService,
    pub api_tester: ApiTesterService,
    pub github: GithubOAuthService,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn SecretStore>, metrics: Arc<Metrics>) -> Self {
        let platform = config.server.platform.as_str();
        let api_tester =
            ApiTesterService::new(Duration::from_secs(config.http.api_tester_timeout_secs));
        let github = GithubOAuthService::new(
            config.github.clone(),
            Duration::from_secs(config.http.oauth_timeout_secs),
            store,
        );

        Self {
            meta: AppMeta::new(VERSION, platform),
            version: VersionInfo::new(VERSION, platform),
            ide: IdeService::new(),
            api_tester,
            github,
            metrics,
            config,
        }
    }
}

/// Build the route table.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/meta", get(handlers::meta))
        .route("/api/v1/version", get(handlers::version))
        .route("/api/v1/tools/api-tester", post(handlers::api_tester))
        .route("/api/v1/tools/markdown/render", post(handlers::render))
        .route("/api/v1/tools/ide/action", post(handlers::ide_action))
        .route("/api/v1/tools/github/status", get(handlers::github_status))
        .route("/api/v1/tools/github/link", post(handlers::github_link))
        .route("/auth/github/login", get(handlers::github_login))
        .route("/auth/github/callback", get(handlers::github_callback))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Allow any origin, the verbs the dashboard uses, and any request header.
async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
}
