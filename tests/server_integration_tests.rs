//! Integration tests for the HTTP surface
//!
//! These tests verify:
//! - Descriptor endpoints and permissive CORS
//! - IDE and markdown endpoints over the wire
//! - The API tester against a local target server
//! - The GitHub OAuth flow against a local fake provider, including token
//!   persistence to the secret file
//!
//! Every server binds to an ephemeral loopback port. Requests are made with
//! the blocking `ureq` client on tokio's blocking pool.

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use camino::Utf8PathBuf;
use idtfe::config::{EnvFileStore, GITHUB_TOKEN_KEY, SecretStore};
use idtfe::server::{self, AppState};
use idtfe::{AppConfig, Metrics};
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const GOOD_CODE: &str = "good-code";
const OAUTH_TOKEN: &str = "gho_test";
const PERSONAL_TOKEN: &str = "pat_ok";

struct TestServer {
    base: String,
    metrics: Arc<Metrics>,
    store: Arc<EnvFileStore>,
    secrets_path: Utf8PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

async fn spawn_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn start_server(github_base: Option<&str>) -> TestServer {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let secrets_path = dir.join(".env");

    let mut config = AppConfig::default();
    config.server.port = 8123;
    config.http.api_tester_timeout_secs = 5;
    config.http.oauth_timeout_secs = 5;
    config.github.client_id = "client-123".to_string();
    config.github.client_secret = "secret-456".to_string();
    config.github.redirect_uri = "http://localhost:8123/auth/github/callback".to_string();
    if let Some(base) = github_base {
        config.github.token_url = format!("{}/login/oauth/access_token", base);
        config.github.api_base = base.to_string();
    }

    let metrics = Arc::new(Metrics::new());
    let store = Arc::new(EnvFileStore::new(&secrets_path));
    let state = Arc::new(AppState::new(
        config,
        Arc::clone(&store) as Arc<dyn SecretStore>,
        Arc::clone(&metrics),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server::serve(listener, state, async move {
        let _ = rx.await;
    }));

    TestServer {
        base,
        metrics,
        store,
        secrets_path,
        shutdown: Some(tx),
        handle,
        _temp_dir: temp_dir,
    }
}

/// Local stand-in for github.com and api.github.com.
async fn start_fake_github() -> String {
    async fn access_token(body: String) -> Response {
        if body.contains(&format!("code={}", GOOD_CODE)) && body.contains("client_secret=secret-456")
        {
            axum::Json(json!({"access_token": OAUTH_TOKEN, "token_type": "bearer"})).into_response()
        } else {
            axum::Json(json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            }))
            .into_response()
        }
    }

    async fn user(headers: HeaderMap) -> Response {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let login = match auth {
            a if a == format!("Bearer {}", OAUTH_TOKEN) => "octocat",
            a if a == format!("Bearer {}", PERSONAL_TOKEN) => "hubot",
            _ => {
                return (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"message": "Bad credentials"})),
                )
                    .into_response();
            }
        };
        axum::Json(json!({
            "login": login,
            "id": 583231,
            "avatar_url": format!("https://avatars.example/{}", login),
            "html_url": format!("https://github.com/{}", login)
        }))
        .into_response()
    }

    spawn_router(
        Router::new()
            .route("/login/oauth/access_token", post(access_token))
            .route("/user", get(user)),
    )
    .await
}

/// Local target for the API tester.
async fn start_target() -> String {
    spawn_router(
        Router::new()
            .route(
                "/echo",
                get(|headers: HeaderMap| async move {
                    let probe = headers
                        .get("x-probe")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    axum::Json(json!({"method": "GET", "probe": probe}))
                })
                .post(|body: String| async move { (StatusCode::CREATED, body) }),
            )
            .route(
                "/teapot",
                get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
            ),
    )
    .await
}

fn into_status_and_json(result: Result<ureq::Response, ureq::Error>) -> (u16, Value) {
    let response = match result {
        Ok(resp) | Err(ureq::Error::Status(_, resp)) => resp,
        Err(ureq::Error::Transport(err)) => panic!("transport error: {}", err),
    };
    let status = response.status();
    let text = response.into_string().unwrap();
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (status, body)
}

async fn get_json(url: String) -> (u16, Value) {
    tokio::task::spawn_blocking(move || into_status_and_json(ureq::get(&url).call()))
        .await
        .unwrap()
}

async fn post_json(url: String, body: Value) -> (u16, Value) {
    tokio::task::spawn_blocking(move || {
        into_status_and_json(
            ureq::post(&url)
                .set("Content-Type", "application/json")
                .send_string(&body.to_string()),
        )
    })
    .await
    .unwrap()
}

async fn post_raw(url: String, body: &'static str) -> (u16, Value) {
    tokio::task::spawn_blocking(move || {
        into_status_and_json(
            ureq::post(&url)
                .set("Content-Type", "application/json")
                .send_string(body),
        )
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_descriptor_endpoints() {
    let server = start_server(None).await;

    let (status, health) = get_json(format!("{}/api/v1/health", server.base)).await;
    assert_eq!(status, 200);
    assert_eq!(
        health,
        json!({
            "status": "ok",
            "message": "I.D.T.F.E Backend is running on Render",
            "port": 8123
        })
    );

    let (_, meta) = get_json(format!("{}/api/v1/meta", server.base)).await;
    let modules = meta["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 4);
    assert!(modules.iter().all(|m| !m["description"].as_str().unwrap().is_empty()));
    assert_eq!(meta["app_name"], "IDTFE");
    assert_eq!(
        meta["feature_flags"].as_object().unwrap().keys().next().unwrap(),
        "auto_format"
    );

    let (_, version) = get_json(format!("{}/api/v1/version", server.base)).await;
    assert_eq!(version["version"], idtfe::VERSION);
    assert_eq!(version["build_info"]["build_date"], "2026-01-13");

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cors_preflight_and_headers() {
    let server = start_server(None).await;
    let url = format!("{}/api/v1/tools/ide/action", server.base);
    let health_url = format!("{}/api/v1/health", server.base);

    let (preflight_status, preflight_origin, get_origin) = tokio::task::spawn_blocking(move || {
        let preflight = ureq::request("OPTIONS", &url)
            .set("Origin", "http://localhost:3000")
            .set("Access-Control-Request-Method", "POST")
            .call()
            .unwrap();
        let get = ureq::get(&health_url).call().unwrap();
        (
            preflight.status(),
            preflight.header("access-control-allow-origin").map(str::to_string),
            get.header("access-control-allow-origin").map(str::to_string),
        )
    })
    .await
    .unwrap();

    assert_eq!(preflight_status, 204);
    assert_eq!(preflight_origin.as_deref(), Some("*"));
    assert_eq!(get_origin.as_deref(), Some("*"));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ide_action_over_http() {
    let server = start_server(None).await;
    let url = format!("{}/api/v1/tools/ide/action", server.base);

    let (status, body) = post_json(
        url.clone(),
        json!({"action": "format", "content": "{\"x\":1}", "file_type": "json"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"content": "{\n  \"x\": 1\n}", "action": "format", "success": true})
    );

    let (status, body) = post_json(
        url.clone(),
        json!({"action": "lint", "content": "", "file_type": "text"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"issues": [{"line": 1, "message": "File is empty"}], "action": "lint", "success": true})
    );

    let (status, body) = post_json(url.clone(), json!({"action": "compile", "content": "x"})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Unsupported action"}));

    let (status, body) = post_raw(url, "{not json").await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("IDE action failed: "));

    assert_eq!(server.metrics.ide_actions.load(Ordering::Relaxed), 2);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_markdown_render_over_http() {
    let server = start_server(None).await;
    let url = format!("{}/api/v1/tools/markdown/render", server.base);

    let (status, body) = post_json(
        url.clone(),
        json!({"content": "# Test\n\n**Bold text** and *italic text*"}),
    )
    .await;
    assert_eq!(status, 200);
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("<h1>Test</h1>"));
    assert!(html.contains("<strong>Bold text</strong>"));

    let (status, body) = post_json(url, json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"html": ""}));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_tester_proxies_requests() {
    let target = start_target().await;
    let server = start_server(None).await;
    let url = format!("{}/api/v1/tools/api-tester", server.base);

    let (status, body) = post_json(
        url.clone(),
        json!({"url": format!("{}/echo", target), "method": "get", "headers": {"X-Probe": 7}}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["body"], json!({"method": "GET", "probe": "7"}));
    assert!(body["duration"].as_f64().unwrap() >= 0.0);
    assert!(
        body["headers"]
            .as_object()
            .unwrap()
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"))
    );

    let (_, body) = post_json(
        url.clone(),
        json!({"url": format!("{}/echo", target), "method": "POST", "body": "raw text"}),
    )
    .await;
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["body"], "raw text");

    let (status, body) = post_json(url.clone(), json!({"url": format!("{}/teapot", target)})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status_code"], 418);
    assert_eq!(body["body"], "short and stout");

    assert_eq!(server.metrics.proxied_requests.load(Ordering::Relaxed), 3);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_tester_errors() {
    let server = start_server(None).await;
    let url = format!("{}/api/v1/tools/api-tester", server.base);

    let (status, body) = post_json(url.clone(), json!({"method": "GET"})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "URL is required"}));

    let (status, body) = post_json(
        url.clone(),
        json!({"url": "http://127.0.0.1:1/", "method": "PATCH"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Unsupported HTTP method"}));

    let (status, body) = post_json(url, json!({"url": "http://127.0.0.1:1/"})).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("Request failed: "));
    assert_eq!(server.metrics.upstream_failures.load(Ordering::Relaxed), 1);

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_github_login_redirect() {
    let server = start_server(None).await;
    let url = format!("{}/auth/github/login", server.base);

    let (status, location) = tokio::task::spawn_blocking(move || {
        let agent = ureq::AgentBuilder::new().redirects(0).build();
        let response = agent.get(&url).call().unwrap();
        (response.status(), response.header("location").map(str::to_string))
    })
    .await
    .unwrap();

    assert_eq!(status, 302);
    assert_eq!(
        location.as_deref(),
        Some(
            "https://github.com/login/oauth/authorize?client_id=client-123\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8123%2Fauth%2Fgithub%2Fcallback\
             &scope=read%3Auser%20repo"
        )
    );

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_github_callback_flow() {
    let github = start_fake_github().await;
    let server = start_server(Some(&github)).await;
    fs::write(&server.secrets_path, "PORT=8000\nGITHUB_TOKEN=stale").unwrap();

    let (status, body) = get_json(format!("{}/auth/github/callback", server.base)).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Missing code"}));

    let (status, body) =
        get_json(format!("{}/auth/github/callback?code=expired", server.base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Token exchange failed");
    assert_eq!(body["details"]["error"], "bad_verification_code");
    assert_eq!(
        fs::read_to_string(&server.secrets_path).unwrap(),
        "PORT=8000\nGITHUB_TOKEN=stale"
    );

    let (status, body) =
        get_json(format!("{}/auth/github/callback?code={}", server.base, GOOD_CODE)).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "authenticated": true,
            "username": "octocat",
            "avatar": "https://avatars.example/octocat",
            "profile": "https://github.com/octocat",
            "id": 583231
        })
    );
    assert_eq!(
        fs::read_to_string(&server.secrets_path).unwrap(),
        format!("PORT=8000\nGITHUB_TOKEN={}", OAUTH_TOKEN)
    );

    let (status, body) = get_json(format!("{}/api/v1/tools/github/status", server.base)).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"success": true, "username": "octocat", "message": "Linked as octocat"})
    );

    assert_eq!(server.metrics.logins_completed.load(Ordering::Relaxed), 1);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_github_link_flow() {
    let github = start_fake_github().await;
    let server = start_server(Some(&github)).await;
    let status_url = format!("{}/api/v1/tools/github/status", server.base);
    let link_url = format!("{}/api/v1/tools/github/link", server.base);

    let (_, body) = get_json(status_url.clone()).await;
    assert_eq!(body, json!({"success": false, "message": "Not linked"}));

    let (status, body) = post_json(link_url.clone(), json!({"token": ""})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Token is required"}));

    let (status, body) = post_json(link_url.clone(), json!({"token": "nope"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("401"));
    assert_eq!(server.store.get(GITHUB_TOKEN_KEY).unwrap(), None);

    let (status, body) = post_json(link_url, json!({"token": PERSONAL_TOKEN})).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"success": true, "username": "hubot", "message": "Linked as hubot"})
    );
    assert_eq!(
        server.store.get(GITHUB_TOKEN_KEY).unwrap().as_deref(),
        Some(PERSONAL_TOKEN)
    );

    let (_, body) = get_json(status_url).await;
    assert_eq!(body["username"], "hubot");

    server.stop().await;
}
