//! Outbound request proxy behind the dashboard's API Tester module.
//!
//! The browser cannot call arbitrary origins, so the dashboard posts a request
//! description here and gets back status, headers, body and timing. An
//! upstream 4xx/5xx is a normal result; only transport failures are errors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur while proxying a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiTestError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Unsupported HTTP method")]
    UnsupportedMethod(String),

    #[error("Request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Parse a method name, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, ApiTestError> {
        match raw.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ApiTestError::UnsupportedMethod(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    fn sends_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// Request body of `POST /api/v1/tools/api-tester`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTestRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Map<String, Value>,

    /// Sent verbatim for POST/PUT, ignored otherwise
    #[serde(default)]
    pub body: String,
}

/// What came back from the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiTestResponse {
    pub status_code: u16,
    pub headers: IndexMap<String, String>,

    /// Parsed JSON when the body is JSON, otherwise the raw text
    pub body: Value,

    /// Wall-clock seconds, rounded to milliseconds
    pub duration: f64,
}

/// Blocking HTTP client with a fixed per-request timeout.
pub struct ApiTesterService {
    agent: ureq::Agent,
    timeout: Duration,
}

impl ApiTesterService {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward `request` to its target and capture the response.
    ///
    /// Blocking; call from `spawn_blocking` inside async code.
    pub fn execute(&self, request: &ApiTestRequest) -> Result<ApiTestResponse, ApiTestError> {
        let url = match request.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ApiTestError::MissingUrl),
        };
        let method = HttpMethod::parse(&request.method)?;

        tracing::info!("Proxying {} {}", method.as_str(), url);

        let mut outbound = self.agent.request(method.as_str(), url);
        for (name, value) in &request.headers {
            if let Some(value) = header_value_to_string(value) {
                outbound = outbound.set(name, &value);
            }
        }

        let started = Instant::now();
        let result = if method.sends_body() {
            outbound.send_string(&request.body)
        } else {
            outbound.call()
        };

        let response = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                tracing::debug!("Upstream returned status {}", code);
                resp
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!("Proxy request to {} failed: {}", url, err);
                return Err(ApiTestError::Request(err.to_string()));
            }
        };

        let status_code = response.status();
        let headers = collect_headers(&response);
        let text = response
            .into_string()
            .map_err(|e| ApiTestError::Request(e.to_string()))?;
        let duration = round_millis(started.elapsed());

        Ok(ApiTestResponse {
            status_code,
            headers,
            body: parse_body(text),
            duration,
        })
    }
}

fn header_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Response headers in arrival order. Repeated names are joined with `, `.
fn collect_headers(response: &ureq::Response) -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    for name in response.headers_names() {
        let values = response.all(&name);
        if !values.is_empty() {
            headers.insert(name, values.join(", "));
        }
    }
    headers
}

fn parse_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}
