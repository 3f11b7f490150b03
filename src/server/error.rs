use crate::models::UnsupportedAction;
use crate::services::{ApiTestError, OAuthError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;

/// Errors surfaced to HTTP callers.
///
/// Every variant renders as `400 {"error": "<message>"}`; the dashboard only
/// shows the message. `Upstream` may add the provider's raw body as `details`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Missing or invalid request field
    #[error("{0}")]
    Validation(String),

    /// Outbound call failed or was rejected by the provider
    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            details: None,
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Upstream {
                message,
                details: Some(details),
            } => json!({"error": message, "details": details}),
            other => json!({"error": other.to_string()}),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl From<UnsupportedAction> for ApiError {
    fn from(err: UnsupportedAction) -> Self {
        tracing::debug!("Rejected IDE action '{}'", err.0);
        Self::Validation(err.to_string())
    }
}

impl From<ApiTestError> for ApiError {
    fn from(err: ApiTestError) -> Self {
        match err {
            ApiTestError::MissingUrl | ApiTestError::UnsupportedMethod(_) => {
                Self::Validation(err.to_string())
            }
            ApiTestError::Request(_) => Self::upstream(err.to_string()),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::MissingCode | OAuthError::MissingToken | OAuthError::NotLinked => {
                Self::Validation(err.to_string())
            }
            OAuthError::TokenExchangeFailed(details) => Self::Upstream {
                message: "Token exchange failed".to_string(),
                details: Some(details),
            },
            OAuthError::Upstream(_) => Self::upstream(err.to_string()),
        }
    }
}
