//! Web IDE action request/response shapes.
//!
//! The wire format is loosely typed (`action` and `file_type` are free strings);
//! [`ActionRequest::try_from`] closes it into [`Action`] and [`FileType`] so the
//! dispatcher can match exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three IDE operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Format,
    Lint,
    Preview,
}

/// Raised when `action` is missing or not one of `format`, `lint`, `preview`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported action")]
pub struct UnsupportedAction(pub String);

impl FromStr for Action {
    type Err = UnsupportedAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "format" => Ok(Self::Format),
            "lint" => Ok(Self::Lint),
            "preview" => Ok(Self::Preview),
            other => Err(UnsupportedAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Format => "format",
            Self::Lint => "lint",
            Self::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// File type of the editor buffer, matched case-insensitively.
///
/// Unknown types are kept verbatim in `Other` and treated as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Json,
    Html,
    Css,
    Markdown,
    Other(String),
}

impl From<&str> for FileType {
    fn from(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "json" => Self::Json,
            "html" => Self::Html,
            "css" => Self::Css,
            "markdown" => Self::Markdown,
            _ => Self::Other(raw.to_string()),
        }
    }
}

/// Options that only matter for `preview` of HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewOptions {
    pub auto_detect_resources: bool,
    pub directory_path: String,
    pub current_file: String,
}

/// Request body of `POST /api/v1/tools/ide/action` as sent by the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionPayload {
    /// Any JSON value; only the exact strings `format`/`lint`/`preview` dispatch
    #[serde(default)]
    pub action: Option<Value>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub auto_detect_resources: Option<bool>,
    #[serde(default)]
    pub directory_path: Option<String>,
    #[serde(default)]
    pub current_file: Option<String>,
}

/// A validated IDE action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: Action,
    pub content: String,
    pub file_type: FileType,
    pub options: PreviewOptions,
}

impl TryFrom<ActionPayload> for ActionRequest {
    type Error = UnsupportedAction;

    fn try_from(payload: ActionPayload) -> Result<Self, Self::Error> {
        let action = match payload.action {
            Some(Value::String(name)) => name.parse()?,
            Some(other) => return Err(UnsupportedAction(other.to_string())),
            None => return Err(UnsupportedAction(String::new())),
        };
        Ok(Self {
            action,
            content: payload.content.unwrap_or_default(),
            file_type: FileType::from(payload.file_type.as_deref().unwrap_or_default()),
            options: PreviewOptions {
                auto_detect_resources: payload.auto_detect_resources.unwrap_or(false),
                directory_path: payload.directory_path.unwrap_or_default(),
                current_file: payload.current_file.unwrap_or_default(),
            },
        })
    }
}

/// A single heuristic lint finding. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub line: usize,
    pub message: String,
}

impl LintIssue {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: line.max(1),
            message: message.into(),
        }
    }
}

/// How the dashboard should display a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Html,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatResult {
    pub content: String,
    pub action: Action,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub action: Action,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResult {
    pub preview: String,
    #[serde(rename = "type")]
    pub kind: PreviewKind,
    pub action: Action,
    pub success: bool,

    /// Present only when the sibling-resource pipeline ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_resources: Option<Vec<String>>,
}

/// Result of a dispatched IDE action; serializes as the bare inner shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    Format(FormatResult),
    Lint(LintResult),
    Preview(PreviewResult),
}

impl ActionResponse {
    pub fn format(content: String) -> Self {
        Self::Format(FormatResult {
            content,
            action: Action::Format,
            success: true,
        })
    }

    pub fn lint(issues: Vec<LintIssue>) -> Self {
        Self::Lint(LintResult {
            issues,
            action: Action::Lint,
            success: true,
        })
    }

    pub fn preview(
        preview: String,
        kind: PreviewKind,
        detected_resources: Option<Vec<String>>,
    ) -> Self {
        Self::Preview(PreviewResult {
            preview,
            kind,
            action: Action::Preview,
            success: true,
            detected_resources,
        })
    }
}
