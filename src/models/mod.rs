//! Data models for the I.D.T.F.E backend.
//!
//! This module contains the request/response shapes and configuration structures:
//! - [`AppConfig`]: Server, outbound HTTP, GitHub OAuth, secret file, and logging settings
//! - [`ActionRequest`]: An IDE action (`format`, `lint`, `preview`) with its file type and options
//! - [`ActionResponse`]: The per-action response payloads returned by the dispatcher
//! - [`AppMeta`] / [`VersionInfo`]: Static descriptors served by the meta and version endpoints
//!
//! # Architecture Note
//!
//! Every value here is request-scoped. Nothing is shared mutably across requests;
//! the only persisted state is the secret file owned by
//! [`SecretStore`](crate::config::SecretStore).

pub mod config;
pub mod ide;
pub mod meta;

pub use config::{
    AppConfig, GithubConfig, HttpConfig, LoggingConfig, SecretsConfig, ServerConfig,
};
pub use ide::{
    Action, ActionPayload, ActionRequest, ActionResponse, FileType, FormatResult, LintIssue,
    LintResult, PreviewKind, PreviewOptions, PreviewResult, UnsupportedAction,
};
pub use meta::{AppMeta, ModuleInfo, VersionInfo};
