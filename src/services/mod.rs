//! Services module - business logic behind the dashboard endpoints.
//!
//! Nothing here knows about axum. Each service takes plain inputs and returns
//! typed results or a `thiserror` enum; the `server` module maps those onto
//! HTTP. Services that do I/O (`api_tester`, `github`, HTML preview in `ide`)
//! are blocking and are run on tokio's blocking pool by the handlers.
//!
//! # Components
//!
//! - [`IdeService`]: Web IDE action dispatcher (format, lint, preview)
//!   - [`MicroRules`]: per-language heuristics for JSON, HTML and CSS
//!   - [`render_markdown`]: Markdown to HTML with code-block wrappers
//!   - [`resources`]: sibling CSS/JS scan, load and inject for HTML previews
//!
//! - [`ApiTesterService`]: forwards a described request and captures the response
//!
//! - [`GithubOAuthService`]: OAuth login, token persistence, account status
//!
//! # Usage Example
//!
//! ```ignore
//! use idtfe::models::{ActionPayload, ActionRequest};
//! use idtfe::services::IdeService;
//!
//! let service = IdeService::new();
//! let payload: ActionPayload = serde_json::from_str(body)?;
//! let dispatched = service.dispatch(&ActionRequest::try_from(payload)?);
//! ```

pub mod api_tester;
pub mod github;
pub mod ide;
pub mod markdown;
pub mod micro_rules;
pub mod resources;

pub use api_tester::{ApiTestError, ApiTestRequest, ApiTestResponse, ApiTesterService, HttpMethod};
pub use github::{GithubOAuthService, GithubUser, LinkStatus, LoginResult, OAuthError};
pub use ide::{Dispatched, IdeService};
pub use markdown::render_markdown;
pub use micro_rules::MicroRules;
pub use resources::{
    EnhancedHtml, LoadedResources, PartialFailure, ResourceError, ResourceSet, SkippedResource,
    enhance_html, inject,
};
