use crate::models::{Action, ActionRequest, ActionResponse, FileType, PreviewKind};
use crate::services::markdown::render_markdown;
use crate::services::micro_rules::MicroRules;
use crate::services::resources::{PartialFailure, enhance_html};
use camino::Utf8Path;

/// Result of [`IdeService::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub response: ActionResponse,

    /// Resource files that were listed but could not be read (preview only)
    pub partial_failure: PartialFailure,
}

impl From<ActionResponse> for Dispatched {
    fn from(response: ActionResponse) -> Self {
        Self {
            response,
            partial_failure: PartialFailure::default(),
        }
    }
}

/// Routes Web IDE actions to the per-language format, lint, and preview handlers.
///
/// Unknown file types are treated as plain text: format trims, lint only
/// reports empty buffers, preview passes the content through.
pub struct IdeService {
    rules: MicroRules,
}

impl IdeService {
    pub fn new() -> Self {
        Self {
            rules: MicroRules::new(),
        }
    }

    pub fn rules(&self) -> &MicroRules {
        &self.rules
    }

    /// Execute an action. Blocking: HTML preview may read the resource directory.
    pub fn dispatch(&self, request: &ActionRequest) -> Dispatched {
        tracing::debug!(
            "IDE {} for {:?} ({} bytes)",
            request.action,
            request.file_type,
            request.content.len()
        );

        match request.action {
            Action::Format => ActionResponse::format(self.format(request)).into(),
            Action::Lint => ActionResponse::lint(self.lint(request)).into(),
            Action::Preview => self.preview(request),
        }
    }

    fn format(&self, request: &ActionRequest) -> String {
        let content = &request.content;
        match request.file_type {
            FileType::Json => self.rules.format_json(content),
            FileType::Html => self.rules.format_html(content),
            FileType::Css => self.rules.format_css(content),
            FileType::Markdown | FileType::Other(_) => content.trim().to_string(),
        }
    }

    fn lint(&self, request: &ActionRequest) -> Vec<crate::models::LintIssue> {
        let content = &request.content;
        match request.file_type {
            FileType::Json => self.rules.lint_json(content),
            FileType::Html => self.rules.lint_html(content),
            FileType::Css => self.rules.lint_css(content),
            FileType::Markdown | FileType::Other(_) => self.rules.lint_text(content),
        }
    }

    fn preview(&self, request: &ActionRequest) -> Dispatched {
        let content = &request.content;
        match request.file_type {
            FileType::Markdown => {
                ActionResponse::preview(render_markdown(content), PreviewKind::Html, None).into()
            }
            FileType::Html => {
                let options = &request.options;
                if !options.auto_detect_resources || options.directory_path.is_empty() {
                    return ActionResponse::preview(content.clone(), PreviewKind::Html, None)
                        .into();
                }

                let enhanced = enhance_html(
                    content,
                    Utf8Path::new(&options.directory_path),
                    &options.current_file,
                );
                Dispatched {
                    response: ActionResponse::preview(
                        enhanced.html,
                        PreviewKind::Html,
                        Some(enhanced.detected_resources),
                    ),
                    partial_failure: enhanced.partial_failure,
                }
            }
            FileType::Json => {
                let preview = self
                    .rules
                    .pretty_json(content)
                    .unwrap_or_else(|| content.clone());
                ActionResponse::preview(preview, PreviewKind::Text, None).into()
            }
            FileType::Css | FileType::Other(_) => {
                ActionResponse::preview(content.clone(), PreviewKind::Text, None).into()
            }
        }
    }
}

impl Default for IdeService {
    fn default() -> Self {
        Self::new()
    }
}
