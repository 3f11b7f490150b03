//! Per-language format and lint heuristics for the Web IDE.
//!
//! None of these build a document model. The HTML formatter and both
//! HTML/CSS linters are line-oriented, so multiple tags per line, tags that
//! span lines, or `<`/`>` inside text are not modeled.

use crate::models::LintIssue;
use regex::Regex;
use serde_json::Value as Json;

/// Opening tags that never increase indentation.
const VOID_TAG_PREFIXES: &[&str] = &["<br", "<hr", "<img", "<input", "<meta"];

/// Format/lint rules with pre-compiled CSS spacing patterns.
///
/// # Fields
///
/// The three CSS patterns are applied in order; each one runs on the output
/// of the previous:
///
/// - `css_open_brace`: `\s*\{\s*` → `" {\n  "`
/// - `css_semicolon`: `;\s*` → `";\n  "`
/// - `css_close_brace`: `\s*\}\s*` → `"\n}\n\n"`
pub struct MicroRules {
    css_open_brace: Regex,
    css_semicolon: Regex,
    css_close_brace: Regex,
}

impl MicroRules {
    pub fn new() -> Self {
        Self {
            css_open_brace: Regex::new(r"\s*\{\s*").expect("Invalid open brace regex"),
            css_semicolon: Regex::new(r";\s*").expect("Invalid semicolon regex"),
            css_close_brace: Regex::new(r"\s*\}\s*").expect("Invalid close brace regex"),
        }
    }

    /// Pretty-print JSON with 2-space indentation, keeping key order.
    ///
    /// Returns `None` when `content` is not valid JSON.
    pub fn pretty_json(&self, content: &str) -> Option<String> {
        let value: Json = serde_json::from_str(content).ok()?;
        serde_json::to_string_pretty(&value).ok()
    }

    /// Format JSON, falling back to a whitespace trim when it does not parse.
    pub fn format_json(&self, content: &str) -> String {
        self.pretty_json(content)
            .unwrap_or_else(|| content.trim().to_string())
    }

    /// Re-indent HTML by tag prefix, two spaces per level.
    ///
    /// Blank lines are dropped. A line starting with `</` dedents before it is
    /// emitted; a line starting with `<` that is not a closing tag, not
    /// self-closing (`/>`), and contains none of the void tag prefixes
    /// indents the following lines.
    pub fn format_html(&self, content: &str) -> String {
        let mut formatted = Vec::new();
        let mut indent_level: usize = 0;

        for line in content.split('\n') {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            if stripped.starts_with("</") {
                indent_level = indent_level.saturating_sub(1);
            }

            formatted.push(format!("{}{}", "  ".repeat(indent_level), stripped));

            if stripped.starts_with('<')
                && !stripped.starts_with("</")
                && !stripped.ends_with("/>")
                && !VOID_TAG_PREFIXES.iter().any(|tag| stripped.contains(tag))
            {
                indent_level += 1;
            }
        }

        formatted.join("\n")
    }

    /// Normalize CSS spacing around braces and semicolons.
    pub fn format_css(&self, content: &str) -> String {
        let spaced = self.css_open_brace.replace_all(content, " {\n  ");
        let spaced = self.css_semicolon.replace_all(&spaced, ";\n  ");
        let spaced = self.css_close_brace.replace_all(&spaced, "\n}\n\n");
        spaced.trim().to_string()
    }

    /// Report the JSON parse error, if any, as a single issue.
    pub fn lint_json(&self, content: &str) -> Vec<LintIssue> {
        match serde_json::from_str::<Json>(content) {
            Ok(_) => Vec::new(),
            Err(e) => vec![LintIssue::new(
                e.line(),
                format!("JSON Error: {}", parse_error_message(&e)),
            )],
        }
    }

    /// Flag `<script>`/`<style>` openings whose closing tag is not on the same line.
    pub fn lint_html(&self, content: &str) -> Vec<LintIssue> {
        let mut issues = Vec::new();

        for (i, line) in content.split('\n').enumerate() {
            let lower = line.to_lowercase();
            if lower.contains("<script>") && !lower.contains("</script>") {
                issues.push(LintIssue::new(i + 1, "Unclosed script tag"));
            }
            if lower.contains("<style>") && !lower.contains("</style>") {
                issues.push(LintIssue::new(i + 1, "Unclosed style tag"));
            }
        }

        issues
    }

    /// Flag declaration-looking lines that do not end in `;`, `{` or `}`.
    pub fn lint_css(&self, content: &str) -> Vec<LintIssue> {
        content
            .split('\n')
            .enumerate()
            .filter_map(|(i, line)| {
                let stripped = line.trim();
                let terminated = stripped.ends_with([';', '{', '}']);
                let flagged = !stripped.is_empty()
                    && !terminated
                    && stripped.contains(':')
                    && !stripped.starts_with("/*");
                flagged.then(|| LintIssue::new(i + 1, "Missing semicolon"))
            })
            .collect()
    }

    /// Lint for plain text: only an empty buffer is reported.
    pub fn lint_text(&self, content: &str) -> Vec<LintIssue> {
        if content.trim().is_empty() {
            vec![LintIssue::new(1, "File is empty")]
        } else {
            Vec::new()
        }
    }
}

/// serde_json's message without the trailing "at line L column C".
fn parse_error_message(err: &serde_json::Error) -> String {
    let full = err.to_string();
    if err.line() == 0 {
        return full;
    }
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    match full.strip_suffix(&suffix) {
        Some(message) => message.to_string(),
        None => full,
    }
}

impl Default for MicroRules {
    fn default() -> Self {
        Self::new()
    }
}
