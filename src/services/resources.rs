//! Sibling-resource pipeline for HTML previews.
//!
//! Given the directory an HTML file lives in, the pipeline:
//! 1. [`scan`]s the directory (non-recursive) for `.css` and `.js` files
//! 2. [`load`]s each file, skipping unreadable ones without failing the batch
//! 3. [`inject`]s the aggregated CSS before `</head>` and JS before `</body>`
//!
//! Tag detection is literal and case-sensitive (`</head>`, `</body>`); there is
//! no HTML parsing. Documents without the exact tags get a synthesized `<head>`
//! or an appended `<script>` instead.

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use std::fs;
use thiserror::Error;

const HEAD_CLOSE: &str = "</head>";
const BODY_CLOSE: &str = "</body>";

/// Errors that can occur while scanning a resource directory
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(Utf8PathBuf),

    #[error("Failed to list directory {path}: {source}")]
    Listing {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// CSS and JS candidates found in a directory, sorted by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    pub css_files: Vec<String>,
    pub js_files: Vec<String>,
}

impl ResourceSet {
    pub fn is_empty(&self) -> bool {
        self.css_files.is_empty() && self.js_files.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Css,
    Js,
}

/// Concatenated file contents, each preceded by a `/* name */` provenance line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedAsset {
    pub kind: AssetKind,
    pub content: String,
}

impl AggregatedAsset {
    fn empty(kind: AssetKind) -> Self {
        Self {
            kind,
            content: String::new(),
        }
    }

    fn push(&mut self, file_name: &str, body: &str) {
        self.content
            .push_str(&format!("/* {} */\n{}\n\n", file_name, body));
    }
}

/// A file that was listed but could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResource {
    pub file: String,
    pub reason: String,
}

/// Files skipped during a best-effort load. Not surfaced to HTTP callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFailure {
    pub skipped: Vec<SkippedResource>,
}

impl PartialFailure {
    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Output of [`load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResources {
    pub css: AggregatedAsset,
    pub js: AggregatedAsset,

    /// Names actually read, CSS first then JS
    pub loaded: Vec<String>,
    pub partial_failure: PartialFailure,
}

/// Output of [`enhance_html`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedHtml {
    pub html: String,
    pub detected_resources: Vec<String>,
    pub partial_failure: PartialFailure,
}

/// List the direct children of `directory` and classify them by extension.
///
/// Only regular files (after following symlinks) are considered. Names that
/// are not valid UTF-8 are ignored.
pub fn scan(directory: &Utf8Path) -> Result<ResourceSet, ResourceError> {
    if !directory.is_dir() {
        return Err(ResourceError::DirectoryNotFound(directory.to_path_buf()));
    }

    let entries = fs::read_dir(directory).map_err(|source| ResourceError::Listing {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    let mut set = ResourceSet::default();
    for name in names {
        if name.ends_with(".css") {
            set.css_files.push(name);
        } else if name.ends_with(".js") {
            set.js_files.push(name);
        }
    }

    tracing::debug!(
        "Scanned {}: {} css, {} js",
        directory,
        set.css_files.len(),
        set.js_files.len()
    );

    Ok(set)
}

/// Read every file in `set`, in parallel, keeping `set` order in the output.
pub fn load(directory: &Utf8Path, set: &ResourceSet) -> LoadedResources {
    let mut loaded = Vec::new();
    let mut partial_failure = PartialFailure::default();

    let css = load_kind(
        directory,
        &set.css_files,
        AssetKind::Css,
        &mut loaded,
        &mut partial_failure,
    );
    let js = load_kind(
        directory,
        &set.js_files,
        AssetKind::Js,
        &mut loaded,
        &mut partial_failure,
    );

    LoadedResources {
        css,
        js,
        loaded,
        partial_failure,
    }
}

fn load_kind(
    directory: &Utf8Path,
    files: &[String],
    kind: AssetKind,
    loaded: &mut Vec<String>,
    partial_failure: &mut PartialFailure,
) -> AggregatedAsset {
    let reads: Vec<(&String, std::io::Result<String>)> = files
        .par_iter()
        .map(|name| (name, fs::read_to_string(directory.join(name))))
        .collect();

    let mut asset = AggregatedAsset::empty(kind);
    for (name, read) in reads {
        match read {
            Ok(body) => {
                asset.push(name, &body);
                loaded.push(name.clone());
            }
            Err(e) => {
                tracing::warn!("Skipping resource {}: {}", name, e);
                partial_failure.skipped.push(SkippedResource {
                    file: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    asset
}

/// Insert `css_text` and `js_text` into `html`.
///
/// Empty text means no injection for that kind, so `inject(html, "", "")`
/// returns `html` unchanged. Only the first `</head>` / `</body>` is used.
pub fn inject(html: &str, css_text: &str, js_text: &str) -> String {
    let mut enhanced = html.to_string();

    if !css_text.is_empty() {
        let style = format!("<style>\n{}</style>", css_text);
        enhanced = match enhanced.find(HEAD_CLOSE) {
            Some(idx) => {
                enhanced.insert_str(idx, &format!("{}\n", style));
                enhanced
            }
            None => format!("<head>{}</head>\n{}", style, enhanced),
        };
    }

    if !js_text.is_empty() {
        let script = format!("<script>\n{}</script>", js_text);
        match enhanced.find(BODY_CLOSE) {
            Some(idx) => enhanced.insert_str(idx, &format!("{}\n", script)),
            None => {
                enhanced.push('\n');
                enhanced.push_str(&script);
            }
        }
    }

    enhanced
}

/// Run scan → load → inject. Scan failures fall back to the original HTML.
pub fn enhance_html(html: &str, directory: &Utf8Path, current_file: &str) -> EnhancedHtml {
    let set = match scan(directory) {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!("Resource detection disabled for this preview: {}", e);
            return EnhancedHtml {
                html: html.to_string(),
                detected_resources: Vec::new(),
                partial_failure: PartialFailure::default(),
            };
        }
    };

    let resources = load(directory, &set);
    tracing::debug!(
        "Injecting {} resources into preview of '{}' ({} skipped)",
        resources.loaded.len(),
        current_file,
        resources.partial_failure.skipped.len()
    );

    EnhancedHtml {
        html: inject(html, &resources.css.content, &resources.js.content),
        detected_resources: resources.loaded,
        partial_failure: resources.partial_failure,
    }
}
