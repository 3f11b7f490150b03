use indexmap::IndexMap;
use serde::Serialize;

const DEVELOPER: &str = "Chisom Life Eke";
const COMPANY: &str = "Quick Red Tech";
const GITHUB: &str = "QRTQuick";
const LICENSE: &str = "Open Source";

/// Static application descriptor served by `GET /api/v1/meta`.
#[derive(Debug, Clone, Serialize)]
pub struct AppMeta {
    pub app_name: String,
    pub full_name: String,
    pub version: String,
    pub developer: String,
    pub company: String,
    pub github: String,
    pub license: String,
    pub copyright: String,
    pub deployment: String,
    pub modules: Vec<ModuleInfo>,
    pub feature_flags: IndexMap<String, bool>,
}

/// One dashboard module as listed in the meta descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub id: String,
    pub enabled: bool,
    pub description: String,
}

impl ModuleInfo {
    fn enabled(name: &str, id: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            enabled: true,
            description: description.to_string(),
        }
    }
}

impl AppMeta {
    /// Build the descriptor for the given crate version and deployment label.
    pub fn new(version: &str, platform: &str) -> Self {
        let modules = vec![
            ModuleInfo::enabled(
                "API Tester",
                "api-tester",
                "Test REST APIs with various HTTP methods",
            ),
            ModuleInfo::enabled(
                "README Previewer",
                "readme-previewer",
                "Render Markdown files with live preview",
            ),
            ModuleInfo::enabled(
                "Web IDE",
                "web-ide",
                "Code editor with formatting and linting",
            ),
            ModuleInfo::enabled(
                "Browser",
                "browser",
                "Embedded web browser with JSON formatting",
            ),
        ];

        let feature_flags = [
            "auto_format",
            "syntax_highlighting",
            "live_preview",
            "github_integration",
            "cloud_deployment",
        ]
        .into_iter()
        .map(|flag| (flag.to_string(), true))
        .collect();

        Self {
            app_name: "IDTFE".to_string(),
            full_name: "Integrated Developer Tools for Efficiency".to_string(),
            version: version.to_string(),
            developer: DEVELOPER.to_string(),
            company: COMPANY.to_string(),
            github: GITHUB.to_string(),
            license: LICENSE.to_string(),
            copyright: format!("© 2026 {}", COMPANY),
            deployment: format!("{} Cloud Platform", platform),
            modules,
            feature_flags,
        }
    }
}

/// Version descriptor served by `GET /api/v1/version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub compatible_frontend: String,
    pub changelog: String,
    pub build_info: IndexMap<String, String>,
}

impl VersionInfo {
    pub fn new(version: &str, platform: &str) -> Self {
        let build_info = [
            ("developer", DEVELOPER.to_string()),
            ("company", COMPANY.to_string()),
            ("github", GITHUB.to_string()),
            ("license", LICENSE.to_string()),
            ("build_date", "2026-01-13".to_string()),
            ("platform", format!("{} Cloud", platform)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            version: version.to_string(),
            compatible_frontend: version.to_string(),
            changelog: format!("Initial release with core modules - Deployed on {}", platform),
            build_info,
        }
    }
}
