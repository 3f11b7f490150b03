use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Application configuration loaded from `idtfe.yaml` and the environment.
///
/// Every section falls back to its defaults, so a partial file (or no file)
/// is always valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub github: GithubConfig,
    pub secrets: SecretsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Label reported by the health endpoint ("running on <platform>")
    pub platform: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: default_port(),
            platform: "Render".to_string(),
        }
    }
}

/// Timeouts for outbound calls. Both must be non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub api_tester_timeout_secs: u64,
    pub oauth_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_tester_timeout_secs: 30,
            oauth_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base: String,
    pub scope: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_base: "https://api.github.com".to_string(),
            scope: "read:user repo".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Flat `KEY=value` file holding persisted secrets (e.g. `GITHUB_TOKEN`)
    pub env_file: Utf8PathBuf,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            env_file: Utf8PathBuf::from(".env"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
    pub prefix: String,
    pub debug: bool,
    pub console: bool,

    /// Write the file log as JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            prefix: "idtfe".to_string(),
            debug: false,
            console: true,
            json: false,
        }
    }
}

fn default_port() -> u16 {
    8000
}
