use crate::models::AppConfig;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;

pub mod secrets;

pub use secrets::{EnvFileStore, GITHUB_TOKEN_KEY, MemoryStore, SecretStore};

/// File name of the YAML configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "idtfe.yaml";

/// Prefix for structured environment overrides, e.g. `IDTFE__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "IDTFE";

/// Plain environment variables honored for hosting platforms and OAuth setup.
const PLAIN_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("GITHUB_CLIENT_ID", "github.client_id"),
    ("GITHUB_CLIENT_SECRET", "github.client_secret"),
    ("GITHUB_REDIRECT_URI", "github.redirect_uri"),
];

/// Configuration manager for loading and saving the application configuration.
///
/// Settings are layered (later wins):
/// 1. Built-in defaults ([`AppConfig::default`])
/// 2. `idtfe.yaml` in the config directory (written with defaults when missing)
/// 3. `IDTFE__SECTION__KEY` environment variables
/// 4. `PORT`, `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET`, `GITHUB_REDIRECT_URI`
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory holding `idtfe.yaml` and, by default, the secret file
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the layered configuration using the process environment.
    pub fn load_app_config(&self) -> Result<AppConfig> {
        self.load_app_config_with_env(std::env::vars().collect())
    }

    /// Load the layered configuration against an explicit environment map.
    pub fn load_app_config_with_env(&self, env: HashMap<String, String>) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, writing defaults",
                self.config_path
            );
            self.save_app_config(&AppConfig::default())?;
        }

        let mut builder = config::Config::builder()
            .add_source(
                config::File::from(self.config_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone().into_iter().collect())),
            );

        for (var, key) in PLAIN_ENV_OVERRIDES {
            builder = builder
                .set_override_option(*key, env.get(*var).cloned())
                .with_context(|| format!("Invalid override from {}", var))?;
        }

        let config: AppConfig = builder
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        validate(&config)?;

        tracing::info!("Loaded app config from {}", self.config_path);
        Ok(config)
    }

    /// Save the application configuration file.
    pub fn save_app_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize app config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write app config: {}", self.config_path))?;

        tracing::info!("Saved app config to {}", self.config_path);
        Ok(())
    }

    /// Resolve the secret file path; relative paths are taken from the config directory.
    pub fn secrets_path(&self, config: &AppConfig) -> Utf8PathBuf {
        let env_file = &config.secrets.env_file;
        if env_file.is_absolute() {
            env_file.clone()
        } else {
            self.config_dir.join(env_file)
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.http.api_tester_timeout_secs == 0 {
        bail!("http.api_tester_timeout_secs must be greater than zero");
    }
    if config.http.oauth_timeout_secs == 0 {
        bail!("http.oauth_timeout_secs must be greater than zero");
    }
    Ok(())
}
