use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the application config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "Rickdex.yaml";

/// Prefix of environment overrides, e.g. `RICKDEX_ENDPOINT`.
pub const ENV_PREFIX: &str = "RICKDEX";

/// Configuration manager for loading and saving `Rickdex.yaml`.
///
/// Sources are layered, later ones winning:
/// 1. built-in defaults ([`AppConfig::default`])
/// 2. `Rickdex.yaml` in the config directory (optional)
/// 3. `RICKDEX_*` environment variables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` if needed.
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

    /// Load the layered configuration and validate it.
    pub fn load(&self) -> Result<AppConfig> {
        self.load_with_env(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load with an explicit environment source.
    ///
    /// `Environment::source` lets callers supply the variables instead of the
    /// process environment.
    pub fn load_with_env(&self, env: Environment) -> Result<AppConfig> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to serialize default config")?;

        if self.config_path.exists() {
            tracing::info!("Loading config from {}", self.config_path);
        } else {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let layered = Config::builder()
            .add_source(defaults)
            .add_source(
                File::new(self.config_path.as_str(), FileFormat::Yaml).required(false),
            )
            .add_source(env.try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: AppConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", self.config_path))?;

        tracing::info!(
            "Config loaded: endpoint={}, timeout={}s, policy={:?}",
            config.endpoint,
            config.request_timeout_secs,
            config.fetch_policy
        );
        Ok(config)
    }

    /// Write `config` to `Rickdex.yaml`.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Write the default config if no file exists yet; returns whether it wrote one.
    pub fn write_default_if_missing(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        self.save(&AppConfig::default())?;
        Ok(true)
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
