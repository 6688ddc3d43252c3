use anyhow::{Context, Result};
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for RelSentry
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Where the release baseline is kept
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub API configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Base API endpoint
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Account whose starred repositories are tracked
    #[serde(default = "default_account")]
    pub account: String,

    /// User-Agent sent with every request (required by the API)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds, transport default when unset
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Baseline storage configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StateConfig {
    /// Baseline file location
    #[serde(default = "default_state_path")]
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

// Default value functions
fn default_api_endpoint() -> String {
    "https://api.github.com".to_string()
}
fn default_account() -> String {
    "tomplus".to_string()
}
fn default_user_agent() -> String {
    format!("relsentry/{}", env!("CARGO_PKG_VERSION"))
}
fn default_state_path() -> String {
    match data_dir() {
        Some(dir) => dir
            .join("relsentry")
            .join("releases.json")
            .to_string_lossy()
            .into_owned(),
        None => "relsentry-releases.json".to_string(),
    }
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            account: default_account(),
            user_agent: default_user_agent(),
            timeout: None,
        }
    }
}

impl GitHubConfig {
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let mut config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;
            config.expand_paths()?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_paths()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("relsentry").join("config.yml"))
    }

    /// Expand environment variables and `~` in configured paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.state.path = shellexpand::full(&self.state.path)
            .context("Failed to expand state.path")?
            .into_owned();

        Ok(())
    }

    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.state.path)
    }
}
