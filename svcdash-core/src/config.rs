use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const CONFIG_ENV: &str = "SVCDASH_CONFIG";
pub const CONFIG_NAMES: [&str; 4] = ["svcdash.yaml", "svcdash.yml", ".svcdash.yaml", ".svcdash.yml"];

/// Control-plane connection settings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL; `/services` and `/control/...` are appended
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_request_timeout(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Background poll period
    #[serde(default = "default_interval")]
    pub interval_ms: u64,

    /// Delay before the re-poll that follows a successful action
    #[serde(default = "default_repoll_delay")]
    pub repoll_delay_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            repoll_delay_ms: default_repoll_delay(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Auto-dismiss timeout
    #[serde(default = "default_notification_timeout")]
    pub timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_notification_timeout(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for the TUI log file (default: platform data dir)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            filter: default_filter(),
        }
    }
}

fn default_version() -> String {
    "1".into()
}
fn default_url() -> String {
    DEFAULT_BACKEND_URL.into()
}
fn default_request_timeout() -> u64 {
    10_000
}
fn default_interval() -> u64 {
    5_000
}
fn default_repoll_delay() -> u64 {
    1_000
}
fn default_notification_timeout() -> u64 {
    5_000
}
fn default_filter() -> String {
    "info".into()
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DashConfig {
    /// Config file version
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            backend: BackendConfig::default(),
            refresh: RefreshConfig::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    InvalidUrl { url: String, reason: &'static str },
    ZeroDuration { field: &'static str },
    NotFound { searched: Vec<PathBuf> },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::InvalidUrl { url, reason } => {
                write!(f, "invalid backend url '{}': {}", url, reason)
            }
            Self::ZeroDuration { field } => write!(f, "{} must be greater than zero", field),
            Self::NotFound { searched } => {
                write!(f, "no config file found, searched: {:?}", searched)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl DashConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: DashConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file in standard locations
    pub fn discover(start_dir: &Path) -> Result<(PathBuf, Self), ConfigError> {
        let mut searched = Vec::new();

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &CONFIG_NAMES {
                let path = current.join(name);
                if path.exists() {
                    return Ok((path.clone(), Self::load(&path)?));
                }
                searched.push(path);
            }
            dir = current.parent();
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Replace the backend URL, re-validating it
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        self.backend.url = url.into();
        validate_url(&self.backend.url)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url(&self.backend.url)?;

        for (field, value) in [
            ("backend.timeout_ms", self.backend.timeout_ms),
            ("refresh.interval_ms", self.refresh.interval_ms),
            ("refresh.repoll_delay_ms", self.refresh.repoll_delay_ms),
            ("notifications.timeout_ms", self.notifications.timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { field });
            }
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.backend.url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.timeout_ms)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            poll_interval: Duration::from_millis(self.refresh.interval_ms),
            repoll_delay: Duration::from_millis(self.refresh.repoll_delay_ms),
            notification_ttl: Duration::from_millis(self.notifications.timeout_ms),
        }
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: "scheme must be http or https",
        })?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host",
        });
    }
    Ok(())
}
