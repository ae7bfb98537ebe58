use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend service locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the basic-info service (`/basicInfo`, `/departments`)
    #[serde(default = "default_basic_info_url")]
    pub basic_info_url: String,
    /// Base URL of the details service (`/details`, `/locations`)
    #[serde(default = "default_details_url")]
    pub details_url: String,
    /// Per-request timeout; POSTs are slowed to ~3s by the mock backend
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_basic_info_url() -> String {
    "http://localhost:4001".to_string()
}

fn default_details_url() -> String {
    "http://localhost:4002".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            basic_info_url: default_basic_info_url(),
            details_url: default_details_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Wizard timing and upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Quiescence before a draft is written (default: 2000)
    #[serde(default = "default_autosave_delay")]
    pub autosave_delay_ms: u64,
    /// Quiescence before an autocomplete lookup is sent (default: 300)
    #[serde(default = "default_lookup_debounce")]
    pub lookup_debounce_ms: u64,
    /// Largest accepted photo in bytes (default: 2 MiB)
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: u64,
}

fn default_autosave_delay() -> u64 {
    2000
}

fn default_lookup_debounce() -> u64 {
    300
}

fn default_max_photo_bytes() -> u64 {
    2 * 1024 * 1024
}

impl WizardConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn lookup_debounce(&self) -> Duration {
        Duration::from_millis(self.lookup_debounce_ms)
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay(),
            lookup_debounce_ms: default_lookup_debounce(),
            max_photo_bytes: default_max_photo_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root for drafts and logs
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".onboard".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_ms: u64,
    /// Rows per page in the employee list
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_refresh_rate() -> u64 {
    100
}

fn default_page_size() -> usize {
    10
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate(),
            page_size: default_page_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".onboard/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Embedded defaults so the app runs without any config file
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/onboard/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("onboard").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with ONBOARD_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("ONBOARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Directory holding one file per role draft
    pub fn drafts_path(&self) -> PathBuf {
        self.state_path().join("drafts")
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            wizard: WizardConfig::default(),
            paths: PathsConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
