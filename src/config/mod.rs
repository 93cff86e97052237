use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_DATA_DIR, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_OUTPUT_DIR,
    LOG_FILE_NAME,
};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

pub const ENV_API_BASE_URL: &str = "HOIVA_API_BASE_URL";
pub const ENV_DATA_DIR: &str = "HOIVA_DATA_DIR";
pub const ENV_OUTPUT_DIR: &str = "HOIVA_OUTPUT_DIR";
pub const ENV_LOG_FILE: &str = "HOIVA_LOG_FILE";
pub const ENV_HTTP_TIMEOUT: &str = "HOIVA_HTTP_TIMEOUT";

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root of the PxWeb API, the table paths are appended to it.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Directory holding the expenditure and home care workbooks and the region GeoJSON.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Directory the SVG charts are written to. Created when missing.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for API requests. Defaults to 30 seconds if not specified.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

/// Default HTTP timeout in seconds
fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// A missing file is not an error: the defaults are used instead.
    /// Environment variables override config file values.
    ///
    /// # Environment Variables
    /// - `HOIVA_API_BASE_URL` - Override PxWeb API root
    /// - `HOIVA_DATA_DIR` - Override directory of the bundled sources
    /// - `HOIVA_OUTPUT_DIR` - Override chart output directory
    /// - `HOIVA_LOG_FILE` - Override log file path
    /// - `HOIVA_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(AppError)` - Unreadable file, invalid TOML or invalid settings
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            debug!("Loading configuration from {config_path}");
            Config::load_from_path(&config_path).await?
        } else {
            debug!("No configuration file at {config_path}, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Replaces settings with the `HOIVA_*` environment variables that are set.
    /// An unparsable timeout is ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }

        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            self.data_dir = dir;
        }

        if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            self.output_dir = dir;
        }

        if let Ok(log_file_path) = std::env::var(ENV_LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Ok(raw) = std::env::var(ENV_HTTP_TIMEOUT) {
            match raw.parse::<u64>() {
                Ok(timeout) => self.http_timeout_seconds = timeout,
                Err(_) => warn!("Ignoring {ENV_HTTP_TIMEOUT}={raw}, not a number of seconds"),
            }
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Saves current configuration to the default config file location.
    ///
    /// # Notes
    /// - Creates config directory if it doesn't exist
    /// - Uses TOML format for storage
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    pub fn data_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.data_dir).join(file_name)
    }

    /// Log file in effect: the custom path or the default file in the log directory.
    pub fn effective_log_file(&self) -> String {
        match &self.log_file_path {
            Some(path) => path.clone(),
            None => format!("{}/{LOG_FILE_NAME}", get_log_dir_path()),
        }
    }

    /// Displays current configuration settings to stdout.
    ///
    /// # Notes
    /// - Shows config file location and current settings
    /// - Without a config file the defaults (with environment overrides) are shown
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let exists = Path::new(&config_path).exists();
        let config = Config::load().await?;

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        println!("{config_path}");
        if !exists {
            println!("(Not created yet, showing defaults)");
        }
        println!("────────────────────────────────────");
        println!("PxWeb API:");
        println!("{}", config.api_base_url);
        println!("────────────────────────────────────");
        println!("Data Directory:");
        println!("{}", config.data_dir);
        println!("────────────────────────────────────");
        println!("Chart Directory:");
        println!("{}", config.output_dir);
        println!("────────────────────────────────────");
        println!("HTTP Timeout:");
        println!("{} seconds", config.http_timeout_seconds);
        println!("────────────────────────────────────");
        println!("Log File Location:");
        println!("{}", config.effective_log_file());
        if config.log_file_path.is_none() {
            println!("(Default location)");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist. A trailing slash of
    /// the API base URL is dropped so table paths join cleanly.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(&Config {
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            ..self.clone()
        })?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without environment overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
