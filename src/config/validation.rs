use crate::error::AppError;
use std::path::Path;

use super::Config;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API base URL cannot be empty and must use http or https
/// - Data and output directories cannot be empty
/// - HTTP timeout must be positive
/// - If log file path is provided, it cannot be empty
/// - Log file path parent directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    let url = config.api_base_url.trim();
    if url.is_empty() {
        return Err(AppError::config_error("API base URL cannot be empty"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::config_error(format!(
            "API base URL must start with http:// or https://, got '{url}'"
        )));
    }

    if config.data_dir.trim().is_empty() {
        return Err(AppError::config_error("Data directory cannot be empty"));
    }
    if config.output_dir.trim().is_empty() {
        return Err(AppError::config_error("Output directory cannot be empty"));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "HTTP timeout must be at least one second",
        ));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        // Creating the directory is the only reliable check
        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_urls() {
        for url in ["", "   ", "pxdata.stat.fi/PxWeb", "ftp://pxdata.stat.fi"] {
            let config = Config {
                api_base_url: url.to_string(),
                ..Config::default()
            };
            assert!(
                matches!(validate_config(&config), Err(AppError::Config(_))),
                "accepted '{url}'"
            );
        }
    }

    #[test]
    fn test_accepts_plain_http() {
        let config = Config {
            api_base_url: "http://localhost:8080/PxWeb/api/v1/fi/StatFin".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_empty_directories_and_zero_timeout() {
        let no_data = Config {
            data_dir: String::new(),
            ..Config::default()
        };
        assert!(validate_config(&no_data).is_err());

        let no_output = Config {
            output_dir: " ".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&no_output).is_err());

        let no_timeout = Config {
            http_timeout_seconds: 0,
            ..Config::default()
        };
        assert!(validate_config(&no_timeout).is_err());
    }

    #[test]
    fn test_log_directory_is_created() {
        let temp_dir = tempdir().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");
        let config = Config {
            log_file_path: Some(log_dir.join("run.log").to_string_lossy().to_string()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
        assert!(log_dir.exists());
    }

    #[test]
    fn test_empty_log_path_is_rejected() {
        let config = Config {
            log_file_path: Some(String::new()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
