use crate::config::types::{ApiConfig, Config, PreprocessConfig, ServerConfig, StorageConfig};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_storage_config(&config.storage)?;
    validate_server_config(&config.server)?;
    validate_preprocess_config(&config.preprocess)?;
    Ok(())
}

/// Validates platform API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use the http or https scheme, got '{}'",
            url.scheme()
        )));
    }

    if config.access_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "access_token cannot be empty".to_string(),
        ));
    }

    if config.rate_limit < 1 || config.rate_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "rate_limit must be between 1 and 100, got {}",
            config.rate_limit
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config
        .listen_addr
        .parse::<SocketAddr>()
        .map_err(|e| {
            ConfigError::Validation(format!(
                "listen_addr must be a socket address like '127.0.0.1:8080': {}",
                e
            ))
        })?;
    Ok(())
}

/// Validates preprocessing configuration
fn validate_preprocess_config(config: &PreprocessConfig) -> Result<(), ConfigError> {
    if config.min_text_length > 10_000 {
        return Err(ConfigError::Validation(format!(
            "min_text_length must be <= 10000, got {}",
            config.min_text_length
        )));
    }

    if config.lexicon_path.is_empty() {
        return Err(ConfigError::Validation(
            "lexicon_path cannot be empty".to_string(),
        ));
    }

    if !(config.flag_threshold > 0.0 && config.flag_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "flag_threshold must be in (0, 1], got {}",
            config.flag_threshold
        )));
    }

    Ok(())
}
