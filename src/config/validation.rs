use crate::config::types::{Config, ScannerConfig, SeenConfig, TelegramConfig, WatchEntry};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scanner_config(&config.scanner)?;
    validate_seen_config(&config.seen)?;
    validate_telegram_config(&config.telegram)?;
    validate_watches(&config.watches)?;
    Ok(())
}

/// Validates scan loop configuration
fn validate_scanner_config(config: &ScannerConfig) -> Result<(), ConfigError> {
    if config.scan_delay < 5 {
        return Err(ConfigError::Validation(format!(
            "scan_delay must be >= 5s, got {}s",
            config.scan_delay
        )));
    }

    if config.max_listings < 1 || config.max_listings > 50 {
        return Err(ConfigError::Validation(format!(
            "max_listings must be between 1 and 50, got {}",
            config.max_listings
        )));
    }

    if config.request_timeout < 1 || config.request_timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be between 1 and 300 seconds, got {}",
            config.request_timeout
        )));
    }

    Ok(())
}

/// Validates the seen-store policy
fn validate_seen_config(config: &SeenConfig) -> Result<(), ConfigError> {
    match config {
        SeenConfig::Unbounded => Ok(()),
        SeenConfig::Recent { capacity } if *capacity < 1 => Err(ConfigError::Validation(
            "seen capacity must be >= 1".to_string(),
        )),
        SeenConfig::Windowed { ttl_hours } if *ttl_hours < 1 => Err(ConfigError::Validation(
            "seen ttl-hours must be >= 1".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validates Telegram settings
fn validate_telegram_config(config: &TelegramConfig) -> Result<(), ConfigError> {
    if config.token.is_empty() {
        return Err(ConfigError::Validation(
            "telegram token cannot be empty".to_string(),
        ));
    }

    // Bot tokens look like "<bot id>:<secret>"
    if !config.token.contains(':') {
        return Err(ConfigError::Validation(
            "telegram token must have the form '<bot id>:<secret>'".to_string(),
        ));
    }

    validate_http_url(&config.api_base, "api-base")?;

    Ok(())
}

/// Validates watch entries
fn validate_watches(watches: &[WatchEntry]) -> Result<(), ConfigError> {
    if watches.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[watch]] entry is required".to_string(),
        ));
    }

    for entry in watches {
        validate_http_url(&entry.url, "watch url")?;

        if entry.chats.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Watch '{}' must have at least one chat",
                entry.url
            )));
        }
    }

    Ok(())
}

/// Checks that a URL parses and uses HTTP(S)
fn validate_http_url(raw: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, raw
        )));
    }

    Ok(())
}
