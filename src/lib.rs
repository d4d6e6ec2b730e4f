//! Ad-Watcher: a classifieds search watcher
//!
//! This crate polls classifieds search pages, detects listings that were not
//! seen before, enriches them from their detail pages and delivers them to
//! Telegram chats.

pub mod config;
pub mod listing;
pub mod notify;
pub mod page;
pub mod runner;
pub mod watcher;

use thiserror::Error;

/// Main error type for Ad-Watcher operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid request header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Notification error: {0}")]
    Notify(#[from] notify::NotifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Ad-Watcher operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::Listing;
pub use runner::Runner;
pub use watcher::{ScanOutcome, Watcher};
