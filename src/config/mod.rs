//! Configuration module for ad-watcher
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use ad_watcher::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("watcher.toml")).unwrap();
//! println!("Watching {} pages", config.watches.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HttpConfig, ScannerConfig, SeenConfig, TelegramConfig, WatchEntry,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
