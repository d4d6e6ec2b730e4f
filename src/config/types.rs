use serde::Deserialize;

/// Main configuration structure for ad-watcher
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub seen: SeenConfig,
    pub telegram: TelegramConfig,
    #[serde(default, rename = "watch")]
    pub watches: Vec<WatchEntry>,
}

/// Scan loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Seconds between two scan cycles
    #[serde(rename = "scan-delay")]
    pub scan_delay: u64,

    /// Maximum number of listings considered per scan
    #[serde(rename = "max-listings", default = "default_max_listings")]
    pub max_listings: usize,

    /// Per-fetch timeout in seconds
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Deliver the listings already on the page when the watcher starts
    #[serde(rename = "show-new-on-start", default)]
    pub show_new_on_start: bool,
}

/// Request headers sent to the listing site
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

/// Retention policy for fingerprints of already delivered listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum SeenConfig {
    /// Remember every fingerprint for the lifetime of the process
    #[default]
    Unbounded,

    /// Keep only the most recently added fingerprints
    Recent { capacity: usize },

    /// Forget fingerprints older than the given number of hours
    Windowed {
        #[serde(rename = "ttl-hours")]
        ttl_hours: u64,
    },
}

/// Telegram Bot API settings
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token as issued by BotFather
    pub token: String,

    /// Base URL of the Bot API
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// Pause between two media groups of the same listing (milliseconds)
    #[serde(rename = "batch-pause-ms", default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

/// A listing page to watch and the chats subscribed to it
#[derive(Debug, Clone, Deserialize)]
pub struct WatchEntry {
    /// Optional label used in logs
    #[serde(default)]
    pub name: Option<String>,

    /// Listing page URL
    pub url: String,

    /// Telegram chat ids receiving new listings
    pub chats: Vec<i64>,
}

impl WatchEntry {
    /// Label for logs: the configured name, or the URL path
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match url::Url::parse(&self.url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => self.url.clone(),
        }
    }
}

fn default_max_listings() -> usize {
    10
}

fn default_request_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.5".to_string()
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_batch_pause_ms() -> u64 {
    1000
}
