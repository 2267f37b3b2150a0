use serde::Deserialize;

/// Main configuration structure for wellwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub preprocess: PreprocessConfig,
}

/// Platform API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the platform API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Access token sent with every API call
    #[serde(rename = "access-token")]
    pub access_token: String,

    /// Maximum API calls per second
    #[serde(rename = "rate-limit")]
    pub rate_limit: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite results database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Root directory of the staging area
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds, e.g. "127.0.0.1:8080"
    #[serde(rename = "listen-addr")]
    pub listen_addr: String,
}

/// Preprocessing and classification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessConfig {
    /// Rows with this many characters or fewer are dropped
    #[serde(rename = "min-text-length")]
    pub min_text_length: usize,

    /// Path to the risk lexicon, one term per line
    #[serde(rename = "lexicon-path")]
    pub lexicon_path: String,

    /// Share of lexicon-hit tokens at which a row is flagged
    #[serde(rename = "flag-threshold")]
    pub flag_threshold: f64,
}
