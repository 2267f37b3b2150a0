//! Wellwatch: a social-platform content crawler with risk-signal inference
//!
//! This crate implements a pipeline that collects posts and comments from
//! named communities on a remote social platform, preprocesses the text,
//! runs a risk classifier over it, and persists the results transactionally,
//! while exposing live progress and cooperative cancellation over HTTP.

pub mod api;
pub mod collector;
pub mod config;
pub mod crawler;
pub mod limiter;
pub mod pipeline;
pub mod server;
pub mod status;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wellwatch operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform API error during {operation}: [{code}] {message}")]
    Api {
        operation: String,
        code: i64,
        message: String,
    },

    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: String,
        source: reqwest::Error,
    },

    #[error("Malformed API payload during {operation}: {message}")]
    Decode { operation: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("Staging file error at {path}: {message}")]
    Staging { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline stop was requested")]
    Stopped,
}

impl From<status::StopRequested> for CrawlError {
    fn from(_: status::StopRequested) -> Self {
        Self::Stopped
    }
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

/// Result type alias for wellwatch operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use status::{Phase, PipelineStatus, StatusManager, StopRequested};
