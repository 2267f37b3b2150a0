//! Storage module for persisting pipeline results
//!
//! This module handles all database operations for the pipeline, including:
//! - SQLite database initialization and schema management
//! - Source metadata upserts
//! - Run tracking and run-to-source links
//! - Transactional prediction saves

mod schema;
mod sqlite;

pub use sqlite::{SaveBatch, SqliteStorage};

use crate::api::CommunityInfo;
use crate::CrawlError;
use std::path::Path;
use thiserror::Error;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Initializes or opens the results database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlError)` - Failed to open or migrate the database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlError> {
    Ok(SqliteStorage::new(path)?)
}

/// Represents a monitored community in the database
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub id: i64,
    pub name: String,
    pub screen_name: String,
    pub is_closed: i64,
    pub kind: String,
}

impl From<&CommunityInfo> for SourceRecord {
    fn from(info: &CommunityInfo) -> Self {
        Self {
            id: info.id,
            name: info.name.clone(),
            screen_name: info.screen_name.clone(),
            is_closed: info.is_closed,
            kind: info.kind.clone(),
        }
    }
}

/// Represents a completed pipeline run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub target_date: String,
    pub created_at: String,
}

/// Represents one stored risk flag
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub run_id: i64,
    pub source_id: i64,
    pub parent_id: i64,
    pub item_id: i64,
    pub flagged: bool,
}

/// Counters for one transactional save
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaveSummary {
    pub sources_upserted: usize,
    pub links_inserted: usize,
    pub links_skipped: usize,
    pub predictions_inserted: usize,
    pub predictions_skipped: usize,
}
