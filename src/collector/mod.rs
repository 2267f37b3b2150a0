//! Collection boundary between the pipeline and the platform
//!
//! The pipeline never talks to the platform API directly; it drives a
//! `Collector`, which fetches data and parks it as JSON files in a staging
//! area. Staging layout under the data directory:
//!
//! - `sources/<id>.json` - array of community metadata records
//! - `posts/<id>.json` - array of posts for one community
//! - `comments/<id>.json` - map of post id to its comment list
//!
//! The preprocessing stages read these files back with the helpers below.

mod http;

pub use http::HttpCollector;

use crate::api::{Comment, CommunityInfo, Post};
use crate::{CrawlError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Comments staging payload: post id to the comments under that post
pub type CommentsByPost = BTreeMap<i64, Vec<Comment>>;

/// Fetches platform data into the staging area
///
/// Object-safe so the pipeline can run against a scripted implementation
/// in tests.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Fetches metadata for the given sources, one staging file per source
    async fn collect_sources(&self, ids: &[String], dest_dir: &Path) -> Result<Vec<PathBuf>>;

    /// Pages through one source's posts back to the target date
    async fn collect_items(
        &self,
        source_id: &str,
        until: NaiveDate,
        dest_dir: &Path,
    ) -> Result<PathBuf>;

    /// Fetches the comments for every post in a posts staging file
    async fn collect_child_items(&self, posts_file: &Path, dest_dir: &Path) -> Result<PathBuf>;
}

/// Writes a staging file, mapping failures to `CrawlError::Staging`
pub fn write_staging<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    let json = serde_json::to_string(payload).map_err(|e| CrawlError::Staging {
        path: path.to_path_buf(),
        message: format!("cannot encode staging payload: {e}"),
    })?;
    std::fs::write(path, json).map_err(|e| CrawlError::Staging {
        path: path.to_path_buf(),
        message: format!("cannot write staging file: {e}"),
    })
}

/// Reads a staging file back, mapping failures to `CrawlError::Staging`
pub fn read_staging<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).map_err(|e| CrawlError::Staging {
        path: path.to_path_buf(),
        message: format!("cannot read staging file: {e}"),
    })?;
    serde_json::from_str(&json).map_err(|e| CrawlError::Staging {
        path: path.to_path_buf(),
        message: format!("cannot decode staging file: {e}"),
    })
}

/// Reads a sources staging file
pub fn read_sources_file(path: &Path) -> Result<Vec<CommunityInfo>> {
    read_staging(path)
}

/// Reads a posts staging file
pub fn read_posts_file(path: &Path) -> Result<Vec<Post>> {
    read_staging(path)
}

/// Reads a comments staging file
pub fn read_comments_file(path: &Path) -> Result<CommentsByPost> {
    read_staging(path)
}
