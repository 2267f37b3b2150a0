//! Collector implementation backed by the platform API

use crate::api::{ApiClient, ApiOutcome, Comment, CommunityInfo, Post};
use crate::collector::{read_posts_file, write_staging, Collector, CommentsByPost};
use crate::{CrawlError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Posts fetched per `wall.get` page, the platform's maximum
const PAGE_SIZE: u64 = 100;

/// Fetches sources, posts and comments over the platform API and parks
/// them in the staging area
pub struct HttpCollector {
    api: Arc<ApiClient>,
}

impl HttpCollector {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn api_error(operation: &str, code: i64, message: String) -> CrawlError {
        CrawlError::Api {
            operation: operation.to_string(),
            code,
            message,
        }
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn collect_sources(&self, ids: &[String], dest_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(ids.len());
        for id in ids {
            let communities: Vec<CommunityInfo> =
                match self.api.community_info(std::slice::from_ref(id)).await? {
                    ApiOutcome::Success(communities) => communities,
                    ApiOutcome::Empty => {
                        tracing::warn!("source {} resolved to no community", id);
                        Vec::new()
                    }
                    ApiOutcome::ApiError { code, message } => {
                        return Err(Self::api_error("communities.getById", code, message));
                    }
                };

            let path = dest_dir.join(format!("{id}.json"));
            write_staging(&path, &communities)?;
            tracing::debug!("staged {} community record(s) at {}", communities.len(), path.display());
            files.push(path);
        }
        Ok(files)
    }

    async fn collect_items(
        &self,
        source_id: &str,
        until: NaiveDate,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        // resolve the source so paging runs against its numeric id
        let resolve_ids = [source_id.to_string()];
        let community = match self.api.community_info(&resolve_ids).await? {
            ApiOutcome::Success(communities) => communities.into_iter().next(),
            ApiOutcome::Empty => None,
            ApiOutcome::ApiError { code, message } => {
                return Err(Self::api_error("communities.getById", code, message));
            }
        };

        let path = dest_dir.join(format!("{source_id}.json"));
        let Some(community) = community else {
            write_staging(&path, &Vec::<Post>::new())?;
            return Ok(path);
        };

        // posts arrive newest first; page until one falls before the target date
        let cutoff = until
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let mut collected: Vec<Post> = Vec::new();
        let mut offset = 0u64;
        loop {
            let page = match self.api.posts(community.id, offset, PAGE_SIZE).await? {
                ApiOutcome::Success(page) => page,
                ApiOutcome::Empty => break,
                ApiOutcome::ApiError { code, message } => {
                    return Err(Self::api_error("wall.get", code, message));
                }
            };

            let page_len = page.items.len() as u64;
            let mut reached_cutoff = false;
            for post in page.items {
                if post.date < cutoff {
                    reached_cutoff = true;
                    break;
                }
                collected.push(post);
            }
            if reached_cutoff || page_len < PAGE_SIZE {
                break;
            }
            offset += page_len;
        }

        tracing::debug!(
            "collected {} post(s) for source {} back to {}",
            collected.len(),
            source_id,
            until
        );
        write_staging(&path, &collected)?;
        Ok(path)
    }

    async fn collect_child_items(&self, posts_file: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let posts = read_posts_file(posts_file)?;

        let mut by_post = CommentsByPost::new();
        for post in &posts {
            let comments: Vec<Comment> = match self.api.comments(post.owner_id, post.id).await? {
                ApiOutcome::Success(page) => page.items,
                ApiOutcome::Empty => Vec::new(),
                ApiOutcome::ApiError { code, message } => {
                    return Err(Self::api_error("wall.getComments", code, message));
                }
            };
            by_post.insert(post.id, comments);
        }

        let file_name = posts_file
            .file_name()
            .ok_or_else(|| CrawlError::Staging {
                path: posts_file.to_path_buf(),
                message: "posts staging path has no file name".to_string(),
            })?;
        let path = dest_dir.join(file_name);
        write_staging(&path, &by_post)?;
        tracing::debug!(
            "staged comments for {} post(s) at {}",
            posts.len(),
            path.display()
        );
        Ok(path)
    }
}
