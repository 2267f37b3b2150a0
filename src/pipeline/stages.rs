//! Collection stage loops
//!
//! Both stages walk the source list in input order, report per-source
//! progress, and honor cooperative stop: a raised stop flag ends the loop
//! at the next check and whatever was already collected is handed on as a
//! partial result, never discarded.

use crate::collector::Collector;
use crate::status::StatusManager;
use crate::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Collects metadata for every source into the staging area
///
/// Returns the staging files written so far, which on a stopped run is a
/// prefix of the input list.
pub async fn collect_sources_stage(
    collector: &dyn Collector,
    status: &StatusManager,
    sources: &[String],
    data_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let dest_dir = data_dir.join("sources");
    std::fs::create_dir_all(&dest_dir)?;

    status.reset_stop_flag();

    let total = sources.len();
    let mut files = Vec::with_capacity(total);
    for (i, source) in sources.iter().enumerate() {
        if status.should_stop() {
            tracing::info!("stop requested, ending source collection early");
            break;
        }

        status.set_current_source(Some(source.clone()))?;
        status.set_progress(Some((i * 100 / total) as u8));

        tracing::info!("collecting metadata for source {}", source);
        let saved = collector
            .collect_sources(std::slice::from_ref(source), &dest_dir)
            .await?;
        files.extend(saved);
    }

    if !status.should_stop() {
        status.set_current_source(None)?;
        status.set_progress(None);
    }

    Ok(files)
}

/// Collects posts and then comments for every source
///
/// The stop flag is also consulted between a source's posts and its
/// comments, so a long comment sweep never starts after a stop request.
/// Returns the posts and comments staging files written so far.
pub async fn collect_items_stage(
    collector: &dyn Collector,
    status: &StatusManager,
    sources: &[String],
    target_date: NaiveDate,
    data_dir: &Path,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let posts_dir = data_dir.join("posts");
    let comments_dir = data_dir.join("comments");
    std::fs::create_dir_all(&posts_dir)?;
    std::fs::create_dir_all(&comments_dir)?;

    status.reset_stop_flag();

    let total = sources.len();
    let mut posts_files = Vec::with_capacity(total);
    let mut comments_files = Vec::with_capacity(total);
    for (i, source) in sources.iter().enumerate() {
        if status.should_stop() {
            tracing::info!("stop requested, ending item collection early");
            break;
        }

        status.set_current_source(Some(source.clone()))?;
        status.set_progress(Some((i * 100 / total) as u8));

        tracing::info!("collecting posts for source {}", source);
        let posts_file = collector
            .collect_items(source, target_date, &posts_dir)
            .await?;
        posts_files.push(posts_file.clone());

        if status.should_stop() {
            tracing::info!("stop requested, skipping comment collection for {}", source);
            break;
        }

        status.set_progress(Some(((2 * i + 1) * 100 / (2 * total)) as u8));

        tracing::info!("collecting comments for source {}", source);
        let comments_file = collector
            .collect_child_items(&posts_file, &comments_dir)
            .await?;
        comments_files.push(comments_file);
    }

    if !status.should_stop() {
        status.set_current_source(None)?;
        status.set_progress(None);
    }

    Ok((posts_files, comments_files))
}
