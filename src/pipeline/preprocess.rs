//! Preprocessing of staged JSON into classifier-ready rows
//!
//! Posts, comments and comment replies are flattened into one publication
//! shape, short rows are dropped, text is lowercased and stripped down to
//! alphanumeric runs, and each row gets a lexicon hit count for the
//! classifier.

use crate::api::CommunityInfo;
use crate::collector::{read_comments_file, read_posts_file, read_sources_file};
use crate::{CrawlError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One flattened, cleaned publication ready for inference
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedItem {
    pub source_id: i64,
    /// 0 for a post, the owning post's id for a comment or reply
    pub parent_id: i64,
    pub item_id: i64,
    pub tokens: Vec<String>,
    pub lexicon_hits: usize,
}

/// Loads the risk lexicon, one term per line, blank lines ignored
pub fn load_lexicon(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| CrawlError::Staging {
        path: path.to_path_buf(),
        message: format!("cannot read lexicon: {e}"),
    })?;
    Ok(content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Parses staged source metadata into rows for the save phase
pub fn preprocess_sources(files: &[PathBuf]) -> Result<Vec<CommunityInfo>> {
    let mut sources = Vec::new();
    for file in files {
        sources.extend(read_sources_file(file)?);
    }
    tracing::info!("preprocessed {} source record(s)", sources.len());
    Ok(sources)
}

/// Flattens and cleans staged posts and comments
pub fn preprocess_items(
    posts_files: &[PathBuf],
    comments_files: &[PathBuf],
    preprocessor: &Preprocessor,
) -> Result<Vec<ProcessedItem>> {
    let mut raw: Vec<(i64, i64, i64, String)> = Vec::new();

    for file in posts_files {
        for post in read_posts_file(file)? {
            raw.push((post.owner_id, 0, post.id, post.text));
        }
    }

    for file in comments_files {
        for comments in read_comments_file(file)?.into_values() {
            for comment in comments {
                raw.push((comment.owner_id, comment.post_id, comment.id, comment.text));
                for reply in comment.thread.items {
                    raw.push((reply.owner_id, reply.post_id, reply.id, reply.text));
                }
            }
        }
    }

    let total = raw.len();
    let items: Vec<ProcessedItem> = raw
        .into_iter()
        .filter_map(|(source_id, parent_id, item_id, text)| {
            preprocessor.process(&text).map(|(tokens, lexicon_hits)| ProcessedItem {
                source_id,
                parent_id,
                item_id,
                tokens,
                lexicon_hits,
            })
        })
        .collect();

    tracing::info!("preprocessed {} of {} publication(s)", items.len(), total);
    Ok(items)
}

/// Cleans and tokenizes publication text
pub struct Preprocessor {
    min_text_length: usize,
    lexicon: HashSet<String>,
}

impl Preprocessor {
    pub fn new(min_text_length: usize, lexicon: HashSet<String>) -> Self {
        Self {
            min_text_length,
            lexicon,
        }
    }

    /// Returns the cleaned tokens and lexicon hit count, or None when the
    /// row is too short or cleans down to nothing
    fn process(&self, text: &str) -> Option<(Vec<String>, usize)> {
        if text.chars().count() <= self.min_text_length {
            return None;
        }
        let cleaned = clean_text(text);
        let tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return None;
        }
        let lexicon_hits = tokens.iter().filter(|t| self.lexicon.contains(*t)).count();
        Some((tokens, lexicon_hits))
    }
}

/// Lowercases and replaces every non-alphanumeric run with a space
fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}
