//! Typed client for the remote social platform's JSON API
//!
//! This module contains:
//! - The wire envelope and payload types
//! - Outcome classification (payload / empty / platform error)
//! - The rate-limited HTTP client all collection code goes through

mod client;
mod types;

pub use client::{build_http_client, ApiClient};
pub use types::{ApiOutcome, Comment, CommentPage, CommunityInfo, Post, PostPage, Thread};
