//! Platform API client
//!
//! One `ApiClient` per process holds the HTTP client, base URL, access
//! token and the shared rate limiter. Every outbound call passes through
//! the limiter, so the whole process shares one request budget no matter
//! how many call sites exist.

use crate::api::types::{
    ApiOutcome, CommentPage, CommunityInfo, CommunityList, Envelope, PostPage,
};
use crate::limiter::RateLimiter;
use crate::{CrawlError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Platform API protocol version sent with every request
const API_VERSION: &str = "5.199";

/// Builds the HTTP client used for all platform calls
pub fn build_http_client(timeout_secs: u64) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("wellwatch/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Typed client for the platform's JSON API
pub struct ApiClient {
    http: Client,
    base_url: Url,
    access_token: String,
    limiter: Arc<RateLimiter>,
}

impl ApiClient {
    pub fn new(http: Client, base_url: Url, access_token: String, limiter: Arc<RateLimiter>) -> Self {
        Self {
            http,
            base_url,
            access_token,
            limiter,
        }
    }

    /// Fetches metadata for the named communities
    pub async fn community_info(&self, ids: &[String]) -> Result<ApiOutcome<Vec<CommunityInfo>>> {
        let operation = "communities.getById";
        let params = [("community_ids", ids.join(","))];
        let envelope: Envelope<CommunityList> = self.call(operation, &params).await?;
        let outcome = decode_outcome(envelope, operation, |list: &CommunityList| {
            list.communities.is_empty() || list.communities[0].name.is_empty()
        })?;
        Ok(match outcome {
            ApiOutcome::Success(list) => ApiOutcome::Success(list.communities),
            ApiOutcome::Empty => ApiOutcome::Empty,
            ApiOutcome::ApiError { code, message } => ApiOutcome::ApiError { code, message },
        })
    }

    /// Fetches one page of posts from a community wall
    pub async fn posts(
        &self,
        community_id: i64,
        offset: u64,
        limit: u64,
    ) -> Result<ApiOutcome<PostPage>> {
        let operation = "wall.get";
        let params = [
            ("owner_id", community_id.to_string()),
            ("offset", offset.to_string()),
            ("count", limit.to_string()),
        ];
        let envelope: Envelope<PostPage> = self.call(operation, &params).await?;
        decode_outcome(envelope, operation, |page: &PostPage| page.items.is_empty())
    }

    /// Fetches the comments of one post, reply threads included
    pub async fn comments(&self, community_id: i64, post_id: i64) -> Result<ApiOutcome<CommentPage>> {
        let operation = "wall.getComments";
        let params = [
            ("owner_id", community_id.to_string()),
            ("post_id", post_id.to_string()),
        ];
        let envelope: Envelope<CommentPage> = self.call(operation, &params).await?;
        decode_outcome(envelope, operation, |page: &CommentPage| page.items.is_empty())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        params: &[(&str, String)],
    ) -> Result<Envelope<T>> {
        let url = self
            .base_url
            .join(&format!("method/{operation}"))
            .map_err(|e| CrawlError::Decode {
                operation: operation.to_string(),
                message: format!("cannot build request url: {e}"),
            })?;

        tracing::debug!("calling {}", operation);
        let response = self
            .limiter
            .execute(|| {
                self.http
                    .get(url)
                    .query(&[
                        ("access_token", self.access_token.as_str()),
                        ("v", API_VERSION),
                    ])
                    .query(params)
                    .send()
            })
            .await
            .map_err(|e| CrawlError::Transport {
                operation: operation.to_string(),
                source: e,
            })?;

        response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| CrawlError::Decode {
                operation: operation.to_string(),
                message: e.to_string(),
            })
    }
}

/// Resolves an envelope into an `ApiOutcome`
///
/// A payload that `is_empty` judges vacuous becomes `Empty`; an envelope
/// carrying neither payload nor error is a decode failure.
fn decode_outcome<T>(
    envelope: Envelope<T>,
    operation: &str,
    is_empty: impl Fn(&T) -> bool,
) -> Result<ApiOutcome<T>> {
    if let Some(error) = envelope.error {
        tracing::warn!(
            "platform error during {}: [{}] {}",
            operation,
            error.error_code,
            error.error_msg
        );
        return Ok(ApiOutcome::ApiError {
            code: error.error_code,
            message: error.error_msg,
        });
    }
    match envelope.response {
        Some(payload) => {
            if is_empty(&payload) {
                tracing::warn!("empty response during {}", operation);
                Ok(ApiOutcome::Empty)
            } else {
                Ok(ApiOutcome::Success(payload))
            }
        }
        None => Err(CrawlError::Decode {
            operation: operation.to_string(),
            message: "envelope carries neither response nor error".to_string(),
        }),
    }
}
