//! Typed payloads for the platform API
//!
//! Every response from the platform arrives in an envelope that carries
//! either a `response` payload or an `error` body. The envelope is decoded
//! here, at the boundary, into explicit types; nothing downstream ever
//! inspects raw JSON.

use serde::{Deserialize, Serialize};

/// Wire envelope wrapping every platform response
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: Option<T>,
    pub error: Option<ErrorBody>,
}

/// Error body the platform returns instead of a payload
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error_code: i64,
    pub error_msg: String,
}

/// Outcome of one platform API call
///
/// `Empty` means the call succeeded but returned nothing useful (an empty
/// item list or a blank community record). `ApiError` carries the
/// platform's own error body; whether that is fatal is the caller's call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Empty,
    ApiError { code: i64, message: String },
}

/// Community metadata as returned by `communities.getById`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub is_closed: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Payload of `communities.getById`
#[derive(Debug, Deserialize)]
pub struct CommunityList {
    #[serde(default)]
    pub communities: Vec<CommunityInfo>,
}

/// One post from a community wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub owner_id: i64,
    /// Publication time, unix seconds UTC
    pub date: i64,
    #[serde(default)]
    pub text: String,
}

/// One page of `wall.get`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub items: Vec<Post>,
}

/// One comment, with its reply thread embedded as the platform returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    /// Wall the comment lives on; the platform repeats it on every comment
    #[serde(default)]
    pub owner_id: i64,
    #[serde(default)]
    pub post_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub thread: Thread,
}

/// Embedded reply thread of a comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub items: Vec<Comment>,
}

/// Payload of `wall.getComments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub items: Vec<Comment>,
}
