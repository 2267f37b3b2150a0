//! Shared scaffolding for the end-to-end tests

use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;
use wellwatch::api::{build_http_client, ApiClient};
use wellwatch::limiter::RateLimiter;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an API client pointed at the mock server, with a request budget
/// wide enough that no test ever waits on the limiter
pub fn api_client(server: &MockServer) -> ApiClient {
    let http = build_http_client(5).expect("Failed to build HTTP client");
    let base_url = Url::parse(&server.uri()).expect("Failed to parse mock server URI");
    ApiClient::new(
        http,
        base_url,
        "test-token".to_string(),
        Arc::new(RateLimiter::new(100)),
    )
}

/// Wraps a payload in the platform's response envelope
pub fn envelope(payload: Value) -> Value {
    json!({ "response": payload })
}

pub fn community(id: i64, name: &str, screen_name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "screen_name": screen_name,
        "is_closed": 0,
        "type": "page",
    })
}

pub fn post(id: i64, owner_id: i64, date: i64, text: &str) -> Value {
    json!({ "id": id, "owner_id": owner_id, "date": date, "text": text })
}

/// Mounts `communities.getById` for one requested id
pub async fn mount_community(server: &MockServer, requested: &str, communities: Value) {
    Mock::given(method("GET"))
        .and(path("/method/communities.getById"))
        .and(query_param("community_ids", requested))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "communities": communities }))),
        )
        .mount(server)
        .await;
}

/// Mounts `wall.get` for one owner, matching any offset
pub async fn mount_posts(server: &MockServer, owner_id: i64, items: Value) {
    let count = items.as_array().map(|a| a.len()).unwrap_or(0);
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("owner_id", owner_id.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "count": count, "items": items }))),
        )
        .mount(server)
        .await;
}

/// Mounts `wall.getComments` for one post
pub async fn mount_comments(server: &MockServer, post_id: i64, items: Value) {
    let count = items.as_array().map(|a| a.len()).unwrap_or(0);
    Mock::given(method("GET"))
        .and(path("/method/wall.getComments"))
        .and(query_param("post_id", post_id.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "count": count, "items": items }))),
        )
        .mount(server)
        .await;
}
