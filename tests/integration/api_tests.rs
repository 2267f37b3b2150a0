//! API client and collector behavior against the mock platform

use crate::support::{api_client, community, envelope, mount_comments, mount_community, post};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wellwatch::api::{ApiOutcome, Post};
use wellwatch::collector::{
    read_comments_file, read_posts_file, write_staging, Collector, HttpCollector,
};
use wellwatch::CrawlError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_community_info_sends_token_and_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/communities.getById"))
        .and(query_param("access_token", "test-token"))
        .and(query_param("v", "5.199"))
        .and(query_param("community_ids", "wellness"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "communities": [community(9, "wellness daily", "wellness")]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client(&server);
    let outcome = api
        .community_info(&["wellness".to_string()])
        .await
        .expect("community_info failed");

    match outcome {
        ApiOutcome::Success(communities) => {
            assert_eq!(communities.len(), 1);
            assert_eq!(communities[0].id, 9);
            assert_eq!(communities[0].kind, "page");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_platform_error_becomes_api_error_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"error_code": 15, "error_msg": "Access denied"}
        })))
        .mount(&server)
        .await;

    let api = api_client(&server);
    match api.posts(9, 0, 100).await.expect("call failed") {
        ApiOutcome::ApiError { code, message } => {
            assert_eq!(code, 15);
            assert_eq!(message, "Access denied");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_wall_is_empty_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "count": 0, "items": [] }))),
        )
        .mount(&server)
        .await;

    let api = api_client(&server);
    let outcome = api.posts(9, 0, 100).await.expect("call failed");
    assert!(matches!(outcome, ApiOutcome::Empty));
}

#[tokio::test]
async fn test_malformed_payload_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let api = api_client(&server);
    let err = api.posts(9, 0, 100).await.unwrap_err();
    assert!(matches!(err, CrawlError::Decode { .. }));
}

#[tokio::test]
async fn test_collect_items_pages_until_target_date() {
    let server = MockServer::start().await;
    mount_community(
        &server,
        "9",
        json!([community(9, "wellness daily", "wellness")]),
    )
    .await;

    let target = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let cutoff = target.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();

    // a full first page, every post on or after the target date
    let first_page: Vec<serde_json::Value> = (0..100)
        .map(|i: i64| {
            post(
                1000 + i,
                9,
                cutoff + 1000 - i,
                &format!("post number {i} with enough text to keep"),
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "count": 101, "items": first_page }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    // the second page starts before the target date, so paging stops here
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "count": 101,
            "items": [post(99, 9, cutoff - 5, "too old to keep")]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let collector = HttpCollector::new(Arc::new(api_client(&server)));
    let dir = TempDir::new().unwrap();
    let file = collector
        .collect_items("9", target, dir.path())
        .await
        .expect("collect_items failed");

    let posts = read_posts_file(&file).unwrap();
    assert_eq!(posts.len(), 100);
    assert!(posts.iter().all(|p| p.date >= cutoff));
}

#[tokio::test]
async fn test_collect_child_items_groups_comments_by_post() {
    let server = MockServer::start().await;
    mount_comments(
        &server,
        10,
        json!([{
            "id": 20, "owner_id": 9, "post_id": 10, "text": "top level comment",
            "thread": {"count": 1, "items": [
                {"id": 21, "owner_id": 9, "post_id": 10, "text": "a reply"}
            ]}
        }]),
    )
    .await;
    mount_comments(&server, 11, json!([])).await;

    let dir = TempDir::new().unwrap();
    let posts_file = dir.path().join("9.json");
    write_staging(
        &posts_file,
        &vec![
            Post {
                id: 10,
                owner_id: 9,
                date: 1700000000,
                text: "first post".to_string(),
            },
            Post {
                id: 11,
                owner_id: 9,
                date: 1700000100,
                text: "second post".to_string(),
            },
        ],
    )
    .unwrap();

    let comments_dir = dir.path().join("comments");
    std::fs::create_dir_all(&comments_dir).unwrap();
    let collector = HttpCollector::new(Arc::new(api_client(&server)));
    let file = collector
        .collect_child_items(&posts_file, &comments_dir)
        .await
        .expect("collect_child_items failed");

    let by_post = read_comments_file(&file).unwrap();
    assert_eq!(by_post.len(), 2);
    assert_eq!(by_post[&10].len(), 1);
    assert_eq!(by_post[&10][0].thread.items.len(), 1);
    assert!(by_post[&11].is_empty());
}
