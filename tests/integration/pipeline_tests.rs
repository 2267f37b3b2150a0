//! Full pipeline runs against the mock platform

use crate::support::{api_client, community, mount_comments, mount_community, mount_posts, post};
use chrono::NaiveDate;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wellwatch::collector::HttpCollector;
use wellwatch::crawler::Crawler;
use wellwatch::pipeline::{load_lexicon, LexiconClassifier, Preprocessor};
use wellwatch::storage::SqliteStorage;
use wellwatch::{Phase, StatusManager};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wires a crawler to the mock platform with a small risk lexicon
fn build_crawler(
    server: &MockServer,
    dir: &TempDir,
    status: &Arc<StatusManager>,
    terms: &str,
) -> (Crawler, PathBuf) {
    let lexicon_path = dir.path().join("lexicon.txt");
    std::fs::write(&lexicon_path, terms).unwrap();
    let lexicon = load_lexicon(&lexicon_path).unwrap();

    let db_path = dir.path().join("results.db");
    let crawler = Crawler::new(
        Arc::new(HttpCollector::new(Arc::new(api_client(server)))),
        Arc::new(LexiconClassifier::new(0.3)),
        Arc::clone(status),
        &db_path,
        dir.path().join("staging"),
        Preprocessor::new(3, lexicon),
    )
    .expect("Failed to build crawler");
    (crawler, db_path)
}

fn target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

#[tokio::test]
async fn test_full_run_classifies_and_persists() {
    let server = MockServer::start().await;
    mount_community(
        &server,
        "9",
        json!([community(9, "wellness daily", "wellness")]),
    )
    .await;
    mount_community(
        &server,
        "10",
        json!([community(10, "night owls", "nightowls")]),
    )
    .await;
    mount_posts(
        &server,
        9,
        json!([
            post(10, 9, 1704100000, "feeling so alone and tired and empty tonight"),
            post(11, 9, 1704100100, "the park was lovely this afternoon"),
        ]),
    )
    .await;
    mount_posts(&server, 10, json!([])).await;
    mount_comments(
        &server,
        10,
        json!([{
            "id": 20, "owner_id": 9, "post_id": 10,
            "text": "i feel so alone lately honestly",
            "thread": {"count": 1, "items": [{
                "id": 21, "owner_id": 9, "post_id": 10,
                "text": "same here tired tired tired friend"
            }]}
        }]),
    )
    .await;
    mount_comments(&server, 11, json!([])).await;

    let dir = TempDir::new().unwrap();
    let status = Arc::new(StatusManager::new());
    let (crawler, db_path) = build_crawler(&server, &dir, &status, "alone\ntired\nempty\n");

    crawler
        .run_pipeline(&["9".to_string(), "10".to_string()], target_date())
        .await;

    let snapshot = status.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.last_error, None);

    let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    assert_eq!(storage.run_count().unwrap(), 1);
    assert_eq!(storage.linked_sources(1).unwrap(), vec![9, 10]);

    // both posts, the comment and its reply were classified
    let predictions = storage.predictions_for_run(1).unwrap();
    assert_eq!(predictions.len(), 4);
    let flags: Vec<(i64, i64, bool)> = predictions
        .iter()
        .map(|p| (p.parent_id, p.item_id, p.flagged))
        .collect();
    assert!(flags.contains(&(0, 10, true)));
    assert!(flags.contains(&(0, 11, false)));
    assert!(flags.contains(&(10, 20, false)));
    assert!(flags.contains(&(10, 21, true)));
}

#[tokio::test]
async fn test_platform_failure_surfaces_phase_in_status() {
    let server = MockServer::start().await;
    mount_community(
        &server,
        "9",
        json!([community(9, "wellness daily", "wellness")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"error_code": 15, "error_msg": "Access denied"}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let status = Arc::new(StatusManager::new());
    let (crawler, db_path) = build_crawler(&server, &dir, &status, "alone\n");

    crawler.run_pipeline(&["9".to_string()], target_date()).await;

    let snapshot = status.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(
        snapshot.last_error,
        Some("Pipeline failed during collecting_items.".to_string())
    );

    // nothing persisted for a failed run
    let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    assert_eq!(storage.run_count().unwrap(), 0);
}

#[tokio::test]
async fn test_empty_walls_report_no_data() {
    let server = MockServer::start().await;
    mount_community(
        &server,
        "9",
        json!([community(9, "wellness daily", "wellness")]),
    )
    .await;
    mount_posts(&server, 9, json!([])).await;

    let dir = TempDir::new().unwrap();
    let status = Arc::new(StatusManager::new());
    let (crawler, db_path) = build_crawler(&server, &dir, &status, "alone\n");

    crawler.run_pipeline(&["9".to_string()], target_date()).await;

    let snapshot = status.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.last_error, Some("No data to process.".to_string()));

    let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    assert_eq!(storage.run_count().unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_source_reports_no_data() {
    let server = MockServer::start().await;
    // the platform resolves the name to nothing
    mount_community(&server, "ghost", json!([])).await;

    let dir = TempDir::new().unwrap();
    let status = Arc::new(StatusManager::new());
    let (crawler, db_path) = build_crawler(&server, &dir, &status, "alone\n");

    crawler
        .run_pipeline(&["ghost".to_string()], target_date())
        .await;

    let snapshot = status.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.last_error, Some("No data to process.".to_string()));

    let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    assert_eq!(storage.run_count().unwrap(), 0);
}
