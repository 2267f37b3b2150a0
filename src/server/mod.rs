//! HTTP boundary
//!
//! Four routes drive and observe the pipeline:
//! - `POST /collect` validates the request and launches a run in the
//!   background, holding the single-run permit for its duration
//! - `GET /status` returns the live status snapshot
//! - `POST /stop` raises the cooperative stop flag
//! - `POST /reset` clears the status for operator recovery

use crate::crawler::Crawler;
use crate::{Result, StatusManager};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    crawler: Arc<Crawler>,
    status: Arc<StatusManager>,
    /// One permit; holding it marks a run as active
    run_gate: Arc<Semaphore>,
}

/// Body of `POST /collect`
#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    pub sources: Vec<String>,
    pub target_date: String,
}

#[derive(Serialize)]
struct AckResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Builds the application router
pub fn build_app(crawler: Arc<Crawler>, status: Arc<StatusManager>) -> Router {
    let state = AppState {
        crawler,
        status,
        run_gate: Arc::new(Semaphore::new(1)),
    };

    Router::new()
        .route("/collect", post(collect_handler))
        .route("/status", get(status_handler))
        .route("/stop", post(stop_handler))
        .route("/reset", post(reset_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// Binds the listen address and serves the router until shutdown
pub async fn serve(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Launches a pipeline run unless one is already active
///
/// Returns 400 for an invalid request, 409 with the current status when a
/// run holds the permit, and `{"status":"ok"}` once the run is launched.
async fn collect_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CollectRequest>,
) -> Response {
    if request.sources.is_empty() {
        return bad_request("sources must not be empty");
    }

    let target_date = match NaiveDate::parse_from_str(&request.target_date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return bad_request("target_date must be formatted as YYYY-MM-DD"),
    };
    if target_date > Utc::now().date_naive() {
        return bad_request("target_date must not be in the future");
    }

    // the permit moves into the run task, so the gate reopens exactly when
    // the run ends
    let permit = match Arc::clone(&state.run_gate).try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::info!("collect rejected, a run is already active");
            return (StatusCode::CONFLICT, Json(state.status.snapshot())).into_response();
        }
    };

    let crawler = Arc::clone(&state.crawler);
    tokio::spawn(async move {
        let _permit = permit;
        crawler.run_pipeline(&request.sources, target_date).await;
    });

    (StatusCode::OK, Json(AckResponse { status: "ok" })).into_response()
}

/// Returns the live status snapshot
async fn status_handler(Extension(state): Extension<AppState>) -> Response {
    Json(state.status.snapshot()).into_response()
}

/// Raises the stop flag; acknowledged whether or not a run is active
async fn stop_handler(Extension(state): Extension<AppState>) -> Response {
    state.status.request_stop();
    tracing::info!("stop requested over HTTP");
    Json(AckResponse {
        status: "stop_requested",
    })
    .into_response()
}

/// Clears the published status
async fn reset_handler(Extension(state): Extension<AppState>) -> Response {
    state.status.reset();
    tracing::info!("status reset over HTTP");
    Json(AckResponse { status: "reset" }).into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
