//! HTTP server for the local dashboard.
//!
//! Serves the latest emotion, baseline and history as JSON, and lets the
//! dashboard pause, resume or recalibrate the monitor.
//!
//! # Architecture
//!
//! ```text
//! Monitor task ──→ MonitorHandle ──→ GET /api/stats ──→ Dashboard
//!                       ↑
//!                POST /api/pause | resume | recalibrate
//! ```

use crate::core::engine::Assessment;
use crate::core::model::{Baseline, HistoryEntry};
use crate::state::{MonitorSnapshot, SharedMonitor};
use axum::{
    extract::State,
    http::{request::Parts, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

const PLACEHOLDER_COLOR: &str = "#888888";

/// Calibration progress as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationView {
    pub collected: usize,
    pub target: usize,
}

/// One point of the dashboard chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub time: String,
    pub emotion: String,
    pub confidence: u8,
    pub kpm: f64,
}

impl From<&HistoryEntry> for HistoryPoint {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            time: entry
                .sample
                .timestamp
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
            emotion: entry.classification.emotion.label().to_string(),
            confidence: entry.classification.confidence,
            kpm: entry.sample.kpm,
        }
    }
}

/// Response from the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub emotion: String,
    pub confidence: u8,
    pub kpm: f64,
    pub mouse: f64,
    pub clicks: u32,
    pub timestamp: String,
    pub time: String,
    pub color: String,
    pub paused: bool,
    pub calibrating: bool,
    pub calibration: CalibrationView,
    pub baseline: Baseline,
    pub session_id: String,
    pub history: Vec<HistoryPoint>,
}

impl From<&MonitorSnapshot> for StatsResponse {
    fn from(snapshot: &MonitorSnapshot) -> Self {
        let placeholder = |label: &str| (label.to_string(), 0u8, PLACEHOLDER_COLOR.to_string());
        let (emotion, confidence, color) = match snapshot.latest.map(|o| o.assessment) {
            None => placeholder("Initializing"),
            Some(_) if snapshot.calibration.calibrating => placeholder("Calibrating"),
            // The sample that completed calibration carries no label.
            Some(Assessment::Calibrating { .. }) => placeholder("Calibrated"),
            Some(Assessment::Classified(c)) => (
                c.emotion.label().to_string(),
                c.confidence,
                c.emotion.color().to_string(),
            ),
        };

        let timestamp = snapshot
            .latest
            .map(|o| o.sample.timestamp)
            .unwrap_or_else(Utc::now);
        let (kpm, mouse, clicks) = snapshot
            .latest
            .map(|o| (o.sample.kpm, o.sample.mouse, o.sample.clicks))
            .unwrap_or((0.0, 0.0, 0));

        Self {
            emotion,
            confidence,
            kpm,
            mouse,
            clicks,
            timestamp: timestamp.to_rfc3339(),
            time: timestamp.with_timezone(&Local).format("%H:%M:%S").to_string(),
            color,
            paused: snapshot.paused,
            calibrating: snapshot.calibration.calibrating,
            calibration: CalibrationView {
                collected: snapshot.calibration.collected,
                target: snapshot.calibration.target,
            },
            baseline: snapshot.baseline,
            session_id: snapshot.session_id.to_string(),
            history: snapshot.history.iter().map(HistoryPoint::from).collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PauseResponse {
    pub paused: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecalibrateResponse {
    pub recalibrating: bool,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/stats
///
/// Always succeeds; before the first sample it reports a placeholder.
async fn stats(State(handle): State<SharedMonitor>) -> Json<StatsResponse> {
    let snapshot = handle.snapshot().await;
    Json(StatsResponse::from(&snapshot))
}

/// GET /api/history
async fn history(State(handle): State<SharedMonitor>) -> Json<Vec<HistoryPoint>> {
    let entries = handle.history().await;
    Json(entries.iter().map(HistoryPoint::from).collect())
}

/// POST /api/pause
async fn pause(State(handle): State<SharedMonitor>) -> Json<PauseResponse> {
    handle.set_paused(true);
    Json(PauseResponse { paused: true })
}

/// POST /api/resume
async fn resume(State(handle): State<SharedMonitor>) -> Json<PauseResponse> {
    handle.set_paused(false);
    Json(PauseResponse { paused: false })
}

/// POST /api/recalibrate
async fn recalibrate(State(handle): State<SharedMonitor>) -> Json<RecalibrateResponse> {
    handle.request_recalibration();
    tracing::info!("Recalibration requested over HTTP");
    Json(RecalibrateResponse {
        recalibrating: true,
    })
}

fn is_local_origin(origin: &HeaderValue, _parts: &Parts) -> bool {
    let origin = origin.as_bytes();
    [b"http://localhost".as_slice(), b"http://127.0.0.1".as_slice()]
        .iter()
        .any(|allowed| {
            origin.starts_with(allowed)
                && matches!(origin.get(allowed.len()), None | Some(b':'))
        })
}

/// Build the dashboard router.
pub fn router(handle: SharedMonitor) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/history", get(history))
        .route("/api/pause", post(pause))
        .route("/api/resume", post(resume))
        .route("/api/recalibrate", post(recalibrate))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(is_local_origin))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .with_state(handle)
}

/// Run the HTTP server until `shutdown` is cancelled.
pub async fn run(
    config: ServerConfig,
    handle: SharedMonitor,
    shutdown: CancellationToken,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let app = router(handle);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Dashboard API listening on http://{}", actual_addr);

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, task))
}
