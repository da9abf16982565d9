//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

use crate::engine::controls::{Controls, SharedControls};
use crate::engine::FrameSink;
use crate::render::Layout;
use crate::types::Frame;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub latest_frame: RwLock<Option<Frame>>,
    pub controls: SharedControls,
    /// Ids that hold requests may name.
    pub train_ids: Vec<String>,
    pub layout: Layout,
}

impl DashboardState {
    pub fn new(controls: SharedControls, train_ids: Vec<String>, layout: Layout) -> Self {
        Self {
            latest_frame: RwLock::new(None),
            controls,
            train_ids,
            layout,
        }
    }
}

/// The dashboard keeps only the most recent frame.
#[async_trait]
impl FrameSink for DashboardState {
    async fn present(&self, frame: &Frame) -> Result<()> {
        *self.latest_frame.write().await = Some(frame.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "dashboard"
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HoldRequest {
    pub hold: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeedRequest {
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/frame
pub async fn get_frame(State(state): State<AppState>) -> Result<Json<Frame>, ApiError> {
    state
        .latest_frame
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no frame yet"))
}

/// GET /api/layout
pub async fn get_layout(State(state): State<AppState>) -> Json<Layout> {
    Json(state.layout.clone())
}

/// GET /api/controls
pub async fn get_controls(State(state): State<AppState>) -> Json<Controls> {
    Json(state.controls.read().await.clone())
}

/// POST /api/trains/:id/hold
pub async fn set_hold(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<HoldRequest>,
) -> Result<Json<Controls>, ApiError> {
    if !state.train_ids.contains(&id) {
        return Err(api_error(StatusCode::NOT_FOUND, format!("Train not found: {id}")));
    }
    let mut controls = state.controls.write().await;
    controls.set_hold(id.clone(), req.hold);
    info!(train = %id, hold = req.hold, "Hold updated from dashboard");
    Ok(Json(controls.clone()))
}

/// POST /api/speed
pub async fn set_speed(
    State(state): State<AppState>,
    Json(req): Json<SpeedRequest>,
) -> Result<Json<Controls>, ApiError> {
    let mut controls = state.controls.write().await;
    controls
        .set_tick_delay(Duration::from_millis(req.delay_ms))
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    info!(delay_ms = req.delay_ms, "Tick delay updated from dashboard");
    Ok(Json(controls.clone()))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
