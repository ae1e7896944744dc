//! services/api/src/web/cover_flow.rs
//!
//! Handlers that feed scroll, swipe and click input into the cover-flow state.
//! Every handler answers with the resulting view.

use crate::error::ApiError;
use crate::web::{protocol::CoverFlowView, state::AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use lumiere_core::Studio;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct WheelRequest {
    pub delta_y: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SwipePhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwipeRequest {
    pub phase: SwipePhase,
    /// Required for `start` and `move`.
    pub client_y: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveRequest {
    /// Only the sign matters: one step forward, back, or none.
    pub direction: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct JumpRequest {
    pub index: usize,
}

fn view_of(studio: &Studio) -> Json<CoverFlowView> {
    Json(CoverFlowView::new(studio.cover_flow(), studio.results()))
}

/// Feed a scroll-wheel event.
#[utoipa::path(
    post,
    path = "/cover-flow/wheel",
    request_body = WheelRequest,
    responses((status = 200, description = "Cover flow after the event", body = CoverFlowView))
)]
pub async fn wheel_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<WheelRequest>,
) -> Json<CoverFlowView> {
    let mut studio = app_state.studio.lock().await;
    studio.cover_flow_mut().wheel(request.delta_y);
    view_of(&studio)
}

/// Feed a touch gesture event.
#[utoipa::path(
    post,
    path = "/cover-flow/swipe",
    request_body = SwipeRequest,
    responses(
        (status = 200, description = "Cover flow after the event", body = CoverFlowView),
        (status = 400, description = "Missing client_y")
    )
)]
pub async fn swipe_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SwipeRequest>,
) -> Result<Json<CoverFlowView>, (StatusCode, String)> {
    let mut studio = app_state.studio.lock().await;
    let flow = studio.cover_flow_mut();
    match (request.phase, request.client_y) {
        (SwipePhase::Start, Some(y)) => flow.touch_start(y),
        (SwipePhase::Move, Some(y)) => {
            flow.touch_move(y);
        }
        (SwipePhase::End, _) => flow.touch_end(),
        (_, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "client_y is required for start and move".to_string(),
            ))
        }
    }
    Ok(view_of(&studio))
}

/// Move one step forward or back.
#[utoipa::path(
    post,
    path = "/cover-flow/move",
    request_body = MoveRequest,
    responses((status = 200, description = "Cover flow after the move", body = CoverFlowView))
)]
pub async fn move_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<MoveRequest>,
) -> Json<CoverFlowView> {
    let mut studio = app_state.studio.lock().await;
    studio.cover_flow_mut().move_by(request.direction);
    view_of(&studio)
}

/// Bring a specific item to the center.
#[utoipa::path(
    post,
    path = "/cover-flow/jump",
    request_body = JumpRequest,
    responses(
        (status = 200, description = "Cover flow after the jump", body = CoverFlowView),
        (status = 422, description = "Index outside the result list")
    )
)]
pub async fn jump_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<JumpRequest>,
) -> Result<Json<CoverFlowView>, (StatusCode, String)> {
    let mut studio = app_state.studio.lock().await;
    studio
        .cover_flow_mut()
        .jump_to(request.index)
        .map_err(|e| ApiError::from(lumiere_core::StudioError::from(e)))?;
    Ok(view_of(&studio))
}
