//! services/api/src/web/canvas.rs
//!
//! Handlers for dropping catalog products onto the room canvas and moving
//! them around. Pointer positions arrive in client coordinates together with
//! the canvas bounding box, exactly as the browser reports them.

use crate::catalog::ProductRecord;
use crate::error::ApiError;
use crate::web::{protocol::PlacedProductView, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use lumiere_core::{CanvasRect, Product};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CanvasRectBody {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl From<CanvasRectBody> for CanvasRect {
    fn from(r: CanvasRectBody) -> Self {
        CanvasRect {
            left: r.left,
            top: r.top,
            width: r.width,
            height: r.height,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DropRequest {
    /// The raw `application/json` drag payload: a serialized product.
    pub payload: String,
    pub client_x: f64,
    pub client_y: f64,
    pub rect: CanvasRectBody,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DragRequest {
    pub client_x: f64,
    pub client_y: f64,
    pub rect: CanvasRectBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacementsResponse {
    items: Vec<PlacedProductView>,
    dragging: Option<Uuid>,
}

/// Parses a drag payload. Empty or malformed payloads yield `None`.
fn parse_drag_payload(payload: &str) -> Option<Product> {
    if payload.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ProductRecord>(payload) {
        Ok(record) => Some(Product::from(record)),
        Err(e) => {
            warn!("Ignoring malformed product drop payload: {}", e);
            None
        }
    }
}

/// List the products placed on the canvas.
#[utoipa::path(
    get,
    path = "/placements",
    responses((status = 200, description = "Placed products", body = PlacementsResponse))
)]
pub async fn list_placements_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<PlacementsResponse> {
    let studio = app_state.studio.lock().await;
    let board = studio.placements();
    Json(PlacementsResponse {
        items: board.items().iter().map(PlacedProductView::from).collect(),
        dragging: board.dragging(),
    })
}

/// Drop a product onto the canvas.
///
/// A malformed payload or a canvas without area is ignored and answered with
/// 204 No Content.
#[utoipa::path(
    post,
    path = "/placements/drop",
    request_body = DropRequest,
    responses(
        (status = 201, description = "Product placed", body = PlacedProductView),
        (status = 204, description = "Drop ignored"),
        (status = 400, description = "No room photo uploaded")
    )
)]
pub async fn drop_product_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<DropRequest>,
) -> Result<Response, (StatusCode, String)> {
    let Some(product) = parse_drag_payload(&request.payload) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let rect = CanvasRect::from(request.rect);
    let Some(position) = rect.to_position(request.client_x, request.client_y) else {
        warn!("Ignoring product drop on a canvas without area.");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let mut studio = app_state.studio.lock().await;
    let placed = studio
        .drop_product(product, position)
        .map_err(ApiError::from)?;
    info!(
        "Placed {} at ({:.1}%, {:.1}%).",
        placed.product.name,
        placed.position.x(),
        placed.position.y()
    );
    Ok((StatusCode::CREATED, Json(PlacedProductView::from(placed))).into_response())
}

/// Start dragging a placed product.
#[utoipa::path(
    post,
    path = "/placements/{id}/grab",
    params(("id" = Uuid, Path, description = "Placed product id")),
    responses(
        (status = 204, description = "Drag started"),
        (status = 404, description = "Unknown placement")
    )
)]
pub async fn grab_placement_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .studio
        .lock()
        .await
        .grab_placement(id)
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move the grabbed product to a new pointer position (clamped to the canvas).
#[utoipa::path(
    post,
    path = "/placements/drag",
    request_body = DragRequest,
    responses(
        (status = 200, description = "Product moved", body = PlacedProductView),
        (status = 204, description = "Nothing is being dragged")
    )
)]
pub async fn drag_placement_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<DragRequest>,
) -> Response {
    let rect = CanvasRect::from(request.rect);
    let Some(position) = rect.to_position(request.client_x, request.client_y) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let mut studio = app_state.studio.lock().await;
    match studio.drag_placement(position) {
        Some(placed) => Json(PlacedProductView::from(placed)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Stop dragging.
#[utoipa::path(
    post,
    path = "/placements/release",
    responses((status = 204, description = "Drag ended"))
)]
pub async fn release_placement_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.studio.lock().await.release_placement();
    StatusCode::NO_CONTENT
}

/// Remove a placed product.
#[utoipa::path(
    delete,
    path = "/placements/{id}",
    params(("id" = Uuid, Path, description = "Placed product id")),
    responses(
        (status = 204, description = "Placement removed"),
        (status = 404, description = "Unknown placement")
    )
)]
pub async fn remove_placement_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .studio
        .lock()
        .await
        .remove_placement(id)
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
