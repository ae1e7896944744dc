//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the room, generation, history and catalog
//! endpoints, and the master definition for the OpenAPI specification.

use crate::catalog::ProductRecord;
use crate::error::ApiError;
use crate::imaging::{jpeg_data_url, normalize_upload};
use crate::web::{
    canvas, cover_flow,
    generation_task::{cancel_generation, start_generation},
    protocol::{
        CoverFlowView, GeneratedImageView, HistoryItemView, ItemLayoutView, PlacedProductView,
    },
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use lumiere_core::{LightingColor, RoomImage};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

const MISSING_KEY_WARNING: &str = "Setup Required: Add your API_KEY to environment variables.";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        status_handler,
        list_products_handler,
        upload_room_handler,
        get_room_handler,
        generate_handler,
        cancel_generation_handler,
        results_handler,
        list_history_handler,
        select_history_handler,
        cover_flow::wheel_handler,
        cover_flow::swipe_handler,
        cover_flow::move_handler,
        cover_flow::jump_handler,
        canvas::list_placements_handler,
        canvas::drop_product_handler,
        canvas::grab_placement_handler,
        canvas::drag_placement_handler,
        canvas::release_placement_handler,
        canvas::remove_placement_handler,
    ),
    components(
        schemas(
            StatusResponse,
            RoomResponse,
            GenerationAccepted,
            ResultsResponse,
            ProductRecord,
            GeneratedImageView,
            HistoryItemView,
            CoverFlowView,
            ItemLayoutView,
            PlacedProductView,
            cover_flow::WheelRequest,
            cover_flow::SwipeRequest,
            cover_flow::SwipePhase,
            cover_flow::MoveRequest,
            cover_flow::JumpRequest,
            canvas::CanvasRectBody,
            canvas::DropRequest,
            canvas::DragRequest,
            canvas::PlacementsResponse,
        )
    ),
    tags(
        (name = "Lumière Studio API", description = "Room lighting visualizer: uploads, AI lighting variants, cover flow and furniture placement.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    api_key_configured: bool,
    /// Standing banner text when generation cannot work.
    warning: Option<String>,
    is_generating: bool,
    progress: f64,
    has_room: bool,
    result_count: usize,
    history_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResponse {
    id: Uuid,
    url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerationAccepted {
    colors: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResultsResponse {
    items: Vec<GeneratedImageView>,
    cover_flow: CoverFlowView,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Report whether generation is configured and what the studio is doing.
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Current studio status", body = StatusResponse))
)]
pub async fn status_handler(State(app_state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let api_key_configured = app_state.config.has_api_key();
    let studio = app_state.studio.lock().await;
    Json(StatusResponse {
        api_key_configured,
        warning: (!api_key_configured).then(|| MISSING_KEY_WARNING.to_string()),
        is_generating: studio.is_generating(),
        progress: studio.progress(),
        has_room: studio.room().is_some(),
        result_count: studio.results().len(),
        history_count: studio.history().len(),
    })
}

/// List the furniture catalog.
#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "All catalog products", body = [ProductRecord]))
)]
pub async fn list_products_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<ProductRecord>> {
    Json(
        app_state
            .catalog
            .products()
            .iter()
            .map(ProductRecord::from)
            .collect(),
    )
}

/// Upload a new room photo.
///
/// Accepts a multipart/form-data request with a single image part. The current
/// results and placed products are cleared.
#[utoipa::path(
    post,
    path = "/room",
    request_body(content_type = "multipart/form-data", description = "The room photo to upload."),
    responses(
        (status = 201, description = "Room photo loaded", body = RoomResponse),
        (status = 400, description = "Missing file or undecodable image"),
        (status = 409, description = "A generation session is running")
    )
)]
pub async fn upload_room_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;
    let raw = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;

    let jpeg = tokio::task::spawn_blocking(move || normalize_upload(&raw))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            warn!("Rejected room upload: {}", e);
            ApiError::from(e)
        })?;

    let room = RoomImage::new(jpeg);
    let response = RoomResponse {
        id: room.id,
        url: jpeg_data_url(&room.jpeg),
    };
    app_state
        .studio
        .lock()
        .await
        .load_room(room)
        .map_err(ApiError::from)?;

    info!("Room photo {} loaded.", response.id);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get the active room photo.
#[utoipa::path(
    get,
    path = "/room",
    responses(
        (status = 200, description = "The active room photo", body = RoomResponse),
        (status = 404, description = "No room photo uploaded yet")
    )
)]
pub async fn get_room_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<RoomResponse>, (StatusCode, String)> {
    let studio = app_state.studio.lock().await;
    let room = studio
        .room()
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No room photo uploaded".to_string()))?;
    Ok(Json(RoomResponse {
        id: room.id,
        url: jpeg_data_url(&room.jpeg),
    }))
}

/// Start generating the six lighting variants of the active room photo.
///
/// Progress and results are streamed over `/ws`.
#[utoipa::path(
    post,
    path = "/generate",
    responses(
        (status = 202, description = "Generation started", body = GenerationAccepted),
        (status = 400, description = "No room photo uploaded"),
        (status = 409, description = "A generation session is already running")
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !app_state.config.has_api_key() {
        warn!("Generation started without an API key; every color will be skipped.");
    }
    start_generation(app_state).await.map_err(ApiError::from)?;
    let colors = LightingColor::GENERATED
        .iter()
        .map(|c| c.label().to_string())
        .collect();
    Ok((StatusCode::ACCEPTED, Json(GenerationAccepted { colors })))
}

/// Stop the running generation session after the color in flight.
#[utoipa::path(
    post,
    path = "/generate/cancel",
    responses(
        (status = 202, description = "Cancellation requested"),
        (status = 409, description = "No generation session is running")
    )
)]
pub async fn cancel_generation_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, String)> {
    if cancel_generation(&app_state).await {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err((
            StatusCode::CONFLICT,
            "No generation session is running".to_string(),
        ))
    }
}

/// Get the active results with their cover-flow layout.
#[utoipa::path(
    get,
    path = "/results",
    responses((status = 200, description = "Active results", body = ResultsResponse))
)]
pub async fn results_handler(State(app_state): State<Arc<AppState>>) -> Json<ResultsResponse> {
    let studio = app_state.studio.lock().await;
    Json(ResultsResponse {
        items: studio.results().iter().map(GeneratedImageView::from).collect(),
        cover_flow: CoverFlowView::new(studio.cover_flow(), studio.results()),
    })
}

/// List past generation sessions, newest first.
#[utoipa::path(
    get,
    path = "/history",
    responses((status = 200, description = "Session history", body = [HistoryItemView]))
)]
pub async fn list_history_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<HistoryItemView>> {
    let studio = app_state.studio.lock().await;
    Json(studio.history().iter().map(HistoryItemView::from).collect())
}

/// Make a past session the active room and results.
#[utoipa::path(
    post,
    path = "/history/{id}/select",
    params(("id" = Uuid, Path, description = "History entry id")),
    responses(
        (status = 200, description = "History entry selected", body = ResultsResponse),
        (status = 404, description = "Unknown history entry"),
        (status = 409, description = "A generation session is running")
    )
)]
pub async fn select_history_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultsResponse>, (StatusCode, String)> {
    let mut studio = app_state.studio.lock().await;
    studio.select_history(id).map_err(|e| {
        error!("Failed to select history entry {}: {}", id, e);
        ApiError::from(e)
    })?;
    Ok(Json(ResultsResponse {
        items: studio.results().iter().map(GeneratedImageView::from).collect(),
        cover_flow: CoverFlowView::new(studio.cover_flow(), studio.results()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Config;
    use async_trait::async_trait;
    use bytes::Bytes;
    use axum::{body::Body, extract::FromRequest, http::Request};
    use chrono::Utc;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use lumiere_core::{GeneratedImage, LightingGenerator, PortError, PortResult, SessionReport};
    use std::collections::HashMap;
    use std::io::Cursor;

    const BOUNDARY: &str = "lumiere-test-boundary";

    struct NeverGenerates;

    #[async_trait]
    impl LightingGenerator for NeverGenerates {
        async fn relight(&self, _room: &RoomImage, _color: LightingColor) -> PortResult<Bytes> {
            Err(PortError::Unauthorized)
        }
    }

    fn app() -> Arc<AppState> {
        let config = Arc::new(Config::from_vars(HashMap::new()).unwrap());
        let catalog = Arc::new(Catalog::load(None).unwrap());
        Arc::new(AppState::new(config, Arc::new(NeverGenerates), catalog))
    }

    async fn multipart_with_file(contents: &[u8]) -> Multipart {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"room.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/room")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 3, Rgb([30, 60, 90]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    /// Loads a room and records one finished session for it.
    async fn app_with_session() -> (Arc<AppState>, RoomImage) {
        let app = app();
        let room = RoomImage::new(Bytes::from_static(b"first-room"));
        {
            let mut studio = app.studio.lock().await;
            studio.load_room(room.clone()).unwrap();
            studio.begin_session().unwrap();
            studio.finish_session(SessionReport {
                session_id: Uuid::new_v4(),
                original: room.clone(),
                variants: vec![GeneratedImage {
                    id: Uuid::new_v4(),
                    jpeg: room.jpeg.clone(),
                    color: LightingColor::Original,
                    created_at: Utc::now(),
                }],
                attempted: 6,
                cancelled: false,
            });
        }
        (app, room)
    }

    #[tokio::test]
    async fn valid_upload_becomes_the_active_room() {
        let (app, previous) = app_with_session().await;
        let multipart = multipart_with_file(&png_bytes()).await;

        let response = match upload_room_handler(State(app.clone()), multipart).await {
            Ok(ok) => ok.into_response(),
            Err((status, message)) => panic!("upload failed: {} {}", status, message),
        };
        assert_eq!(response.status(), StatusCode::CREATED);

        let studio = app.studio.lock().await;
        let room = studio.room().unwrap();
        assert_ne!(room.id, previous.id);
        assert_eq!(&room.jpeg[..2], &[0xFF, 0xD8]);
        assert!(studio.results().is_empty());
        assert_eq!(studio.history().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_upload_is_rejected_without_state_change() {
        let (app, previous) = app_with_session().await;
        let multipart = multipart_with_file(b"this is not an image").await;

        let err = upload_room_handler(State(app.clone()), multipart)
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("Failed to read file"));

        let studio = app.studio.lock().await;
        assert_eq!(studio.room(), Some(&previous));
        assert_eq!(studio.results().len(), 1);
    }

    #[tokio::test]
    async fn status_shows_missing_key_banner() {
        let Json(status) = status_handler(State(app())).await;
        assert!(!status.api_key_configured);
        assert_eq!(status.warning.as_deref(), Some(MISSING_KEY_WARNING));
        assert!(!status.has_room);
        assert!(!status.is_generating);
    }

    #[tokio::test]
    async fn generate_without_room_is_a_bad_request() {
        let err = generate_handler(State(app())).await.err().unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancel_without_session_conflicts() {
        let err = cancel_generation_handler(State(app())).await.unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_history_entry_is_not_found() {
        let err = select_history_handler(State(app()), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn products_come_from_the_catalog() {
        let Json(products) = list_products_handler(State(app())).await;
        assert_eq!(products.len(), 8);
        assert_eq!(products[0].id, "ikea-hektar");
    }
}
