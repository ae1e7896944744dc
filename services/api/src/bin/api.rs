//! services/api/src/bin/api.rs

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use lumiere_api::{
    adapters::GeminiLightingAdapter,
    catalog::Catalog,
    config::Config,
    error::ApiError,
    web::{canvas, cover_flow, rest, rest::ApiDoc, state::AppState, ws_handler},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Product Catalog ---
    let catalog = Arc::new(Catalog::load(config.catalog_path.as_deref())?);

    // --- 3. Initialize the Lighting Adapter ---
    if !config.has_api_key() {
        warn!("GEMINI_API_KEY is not set; every lighting request will fail until it is.");
    }
    let http_client = reqwest::Client::builder()
        .timeout(config.generation_timeout)
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
    let generator = Arc::new(GeminiLightingAdapter::new(
        http_client,
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), generator, catalog));

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let studio_routes = Router::new()
        .route("/status", get(rest::status_handler))
        .route("/products", get(rest::list_products_handler))
        .route(
            "/room",
            get(rest::get_room_handler).post(rest::upload_room_handler),
        )
        .route("/generate", post(rest::generate_handler))
        .route("/generate/cancel", post(rest::cancel_generation_handler))
        .route("/results", get(rest::results_handler))
        .route("/history", get(rest::list_history_handler))
        .route("/history/{id}/select", post(rest::select_history_handler));

    let cover_flow_routes = Router::new()
        .route("/cover-flow/wheel", post(cover_flow::wheel_handler))
        .route("/cover-flow/swipe", post(cover_flow::swipe_handler))
        .route("/cover-flow/move", post(cover_flow::move_handler))
        .route("/cover-flow/jump", post(cover_flow::jump_handler));

    let canvas_routes = Router::new()
        .route("/placements", get(canvas::list_placements_handler))
        .route("/placements/drop", post(canvas::drop_product_handler))
        .route("/placements/drag", post(canvas::drag_placement_handler))
        .route("/placements/release", post(canvas::release_placement_handler))
        .route("/placements/{id}/grab", post(canvas::grab_placement_handler))
        .route("/placements/{id}", delete(canvas::remove_placement_handler));

    let api_router = Router::new()
        .merge(studio_routes)
        .merge(cover_flow_routes)
        .merge(canvas_routes)
        .route("/ws", get(ws_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
