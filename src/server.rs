//! Axum HTTP surface for the compression handler

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::handler::{HandlerError, ImageHandler};
use crate::image::ImageService;
use crate::models::HealthResponse;
use crate::Result;

pub const UPLOAD_ROUTE: &str = "/upload-image";
pub const NETLIFY_UPLOAD_ROUTE: &str = "/.netlify/functions/upload-image";

/// Application state shared across handlers
pub struct AppState {
    pub handler: ImageHandler,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, image: Arc<dyn ImageService>) -> Self {
        Self {
            handler: ImageHandler::new(image),
            config,
        }
    }
}

/// Create the REST API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        // Every method reaches the handler so non-POST gets the JSON 405 body
        .route(UPLOAD_ROUTE, any(upload_image_handler))
        .route(NETLIFY_UPLOAD_ROUTE, any(upload_image_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run(config: Config, image: Arc<dyn ImageService>) -> Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}{}", listener.local_addr()?, UPLOAD_ROUTE);

    serve(listener, Arc::new(AppState::new(config, image))).await
}

pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn upload_image_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    let span = info_span!("upload_image", request_id = %Uuid::new_v4(), %method);

    match state.handler.handle(&method, &body).instrument(span).await {
        Ok(response) => cors_json(StatusCode::OK, response),
        Err(e) => e.into_response(),
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// JSON response carrying the CORS headers browsers need to read it.
fn cors_json<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
        Json(body),
    )
        .into_response()
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        cors_json(self.status(), self.body())
    }
}
