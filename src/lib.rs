pub mod config;
pub mod error;
pub mod handlers;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::remove_bg::BackgroundRemover;
use crate::services::transcoder::Transcoder;
use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::convert::video_to_mp3,
        handlers::convert::compress_image,
        handlers::convert::remove_background,
    ),
    components(
        schemas(
            handlers::convert::ConvertResponse,
        )
    ),
    tags(
        (name = "convert", description = "File conversion endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub transcoder: Arc<dyn Transcoder>,
    pub remover: Arc<dyn BackgroundRemover>,
}

pub fn create_app(state: AppState) -> Router {
    let public_dir = state.config.public_dir.clone();
    let output_dir = state.config.output_dir.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/video-to-mp3",
            post(handlers::convert::video_to_mp3)
                .get_service(ServeFile::new(public_dir.join("video-to-mp3.html"))),
        )
        .route("/compress-image", post(handlers::convert::compress_image))
        .route(
            "/remove-bg",
            post(handlers::convert::remove_background)
                .get_service(ServeFile::new(public_dir.join("remove-bg.html"))),
        )
        .route_service("/", ServeFile::new(public_dir.join("index.html")))
        .route_service(
            "/image-compress",
            ServeFile::new(public_dir.join("image-compress.html")),
        )
        .nest_service("/output", ServeDir::new(output_dir))
        .with_state(state)
}
