use crate::error::AppError;
use crate::services::transcoder::{DEFAULT_QUALITY, quality_to_qscale};
use crate::services::upload::StagedUpload;
use axum::{
    Json,
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct ConvertResponse {
    pub success: bool,
    /// Public URL path of the generated file under /output
    pub file: String,
}

#[utoipa::path(
    post,
    path = "/video-to-mp3",
    responses(
        (status = 200, description = "Audio track extracted", body = ConvertResponse),
        (status = 400, description = "No video uploaded"),
        (status = 500, description = "Conversion failed")
    ),
    tag = "convert"
)]
pub async fn video_to_mp3(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, AppError> {
    let mut upload: Option<StagedUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "video" {
            upload = Some(StagedUpload::from_field(field, &state.config.upload_dir).await?);
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No video uploaded".to_string()))?;

    let output_name = format!("{}.mp3", Utc::now().timestamp_millis());
    let output_path = state.config.output_dir.join(&output_name);

    state
        .transcoder
        .extract_mp3(upload.path(), &output_path)
        .await?;

    tracing::info!(
        "Extracted audio from {} to {}",
        upload.original_name(),
        output_name
    );

    Ok(Json(ConvertResponse {
        success: true,
        file: format!("/output/{}", output_name),
    }))
}

#[utoipa::path(
    post,
    path = "/compress-image",
    responses(
        (status = 200, description = "Recompressed JPEG attachment"),
        (status = 400, description = "No image uploaded"),
        (status = 500, description = "Conversion failed")
    ),
    tag = "convert"
)]
pub async fn compress_image(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<StagedUpload> = None;
    let mut quality = DEFAULT_QUALITY;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            upload = Some(StagedUpload::from_field(field, &state.config.upload_dir).await?);
        } else if name == "quality" {
            let text = field.text().await.unwrap_or_default();
            quality = text.trim().parse().unwrap_or(DEFAULT_QUALITY);
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No image uploaded".to_string()))?;

    let output_name = format!("compress-{}.jpg", Utc::now().timestamp_millis());
    let output_path = state.config.output_dir.join(&output_name);

    state
        .transcoder
        .compress_jpeg(upload.path(), &output_path, quality_to_qscale(quality))
        .await?;

    tracing::info!(
        "Compressed {} to {} (quality={})",
        upload.original_name(),
        output_name,
        quality
    );

    let file = tokio::fs::File::open(&output_path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, mime::IMAGE_JPEG.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", output_name),
        ),
    ];

    Ok((headers, body).into_response())
}

#[utoipa::path(
    post,
    path = "/remove-bg",
    responses(
        (status = 200, description = "Image with background removed"),
        (status = 400, description = "No image uploaded"),
        (status = 500, description = "Background removal failed")
    ),
    tag = "convert"
)]
pub async fn remove_background(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<StagedUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            upload = Some(StagedUpload::from_field(field, &state.config.upload_dir).await?);
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No image uploaded".to_string()))?;

    let cutout = state.remover.remove_background(upload.path()).await?;

    // Unique per-request name; a shared fixed path would let concurrent
    // requests overwrite each other's result.
    let output_name = format!("no-bg-{}.png", Uuid::new_v4());
    let output_path = state.config.output_dir.join(&output_name);
    tokio::fs::write(&output_path, &cutout).await?;

    tracing::info!(
        "Removed background from {} ({} bytes) to {}",
        upload.original_name(),
        cutout.len(),
        output_name
    );

    let file = tokio::fs::File::open(&output_path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [(header::CONTENT_TYPE, mime::IMAGE_PNG.to_string())];

    Ok((headers, body).into_response())
}
