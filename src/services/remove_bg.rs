use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum RemoveBgError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("remove.bg request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remove.bg returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

/// Seam for the remote background-removal service.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Sends the image to the remote service and returns the processed PNG bytes.
    async fn remove_background(&self, image: &Path) -> Result<Bytes, RemoveBgError>;
}

/// Client for the remove.bg HTTP API.
pub struct RemoveBgClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RemoveBgClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.removebg_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.removebg_endpoint.clone(),
            api_key: config.removebg_api_key.clone(),
        })
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    async fn remove_background(&self, image: &Path) -> Result<Bytes, RemoveBgError> {
        let data = tokio::fs::read(image).await?;

        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let form = reqwest::multipart::Form::new()
            .part(
                "image_file",
                reqwest::multipart::Part::bytes(data).file_name(file_name),
            )
            .text("size", "auto");

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoveBgError::Api { status, body });
        }

        Ok(response.bytes().await?)
    }
}
