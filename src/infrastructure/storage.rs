use crate::config::AppConfig;
use anyhow::{Context, Result};
use tracing::info;

/// Creates the staging and output directories before the server starts
/// accepting requests. Failure here is fatal to startup.
pub async fn setup_storage(config: &AppConfig) -> Result<()> {
    for dir in [&config.upload_dir, &config.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    info!(
        "Storage ready: uploads={}, outputs={}",
        config.upload_dir.display(),
        config.output_dir.display()
    );

    Ok(())
}
