use crate::config::AppConfig;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tokio::time::sleep;

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Staged uploads are deleted by their request guard; anything still here
/// after an hour was orphaned by an unclean process exit.
const STALE_UPLOAD_AGE: Duration = Duration::from_secs(3600);

/// Periodic filesystem janitor for the staging and output directories.
pub struct CleanupWorker {
    config: AppConfig,
    shutdown: watch::Receiver<bool>,
}

impl CleanupWorker {
    pub fn new(config: AppConfig, shutdown: watch::Receiver<bool>) -> Self {
        Self { config, shutdown }
    }

    pub async fn run(mut self) {
        tracing::info!("Cleanup worker started");

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("Cleanup worker shutting down");
                    break;
                }
                _ = sleep(SWEEP_INTERVAL) => {
                    self.perform_cleanup().await;
                }
            }
        }
    }

    async fn perform_cleanup(&self) {
        if let Err(e) = sweep_dir(&self.config.upload_dir, STALE_UPLOAD_AGE).await {
            tracing::warn!("Upload sweep failed: {}", e);
        }

        if let Some(hours) = self.config.output_retention_hours {
            let max_age = Duration::from_secs(hours as u64 * 3600);
            if let Err(e) = sweep_dir(&self.config.output_dir, max_age).await {
                tracing::warn!("Output sweep failed: {}", e);
            }
        }
    }
}

/// Removes regular files in `dir` not modified within `max_age`.
/// Returns the number of files removed.
pub async fn sweep_dir(dir: &Path, max_age: Duration) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(max_age)
        .unwrap_or(UNIX_EPOCH);

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };

        if modified < cutoff {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::info!("Swept stale file {}", entry.path().display());
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to sweep {}: {}", entry.path().display(), e);
                }
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_removes_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.mp3");
        tokio::fs::write(&path, b"data").await.unwrap();

        // Everything written before "now" counts as stale at age zero
        tokio::time::sleep(Duration::from_millis(50)).await;
        let removed = sweep_dir(dir.path(), Duration::ZERO).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_sweep_retains_recent_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.mp3");
        tokio::fs::write(&path, b"data").await.unwrap();

        let removed = sweep_dir(dir.path(), Duration::from_secs(3600)).await.unwrap();

        assert_eq!(removed, 0);
        assert!(path.exists());
    }
}
