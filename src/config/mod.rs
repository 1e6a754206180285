use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the conversion service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening port (default: 3000)
    pub port: u16,

    /// Directory for staged uploads (default: "uploads")
    pub upload_dir: PathBuf,

    /// Directory for generated outputs, served under /output (default: "public/output")
    pub output_dir: PathBuf,

    /// Directory holding the static HTML pages (default: "public")
    pub public_dir: PathBuf,

    /// Path to the ffmpeg binary (default: "ffmpeg", resolved via PATH)
    pub ffmpeg_path: PathBuf,

    /// Maximum request body size in bytes (default: 512 MB)
    pub max_upload_size: usize,

    /// API key for the remove.bg service (required, no default)
    pub removebg_api_key: String,

    /// Endpoint URL for the remove.bg service
    pub removebg_endpoint: String,

    /// Request timeout for the remove.bg call in seconds (default: 30)
    pub removebg_timeout_secs: u64,

    /// Delete generated outputs older than this many hours; unset keeps them forever
    pub output_retention_hours: Option<i64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("public/output"),
            public_dir: PathBuf::from("public"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            max_upload_size: 512 * 1024 * 1024, // 512 MB
            removebg_api_key: String::new(),
            removebg_endpoint: "https://api.remove.bg/v1.0/removebg".to_string(),
            removebg_timeout_secs: 30,
            output_retention_hours: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let default = Self::default();

        let config = Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.output_dir),

            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.public_dir),

            ffmpeg_path: env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.ffmpeg_path),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            removebg_api_key: env::var("REMOVEBG_API_KEY")
                .context("REMOVEBG_API_KEY must be set")?,

            removebg_endpoint: env::var("REMOVEBG_ENDPOINT").unwrap_or(default.removebg_endpoint),

            removebg_timeout_secs: env::var("REMOVEBG_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.removebg_timeout_secs),

            output_retention_hours: env::var("OUTPUT_RETENTION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Sanity checks over loaded values; failure here aborts startup
    pub fn validate(&self) -> Result<()> {
        if self.removebg_api_key.trim().is_empty() {
            bail!("remove.bg API key is empty");
        }
        reqwest::Url::parse(&self.removebg_endpoint)
            .with_context(|| format!("invalid remove.bg endpoint: {}", self.removebg_endpoint))?;
        if self.max_upload_size == 0 {
            bail!("MAX_UPLOAD_SIZE must be greater than zero");
        }
        if let Some(hours) = self.output_retention_hours {
            if hours <= 0 {
                bail!("OUTPUT_RETENTION_HOURS must be positive when set");
            }
        }
        Ok(())
    }

    /// Create config for tests and local development
    pub fn development() -> Self {
        Self {
            removebg_api_key: "test-api-key".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.output_dir, PathBuf::from("public/output"));
        assert_eq!(config.max_upload_size, 512 * 1024 * 1024);
        assert_eq!(config.removebg_timeout_secs, 30);
        assert!(config.output_retention_hours.is_none());
    }

    #[test]
    fn test_development_config_is_valid() {
        let config = AppConfig::development();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_api_key() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = AppConfig {
            removebg_endpoint: "not a url".to_string(),
            ..AppConfig::development()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nonpositive_retention() {
        let config = AppConfig {
            output_retention_hours: Some(0),
            ..AppConfig::development()
        };
        assert!(config.validate().is_err());
    }
}
