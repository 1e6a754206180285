use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Default quality when the form field is absent or non-numeric
pub const DEFAULT_QUALITY: i64 = 60;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("failed to launch ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffmpeg exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}

/// Seam for the external media tool so handlers can be exercised without
/// an ffmpeg binary on the machine.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Strip the video stream and encode the audio track as 192 kbps MP3.
    async fn extract_mp3(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;

    /// Re-encode an image as JPEG at the given `-q:v` quality scale.
    async fn compress_jpeg(
        &self,
        input: &Path,
        output: &Path,
        qscale: i64,
    ) -> Result<(), TranscodeError>;
}

/// Maps the client quality parameter (0-100 nominal) to ffmpeg's `-q:v`
/// scale: `max(2, quality / 10)`. Only the low end is clamped; out-of-range
/// inputs are accepted as-is.
pub fn quality_to_qscale(quality: i64) -> i64 {
    (quality / 10).max(2)
}

pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: PathBuf) -> Self {
        Self { ffmpeg }
    }

    /// Runs one ffmpeg invocation to completion. `Command::output` resolves
    /// exactly once, so each request sees a single terminal outcome.
    async fn run(&self, args: Vec<std::ffi::OsString>, output: &Path) -> Result<(), TranscodeError> {
        let result = Command::new(&self.ffmpeg)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !result.status.success() {
            // Don't leave a partial output behind
            let _ = tokio::fs::remove_file(output).await;
            return Err(TranscodeError::Failed {
                code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract_mp3(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let args: Vec<std::ffi::OsString> = vec![
            "-y".into(),
            "-i".into(),
            input.into(),
            "-vn".into(),
            "-b:a".into(),
            "192k".into(),
            "-f".into(),
            "mp3".into(),
            output.into(),
        ];
        self.run(args, output).await
    }

    async fn compress_jpeg(
        &self,
        input: &Path,
        output: &Path,
        qscale: i64,
    ) -> Result<(), TranscodeError> {
        let args: Vec<std::ffi::OsString> = vec![
            "-y".into(),
            "-i".into(),
            input.into(),
            "-q:v".into(),
            qscale.to_string().into(),
            output.into(),
        ];
        self.run(args, output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qscale_default_quality() {
        assert_eq!(quality_to_qscale(DEFAULT_QUALITY), 6);
    }

    #[test]
    fn test_qscale_low_clamp() {
        assert_eq!(quality_to_qscale(5), 2);
        assert_eq!(quality_to_qscale(0), 2);
        assert_eq!(quality_to_qscale(-40), 2);
    }

    #[test]
    fn test_qscale_no_high_clamp() {
        assert_eq!(quality_to_qscale(100), 10);
        assert_eq!(quality_to_qscale(250), 25);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let transcoder = FfmpegTranscoder::new(PathBuf::from("/nonexistent/ffmpeg"));
        let result = transcoder
            .extract_mp3(Path::new("in.mp4"), Path::new("out.mp3"))
            .await;
        assert!(matches!(result, Err(TranscodeError::Spawn(_))));
    }
}
