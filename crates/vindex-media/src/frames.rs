//! Representative frame extraction and ingest normalization.

use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Frame extraction capability.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract one frame at `timestamp` seconds into `output` (JPEG).
    async fn extract_frame(
        &self,
        video: &Path,
        timestamp: f64,
        output: &Path,
        timeout: Duration,
    ) -> MediaResult<()>;
}

/// FFmpeg-backed frame extractor.
#[derive(Debug, Default)]
pub struct FfmpegFrameExtractor;

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(
        &self,
        video: &Path,
        timestamp: f64,
        output: &Path,
        timeout: Duration,
    ) -> MediaResult<()> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }

        let cmd = FfmpegCommand::new(video, output)
            .seek(timestamp.max(0.0))
            .single_frame();

        FfmpegRunner::new().with_timeout(timeout).run(&cmd).await?;
        debug!(frame = %output.display(), timestamp, "Extracted frame");
        Ok(())
    }
}

/// Video normalization capability: transcode a source file into the
/// managed layout's container format.
#[async_trait]
pub trait VideoNormalizer: Send + Sync {
    async fn normalize(&self, src: &Path, dst: &Path, timeout: Duration) -> MediaResult<()>;
}

/// FFmpeg-backed normalizer producing H.264/AAC MP4.
#[derive(Debug, Default)]
pub struct FfmpegNormalizer;

#[async_trait]
impl VideoNormalizer for FfmpegNormalizer {
    async fn normalize(&self, src: &Path, dst: &Path, timeout: Duration) -> MediaResult<()> {
        if !src.exists() {
            return Err(MediaError::FileNotFound(src.to_path_buf()));
        }

        let cmd = FfmpegCommand::new(src, dst)
            .video_codec("libx264")
            .audio_codec("aac");

        FfmpegRunner::new().with_timeout(timeout).run(&cmd).await?;
        Ok(())
    }
}
