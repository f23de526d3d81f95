//! Audio track extraction for speech-to-text input.

use std::path::{Path, PathBuf};
use std::time::Duration;
use async_trait::async_trait;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Extracted audio ready for the speech-to-text capability.
///
/// Holds the backing temp directory so the WAV file lives as long as the
/// handle does.
#[derive(Debug)]
pub struct ExtractedAudio {
    path: PathBuf,
    _tempdir: Option<tempfile::TempDir>,
}

impl ExtractedAudio {
    /// Wrap a WAV file backed by a temp directory.
    pub fn new(path: PathBuf, tempdir: tempfile::TempDir) -> Self {
        Self {
            path,
            _tempdir: Some(tempdir),
        }
    }

    /// Wrap an existing WAV file the caller owns.
    pub fn external(path: PathBuf) -> Self {
        Self {
            path,
            _tempdir: None,
        }
    }

    /// Path to the extracted WAV file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Audio extraction capability.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract(&self, video: &Path, timeout: Duration) -> MediaResult<ExtractedAudio>;
}

/// FFmpeg-backed audio extractor producing 16 kHz mono PCM WAV, the
/// input format Whisper expects.
#[derive(Debug, Default)]
pub struct FfmpegAudioExtractor;

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract(&self, video: &Path, timeout: Duration) -> MediaResult<ExtractedAudio> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }

        let tempdir = tempfile::tempdir()?;
        let audio_path = tempdir.path().join("audio.wav");

        let cmd = FfmpegCommand::new(video, &audio_path)
            .no_video()
            .audio_codec("pcm_s16le")
            .output_args(["-ar", "16000", "-ac", "1"]);

        FfmpegRunner::new().with_timeout(timeout).run(&cmd).await?;

        debug!(video = %video.display(), audio = %audio_path.display(), "Extracted audio track");

        Ok(ExtractedAudio::new(audio_path, tempdir))
    }
}
