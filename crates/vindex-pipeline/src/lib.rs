//! Local video indexing pipeline.
//!
//! This crate provides:
//! - Ingestion of source files into the managed layout
//! - Transcription via the speech-to-text capability
//! - Scene segmentation via the boundary-detection capability
//! - Case-insensitive transcript search
//!
//! Each operation runs to completion per invocation. Independent
//! pipeline calls may run concurrently; writes to the same video are
//! serialized by per-video locks, so multi-row replacement is always
//! all-or-nothing.

pub mod config;
pub mod error;
pub mod ingest;
pub mod scenes;
pub mod search;
pub mod transcribe;

use std::sync::Arc;

use vindex_media::{
    AudioExtractor, FfmpegAudioExtractor, FfmpegFrameExtractor, FfmpegNormalizer,
    FfmpegSceneDetector, FfprobeProbe, FrameExtractor, MediaProbe, SceneBoundaryDetector,
    SpeechToText, VideoNormalizer, WhisperCli,
};
use vindex_store::{StorageLayout, VideoIndex, WriteLocks};

pub use config::{PipelineConfig, DEFAULT_SCENE_THRESHOLD};
pub use error::{PipelineError, PipelineResult};
pub use scenes::SceneDetectionResult;

/// External capability handles the pipeline dispatches to.
#[derive(Clone)]
pub struct Capabilities {
    pub probe: Arc<dyn MediaProbe>,
    pub normalizer: Arc<dyn VideoNormalizer>,
    pub audio: Arc<dyn AudioExtractor>,
    pub speech_to_text: Arc<dyn SpeechToText>,
    pub scene_detector: Arc<dyn SceneBoundaryDetector>,
    pub frame_extractor: Arc<dyn FrameExtractor>,
}

impl Capabilities {
    /// The real FFmpeg/Whisper capability set.
    pub fn ffmpeg(config: &PipelineConfig) -> Self {
        Self {
            probe: Arc::new(FfprobeProbe),
            normalizer: Arc::new(FfmpegNormalizer),
            audio: Arc::new(FfmpegAudioExtractor),
            speech_to_text: Arc::new(WhisperCli::new(
                config.whisper_binary.clone(),
                config.whisper_model.clone(),
            )),
            scene_detector: Arc::new(FfmpegSceneDetector),
            frame_extractor: Arc::new(FfmpegFrameExtractor),
        }
    }
}

/// The local video indexing pipeline.
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    layout: StorageLayout,
    index: VideoIndex,
    locks: WriteLocks,
    capabilities: Capabilities,
}

impl Pipeline {
    /// Open the pipeline over the configured storage root with the real
    /// FFmpeg/Whisper capabilities.
    pub async fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let capabilities = Capabilities::ffmpeg(&config);
        Self::with_capabilities(config, capabilities).await
    }

    /// Open the pipeline with an explicit capability set (tests swap in
    /// stubs here).
    pub async fn with_capabilities(
        config: PipelineConfig,
        capabilities: Capabilities,
    ) -> PipelineResult<Self> {
        let layout = StorageLayout::create(&config.storage_root).await?;
        let index = VideoIndex::open(layout.db_path()).await?;

        Ok(Self {
            config,
            layout,
            index,
            locks: WriteLocks::new(),
            capabilities,
        })
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Managed storage layout.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub(crate) fn index(&self) -> &VideoIndex {
        &self.index
    }

    pub(crate) fn locks(&self) -> &WriteLocks {
        &self.locks
    }

    pub(crate) fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}
