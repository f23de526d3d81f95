//! Pipeline error taxonomy.
//!
//! Each component validates its own preconditions and fails fast with a
//! specific kind; raw capability errors never cross the facade boundary.

use thiserror::Error;

use vindex_media::MediaError;
use vindex_store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video already indexed: {0}")]
    DuplicateVideoId(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Unsupported media format: {0}")]
    UnsupportedMediaFormat(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Scene detection failed: {0}")]
    SceneDetectionFailed(String),

    #[error("{capability} timed out after {secs} seconds")]
    CapabilityTimeout { capability: String, secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Short machine-readable kind tag for envelopes and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::DuplicateVideoId(_) => "duplicate_video_id",
            PipelineError::VideoNotFound(_) => "video_not_found",
            PipelineError::UnsupportedMediaFormat(_) => "unsupported_media_format",
            PipelineError::StorageUnavailable(_) => "storage_unavailable",
            PipelineError::TranscriptionFailed(_) => "transcription_failed",
            PipelineError::SceneDetectionFailed(_) => "scene_detection_failed",
            PipelineError::CapabilityTimeout { .. } => "capability_timeout",
            PipelineError::Internal(_) => "internal",
        }
    }

    /// Classify a media error from the probe/normalize path.
    pub fn from_ingest_media(err: MediaError) -> Self {
        match err {
            MediaError::Timeout(secs) => PipelineError::CapabilityTimeout {
                capability: "media_probe".to_string(),
                secs,
            },
            other => PipelineError::UnsupportedMediaFormat(other.to_string()),
        }
    }

    /// Classify a media error from the transcription path.
    pub fn from_transcription_media(err: MediaError) -> Self {
        match err {
            MediaError::Timeout(secs) => PipelineError::CapabilityTimeout {
                capability: "speech_to_text".to_string(),
                secs,
            },
            other => PipelineError::TranscriptionFailed(other.to_string()),
        }
    }

    /// Classify a media error from the scene detection path.
    pub fn from_scene_media(err: MediaError) -> Self {
        match err {
            MediaError::Timeout(secs) => PipelineError::CapabilityTimeout {
                capability: "scene_detector".to_string(),
                secs,
            },
            other => PipelineError::SceneDetectionFailed(other.to_string()),
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VideoNotFound(id) => PipelineError::VideoNotFound(id),
            StoreError::DuplicateVideo(id) => PipelineError::DuplicateVideoId(id),
            StoreError::Unavailable(msg) => PipelineError::StorageUnavailable(msg),
            other => PipelineError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_classify() {
        let err: PipelineError = StoreError::VideoNotFound("v1".to_string()).into();
        assert!(matches!(err, PipelineError::VideoNotFound(_)));

        let err: PipelineError = StoreError::DuplicateVideo("v1".to_string()).into();
        assert!(matches!(err, PipelineError::DuplicateVideoId(_)));

        let err: PipelineError = StoreError::Unavailable("disk".to_string()).into();
        assert!(matches!(err, PipelineError::StorageUnavailable(_)));
    }

    #[test]
    fn test_timeouts_map_to_capability_timeout() {
        let err = PipelineError::from_transcription_media(MediaError::Timeout(120));
        match err {
            PipelineError::CapabilityTimeout { capability, secs } => {
                assert_eq!(capability, "speech_to_text");
                assert_eq!(secs, 120);
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            PipelineError::VideoNotFound("x".into()).kind(),
            "video_not_found"
        );
        assert_eq!(
            PipelineError::SceneDetectionFailed("x".into()).kind(),
            "scene_detection_failed"
        );
    }
}
