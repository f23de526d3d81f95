//! Video metadata models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an indexed video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video processing status.
///
/// Transcription and scene detection run independently; whichever
/// finishes second moves the record to `Indexed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Video file is normalized into the layout and probed
    #[default]
    Ingested,
    /// Transcript segments are persisted
    Transcribed,
    /// Scene records are persisted
    SceneDetected,
    /// Both transcript and scenes are persisted
    Indexed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Ingested => "ingested",
            VideoStatus::Transcribed => "transcribed",
            VideoStatus::SceneDetected => "scene_detected",
            VideoStatus::Indexed => "indexed",
        }
    }

    /// Parse from the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ingested" => Some(VideoStatus::Ingested),
            "transcribed" => Some(VideoStatus::Transcribed),
            "scene_detected" => Some(VideoStatus::SceneDetected),
            "indexed" => Some(VideoStatus::Indexed),
            _ => None,
        }
    }

    /// Status after a successful transcription run.
    pub fn with_transcript(self) -> Self {
        match self {
            VideoStatus::Ingested | VideoStatus::Transcribed => VideoStatus::Transcribed,
            VideoStatus::SceneDetected | VideoStatus::Indexed => VideoStatus::Indexed,
        }
    }

    /// Status after a successful scene detection run.
    pub fn with_scenes(self) -> Self {
        match self {
            VideoStatus::Ingested | VideoStatus::SceneDetected => VideoStatus::SceneDetected,
            VideoStatus::Transcribed | VideoStatus::Indexed => VideoStatus::Indexed,
        }
    }

    /// Whether a transcript set has been persisted for this video.
    pub fn has_transcript(&self) -> bool {
        matches!(self, VideoStatus::Transcribed | VideoStatus::Indexed)
    }

    /// Whether a scene set has been persisted for this video.
    pub fn has_scenes(&self) -> bool {
        matches!(self, VideoStatus::SceneDetected | VideoStatus::Indexed)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An indexed video and its probed metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Video identifier
    pub id: VideoId,
    /// Original source file path
    pub source_path: String,
    /// Normalized path under the managed layout
    pub stored_path: String,
    /// Duration in seconds
    pub duration: f64,
    /// Frame rate (fps)
    pub fps: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Processing status
    pub status: VideoStatus,
    /// When the video was ingested
    pub created_at: DateTime<Utc>,
}
