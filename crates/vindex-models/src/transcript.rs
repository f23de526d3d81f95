//! Transcript segment models and the serialized transcript artifact.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::VideoId;

/// One timestamped span of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Owning video
    pub video_id: VideoId,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds (>= start)
    pub end: f64,
    /// Segment text
    pub text: String,
    /// Recognizer confidence, if reported
    pub confidence: Option<f64>,
}

impl TranscriptSegment {
    /// Whether the segment's time span is well-formed.
    pub fn is_valid(&self) -> bool {
        self.start >= 0.0 && self.end >= self.start
    }
}

/// Serialized transcript artifact, one JSON document per video under
/// `transcripts/`. Holds the full ordered segment list plus global
/// recognition metadata so other tools can inspect it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptDocument {
    /// Owning video
    pub video_id: VideoId,
    /// Detected (or hinted) language code
    pub language: Option<String>,
    /// Speech-to-text model used
    pub model: String,
    /// Ordered segments
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptDocument {
    /// Concatenated transcript text.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
