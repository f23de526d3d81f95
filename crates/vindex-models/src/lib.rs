//! Shared data models for the local video index.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and processing status
//! - Transcript segments and the serialized transcript artifact
//! - Scene records and boundary-to-scene derivation
//! - Search results and time-range filtering

pub mod scene;
pub mod search;
pub mod transcript;
pub mod video;

// Re-export common types
pub use scene::{scenes_from_boundaries, SceneManifest, SceneRecord, BOUNDARY_EPSILON_SECS};
pub use search::{filter_results, SearchResult, TimeRange};
pub use transcript::{TranscriptDocument, TranscriptSegment};
pub use video::{VideoId, VideoRecord, VideoStatus};
