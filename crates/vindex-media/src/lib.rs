//! CLI wrappers for the external media capabilities.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout enforcement
//! - Container probing via FFprobe
//! - Audio track extraction for speech-to-text input
//! - Whisper CLI transcription
//! - FFmpeg scene-score boundary detection
//! - Representative frame extraction
//!
//! Every capability sits behind a trait so the pipeline can be exercised
//! against stubs without the tools installed.

pub mod audio;
pub mod command;
pub mod error;
pub mod frames;
pub mod probe;
pub mod scene;
pub mod transcribe;

pub use audio::{AudioExtractor, ExtractedAudio, FfmpegAudioExtractor};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegOutput, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{FfmpegFrameExtractor, FfmpegNormalizer, FrameExtractor, VideoNormalizer};
pub use probe::{probe_video, FfprobeProbe, MediaProbe, VideoInfo};
pub use scene::{FfmpegSceneDetector, SceneBoundaryDetector};
pub use transcribe::{RawSegment, RawTranscript, SpeechToText, WhisperCli};
