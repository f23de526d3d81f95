//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default scene detection threshold on the 0-100 content scale.
/// Lower values are more sensitive and detect more scenes.
pub const DEFAULT_SCENE_THRESHOLD: f64 = 27.0;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the managed storage layout
    pub storage_root: PathBuf,
    /// Whisper binary name or path
    pub whisper_binary: String,
    /// Whisper model size (tiny/base/small/medium/large)
    pub whisper_model: String,
    /// Scene detection threshold used when the caller passes none
    pub default_scene_threshold: f64,
    /// Timeout for container probing
    pub probe_timeout: Duration,
    /// Timeout for ingest normalization
    pub normalize_timeout: Duration,
    /// Timeout for audio extraction and speech-to-text combined calls
    pub transcribe_timeout: Duration,
    /// Timeout for scene boundary detection
    pub scene_timeout: Duration,
    /// Timeout per representative frame extraction
    pub frame_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./local_video_storage"),
            whisper_binary: "whisper".to_string(),
            whisper_model: "base".to_string(),
            default_scene_threshold: DEFAULT_SCENE_THRESHOLD,
            probe_timeout: Duration::from_secs(30),
            normalize_timeout: Duration::from_secs(600),
            transcribe_timeout: Duration::from_secs(1800),
            scene_timeout: Duration::from_secs(600),
            frame_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_root: std::env::var("VINDEX_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            whisper_binary: std::env::var("VINDEX_WHISPER_BIN")
                .unwrap_or(defaults.whisper_binary),
            whisper_model: std::env::var("VINDEX_WHISPER_MODEL")
                .unwrap_or(defaults.whisper_model),
            default_scene_threshold: std::env::var("VINDEX_SCENE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_scene_threshold),
            probe_timeout: env_secs("VINDEX_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
            normalize_timeout: env_secs("VINDEX_NORMALIZE_TIMEOUT_SECS", defaults.normalize_timeout),
            transcribe_timeout: env_secs(
                "VINDEX_TRANSCRIBE_TIMEOUT_SECS",
                defaults.transcribe_timeout,
            ),
            scene_timeout: env_secs("VINDEX_SCENE_TIMEOUT_SECS", defaults.scene_timeout),
            frame_timeout: env_secs("VINDEX_FRAME_TIMEOUT_SECS", defaults.frame_timeout),
        }
    }
}

fn env_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
