//! Speech-to-text capability.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// One raw timestamped segment from the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub confidence: Option<f64>,
}

/// Full recognizer output for one audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTranscript {
    /// Detected language code, if reported
    pub language: Option<String>,
    /// Ordered segments
    pub segments: Vec<RawSegment>,
}

/// Speech-to-text capability.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio file, optionally hinting the language
    /// (`None` = auto-detect).
    async fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        timeout: Duration,
    ) -> MediaResult<RawTranscript>;

    /// Model name for the transcript artifact metadata.
    fn model_name(&self) -> String;
}

/// Whisper CLI transcriber.
///
/// Shells out to the `whisper` command line tool with JSON output and
/// parses the resulting document. The binary name and model size are
/// configurable so whisper.cpp wrappers with the same output contract
/// can be swapped in.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    binary: String,
    model: String,
}

impl WhisperCli {
    pub fn new(binary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
        }
    }
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self::new("whisper", "base")
    }
}

/// Whisper JSON output document.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
    avg_logprob: Option<f64>,
}

#[async_trait]
impl SpeechToText for WhisperCli {
    async fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        timeout: Duration,
    ) -> MediaResult<RawTranscript> {
        if !audio.exists() {
            return Err(MediaError::FileNotFound(audio.to_path_buf()));
        }

        which::which(&self.binary)
            .map_err(|_| MediaError::WhisperNotFound(self.binary.clone()))?;

        let output_dir = tempfile::tempdir()?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg(audio)
            .args(["--model", &self.model])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(output_dir.path())
            .args(["--verbose", "False"]);
        if let Some(lang) = language {
            cmd.args(["--language", lang]);
        }

        info!(
            audio = %audio.display(),
            model = %self.model,
            language = language.unwrap_or("auto"),
            "Running whisper transcription"
        );

        let run = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(timeout, run)
            .await
            .map_err(|_| MediaError::Timeout(timeout.as_secs()))??;

        if !output.status.success() {
            return Err(MediaError::transcriber_failed(
                format!("{} exited with non-zero status", self.binary),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        // Whisper writes `<audio stem>.json` into the output dir.
        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let json_path = output_dir.path().join(format!("{}.json", stem));
        let content = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            MediaError::transcriber_failed(
                format!("Missing whisper output {}: {}", json_path.display(), e),
                None,
            )
        })?;

        let parsed: WhisperOutput = serde_json::from_str(&content)?;
        debug!(segments = parsed.segments.len(), "Parsed whisper output");

        Ok(RawTranscript {
            language: parsed.language,
            segments: parsed
                .segments
                .into_iter()
                .map(|s| RawSegment {
                    start: s.start,
                    end: s.end,
                    text: s.text.trim().to_string(),
                    confidence: s.avg_logprob,
                })
                .collect(),
        })
    }

    fn model_name(&self) -> String {
        format!("whisper-{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whisper_output_parsing() {
        let json = r#"{
            "text": " the project deadline is Friday",
            "language": "en",
            "segments": [
                {"id": 0, "start": 10.0, "end": 14.2,
                 "text": " the project deadline is Friday",
                 "avg_logprob": -0.21}
            ]
        }"#;
        let parsed: WhisperOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.language.as_deref(), Some("en"));
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.segments[0].start, 10.0);
        assert_eq!(parsed.segments[0].avg_logprob, Some(-0.21));
    }

    #[test]
    fn test_whisper_output_without_segments() {
        let parsed: WhisperOutput = serde_json::from_str(r#"{"language": null}"#).unwrap();
        assert!(parsed.segments.is_empty());
    }

    #[test]
    fn test_model_name() {
        assert_eq!(WhisperCli::default().model_name(), "whisper-base");
    }

    #[tokio::test]
    async fn test_transcribe_missing_file() {
        let err = WhisperCli::default()
            .transcribe(Path::new("/nonexistent/audio.wav"), None, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
