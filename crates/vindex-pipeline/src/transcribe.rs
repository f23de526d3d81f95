//! Video transcription.

use std::path::Path;

use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::Pipeline;
use vindex_models::{TranscriptDocument, TranscriptSegment, VideoId};

impl Pipeline {
    /// Transcribe a video's audio track.
    ///
    /// Extracts the audio, runs the speech-to-text capability, then on
    /// success only: writes the transcript artifact atomically and
    /// replaces the segment set in one transaction. A capability failure
    /// leaves any previously persisted transcript untouched.
    pub async fn transcribe(
        &self,
        id: &VideoId,
        language: Option<&str>,
    ) -> PipelineResult<Vec<TranscriptSegment>> {
        let record = self.index().video(id).await?;
        let timeout = self.config().transcribe_timeout;

        let audio = self
            .capabilities()
            .audio
            .extract(Path::new(&record.stored_path), timeout)
            .await
            .map_err(PipelineError::from_transcription_media)?;

        let raw = self
            .capabilities()
            .speech_to_text
            .transcribe(audio.path(), language, timeout)
            .await
            .map_err(PipelineError::from_transcription_media)?;

        let mut segments: Vec<TranscriptSegment> = raw
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                video_id: id.clone(),
                start: s.start,
                end: s.end,
                text: s.text,
                confidence: s.confidence,
            })
            .filter(TranscriptSegment::is_valid)
            .collect();
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        // Commit on success: everything below runs only after the
        // capability came back clean, under the video's write lock.
        let _guard = self.locks().acquire(id).await;

        let current = self.index().video(id).await?;
        let document = TranscriptDocument {
            video_id: id.clone(),
            language: raw.language,
            model: self.capabilities().speech_to_text.model_name(),
            segments: segments.clone(),
        };
        self.layout()
            .write_artifact(&self.layout().transcript_path(id), &document)
            .await?;

        self.index()
            .replace_segments(id, &segments, current.status.with_transcript())
            .await?;

        info!(
            video_id = %id,
            segments = segments.len(),
            language = document.language.as_deref().unwrap_or("unknown"),
            "Video transcribed"
        );

        Ok(segments)
    }
}
