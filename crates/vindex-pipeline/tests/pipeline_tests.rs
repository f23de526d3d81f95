//! End-to-end pipeline tests over stub capabilities.
//!
//! The stubs stand in for FFmpeg and Whisper so these tests run without
//! the tools installed; the storage layout and index are real.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vindex_media::{
    AudioExtractor, ExtractedAudio, FrameExtractor, MediaError, MediaProbe, MediaResult,
    RawSegment, RawTranscript, SceneBoundaryDetector, SpeechToText, VideoInfo, VideoNormalizer,
};
use vindex_models::{TimeRange, VideoId, VideoStatus, BOUNDARY_EPSILON_SECS};
use vindex_pipeline::{Capabilities, Pipeline, PipelineConfig, PipelineError};

const DURATION: f64 = 120.0;

struct StubProbe;

#[async_trait]
impl MediaProbe for StubProbe {
    async fn probe(&self, path: &Path, _timeout: Duration) -> MediaResult<VideoInfo> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        Ok(VideoInfo {
            duration: DURATION,
            width: 1920,
            height: 1080,
            fps: 25.0,
            codec: "h264".to_string(),
            size: 1024,
        })
    }
}

/// Normalizer stub with a switchable failure mode.
struct StubNormalizer {
    fail: AtomicBool,
}

impl StubNormalizer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl VideoNormalizer for StubNormalizer {
    async fn normalize(&self, src: &Path, dst: &Path, _timeout: Duration) -> MediaResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MediaError::ffmpeg_failed("transcode crashed", None, Some(1)));
        }
        tokio::fs::copy(src, dst).await?;
        Ok(())
    }
}

struct StubAudio;

#[async_trait]
impl AudioExtractor for StubAudio {
    async fn extract(&self, _video: &Path, _timeout: Duration) -> MediaResult<ExtractedAudio> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("audio.wav");
        tokio::fs::write(&path, b"RIFF").await?;
        Ok(ExtractedAudio::new(path, tempdir))
    }
}

/// Speech-to-text stub with a switchable script and failure mode.
struct StubStt {
    segments: Vec<(f64, f64, &'static str)>,
    fail: AtomicBool,
    time_out: AtomicBool,
}

impl StubStt {
    fn with_segments(segments: Vec<(f64, f64, &'static str)>) -> Arc<Self> {
        Arc::new(Self {
            segments,
            fail: AtomicBool::new(false),
            time_out: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl SpeechToText for StubStt {
    async fn transcribe(
        &self,
        _audio: &Path,
        language: Option<&str>,
        timeout: Duration,
    ) -> MediaResult<RawTranscript> {
        if self.time_out.load(Ordering::SeqCst) {
            return Err(MediaError::Timeout(timeout.as_secs()));
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(MediaError::transcriber_failed("recognizer crashed", None));
        }
        Ok(RawTranscript {
            language: Some(language.unwrap_or("en").to_string()),
            segments: self
                .segments
                .iter()
                .map(|(start, end, text)| RawSegment {
                    start: *start,
                    end: *end,
                    text: text.to_string(),
                    confidence: Some(-0.25),
                })
                .collect(),
        })
    }

    fn model_name(&self) -> String {
        "stub".to_string()
    }
}

/// Boundary detector stub: emits a cut every `threshold` seconds, so a
/// lower threshold produces more boundaries, mirroring the real inverse
/// sensitivity relation.
struct StubScenes;

#[async_trait]
impl SceneBoundaryDetector for StubScenes {
    async fn detect(
        &self,
        _video: &Path,
        threshold: f64,
        _timeout: Duration,
    ) -> MediaResult<Vec<f64>> {
        let step = threshold.max(1.0);
        let mut boundaries = Vec::new();
        let mut t = step;
        while t < DURATION {
            boundaries.push(t);
            t += step;
        }
        Ok(boundaries)
    }
}

struct StubFrames;

#[async_trait]
impl FrameExtractor for StubFrames {
    async fn extract_frame(
        &self,
        _video: &Path,
        _timestamp: f64,
        output: &Path,
        _timeout: Duration,
    ) -> MediaResult<()> {
        tokio::fs::write(output, b"\xff\xd8\xff").await?;
        Ok(())
    }
}

struct Harness {
    pipeline: Pipeline,
    stt: Arc<StubStt>,
    normalizer: Arc<StubNormalizer>,
    _root: tempfile::TempDir,
    source_dir: tempfile::TempDir,
}

impl Harness {
    async fn with_transcript(segments: Vec<(f64, f64, &'static str)>) -> Self {
        let root = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let stt = StubStt::with_segments(segments);
        let normalizer = StubNormalizer::new();

        let config = PipelineConfig {
            storage_root: root.path().to_path_buf(),
            ..PipelineConfig::default()
        };
        let capabilities = Capabilities {
            probe: Arc::new(StubProbe),
            normalizer: normalizer.clone(),
            audio: Arc::new(StubAudio),
            speech_to_text: stt.clone(),
            scene_detector: Arc::new(StubScenes),
            frame_extractor: Arc::new(StubFrames),
        };

        let pipeline = Pipeline::with_capabilities(config, capabilities)
            .await
            .unwrap();

        Self {
            pipeline,
            stt,
            normalizer,
            _root: root,
            source_dir,
        }
    }

    async fn new() -> Self {
        Self::with_transcript(vec![(10.0, 14.2, "the project deadline is Friday")]).await
    }

    async fn source_file(&self, name: &str) -> std::path::PathBuf {
        let path = self.source_dir.path().join(name);
        tokio::fs::write(&path, b"fake video bytes").await.unwrap();
        path
    }
}

#[tokio::test]
async fn ingest_creates_record_and_stored_file() {
    let h = Harness::new().await;
    let source = h.source_file("meeting.mov").await;

    let record = h
        .pipeline
        .ingest(&source, Some(VideoId::from("v1")), false)
        .await
        .unwrap();

    assert!(record.duration >= 0.0);
    assert_eq!(record.status, VideoStatus::Ingested);
    assert!(Path::new(&record.stored_path).exists());
    assert!(h.pipeline.layout().root().join("transcripts").is_dir());
}

#[tokio::test]
async fn ingest_rejects_duplicate_without_overwrite() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;

    h.pipeline
        .ingest(&source, Some(VideoId::from("v1")), false)
        .await
        .unwrap();
    let err = h
        .pipeline
        .ingest(&source, Some(VideoId::from("v1")), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateVideoId(_)));
}

#[tokio::test]
async fn ingest_overwrite_replaces_prior_artifacts() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");

    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();
    h.pipeline.transcribe(&id, None).await.unwrap();
    assert!(h.pipeline.layout().transcript_path(&id).exists());

    h.pipeline.ingest(&source, Some(id.clone()), true).await.unwrap();

    let record = h.pipeline.video_info(&id).await.unwrap();
    assert_eq!(record.status, VideoStatus::Ingested);
    assert!(!h.pipeline.layout().transcript_path(&id).exists());
    assert!(h
        .pipeline
        .search(&[id], "deadline", None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn failed_overwrite_ingest_keeps_prior_video() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();
    h.pipeline.transcribe(&id, None).await.unwrap();

    h.normalizer.fail.store(true, Ordering::SeqCst);
    let err = h
        .pipeline
        .ingest(&source, Some(id.clone()), true)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedMediaFormat(_)));

    // The prior record, stored file, transcript artifact, and segment
    // set all survive the failed re-ingest.
    let record = h.pipeline.video_info(&id).await.unwrap();
    assert_eq!(record.status, VideoStatus::Transcribed);
    assert!(Path::new(&record.stored_path).exists());
    assert!(h.pipeline.layout().transcript_path(&id).exists());
    let hits = h.pipeline.search(&[id], "deadline", None).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn ingest_missing_source_is_unsupported() {
    let h = Harness::new().await;
    let err = h
        .pipeline
        .ingest("/nonexistent/clip.mov", None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedMediaFormat(_)));
}

#[tokio::test]
async fn transcribe_unknown_video_fails() {
    let h = Harness::new().await;
    let err = h
        .pipeline
        .transcribe(&VideoId::from("ghost"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::VideoNotFound(_)));
}

#[tokio::test]
async fn transcribe_persists_segments_and_artifact() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    let segments = h.pipeline.transcribe(&id, Some("en")).await.unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "the project deadline is Friday");

    let record = h.pipeline.video_info(&id).await.unwrap();
    assert_eq!(record.status, VideoStatus::Transcribed);

    let artifact = tokio::fs::read_to_string(h.pipeline.layout().transcript_path(&id))
        .await
        .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&artifact).unwrap();
    assert_eq!(doc["language"], "en");
    assert_eq!(doc["segments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn transcription_failure_keeps_prior_transcript() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();
    h.pipeline.transcribe(&id, None).await.unwrap();

    h.stt.fail.store(true, Ordering::SeqCst);
    let err = h.pipeline.transcribe(&id, None).await.unwrap_err();
    assert!(matches!(err, PipelineError::TranscriptionFailed(_)));

    // The first run's segments are still there.
    let hits = h.pipeline.search(&[id], "deadline", None).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn transcription_timeout_maps_to_capability_timeout() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    h.stt.time_out.store(true, Ordering::SeqCst);
    let err = h.pipeline.transcribe(&id, None).await.unwrap_err();
    assert!(matches!(err, PipelineError::CapabilityTimeout { .. }));
}

#[tokio::test]
async fn detect_scenes_spans_full_duration() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    let result = h.pipeline.detect_scenes(&id, Some(27.0)).await.unwrap();
    assert_eq!(result.total_scenes, result.scenes.len());
    assert!(result.total_scenes > 1);

    let scenes = &result.scenes;
    assert!(scenes[0].start.abs() < BOUNDARY_EPSILON_SECS);
    assert!((scenes.last().unwrap().end - DURATION).abs() < BOUNDARY_EPSILON_SECS);
    for pair in scenes.windows(2) {
        assert!((pair[0].end - pair[1].start).abs() < BOUNDARY_EPSILON_SECS);
    }
    // Every scene got its representative frame from the stub.
    assert!(scenes.iter().all(|s| s.frame_path.is_some()));

    let record = h.pipeline.video_info(&id).await.unwrap();
    assert_eq!(record.status, VideoStatus::SceneDetected);
}

#[tokio::test]
async fn lower_threshold_never_detects_fewer_scenes() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    let mut previous = usize::MAX;
    for threshold in [10.0, 20.0, 40.0, 80.0] {
        let result = h.pipeline.detect_scenes(&id, Some(threshold)).await.unwrap();
        assert!(
            result.total_scenes <= previous,
            "threshold {} produced {} scenes, more than a lower threshold",
            threshold,
            result.total_scenes
        );
        previous = result.total_scenes;
    }
}

#[tokio::test]
async fn rerun_replaces_scene_set() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    let first = h.pipeline.detect_scenes(&id, Some(10.0)).await.unwrap();
    let second = h.pipeline.detect_scenes(&id, Some(60.0)).await.unwrap();
    assert_ne!(first.total_scenes, second.total_scenes);

    // Re-reading through a fresh detection run's manifest shows only the
    // second run's scenes.
    let manifest = tokio::fs::read_to_string(h.pipeline.layout().scene_manifest_path(&id))
        .await
        .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(
        doc["scenes"].as_array().unwrap().len(),
        second.total_scenes
    );
    assert_eq!(doc["threshold"], 60.0);
}

#[tokio::test]
async fn rerun_sweeps_stale_frames() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    let first = h.pipeline.detect_scenes(&id, Some(10.0)).await.unwrap();
    let second = h.pipeline.detect_scenes(&id, Some(60.0)).await.unwrap();
    assert!(second.total_scenes < first.total_scenes);

    // Only the second run's frames remain on disk.
    let frames_dir = h.pipeline.layout().root().join("frames");
    let mut entries = tokio::fs::read_dir(&frames_dir).await.unwrap();
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await.unwrap() {
        assert!(entry
            .file_name()
            .to_string_lossy()
            .starts_with("v1_scene_"));
        count += 1;
    }
    assert_eq!(count, second.total_scenes);
}

#[tokio::test]
async fn search_returns_exact_segment() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();
    h.pipeline.transcribe(&id, None).await.unwrap();

    let hits = h.pipeline.search(&[id], "deadline", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].start, 10.0);
    assert_eq!(hits[0].end, 14.2);
    assert_eq!(hits[0].text, "the project deadline is Friday");
}

#[tokio::test]
async fn search_unindexed_video_fails() {
    let h = Harness::new().await;
    let err = h
        .pipeline
        .search(&[VideoId::from("ghost")], "anything", None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::VideoNotFound(_)));
}

#[tokio::test]
async fn search_without_transcript_is_empty_not_error() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    let hits = h.pipeline.search(&[id], "deadline", None).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn search_time_range_post_filters() {
    let h = Harness::with_transcript(vec![
        (5.0, 8.0, "deadline mentioned early"),
        (50.0, 55.0, "deadline mentioned late"),
    ])
    .await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();
    h.pipeline.transcribe(&id, None).await.unwrap();

    let hits = h
        .pipeline
        .search(
            &[id],
            "deadline",
            Some(TimeRange {
                start: 40.0,
                end: 60.0,
            }),
        )
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].start, 50.0);
}

#[tokio::test]
async fn concurrent_transcribe_and_detect_stay_consistent() {
    let h = Harness::with_transcript(vec![
        (0.0, 5.0, "segment one"),
        (5.0, 10.0, "segment two"),
        (10.0, 15.0, "segment three"),
    ])
    .await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();

    let (transcript, scenes) = tokio::join!(
        h.pipeline.transcribe(&id, None),
        h.pipeline.detect_scenes(&id, Some(30.0)),
    );
    let transcript = transcript.unwrap();
    let scenes = scenes.unwrap();

    // Both sets are fully present, and the record reflects both stages.
    let hits = h.pipeline.search(&[id.clone()], "segment", None).await.unwrap();
    assert_eq!(hits.len(), transcript.len());

    let record = h.pipeline.video_info(&id).await.unwrap();
    assert_eq!(record.status, VideoStatus::Indexed);
    assert!(scenes.total_scenes > 0);
}

#[tokio::test]
async fn delete_removes_record_and_artifacts() {
    let h = Harness::new().await;
    let source = h.source_file("a.mov").await;
    let id = VideoId::from("v1");
    h.pipeline.ingest(&source, Some(id.clone()), false).await.unwrap();
    h.pipeline.transcribe(&id, None).await.unwrap();
    h.pipeline.detect_scenes(&id, None).await.unwrap();

    h.pipeline.delete(&id).await.unwrap();

    assert!(matches!(
        h.pipeline.video_info(&id).await.unwrap_err(),
        PipelineError::VideoNotFound(_)
    ));
    assert!(!h.pipeline.layout().video_path(&id).exists());
    assert!(!h.pipeline.layout().transcript_path(&id).exists());
    assert!(!h.pipeline.layout().scene_manifest_path(&id).exists());
}
