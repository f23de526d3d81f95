//! Scene segmentation.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::Pipeline;
use vindex_models::{scenes_from_boundaries, SceneManifest, SceneRecord, VideoId};

/// Outcome of one scene detection run.
#[derive(Debug, Clone, Serialize)]
pub struct SceneDetectionResult {
    /// Number of scenes detected
    pub total_scenes: usize,
    /// Threshold the run used (content scale, lower = more scenes)
    pub threshold: f64,
    /// Ordered scene records
    pub scenes: Vec<SceneRecord>,
}

impl Pipeline {
    /// Detect scenes for a video.
    ///
    /// `threshold` is on the 0-100 content-difference scale, lower =
    /// more sensitive = more scenes; `None` uses the configured default.
    /// Derived scenes are contiguous and span `[0, duration]`. One
    /// representative frame per scene is extracted best-effort; a frame
    /// failure downgrades that scene to no frame rather than failing the
    /// run. The persisted scene set is replaced atomically on success
    /// only.
    pub async fn detect_scenes(
        &self,
        id: &VideoId,
        threshold: Option<f64>,
    ) -> PipelineResult<SceneDetectionResult> {
        let record = self.index().video(id).await?;
        let threshold = threshold.unwrap_or(self.config().default_scene_threshold);

        let boundaries = self
            .capabilities()
            .scene_detector
            .detect(
                Path::new(&record.stored_path),
                threshold,
                self.config().scene_timeout,
            )
            .await
            .map_err(PipelineError::from_scene_media)?;

        let mut scenes = scenes_from_boundaries(id, record.duration, &boundaries);

        // Frame files belong to the run being committed: sweep the prior
        // run's frames and write the new ones under the video's lock, so
        // a rerun with fewer scenes leaves no stale higher-numbered
        // frames behind.
        let _guard = self.locks().acquire(id).await;
        self.layout().remove_frames(id).await?;

        for scene in &mut scenes {
            let frame_path = self.layout().frame_path(id, scene.scene_number);
            match self
                .capabilities()
                .frame_extractor
                .extract_frame(
                    Path::new(&record.stored_path),
                    scene.start,
                    &frame_path,
                    self.config().frame_timeout,
                )
                .await
            {
                Ok(()) => scene.frame_path = Some(frame_path.to_string_lossy().to_string()),
                Err(e) => {
                    warn!(
                        video_id = %id,
                        scene = scene.scene_number,
                        error = %e,
                        "Frame extraction failed, keeping scene without frame"
                    );
                }
            }
        }

        let current = self.index().video(id).await?;
        let manifest = SceneManifest {
            video_id: id.clone(),
            threshold,
            scenes: scenes.clone(),
        };
        self.layout()
            .write_artifact(&self.layout().scene_manifest_path(id), &manifest)
            .await?;

        self.index()
            .replace_scenes(id, &scenes, threshold, current.status.with_scenes())
            .await?;

        info!(
            video_id = %id,
            scenes = scenes.len(),
            threshold,
            "Scenes detected"
        );

        Ok(SceneDetectionResult {
            total_scenes: scenes.len(),
            threshold,
            scenes,
        })
    }
}
