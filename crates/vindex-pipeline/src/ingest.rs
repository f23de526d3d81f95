//! Video ingestion.

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::Pipeline;
use vindex_models::{VideoId, VideoRecord, VideoStatus};
use vindex_store::StoreError;

impl Pipeline {
    /// Ingest a source video into the managed layout.
    ///
    /// Probes the container first (which also validates that the file is
    /// decodable), then normalizes it into `videos/` and writes the index
    /// record with status `Ingested`.
    ///
    /// Fails with [`PipelineError::DuplicateVideoId`] when `id` is
    /// already indexed and `overwrite` is false; with overwrite the prior
    /// record and its artifacts are fully replaced.
    pub async fn ingest(
        &self,
        source: impl AsRef<Path>,
        id: Option<VideoId>,
        overwrite: bool,
    ) -> PipelineResult<VideoRecord> {
        let source = source.as_ref();
        let id = id.unwrap_or_default();

        // Fail fast before the (possibly slow) probe; the index insert
        // re-checks inside its transaction.
        if !overwrite && self.index().try_video(&id).await?.is_some() {
            return Err(PipelineError::DuplicateVideoId(id.to_string()));
        }

        let info = self
            .capabilities()
            .probe
            .probe(source, self.config().probe_timeout)
            .await
            .map_err(PipelineError::from_ingest_media)?;

        // Normalize into a staging path first; a mid-run transcode
        // failure must leave any prior record and artifacts untouched.
        let stored_path = self.layout().video_path(&id);
        let staging_path = stored_path.with_extension("tmp.mp4");
        if let Err(err) = self
            .capabilities()
            .normalizer
            .normalize(source, &staging_path, self.config().normalize_timeout)
            .await
        {
            tokio::fs::remove_file(&staging_path).await.ok();
            return Err(PipelineError::from_ingest_media(err));
        }

        let _guard = self.locks().acquire(&id).await;

        if overwrite && self.index().try_video(&id).await?.is_some() {
            self.layout().remove_artifacts(&id).await?;
        }
        tokio::fs::rename(&staging_path, &stored_path)
            .await
            .map_err(StoreError::from)?;

        let record = VideoRecord {
            id: id.clone(),
            source_path: source.to_string_lossy().to_string(),
            stored_path: stored_path.to_string_lossy().to_string(),
            duration: info.duration,
            fps: info.fps,
            width: info.width,
            height: info.height,
            status: VideoStatus::Ingested,
            created_at: Utc::now(),
        };

        self.index().insert_video(&record, overwrite).await?;

        info!(
            video_id = %id,
            duration = info.duration,
            resolution = format!("{}x{}", info.width, info.height),
            "Video ingested"
        );

        Ok(record)
    }

    /// Fetch an indexed video's record.
    pub async fn video_info(&self, id: &VideoId) -> PipelineResult<VideoRecord> {
        Ok(self.index().video(id).await?)
    }

    /// Delete a video: index record (cascading to segments and scenes)
    /// plus every artifact under the layout.
    pub async fn delete(&self, id: &VideoId) -> PipelineResult<()> {
        let _guard = self.locks().acquire(id).await;
        self.index().delete_video(id).await?;
        self.layout().remove_artifacts(id).await?;
        info!(video_id = %id, "Video deleted");
        Ok(())
    }
}
