//! Managed filesystem layout.
//!
//! One root directory holds everything other tools need to inspect
//! artifacts directly:
//!
//! ```text
//! <root>/
//!   videos/       <id>.mp4
//!   frames/       <id>_scene_<n>.jpg
//!   transcripts/  <id>.json
//!   scenes/       <id>.json
//!   video_index.db
//! ```

use std::path::{Path, PathBuf};
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use vindex_models::VideoId;

const VIDEOS_DIR: &str = "videos";
const FRAMES_DIR: &str = "frames";
const TRANSCRIPTS_DIR: &str = "transcripts";
const SCENES_DIR: &str = "scenes";
const INDEX_DB: &str = "video_index.db";

/// Filesystem layout manager.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Create (idempotently) the layout under `root`.
    ///
    /// Fails with [`StoreError::Unavailable`] when the root cannot be
    /// created or is not writable.
    pub async fn create(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();

        for dir in [
            root.clone(),
            root.join(VIDEOS_DIR),
            root.join(FRAMES_DIR),
            root.join(TRANSCRIPTS_DIR),
            root.join(SCENES_DIR),
        ] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                StoreError::unavailable(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        // Writability probe: a root we cannot write into is unusable even
        // if the directories already exist.
        let probe = root.join(".write_probe");
        fs::write(&probe, b"")
            .await
            .map_err(|e| StoreError::unavailable(format!("root not writable: {}", e)))?;
        fs::remove_file(&probe).await.ok();

        debug!(root = %root.display(), "Storage layout ready");
        Ok(Self { root })
    }

    /// Layout root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index database path.
    pub fn db_path(&self) -> PathBuf {
        self.root.join(INDEX_DB)
    }

    /// Normalized video path for an identifier.
    pub fn video_path(&self, id: &VideoId) -> PathBuf {
        self.root.join(VIDEOS_DIR).join(format!("{}.mp4", id))
    }

    /// Transcript artifact path for an identifier.
    pub fn transcript_path(&self, id: &VideoId) -> PathBuf {
        self.root.join(TRANSCRIPTS_DIR).join(format!("{}.json", id))
    }

    /// Scene manifest path for an identifier.
    pub fn scene_manifest_path(&self, id: &VideoId) -> PathBuf {
        self.root.join(SCENES_DIR).join(format!("{}.json", id))
    }

    /// Representative frame path for one scene of a video.
    pub fn frame_path(&self, id: &VideoId, scene_number: u32) -> PathBuf {
        self.root
            .join(FRAMES_DIR)
            .join(format!("{}_scene_{}.jpg", id, scene_number))
    }

    /// Serialize a document to an artifact path atomically: write to a
    /// temp file in the same directory, then rename over the target.
    pub async fn write_artifact<T: Serialize>(&self, path: &Path, value: &T) -> StoreResult<()> {
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::unavailable("artifact path has no parent"))?;
        let json = serde_json::to_vec_pretty(value)?;

        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        fs::write(tmp.path(), &json).await?;
        tmp.persist(path)
            .map_err(|e| StoreError::Io(e.error))?;

        Ok(())
    }

    /// Remove a video's representative frames. Frames carry the scene
    /// number in their name, so sweep the directory by prefix.
    pub async fn remove_frames(&self, id: &VideoId) -> StoreResult<()> {
        let frames_dir = self.root.join(FRAMES_DIR);
        let prefix = format!("{}_scene_", id);
        let mut entries = fs::read_dir(&frames_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(&prefix)
            {
                fs::remove_file(entry.path()).await.ok();
            }
        }
        Ok(())
    }

    /// Remove every artifact belonging to a video. Missing files are fine.
    pub async fn remove_artifacts(&self, id: &VideoId) -> StoreResult<()> {
        fs::remove_file(self.video_path(id)).await.ok();
        fs::remove_file(self.transcript_path(id)).await.ok();
        fs::remove_file(self.scene_manifest_path(id)).await.ok();
        self.remove_frames(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).await.unwrap();
        let again = StorageLayout::create(dir.path()).await.unwrap();
        assert_eq!(layout.root(), again.root());
        for sub in ["videos", "frames", "transcripts", "scenes"] {
            assert!(dir.path().join(sub).is_dir());
        }
    }

    #[tokio::test]
    async fn test_path_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).await.unwrap();
        let id = VideoId::from("v1");
        assert!(layout.video_path(&id).ends_with("videos/v1.mp4"));
        assert!(layout.transcript_path(&id).ends_with("transcripts/v1.json"));
        assert!(layout.scene_manifest_path(&id).ends_with("scenes/v1.json"));
        assert!(layout
            .frame_path(&id, 3)
            .ends_with("frames/v1_scene_3.jpg"));
    }

    #[tokio::test]
    async fn test_unwritable_root_fails() {
        let err = StorageLayout::create("/proc/definitely/not/writable")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_artifact_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).await.unwrap();
        let id = VideoId::from("v1");

        let path = layout.transcript_path(&id);
        layout
            .write_artifact(&path, &serde_json::json!({"ok": true}))
            .await
            .unwrap();
        assert!(path.exists());

        tokio::fs::write(layout.frame_path(&id, 0), b"jpg").await.unwrap();
        layout.remove_artifacts(&id).await.unwrap();
        assert!(!path.exists());
        assert!(!layout.frame_path(&id, 0).exists());
    }

    #[tokio::test]
    async fn test_remove_frames_only_touches_that_video() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).await.unwrap();
        let (a, b) = (VideoId::from("v1"), VideoId::from("v2"));
        tokio::fs::write(layout.frame_path(&a, 0), b"jpg").await.unwrap();
        tokio::fs::write(layout.frame_path(&b, 0), b"jpg").await.unwrap();

        layout.remove_frames(&a).await.unwrap();
        assert!(!layout.frame_path(&a, 0).exists());
        assert!(layout.frame_path(&b, 0).exists());
    }
}
