//! SQLite video index.
//!
//! The pool exists for read concurrency; mutating operations run inside
//! a single transaction each, and callers serialize writers per video
//! through [`crate::lock::WriteLocks`]. WAL mode plus a busy timeout
//! keeps concurrent readers off the writers' backs.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use vindex_models::{SceneRecord, TranscriptSegment, VideoId, VideoRecord, VideoStatus};

/// The video index database.
#[derive(Debug, Clone)]
pub struct VideoIndex {
    pool: SqlitePool,
}

impl VideoIndex {
    /// Open (creating if missing) the index at `db_path`.
    pub async fn open(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path.as_ref())
            .create_if_missing(true)
            // All pooled connections wait before returning SQLITE_BUSY.
            .busy_timeout(Duration::from_secs(30))
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        let index = Self { pool };
        index.init_schema().await?;
        info!(db = %db_path.as_ref().display(), "Video index open");
        Ok(index)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS videos (
                id TEXT PRIMARY KEY,
                source_path TEXT NOT NULL,
                stored_path TEXT NOT NULL,
                duration REAL NOT NULL,
                fps REAL NOT NULL,
                width INTEGER NOT NULL,
                height INTEGER NOT NULL,
                status TEXT NOT NULL,
                scene_threshold REAL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS transcript_segments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                video_id TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                start_time REAL NOT NULL,
                end_time REAL NOT NULL,
                text TEXT NOT NULL,
                confidence REAL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_segments_video_start
             ON transcript_segments(video_id, start_time)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS scenes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                video_id TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                scene_number INTEGER NOT NULL,
                start_time REAL NOT NULL,
                end_time REAL NOT NULL,
                frame_path TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_scenes_video_start
             ON scenes(video_id, start_time)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new video record.
    ///
    /// Fails with [`StoreError::DuplicateVideo`] when the id is already
    /// indexed, unless `overwrite` is set, in which case the prior record
    /// and its derived rows are dropped in the same transaction.
    pub async fn insert_video(&self, record: &VideoRecord, overwrite: bool) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM videos WHERE id = ?")
            .bind(record.id.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            if !overwrite {
                return Err(StoreError::DuplicateVideo(record.id.to_string()));
            }
            sqlx::query("DELETE FROM videos WHERE id = ?")
                .bind(record.id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT INTO videos
             (id, source_path, stored_path, duration, fps, width, height, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_str())
        .bind(&record.source_path)
        .bind(&record.stored_path)
        .bind(record.duration)
        .bind(record.fps)
        .bind(record.width)
        .bind(record.height)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(video_id = %record.id, overwrite, "Video indexed");
        Ok(())
    }

    /// Fetch a video record, failing when it is not indexed.
    pub async fn video(&self, id: &VideoId) -> StoreResult<VideoRecord> {
        self.try_video(id)
            .await?
            .ok_or_else(|| StoreError::VideoNotFound(id.to_string()))
    }

    /// Fetch a video record if present.
    pub async fn try_video(&self, id: &VideoId) -> StoreResult<Option<VideoRecord>> {
        let row = sqlx::query(
            "SELECT id, source_path, stored_path, duration, fps, width, height,
                    status, created_at
             FROM videos WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| video_from_row(&r)).transpose()
    }

    /// Update a video's processing status.
    pub async fn update_status(&self, id: &VideoId, status: VideoStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE videos SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::VideoNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Replace the full transcript segment set for a video in one
    /// transaction: either all new rows become visible or none do.
    pub async fn replace_segments(
        &self,
        id: &VideoId,
        segments: &[TranscriptSegment],
        status: VideoStatus,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM transcript_segments WHERE video_id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        for segment in segments {
            sqlx::query(
                "INSERT INTO transcript_segments
                 (video_id, start_time, end_time, text, confidence)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id.as_str())
            .bind(segment.start)
            .bind(segment.end)
            .bind(&segment.text)
            .bind(segment.confidence)
            .execute(&mut *tx)
            .await?;
        }

        let updated = sqlx::query("UPDATE videos SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::VideoNotFound(id.to_string()));
        }

        tx.commit().await?;
        debug!(video_id = %id, count = segments.len(), "Transcript segments replaced");
        Ok(())
    }

    /// Fetch a video's transcript segments ordered by start time.
    pub async fn segments(&self, id: &VideoId) -> StoreResult<Vec<TranscriptSegment>> {
        let rows = sqlx::query(
            "SELECT video_id, start_time, end_time, text, confidence
             FROM transcript_segments WHERE video_id = ?
             ORDER BY start_time",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(segment_from_row).collect()
    }

    /// Replace the full scene set for a video in one transaction,
    /// recording the detection threshold used.
    pub async fn replace_scenes(
        &self,
        id: &VideoId,
        scenes: &[SceneRecord],
        threshold: f64,
        status: VideoStatus,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM scenes WHERE video_id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        for scene in scenes {
            sqlx::query(
                "INSERT INTO scenes
                 (video_id, scene_number, start_time, end_time, frame_path)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id.as_str())
            .bind(scene.scene_number)
            .bind(scene.start)
            .bind(scene.end)
            .bind(scene.frame_path.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        let updated =
            sqlx::query("UPDATE videos SET status = ?, scene_threshold = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(threshold)
                .bind(id.as_str())
                .execute(&mut *tx)
                .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::VideoNotFound(id.to_string()));
        }

        tx.commit().await?;
        debug!(video_id = %id, count = scenes.len(), threshold, "Scenes replaced");
        Ok(())
    }

    /// Fetch a video's scenes ordered by start time.
    pub async fn scenes(&self, id: &VideoId) -> StoreResult<Vec<SceneRecord>> {
        let rows = sqlx::query(
            "SELECT video_id, scene_number, start_time, end_time, frame_path
             FROM scenes WHERE video_id = ?
             ORDER BY start_time",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(scene_from_row).collect()
    }

    /// Case-insensitive substring search over the transcript segments of
    /// the given videos, ordered by video id then start time.
    pub async fn search_segments(
        &self,
        ids: &[VideoId],
        query: &str,
    ) -> StoreResult<Vec<TranscriptSegment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT video_id, start_time, end_time, text, confidence
             FROM transcript_segments
             WHERE video_id IN ({placeholders})
               AND lower(text) LIKE ? ESCAPE '\\'
             ORDER BY video_id, start_time"
        );

        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let mut q = sqlx::query(&sql);
        for id in ids {
            q = q.bind(id.as_str());
        }
        q = q.bind(pattern);

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(segment_from_row).collect()
    }

    /// Delete a video and (via cascade) its segments and scenes.
    pub async fn delete_video(&self, id: &VideoId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::VideoNotFound(id.to_string()));
        }
        debug!(video_id = %id, "Video deleted from index");
        Ok(())
    }

    /// Close the pool, releasing all connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Escape SQL LIKE wildcards in user-supplied query text.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn video_from_row(row: &SqliteRow) -> StoreResult<VideoRecord> {
    let status_str: String = row.try_get("status")?;
    let status = VideoStatus::parse(&status_str)
        .ok_or_else(|| StoreError::corrupt_row(format!("unknown status {:?}", status_str)))?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(VideoRecord {
        id: VideoId::from_string(row.try_get::<String, _>("id")?),
        source_path: row.try_get("source_path")?,
        stored_path: row.try_get("stored_path")?,
        duration: row.try_get("duration")?,
        fps: row.try_get("fps")?,
        width: row.try_get::<i64, _>("width")? as u32,
        height: row.try_get::<i64, _>("height")? as u32,
        status,
        created_at,
    })
}

fn segment_from_row(row: &SqliteRow) -> StoreResult<TranscriptSegment> {
    Ok(TranscriptSegment {
        video_id: VideoId::from_string(row.try_get::<String, _>("video_id")?),
        start: row.try_get("start_time")?,
        end: row.try_get("end_time")?,
        text: row.try_get("text")?,
        confidence: row.try_get("confidence")?,
    })
}

fn scene_from_row(row: &SqliteRow) -> StoreResult<SceneRecord> {
    Ok(SceneRecord {
        video_id: VideoId::from_string(row.try_get::<String, _>("video_id")?),
        scene_number: row.try_get::<i64, _>("scene_number")? as u32,
        start: row.try_get("start_time")?,
        end: row.try_get("end_time")?,
        frame_path: row.try_get("frame_path")?,
    })
}
