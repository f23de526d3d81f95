//! Scene boundary detection.
//!
//! Delegates shot-boundary detection to FFmpeg's `scene` frame-difference
//! score: frames whose score exceeds the cutoff are boundaries, and their
//! presentation timestamps are read back from `showinfo` log lines.

use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Scene-boundary detection capability.
///
/// `threshold` is on a 0-100 content-difference scale, where LOWER
/// values are more sensitive and detect MORE scenes.
#[async_trait]
pub trait SceneBoundaryDetector: Send + Sync {
    async fn detect(
        &self,
        video: &Path,
        threshold: f64,
        timeout: Duration,
    ) -> MediaResult<Vec<f64>>;
}

/// FFmpeg `select='gt(scene,..)'` based detector.
#[derive(Debug, Default)]
pub struct FfmpegSceneDetector;

/// Map the public 0-100 content threshold onto FFmpeg's 0-1 scene score.
///
/// The mapping is linear and strictly increasing, so the inverse
/// sensitivity relation is preserved exactly: a lower threshold yields a
/// lower score cutoff and therefore never fewer boundaries.
fn scene_score_cutoff(threshold: f64) -> f64 {
    (threshold / 100.0).clamp(0.0, 1.0)
}

#[async_trait]
impl SceneBoundaryDetector for FfmpegSceneDetector {
    async fn detect(
        &self,
        video: &Path,
        threshold: f64,
        timeout: Duration,
    ) -> MediaResult<Vec<f64>> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }

        let cutoff = scene_score_cutoff(threshold);
        let filter = format!("select='gt(scene,{:.4})',showinfo", cutoff);

        info!(
            video = %video.display(),
            threshold,
            cutoff,
            "Detecting scene boundaries"
        );

        let cmd = FfmpegCommand::analysis(video).video_filter(&filter);
        let output = FfmpegRunner::new().with_timeout(timeout).run(&cmd).await?;

        let boundaries = parse_showinfo_timestamps(&output.stderr);
        debug!(count = boundaries.len(), "Parsed boundary timestamps");

        Ok(boundaries)
    }
}

/// Pull `pts_time:` values out of showinfo log lines.
fn parse_showinfo_timestamps(stderr: &str) -> Vec<f64> {
    let pattern = Regex::new(r"pts_time:([0-9]+(?:\.[0-9]+)?)").unwrap();

    let mut timestamps: Vec<f64> = stderr
        .lines()
        .filter(|line| line.contains("Parsed_showinfo"))
        .filter_map(|line| pattern.captures(line))
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .collect();

    timestamps.sort_by(|a, b| a.total_cmp(b));
    timestamps
}
