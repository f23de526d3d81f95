//! Scene records and boundary-to-scene derivation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::VideoId;

/// Tolerance for boundary dedup and coverage comparisons, in seconds.
///
/// Boundary timestamps come back from frame-level detection, so two
/// boundaries closer than one millisecond are treated as the same cut.
pub const BOUNDARY_EPSILON_SECS: f64 = 1e-3;

/// One detected visual shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneRecord {
    /// Owning video
    pub video_id: VideoId,
    /// Position in the scene sequence, starting at 0
    pub scene_number: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Representative frame path, if one was extracted
    pub frame_path: Option<String>,
}

impl SceneRecord {
    /// Scene length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Serialized scene artifact, one JSON document per video under `scenes/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneManifest {
    /// Owning video
    pub video_id: VideoId,
    /// Detection threshold the run used (content scale, lower = more scenes)
    pub threshold: f64,
    /// Ordered scene records
    pub scenes: Vec<SceneRecord>,
}

/// Derive contiguous, non-overlapping scenes from raw boundary timestamps.
///
/// Boundaries are sorted, deduplicated within [`BOUNDARY_EPSILON_SECS`],
/// and clamped to the open interval `(0, duration)`. The resulting scenes
/// span `[0, duration]` with each scene starting where the previous one
/// ended. An empty boundary list yields a single full-length scene.
pub fn scenes_from_boundaries(
    video_id: &VideoId,
    duration: f64,
    boundaries: &[f64],
) -> Vec<SceneRecord> {
    let mut cuts: Vec<f64> = boundaries
        .iter()
        .copied()
        .filter(|t| *t > BOUNDARY_EPSILON_SECS && *t < duration - BOUNDARY_EPSILON_SECS)
        .collect();
    cuts.sort_by(|a, b| a.total_cmp(b));
    cuts.dedup_by(|a, b| (*a - *b).abs() < BOUNDARY_EPSILON_SECS);

    let mut scenes = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0.0;
    for (i, cut) in cuts.iter().enumerate() {
        scenes.push(SceneRecord {
            video_id: video_id.clone(),
            scene_number: i as u32,
            start,
            end: *cut,
            frame_path: None,
        });
        start = *cut;
    }
    scenes.push(SceneRecord {
        video_id: video_id.clone(),
        scene_number: cuts.len() as u32,
        start,
        end: duration,
        frame_path: None,
    });

    scenes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(duration: f64, boundaries: &[f64]) -> Vec<SceneRecord> {
        scenes_from_boundaries(&VideoId::from("v1"), duration, boundaries)
    }

    #[test]
    fn test_no_boundaries_single_scene() {
        let scenes = derive(60.0, &[]);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].start, 0.0);
        assert_eq!(scenes[0].end, 60.0);
        assert_eq!(scenes[0].scene_number, 0);
    }

    #[test]
    fn test_scenes_are_contiguous() {
        let scenes = derive(100.0, &[42.5, 10.0, 77.25]);
        assert_eq!(scenes.len(), 4);
        assert_eq!(scenes[0].start, 0.0);
        assert_eq!(scenes.last().unwrap().end, 100.0);
        for pair in scenes.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < BOUNDARY_EPSILON_SECS);
        }
    }

    #[test]
    fn test_boundaries_outside_duration_dropped() {
        let scenes = derive(30.0, &[0.0, 15.0, 30.0, 45.0]);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].end, 15.0);
    }

    #[test]
    fn test_near_duplicate_boundaries_collapse() {
        let scenes = derive(20.0, &[10.0, 10.0004]);
        assert_eq!(scenes.len(), 2);
    }

    #[test]
    fn test_scene_numbers_sequential() {
        let scenes = derive(50.0, &[20.0, 40.0, 10.0]);
        let numbers: Vec<u32> = scenes.iter().map(|s| s.scene_number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }
}
