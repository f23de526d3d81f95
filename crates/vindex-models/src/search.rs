//! Transcript search results and time-range filtering.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptSegment;
use crate::video::VideoId;

/// One transcript segment matching a search query. Derived per query,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    /// Video the segment belongs to
    pub video_id: VideoId,
    /// Segment start time in seconds
    pub start: f64,
    /// Segment end time in seconds
    pub end: f64,
    /// Matched segment text
    pub text: String,
    /// Recognizer confidence, if reported
    pub confidence: Option<f64>,
}

impl From<TranscriptSegment> for SearchResult {
    fn from(segment: TranscriptSegment) -> Self {
        Self {
            video_id: segment.video_id,
            start: segment.start,
            end: segment.end,
            text: segment.text,
            confidence: segment.confidence,
        }
    }
}

/// Inclusive time range filter over a segment's start time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeRange {
    /// Earliest segment start to keep, in seconds
    pub start: f64,
    /// Latest segment start to keep, in seconds
    pub end: f64,
}

impl TimeRange {
    /// Whether a segment starting at `start` falls inside the range.
    pub fn contains(&self, start: f64) -> bool {
        self.start <= start && start <= self.end
    }
}

/// Apply an optional time range as a pure post-filter over computed results.
pub fn filter_results(results: Vec<SearchResult>, range: Option<TimeRange>) -> Vec<SearchResult> {
    match range {
        None => results,
        Some(range) => results
            .into_iter()
            .filter(|r| range.contains(r.start))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(start: f64, text: &str) -> SearchResult {
        SearchResult {
            video_id: VideoId::from("v1"),
            start,
            end: start + 2.0,
            text: text.to_string(),
            confidence: None,
        }
    }

    #[test]
    fn test_no_range_passes_through() {
        let results = vec![result(1.0, "a"), result(50.0, "b")];
        assert_eq!(filter_results(results.clone(), None), results);
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let results = vec![result(10.0, "a"), result(20.0, "b"), result(30.0, "c")];
        let filtered = filter_results(
            results,
            Some(TimeRange {
                start: 10.0,
                end: 20.0,
            }),
        );
        let starts: Vec<f64> = filtered.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![10.0, 20.0]);
    }

    #[test]
    fn test_range_can_empty_results() {
        let filtered = filter_results(
            vec![result(5.0, "a")],
            Some(TimeRange {
                start: 100.0,
                end: 200.0,
            }),
        );
        assert!(filtered.is_empty());
    }
}
