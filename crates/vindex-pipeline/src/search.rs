//! Transcript search.

use tracing::debug;

use crate::error::PipelineResult;
use crate::Pipeline;
use vindex_models::{filter_results, SearchResult, TimeRange, VideoId};

impl Pipeline {
    /// Case-insensitive substring search over one or more videos'
    /// transcripts.
    ///
    /// Every identifier must be indexed (`VideoNotFound` otherwise); a
    /// video without transcript segments simply contributes no results.
    /// The optional time range is applied as a pure post-filter. Results
    /// are ordered by video, then by segment start time.
    pub async fn search(
        &self,
        ids: &[VideoId],
        query: &str,
        range: Option<TimeRange>,
    ) -> PipelineResult<Vec<SearchResult>> {
        for id in ids {
            self.index().video(id).await?;
        }

        let segments = self.index().search_segments(ids, query).await?;
        let results: Vec<SearchResult> = segments.into_iter().map(SearchResult::from).collect();
        let results = filter_results(results, range);

        debug!(
            videos = ids.len(),
            query,
            hits = results.len(),
            "Transcript search"
        );

        Ok(results)
    }
}
