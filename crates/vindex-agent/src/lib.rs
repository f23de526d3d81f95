//! Orchestration facade over the local video pipeline.
//!
//! Exposes every pipeline operation as a named action with a flat,
//! validated parameter set, and converts every outcome into a uniform
//! result envelope. This is the sole integration point the surrounding
//! framework depends on.

pub mod action;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use vindex_pipeline::Pipeline;

pub use action::{Action, ActionKind, ActionRequest, InvalidActionParameters};

/// Uniform result envelope.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}

impl AgentResponse {
    fn ok(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    fn error(message: impl Into<String>, kind: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: json!({ "error": kind }),
        }
    }
}

/// The local video agent.
pub struct LocalVideoAgent {
    pipeline: Pipeline,
}

impl LocalVideoAgent {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Validate and dispatch one action request. Never fails: every
    /// internal error kind becomes a `success=false` envelope.
    pub async fn handle(&self, request: ActionRequest) -> AgentResponse {
        let kind = request.action;
        info!(action = kind.as_str(), "Dispatching action");

        let action = match request.validate() {
            Ok(action) => action,
            Err(err) => {
                warn!(action = kind.as_str(), error = %err, "Rejected action request");
                return AgentResponse::error(err.to_string(), "invalid_action_parameters");
            }
        };

        match self.dispatch(action).await {
            Ok(response) => response,
            Err(err) => {
                warn!(action = kind.as_str(), error = %err, "Action failed");
                AgentResponse::error(err.to_string(), err.kind())
            }
        }
    }

    async fn dispatch(&self, action: Action) -> Result<AgentResponse, vindex_pipeline::PipelineError> {
        match action {
            Action::Upload {
                video_path,
                video_id,
                overwrite,
            } => {
                let record = self.pipeline.ingest(&video_path, video_id, overwrite).await?;
                Ok(AgentResponse::ok(
                    format!(
                        "Video {} ingested ({:.2}s, {}x{})",
                        record.id, record.duration, record.width, record.height
                    ),
                    json!({ "video": record }),
                ))
            }
            Action::Transcribe { video_id, language } => {
                let segments = self
                    .pipeline
                    .transcribe(&video_id, language.as_deref())
                    .await?;
                Ok(AgentResponse::ok(
                    format!("Video {} transcribed ({} segments)", video_id, segments.len()),
                    json!({ "segments": segments }),
                ))
            }
            Action::DetectScenes {
                video_id,
                threshold,
            } => {
                let result = self.pipeline.detect_scenes(&video_id, threshold).await?;
                Ok(AgentResponse::ok(
                    format!(
                        "Detected {} scenes in video {} (threshold {})",
                        result.total_scenes, video_id, result.threshold
                    ),
                    serde_json::to_value(&result).unwrap_or_default(),
                ))
            }
            Action::Search {
                video_ids,
                query,
                range,
            } => {
                let results = self.pipeline.search(&video_ids, &query, range).await?;
                Ok(AgentResponse::ok(
                    format!("Found {} matching segments", results.len()),
                    json!({ "results": results }),
                ))
            }
            Action::GetInfo { video_id } => {
                let record = self.pipeline.video_info(&video_id).await?;
                Ok(AgentResponse::ok(
                    format!("Video {}", video_id),
                    json!({ "video": record }),
                ))
            }
            Action::Delete { video_id } => {
                self.pipeline.delete(&video_id).await?;
                Ok(AgentResponse::ok(
                    format!("Video {} deleted", video_id),
                    serde_json::Value::Null,
                ))
            }
        }
    }
}
