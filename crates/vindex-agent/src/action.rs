//! Named actions and parameter validation.

use serde::{Deserialize, Serialize};

use vindex_models::{TimeRange, VideoId};

/// Action discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Upload,
    Transcribe,
    DetectScenes,
    Search,
    GetInfo,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Upload => "upload",
            ActionKind::Transcribe => "transcribe",
            ActionKind::DetectScenes => "detect_scenes",
            ActionKind::Search => "search",
            ActionKind::GetInfo => "get_info",
            ActionKind::Delete => "delete",
        }
    }
}

/// Raw request: an action tag plus a flat parameter set, as the
/// surrounding framework sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_ids: Option<Vec<String>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub overwrite: bool,
}

/// Validated action ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Upload {
        video_path: String,
        video_id: Option<VideoId>,
        overwrite: bool,
    },
    Transcribe {
        video_id: VideoId,
        language: Option<String>,
    },
    DetectScenes {
        video_id: VideoId,
        threshold: Option<f64>,
    },
    Search {
        video_ids: Vec<VideoId>,
        query: String,
        range: Option<TimeRange>,
    },
    GetInfo {
        video_id: VideoId,
    },
    Delete {
        video_id: VideoId,
    },
}

/// Fields that failed validation for a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid action parameters: {}", fields.join(", "))]
pub struct InvalidActionParameters {
    pub fields: Vec<String>,
}

impl ActionRequest {
    /// Validate required parameters for the action and produce the
    /// dispatchable form. All offending fields are reported at once.
    pub fn validate(self) -> Result<Action, InvalidActionParameters> {
        let mut invalid = Vec::new();

        let action = match self.action {
            ActionKind::Upload => {
                let video_path = match self.video_path.as_deref() {
                    Some(p) if !p.trim().is_empty() => p.to_string(),
                    _ => {
                        invalid.push("video_path".to_string());
                        String::new()
                    }
                };
                Action::Upload {
                    video_path,
                    video_id: self.video_id.map(VideoId::from_string),
                    overwrite: self.overwrite,
                }
            }
            ActionKind::Transcribe => Action::Transcribe {
                video_id: require_video_id(&self.video_id, &mut invalid),
                language: self.language.clone(),
            },
            ActionKind::DetectScenes => {
                if let Some(t) = self.threshold {
                    if !t.is_finite() || t < 0.0 {
                        invalid.push("threshold".to_string());
                    }
                }
                Action::DetectScenes {
                    video_id: require_video_id(&self.video_id, &mut invalid),
                    threshold: self.threshold,
                }
            }
            ActionKind::Search => {
                let mut video_ids: Vec<VideoId> = self
                    .video_ids
                    .clone()
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .map(VideoId::from_string)
                    .collect();
                if let Some(id) = self.video_id.as_deref() {
                    if !id.trim().is_empty() {
                        video_ids.push(VideoId::from(id));
                    }
                }
                if video_ids.is_empty() {
                    invalid.push("video_id".to_string());
                }

                let query = match self.query.as_deref() {
                    Some(q) if !q.trim().is_empty() => q.to_string(),
                    _ => {
                        invalid.push("query".to_string());
                        String::new()
                    }
                };

                let range = match (self.start, self.end) {
                    (None, None) => None,
                    (Some(start), Some(end)) if start >= 0.0 && start <= end => {
                        Some(TimeRange { start, end })
                    }
                    _ => {
                        invalid.push("start/end".to_string());
                        None
                    }
                };

                Action::Search {
                    video_ids,
                    query,
                    range,
                }
            }
            ActionKind::GetInfo => Action::GetInfo {
                video_id: require_video_id(&self.video_id, &mut invalid),
            },
            ActionKind::Delete => Action::Delete {
                video_id: require_video_id(&self.video_id, &mut invalid),
            },
        };

        if invalid.is_empty() {
            Ok(action)
        } else {
            Err(InvalidActionParameters { fields: invalid })
        }
    }
}

fn require_video_id(id: &Option<String>, invalid: &mut Vec<String>) -> VideoId {
    match id.as_deref() {
        Some(s) if !s.trim().is_empty() => VideoId::from(s),
        _ => {
            invalid.push("video_id".to_string());
            VideoId::from("")
        }
    }
}
