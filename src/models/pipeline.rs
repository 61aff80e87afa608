use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Pipeline {
    pub id: i64,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct PipelineStage {
    pub id: i64,
    #[serde(rename = "pipelineId")]
    pub pipeline_id: i64,
    pub name: String,
    #[serde(rename = "sortOrder")]
    pub sort_order: i32,
    #[serde(rename = "isFinal")]
    pub is_final: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDetail {
    pub id: i64,
    pub name: String,
    pub stages: Vec<PipelineStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipelineRequest {
    pub name: String,
    pub stages: Vec<CreateStageRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStageRequest {
    pub name: String,
    #[serde(rename = "isFinal", default)]
    pub is_final: bool,
}

/// Role a stage plays when clicked. Custom pipeline stages only ever map to
/// `Won` (final stages) or `In Progress`; the remaining roles come from the
/// built-in four-stage model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StageStatus {
    #[serde(rename = "New Lead")]
    NewLead,
    #[serde(rename = "Not Connected")]
    NotConnected,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Won")]
    Won,
    #[serde(rename = "Not Qualified")]
    NotQualified,
}

/// One row of the derived stage strip shown for a lead: the resolved label,
/// the backing stage id for pipeline-driven stages, and whether the lead
/// currently sits on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectiveStage {
    pub label: String,
    pub id: Option<i64>,
    pub status: StageStatus,
    pub active: bool,
}

/// A manual click on one of the effective stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveToStageRequest {
    pub label: String,
    pub id: Option<i64>,
    pub status: StageStatus,
}
