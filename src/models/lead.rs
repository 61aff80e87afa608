use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Lead {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub status: LeadStatus,
    pub tag: LeadTag,
    #[serde(rename = "callCount")]
    pub call_count: i32,
    #[serde(rename = "pipelineId")]
    pub pipeline_id: Option<i64>,
    #[serde(rename = "stageId")]
    pub stage_id: Option<i64>,
    #[serde(rename = "dropReason")]
    pub drop_reason: Option<String>,
    pub remarks: Option<String>,
    #[serde(rename = "lastCallAt")]
    pub last_call_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{} {}", first, last).trim().to_string()
    }
}

/// Business-level lead status. Closed vocabulary, backed by a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "lead_status")]
pub enum LeadStatus {
    #[serde(rename = "New")]
    #[sqlx(rename = "New")]
    New,
    #[serde(rename = "Not Connected")]
    #[sqlx(rename = "Not Connected")]
    NotConnected,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Closed")]
    #[sqlx(rename = "Closed")]
    Closed,
    #[serde(rename = "Lost")]
    #[sqlx(rename = "Lost")]
    Lost,
    #[serde(rename = "Dropped")]
    #[sqlx(rename = "Dropped")]
    Dropped,
    #[serde(rename = "Not Qualified")]
    #[sqlx(rename = "Not Qualified")]
    NotQualified,
}

impl LeadStatus {
    pub fn display_name(&self) -> &str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::NotConnected => "Not Connected",
            LeadStatus::InProgress => "In Progress",
            LeadStatus::Closed => "Closed",
            LeadStatus::Lost => "Lost",
            LeadStatus::Dropped => "Dropped",
            LeadStatus::NotQualified => "Not Qualified",
        }
    }
}

/// UI-facing pipeline label. Unlike `LeadStatus` this is open vocabulary:
/// besides the well-known labels below it can hold the name of any custom
/// pipeline stage, so it is stored as plain text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct LeadTag(String);

impl LeadTag {
    pub const NOT_CONTACTED: &'static str = "Not Contacted";
    pub const NOT_CONNECTED: &'static str = "Not Connected";
    pub const CONNECTED: &'static str = "Connected";
    pub const FOLLOW_UP: &'static str = "Follow Up";
    pub const MISSED: &'static str = "Missed";
    pub const WON: &'static str = "Won";
    pub const CLOSED: &'static str = "Closed";
    pub const LOST: &'static str = "Lost";
    pub const DROPPED: &'static str = "Dropped";

    pub fn new(label: impl Into<String>) -> Self {
        LeadTag(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is(&self, label: &str) -> bool {
        self.0 == label
    }
}

impl std::fmt::Display for LeadTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeadRequest {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    #[serde(rename = "pipelineId")]
    pub pipeline_id: Option<i64>,
}

/// Partial contact-field update. Lifecycle fields (`status`, `tag`,
/// `call_count`) are not accepted here; they only change through the
/// transition endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLeadRequest {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropLeadRequest {
    pub reason: String,
    pub remarks: String,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachPipelineRequest {
    #[serde(rename = "pipelineId")]
    pub pipeline_id: Option<i64>,
}
