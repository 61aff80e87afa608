use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Singleton configuration row consumed by the drop-eligibility guard and
/// the drop reassignment side effect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct AssignmentRules {
    #[serde(rename = "maxCallAttempts")]
    pub max_call_attempts: i32,
    #[serde(rename = "investigationRole")]
    pub investigation_role: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AssignmentRules {
    fn default() -> Self {
        AssignmentRules {
            max_call_attempts: 5,
            investigation_role: "Leads Investigation Officer".to_string(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRulesRequest {
    #[serde(rename = "maxCallAttempts")]
    pub max_call_attempts: i32,
    #[serde(rename = "investigationRole")]
    pub investigation_role: Option<String>,
}
