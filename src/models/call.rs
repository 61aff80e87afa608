use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged contact attempt. Append-only: rows are never edited after
/// creation, only deleted whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct CallLogEntry {
    pub id: i64,
    #[serde(rename = "leadId")]
    pub lead_id: i64,
    pub disposition: CallDisposition,
    #[serde(rename = "calledAt")]
    pub called_at: DateTime<Utc>,
    pub note: Option<String>,
    #[serde(rename = "followTaskRequested")]
    pub follow_task_requested: bool,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Outcome classification selected after a call attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "call_disposition")]
pub enum CallDisposition {
    #[serde(rename = "Interested")]
    #[sqlx(rename = "Interested")]
    Interested,
    #[serde(rename = "Not Interested")]
    #[sqlx(rename = "Not Interested")]
    NotInterested,
    #[serde(rename = "Follow-up Required")]
    #[sqlx(rename = "Follow-up Required")]
    FollowUpRequired,
    #[serde(rename = "Callback Scheduled")]
    #[sqlx(rename = "Callback Scheduled")]
    CallbackScheduled,
    #[serde(rename = "Demo Scheduled")]
    #[sqlx(rename = "Demo Scheduled")]
    DemoScheduled,
    #[serde(rename = "Meeting Scheduled")]
    #[sqlx(rename = "Meeting Scheduled")]
    MeetingScheduled,
    #[serde(rename = "Quotation Sent")]
    #[sqlx(rename = "Quotation Sent")]
    QuotationSent,
    #[serde(rename = "Negotiation")]
    #[sqlx(rename = "Negotiation")]
    Negotiation,
    #[serde(rename = "Converted / Sale Closed")]
    #[sqlx(rename = "Converted / Sale Closed")]
    Converted,
    #[serde(rename = "Lost Lead")]
    #[sqlx(rename = "Lost Lead")]
    LostLead,
    #[serde(rename = "Call Disconnected")]
    #[sqlx(rename = "Call Disconnected")]
    CallDisconnected,
    #[serde(rename = "Wrong Requirement")]
    #[sqlx(rename = "Wrong Requirement")]
    WrongRequirement,
    #[serde(rename = "Duplicate Lead")]
    #[sqlx(rename = "Duplicate Lead")]
    DuplicateLead,
    #[serde(rename = "Do Not Call (DNC)")]
    #[sqlx(rename = "Do Not Call (DNC)")]
    DoNotCall,
}

impl CallDisposition {
    pub const ALL: [CallDisposition; 14] = [
        CallDisposition::Interested,
        CallDisposition::NotInterested,
        CallDisposition::FollowUpRequired,
        CallDisposition::CallbackScheduled,
        CallDisposition::DemoScheduled,
        CallDisposition::MeetingScheduled,
        CallDisposition::QuotationSent,
        CallDisposition::Negotiation,
        CallDisposition::Converted,
        CallDisposition::LostLead,
        CallDisposition::CallDisconnected,
        CallDisposition::WrongRequirement,
        CallDisposition::DuplicateLead,
        CallDisposition::DoNotCall,
    ];

    pub fn display_name(&self) -> &str {
        match self {
            CallDisposition::Interested => "Interested",
            CallDisposition::NotInterested => "Not Interested",
            CallDisposition::FollowUpRequired => "Follow-up Required",
            CallDisposition::CallbackScheduled => "Callback Scheduled",
            CallDisposition::DemoScheduled => "Demo Scheduled",
            CallDisposition::MeetingScheduled => "Meeting Scheduled",
            CallDisposition::QuotationSent => "Quotation Sent",
            CallDisposition::Negotiation => "Negotiation",
            CallDisposition::Converted => "Converted / Sale Closed",
            CallDisposition::LostLead => "Lost Lead",
            CallDisposition::CallDisconnected => "Call Disconnected",
            CallDisposition::WrongRequirement => "Wrong Requirement",
            CallDisposition::DuplicateLead => "Duplicate Lead",
            CallDisposition::DoNotCall => "Do Not Call (DNC)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogCallRequest {
    pub disposition: CallDisposition,
    #[serde(rename = "calledAt")]
    pub called_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    #[serde(rename = "followTaskRequested", default)]
    pub follow_task_requested: bool,
}

/// Binary signal from the quick-dial action, which collects no full
/// disposition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DialSignal {
    Connected,
    NotConnected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitCallRequest {
    pub response: DialSignal,
}
