//! Transition rules for a lead's `status`/`tag` pair.
//!
//! Everything in this module is pure: operations take a lead snapshot and
//! return the delta to apply plus any side-effect requests. Persistence and
//! dispatch live in the server layer.

use crate::models::{AssignmentRules, CallDisposition, DialSignal, Lead, LeadStatus, LeadTag, MoveToStageRequest, StageStatus};

/// A status/tag pair produced by a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: LeadStatus,
    pub tag: LeadTag,
}

impl StatusChange {
    fn new(status: LeadStatus, tag: &str) -> Self {
        StatusChange {
            status,
            tag: LeadTag::new(tag),
        }
    }
}

/// Result of classifying a call attempt: the delta to apply (None when the
/// lead stays where it is) and a confirmation message for the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResolution {
    pub change: Option<StatusChange>,
    pub message: String,
}

/// What a manual stage click resolves to. Two of the targets never mutate
/// the lead directly; they only tell the caller which flow to open.
#[derive(Debug, Clone, PartialEq)]
pub enum StageAction {
    Apply {
        change: StatusChange,
        stage_id: Option<i64>,
    },
    /// Dropping needs reason + remarks first, so a Not Qualified click
    /// defers to the drop flow.
    OpenDropFlow,
    /// New Lead / Not Connected are only reachable through an actual call
    /// attempt, so clicking them prompts for one.
    OpenCallFlow,
}

/// Outbound command emitted by a successful drop, to be fulfilled by the
/// external assignment service.
#[derive(Debug, Clone, PartialEq)]
pub struct ReassignmentRequest {
    pub lead_id: i64,
    pub to_role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    pub change: StatusChange,
    pub reason: String,
    pub remarks: String,
    pub reassign: ReassignmentRequest,
}

/// Rejected before any state is touched or side effect fires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a drop reason is required")]
    MissingReason,

    #[error("remarks are mandatory when dropping a lead")]
    MissingRemarks,

    #[error("dropping a lead must be explicitly confirmed")]
    Unconfirmed,

    #[error("lead is not eligible for drop: {call_count} of {max_call_attempts} call attempts made")]
    NotEligible {
        call_count: i32,
        max_call_attempts: i32,
    },
}

// ==================== Derived predicates ====================
//
// `status` and `tag` overlap without being redundant, and these predicates
// are not mutually exclusive. Their precedence is fixed here and they are
// combined in exactly one place (`classify`); no caller re-derives them.

pub fn is_follow_up(lead: &Lead) -> bool {
    lead.tag.is(LeadTag::FOLLOW_UP) || lead.tag.is(LeadTag::MISSED) || lead.status == LeadStatus::InProgress
}

pub fn is_won(lead: &Lead) -> bool {
    lead.status == LeadStatus::Closed || lead.tag.is(LeadTag::WON)
}

pub fn is_dropped(lead: &Lead) -> bool {
    lead.status == LeadStatus::Dropped
        || lead.tag.is(LeadTag::LOST)
        || lead.tag.is(LeadTag::DROPPED)
        || lead.status == LeadStatus::NotQualified
}

/// Collapsed lifecycle state derived from the `status`/`tag` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LeadState {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Not Connected")]
    NotConnected,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Won")]
    Won,
    #[serde(rename = "Lost")]
    Lost,
    #[serde(rename = "Dropped")]
    Dropped,
}

/// The single derivation point for a lead's lifecycle state.
pub fn classify(lead: &Lead) -> LeadState {
    if is_won(lead) {
        LeadState::Won
    } else if lead.status == LeadStatus::Dropped
        || lead.tag.is(LeadTag::DROPPED)
        || lead.status == LeadStatus::NotQualified
    {
        LeadState::Dropped
    } else if lead.status == LeadStatus::Lost || lead.tag.is(LeadTag::LOST) {
        LeadState::Lost
    } else if is_follow_up(lead) {
        LeadState::InProgress
    } else if lead.status == LeadStatus::NotConnected || lead.tag.is(LeadTag::NOT_CONNECTED) {
        LeadState::NotConnected
    } else {
        LeadState::New
    }
}

pub fn is_terminal(lead: &Lead) -> bool {
    matches!(classify(lead), LeadState::Won | LeadState::Lost | LeadState::Dropped)
}

// ==================== Call outcomes ====================

/// Classify a full call disposition. First match wins; the four classes
/// partition all fourteen dispositions.
///
/// The caller must also bump `call_count` by one and append the log entry,
/// whatever the classification.
pub fn log_call_outcome(lead: &Lead, disposition: CallDisposition) -> CallResolution {
    use CallDisposition::*;

    let change = match disposition {
        Interested | FollowUpRequired | CallbackScheduled | DemoScheduled | MeetingScheduled
        | QuotationSent | Negotiation => {
            Some(StatusChange::new(LeadStatus::InProgress, LeadTag::FOLLOW_UP))
        }
        Converted => Some(StatusChange::new(LeadStatus::Closed, LeadTag::CLOSED)),
        NotInterested | LostLead | WrongRequirement | DuplicateLead | DoNotCall => {
            Some(StatusChange::new(LeadStatus::Lost, LeadTag::LOST))
        }
        // The exclusion set deliberately omits Not Connected itself, so a
        // repeated disconnect rewrites the same pair instead of being
        // guarded out.
        CallDisconnected => {
            if in_disconnect_exclusion(lead) {
                None
            } else {
                Some(StatusChange::new(LeadStatus::NotConnected, LeadTag::NOT_CONNECTED))
            }
        }
    };

    let message = match &change {
        Some(c) => format!(
            "Call logged as {}; lead is now {}",
            disposition.display_name(),
            c.status.display_name()
        ),
        None => format!(
            "Call logged as {}; lead stays {}",
            disposition.display_name(),
            lead.status.display_name()
        ),
    };

    CallResolution { change, message }
}

// The set {Follow Up, In Progress, Connected, Closed, Lost} mixes both
// vocabularies: each label is checked against the field it can occur in.
fn in_disconnect_exclusion(lead: &Lead) -> bool {
    matches!(
        lead.status,
        LeadStatus::InProgress | LeadStatus::Closed | LeadStatus::Lost
    ) || lead.tag.is(LeadTag::FOLLOW_UP)
        || lead.tag.is(LeadTag::CONNECTED)
        || lead.tag.is(LeadTag::CLOSED)
        || lead.tag.is(LeadTag::LOST)
}

/// Quick-dial outcome: only a connected / not-connected signal, no
/// disposition. `call_count` is bumped either way.
pub fn hit_call(lead: &Lead, signal: DialSignal) -> CallResolution {
    match signal {
        DialSignal::Connected => CallResolution {
            change: Some(StatusChange::new(LeadStatus::InProgress, LeadTag::FOLLOW_UP)),
            message: "Call connected; lead moved to Follow Up".to_string(),
        },
        DialSignal::NotConnected => {
            if in_hit_exclusion(lead) {
                CallResolution {
                    change: None,
                    message: format!("Call not connected; lead stays {}", lead.status.display_name()),
                }
            } else {
                CallResolution {
                    change: Some(StatusChange::new(LeadStatus::NotConnected, LeadTag::NOT_CONNECTED)),
                    message: "Call not connected; lead marked Not Connected".to_string(),
                }
            }
        }
    }
}

// Narrower than the disconnect set: {Follow Up, In Progress, Connected}.
fn in_hit_exclusion(lead: &Lead) -> bool {
    lead.status == LeadStatus::InProgress
        || lead.tag.is(LeadTag::FOLLOW_UP)
        || lead.tag.is(LeadTag::CONNECTED)
}

// ==================== Manual stage moves ====================

/// Resolve a manual click on an effective stage. Terminal leads are not
/// special-cased; a Won or Dropped lead can still be re-staged.
pub fn move_to_stage(target: &MoveToStageRequest) -> StageAction {
    match target.status {
        StageStatus::NotQualified => StageAction::OpenDropFlow,
        StageStatus::InProgress => StageAction::Apply {
            change: StatusChange::new(LeadStatus::InProgress, LeadTag::FOLLOW_UP),
            stage_id: target.id,
        },
        StageStatus::Won => StageAction::Apply {
            change: StatusChange::new(LeadStatus::Closed, LeadTag::WON),
            stage_id: target.id,
        },
        StageStatus::NewLead | StageStatus::NotConnected => StageAction::OpenCallFlow,
    }
}

// ==================== Dropping ====================

/// Drop becomes available once the lead has used up the configured call
/// attempts, or earlier if it is already in follow-up.
pub fn can_drop(lead: &Lead, rules: &AssignmentRules) -> bool {
    lead.call_count >= rules.max_call_attempts || is_follow_up(lead)
}

/// Validate and resolve an irreversible drop. Remarks are mandatory
/// regardless of reason, and an unconfirmed request mutates nothing.
pub fn drop_lead(
    lead: &Lead,
    reason: &str,
    remarks: &str,
    confirmed: bool,
    rules: &AssignmentRules,
) -> Result<DropOutcome, ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::MissingReason);
    }
    if remarks.trim().is_empty() {
        return Err(ValidationError::MissingRemarks);
    }
    if !confirmed {
        return Err(ValidationError::Unconfirmed);
    }
    if !can_drop(lead, rules) {
        return Err(ValidationError::NotEligible {
            call_count: lead.call_count,
            max_call_attempts: rules.max_call_attempts,
        });
    }

    Ok(DropOutcome {
        change: StatusChange::new(LeadStatus::Dropped, LeadTag::DROPPED),
        reason: reason.to_string(),
        remarks: remarks.to_string(),
        reassign: ReassignmentRequest {
            lead_id: lead.id,
            to_role: rules.investigation_role.clone(),
        },
    })
}
