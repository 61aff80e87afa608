//! Unit tests for the lifecycle transition rules.
//!
//! Test categories:
//! 1. Disposition classification (partition over all fourteen values)
//! 2. Quick-dial (hit call) transitions
//! 3. Call counting
//! 4. Drop validation and eligibility
//! 5. Manual stage moves
//! 6. Effective-stage read model
//! 7. End-to-end call sequences

use super::*;
use crate::models::{
    AssignmentRules, CallDisposition, DialSignal, Lead, LeadStatus, LeadTag, MoveToStageRequest,
    PipelineStage, StageStatus,
};

fn lead_with(status: LeadStatus, tag: &str, call_count: i32) -> Lead {
    Lead {
        id: 1,
        first_name: Some("Ada".to_string()),
        last_name: Some("Byron".to_string()),
        phone: "+15550100".to_string(),
        email: None,
        company: None,
        status,
        tag: LeadTag::new(tag),
        call_count,
        pipeline_id: None,
        stage_id: None,
        drop_reason: None,
        remarks: None,
        last_call_at: None,
        created_at: None,
        updated_at: None,
    }
}

fn new_lead() -> Lead {
    lead_with(LeadStatus::New, LeadTag::NOT_CONTACTED, 0)
}

fn rules(max_call_attempts: i32) -> AssignmentRules {
    AssignmentRules {
        max_call_attempts,
        ..AssignmentRules::default()
    }
}

/// Mimics what the server applies after a call-classifying operation: the
/// optional status/tag delta plus the unconditional count bump.
fn apply(lead: &mut Lead, resolution: &CallResolution) {
    if let Some(change) = &resolution.change {
        lead.status = change.status;
        lead.tag = change.tag.clone();
    }
    lead.call_count += 1;
}

// ============================================================================
// Disposition classification
// ============================================================================

#[test]
fn follow_up_dispositions_move_lead_to_in_progress() {
    let follow_up = [
        CallDisposition::Interested,
        CallDisposition::FollowUpRequired,
        CallDisposition::CallbackScheduled,
        CallDisposition::DemoScheduled,
        CallDisposition::MeetingScheduled,
        CallDisposition::QuotationSent,
        CallDisposition::Negotiation,
    ];

    for disposition in follow_up {
        let resolution = log_call_outcome(&new_lead(), disposition);
        let change = resolution.change.expect("follow-up disposition must transition");
        assert_eq!(change.status, LeadStatus::InProgress, "{:?}", disposition);
        assert!(change.tag.is(LeadTag::FOLLOW_UP), "{:?}", disposition);
    }
}

#[test]
fn converted_disposition_closes_lead() {
    let resolution = log_call_outcome(&new_lead(), CallDisposition::Converted);
    let change = resolution.change.expect("conversion must transition");
    assert_eq!(change.status, LeadStatus::Closed);
    assert!(change.tag.is(LeadTag::CLOSED));
}

#[test]
fn dead_end_dispositions_mark_lead_lost() {
    let dead_ends = [
        CallDisposition::NotInterested,
        CallDisposition::LostLead,
        CallDisposition::WrongRequirement,
        CallDisposition::DuplicateLead,
        CallDisposition::DoNotCall,
    ];

    for disposition in dead_ends {
        let resolution = log_call_outcome(&new_lead(), disposition);
        let change = resolution.change.expect("dead-end disposition must transition");
        assert_eq!(change.status, LeadStatus::Lost, "{:?}", disposition);
        assert!(change.tag.is(LeadTag::LOST), "{:?}", disposition);
    }
}

#[test]
fn disconnect_on_fresh_lead_marks_not_connected() {
    let resolution = log_call_outcome(&new_lead(), CallDisposition::CallDisconnected);
    let change = resolution.change.expect("fresh lead must transition");
    assert_eq!(change.status, LeadStatus::NotConnected);
    assert!(change.tag.is(LeadTag::NOT_CONNECTED));
}

#[test]
fn disconnect_leaves_engaged_or_settled_leads_alone() {
    let untouched = [
        lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2),
        lead_with(LeadStatus::New, LeadTag::FOLLOW_UP, 1),
        lead_with(LeadStatus::New, LeadTag::CONNECTED, 1),
        lead_with(LeadStatus::Closed, LeadTag::CLOSED, 3),
        lead_with(LeadStatus::Lost, LeadTag::LOST, 3),
    ];

    for lead in untouched {
        let resolution = log_call_outcome(&lead, CallDisposition::CallDisconnected);
        assert!(resolution.change.is_none(), "{:?}/{}", lead.status, lead.tag);
    }
}

#[test]
fn disconnect_on_not_connected_lead_rewrites_the_same_pair() {
    // Not Connected is not part of the exclusion set, so the transition
    // fires again and lands on the identical pair.
    let lead = lead_with(LeadStatus::NotConnected, LeadTag::NOT_CONNECTED, 1);
    let resolution = log_call_outcome(&lead, CallDisposition::CallDisconnected);
    let change = resolution.change.expect("transition fires again");
    assert_eq!(change.status, LeadStatus::NotConnected);
    assert!(change.tag.is(LeadTag::NOT_CONNECTED));
}

#[test]
fn every_disposition_classifies_into_exactly_one_class() {
    // The four classes partition all fourteen dispositions: from a fresh
    // lead each disposition yields exactly one of the three pairs or the
    // disconnect fallthrough pair.
    for disposition in CallDisposition::ALL {
        let resolution = log_call_outcome(&new_lead(), disposition);
        let change = resolution.change.expect("fresh lead always transitions");
        let pair = (change.status, change.tag.as_str().to_string());
        let known = [
            (LeadStatus::InProgress, LeadTag::FOLLOW_UP.to_string()),
            (LeadStatus::Closed, LeadTag::CLOSED.to_string()),
            (LeadStatus::Lost, LeadTag::LOST.to_string()),
            (LeadStatus::NotConnected, LeadTag::NOT_CONNECTED.to_string()),
        ];
        assert!(known.contains(&pair), "{:?} produced {:?}", disposition, pair);
    }
}

// ============================================================================
// Quick-dial (hit call)
// ============================================================================

#[test]
fn connected_hit_call_moves_lead_to_follow_up() {
    let resolution = hit_call(&new_lead(), DialSignal::Connected);
    let change = resolution.change.expect("connected call must transition");
    assert_eq!(change.status, LeadStatus::InProgress);
    assert!(change.tag.is(LeadTag::FOLLOW_UP));
}

#[test]
fn unconnected_hit_call_marks_fresh_lead_not_connected() {
    let resolution = hit_call(&new_lead(), DialSignal::NotConnected);
    let change = resolution.change.expect("fresh lead must transition");
    assert_eq!(change.status, LeadStatus::NotConnected);
    assert!(change.tag.is(LeadTag::NOT_CONNECTED));
}

#[test]
fn unconnected_hit_call_keeps_engaged_lead_in_place() {
    for lead in [
        lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2),
        lead_with(LeadStatus::New, LeadTag::CONNECTED, 1),
        lead_with(LeadStatus::New, LeadTag::FOLLOW_UP, 1),
    ] {
        let resolution = hit_call(&lead, DialSignal::NotConnected);
        assert!(resolution.change.is_none(), "{:?}/{}", lead.status, lead.tag);
    }
}

// ============================================================================
// Call counting
// ============================================================================

#[test]
fn call_count_grows_by_exactly_one_per_attempt() {
    let mut lead = new_lead();

    let sequence = [
        CallDisposition::CallDisconnected,
        CallDisposition::CallDisconnected,
        CallDisposition::Interested,
        CallDisposition::QuotationSent,
        CallDisposition::Converted,
    ];
    for (i, disposition) in sequence.into_iter().enumerate() {
        let resolution = log_call_outcome(&lead, disposition);
        apply(&mut lead, &resolution);
        assert_eq!(lead.call_count, i as i32 + 1);
    }

    let resolution = hit_call(&lead, DialSignal::NotConnected);
    apply(&mut lead, &resolution);
    assert_eq!(lead.call_count, 6);
}

// ============================================================================
// Drop validation and eligibility
// ============================================================================

#[test]
fn drop_requires_a_reason() {
    let lead = lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2);
    let result = drop_lead(&lead, "", "spoke twice, no budget", true, &rules(5));
    assert_eq!(result.unwrap_err(), ValidationError::MissingReason);
}

#[test]
fn drop_requires_remarks() {
    let lead = lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2);
    let result = drop_lead(&lead, "Budget Issue", "", true, &rules(5));
    assert_eq!(result.unwrap_err(), ValidationError::MissingRemarks);
}

#[test]
fn whitespace_only_reason_or_remarks_is_rejected() {
    let lead = lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2);
    assert_eq!(
        drop_lead(&lead, "   ", "No funds", true, &rules(5)).unwrap_err(),
        ValidationError::MissingReason
    );
    assert_eq!(
        drop_lead(&lead, "Budget Issue", "  \n ", true, &rules(5)).unwrap_err(),
        ValidationError::MissingRemarks
    );
}

#[test]
fn unconfirmed_drop_is_rejected() {
    let lead = lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2);
    let result = drop_lead(&lead, "Budget Issue", "No funds", false, &rules(5));
    assert_eq!(result.unwrap_err(), ValidationError::Unconfirmed);
}

#[test]
fn confirmed_drop_marks_dropped_and_requests_reassignment() {
    let lead = lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2);
    let outcome = drop_lead(&lead, "Budget Issue", "No funds", true, &rules(5)).unwrap();

    assert_eq!(outcome.change.status, LeadStatus::Dropped);
    assert!(outcome.change.tag.is(LeadTag::DROPPED));
    assert_eq!(outcome.reason, "Budget Issue");
    assert_eq!(outcome.remarks, "No funds");
    assert_eq!(outcome.reassign.lead_id, lead.id);
    assert_eq!(outcome.reassign.to_role, "Leads Investigation Officer");
}

#[test]
fn can_drop_after_exhausting_call_attempts() {
    let rules = rules(5);

    let fresh = lead_with(LeadStatus::New, LeadTag::NOT_CONTACTED, 4);
    assert!(!can_drop(&fresh, &rules));

    let exhausted = lead_with(LeadStatus::NotConnected, LeadTag::NOT_CONNECTED, 5);
    assert!(can_drop(&exhausted, &rules));
}

#[test]
fn can_drop_any_follow_up_lead_regardless_of_count() {
    let rules = rules(5);

    let tagged = lead_with(LeadStatus::New, LeadTag::FOLLOW_UP, 0);
    assert!(can_drop(&tagged, &rules));

    let in_progress = lead_with(LeadStatus::InProgress, LeadTag::NOT_CONTACTED, 0);
    assert!(can_drop(&in_progress, &rules));

    let missed = lead_with(LeadStatus::New, LeadTag::MISSED, 0);
    assert!(can_drop(&missed, &rules));
}

#[test]
fn ineligible_drop_is_rejected_before_any_side_effect() {
    let lead = lead_with(LeadStatus::New, LeadTag::NOT_CONTACTED, 1);
    let result = drop_lead(&lead, "Budget Issue", "No funds", true, &rules(5));
    assert_eq!(
        result.unwrap_err(),
        ValidationError::NotEligible {
            call_count: 1,
            max_call_attempts: 5
        }
    );
}

// ============================================================================
// Manual stage moves
// ============================================================================

fn target(status: StageStatus, id: Option<i64>) -> MoveToStageRequest {
    MoveToStageRequest {
        label: "stage".to_string(),
        id,
        status,
    }
}

#[test]
fn not_qualified_click_only_opens_the_drop_flow() {
    assert_eq!(move_to_stage(&target(StageStatus::NotQualified, None)), StageAction::OpenDropFlow);
    assert_eq!(
        move_to_stage(&target(StageStatus::NotQualified, Some(9))),
        StageAction::OpenDropFlow
    );
}

#[test]
fn new_lead_and_not_connected_clicks_only_open_the_call_flow() {
    assert_eq!(move_to_stage(&target(StageStatus::NewLead, None)), StageAction::OpenCallFlow);
    assert_eq!(move_to_stage(&target(StageStatus::NotConnected, None)), StageAction::OpenCallFlow);
}

#[test]
fn in_progress_click_applies_follow_up() {
    match move_to_stage(&target(StageStatus::InProgress, None)) {
        StageAction::Apply { change, stage_id } => {
            assert_eq!(change.status, LeadStatus::InProgress);
            assert!(change.tag.is(LeadTag::FOLLOW_UP));
            assert_eq!(stage_id, None);
        }
        other => panic!("expected Apply, got {:?}", other),
    }
}

#[test]
fn won_click_on_pipeline_stage_closes_lead_and_records_stage_id() {
    match move_to_stage(&target(StageStatus::Won, Some(42))) {
        StageAction::Apply { change, stage_id } => {
            assert_eq!(change.status, LeadStatus::Closed);
            assert!(change.tag.is(LeadTag::WON));
            assert_eq!(stage_id, Some(42));
        }
        other => panic!("expected Apply, got {:?}", other),
    }
}

// ============================================================================
// Effective-stage read model
// ============================================================================

#[test]
fn default_stage_strip_tracks_the_lead() {
    let cases = [
        (new_lead(), 0),
        (lead_with(LeadStatus::NotConnected, LeadTag::NOT_CONNECTED, 1), 1),
        (lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 2), 1),
        (lead_with(LeadStatus::Closed, LeadTag::WON, 3), 2),
        (lead_with(LeadStatus::Dropped, LeadTag::DROPPED, 5), 3),
        (lead_with(LeadStatus::Lost, LeadTag::LOST, 4), 3),
        (lead_with(LeadStatus::NotQualified, LeadTag::DROPPED, 5), 3),
    ];

    for (lead, expected) in cases {
        let stages = effective_stages(&lead, &[]);
        assert_eq!(stages.len(), 4);
        assert_eq!(current_stage_index(&lead), expected);
        for (i, stage) in stages.iter().enumerate() {
            assert_eq!(stage.active, i == expected, "stage {} of {:?}", i, lead.status);
            assert_eq!(stage.id, None);
        }
        assert_eq!(stages[0].label, "Not Contacted");
        assert_eq!(stages[3].label, "Lost");
    }
}

#[test]
fn won_takes_precedence_over_dropped_in_the_stage_index() {
    // Both predicates can hold at once; the won branch is checked first.
    let conflicted = lead_with(LeadStatus::Closed, LeadTag::DROPPED, 3);
    assert_eq!(current_stage_index(&conflicted), 2);
}

#[test]
fn pipeline_stages_map_final_to_won_and_match_by_id_or_tag() {
    let stages = vec![
        PipelineStage { id: 10, pipeline_id: 1, name: "Qualify".to_string(), sort_order: 0, is_final: false },
        PipelineStage { id: 11, pipeline_id: 1, name: "Proposal".to_string(), sort_order: 1, is_final: false },
        PipelineStage { id: 12, pipeline_id: 1, name: "Signed".to_string(), sort_order: 2, is_final: true },
    ];

    let mut lead = new_lead();
    lead.pipeline_id = Some(1);
    lead.stage_id = Some(11);

    let strip = effective_stages(&lead, &stages);
    assert_eq!(strip.len(), 3);
    assert_eq!(strip[0].status, StageStatus::InProgress);
    assert_eq!(strip[2].status, StageStatus::Won);
    assert_eq!(strip[2].id, Some(12));
    assert!(!strip[0].active);
    assert!(strip[1].active);

    // A lead carrying the stage name as tag is also active on that stage.
    lead.stage_id = None;
    lead.tag = LeadTag::new("Signed");
    let strip = effective_stages(&lead, &stages);
    assert!(strip[2].active);
    assert!(!strip[1].active);
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn classify_collapses_the_status_tag_pair() {
    let cases = [
        (new_lead(), LeadState::New),
        (lead_with(LeadStatus::NotConnected, LeadTag::NOT_CONNECTED, 1), LeadState::NotConnected),
        (lead_with(LeadStatus::InProgress, LeadTag::FOLLOW_UP, 1), LeadState::InProgress),
        (lead_with(LeadStatus::New, LeadTag::MISSED, 1), LeadState::InProgress),
        (lead_with(LeadStatus::Closed, LeadTag::CLOSED, 2), LeadState::Won),
        (lead_with(LeadStatus::New, LeadTag::WON, 2), LeadState::Won),
        (lead_with(LeadStatus::Lost, LeadTag::LOST, 2), LeadState::Lost),
        (lead_with(LeadStatus::Dropped, LeadTag::DROPPED, 5), LeadState::Dropped),
        (lead_with(LeadStatus::NotQualified, LeadTag::NOT_CONTACTED, 5), LeadState::Dropped),
    ];

    for (lead, expected) in cases {
        assert_eq!(classify(&lead), expected, "{:?}/{}", lead.status, lead.tag);
        assert_eq!(
            is_terminal(&lead),
            matches!(expected, LeadState::Won | LeadState::Lost | LeadState::Dropped)
        );
    }
}

// ============================================================================
// End-to-end call sequences
// ============================================================================

#[test]
fn connected_then_converted_reaches_closed_in_two_calls() {
    let mut lead = new_lead();

    let resolution = hit_call(&lead, DialSignal::Connected);
    apply(&mut lead, &resolution);
    assert_eq!(lead.status, LeadStatus::InProgress);
    assert!(lead.tag.is(LeadTag::FOLLOW_UP));
    assert_eq!(lead.call_count, 1);

    let resolution = log_call_outcome(&lead, CallDisposition::Converted);
    apply(&mut lead, &resolution);
    assert_eq!(lead.status, LeadStatus::Closed);
    assert!(lead.tag.is(LeadTag::CLOSED));
    assert_eq!(lead.call_count, 2);
}

#[test]
fn repeated_unconnected_hit_calls_stay_not_connected_and_keep_counting() {
    let mut lead = new_lead();

    let resolution = hit_call(&lead, DialSignal::NotConnected);
    apply(&mut lead, &resolution);
    assert_eq!(lead.status, LeadStatus::NotConnected);
    assert!(lead.tag.is(LeadTag::NOT_CONNECTED));
    assert_eq!(lead.call_count, 1);

    // Not Connected is absent from the exclusion set, so the second miss
    // re-applies the same pair rather than being skipped.
    let resolution = hit_call(&lead, DialSignal::NotConnected);
    assert!(resolution.change.is_some());
    apply(&mut lead, &resolution);
    assert_eq!(lead.status, LeadStatus::NotConnected);
    assert!(lead.tag.is(LeadTag::NOT_CONNECTED));
    assert_eq!(lead.call_count, 2);
}

// ============================================================================
// Wire labels
// ============================================================================

#[test]
fn irregular_disposition_labels_survive_the_wire() {
    let converted = serde_json::to_string(&CallDisposition::Converted).unwrap();
    assert_eq!(converted, "\"Converted / Sale Closed\"");

    let dnc: CallDisposition = serde_json::from_str("\"Do Not Call (DNC)\"").unwrap();
    assert_eq!(dnc, CallDisposition::DoNotCall);

    let follow_up: CallDisposition = serde_json::from_str("\"Follow-up Required\"").unwrap();
    assert_eq!(follow_up, CallDisposition::FollowUpRequired);
}

#[test]
fn spaced_status_labels_survive_the_wire() {
    assert_eq!(
        serde_json::to_string(&LeadStatus::NotConnected).unwrap(),
        "\"Not Connected\""
    );
    let status: LeadStatus = serde_json::from_str("\"Not Qualified\"").unwrap();
    assert_eq!(status, LeadStatus::NotQualified);
}
