//! Derived effective-stage read model.

use crate::models::{EffectiveStage, Lead, LeadTag, PipelineStage, StageStatus};

use super::lifecycle::{is_dropped, is_follow_up, is_won};

/// The built-in four-stage model used when no custom pipeline is attached.
pub const DEFAULT_STAGES: [(&str, StageStatus); 4] = [
    ("Not Contacted", StageStatus::NewLead),
    ("Contacted", StageStatus::InProgress),
    ("Closed", StageStatus::Won),
    ("Lost", StageStatus::NotQualified),
];

/// Index into the default stage list the lead currently sits on.
pub fn current_stage_index(lead: &Lead) -> usize {
    if is_won(lead) {
        2
    } else if is_dropped(lead) {
        3
    } else if is_follow_up(lead) || lead.tag.is(LeadTag::NOT_CONNECTED) {
        1
    } else {
        0
    }
}

/// Compute the ordered stage strip for a lead. With pipeline stages, each
/// maps onto Won (final) or In Progress, and is active when the lead points
/// at it by id or carries its name as tag. Without, the default four-stage
/// model applies with `active` derived from the stage index.
pub fn effective_stages(lead: &Lead, pipeline_stages: &[PipelineStage]) -> Vec<EffectiveStage> {
    if pipeline_stages.is_empty() {
        let index = current_stage_index(lead);
        DEFAULT_STAGES
            .iter()
            .enumerate()
            .map(|(i, (label, status))| EffectiveStage {
                label: label.to_string(),
                id: None,
                status: *status,
                active: i == index,
            })
            .collect()
    } else {
        pipeline_stages
            .iter()
            .map(|stage| EffectiveStage {
                label: stage.name.clone(),
                id: Some(stage.id),
                status: if stage.is_final {
                    StageStatus::Won
                } else {
                    StageStatus::InProgress
                },
                active: lead.stage_id == Some(stage.id) || lead.tag.is(&stage.name),
            })
            .collect()
    }
}
