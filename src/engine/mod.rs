//! Lead lifecycle engine.
//!
//! Owns the rules for moving a lead through its pipeline: call-outcome
//! classification, quick-dial results, manual stage clicks, and the guarded
//! drop flow, plus the derived stage strip. Pure decision logic; the server
//! layer persists the deltas and dispatches the side effects this module
//! emits.

pub mod lifecycle;
pub mod stages;

#[cfg(test)]
mod tests;

pub use lifecycle::{
    can_drop, classify, drop_lead, hit_call, is_dropped, is_follow_up, is_terminal, is_won,
    log_call_outcome, move_to_stage, CallResolution, DropOutcome, LeadState, ReassignmentRequest,
    StageAction, StatusChange, ValidationError,
};
pub use stages::{current_stage_index, effective_stages, DEFAULT_STAGES};
