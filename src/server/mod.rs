//! Server-side code for LeadLedger
//!
//! This module contains all backend functionality:
//! - Database access (PostgreSQL via sqlx)
//! - Lifecycle transition endpoints backed by the engine
//! - Reassignment dispatch to the external assignment service
//! - API routes

pub mod assignment;
pub mod db;

use std::sync::Arc;

use axum::http::Method;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::engine;
use crate::engine::StageAction;
use crate::models::*;

use assignment::{ReassignError, ReassignmentService};

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub reassign: Arc<dyn ReassignmentService>,
}

/// Create the Axum router with all API routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // Lead routes
        .route("/api/leads", get(get_leads).post(create_lead))
        .route("/api/leads/{id}", get(get_lead).patch(update_lead).delete(delete_lead))
        .route("/api/leads/{id}/stages", get(get_lead_stages))
        .route("/api/leads/{id}/pipeline", put(set_lead_pipeline))

        // Lifecycle transition routes
        .route("/api/leads/{id}/calls", get(get_lead_calls).post(log_call))
        .route("/api/leads/{id}/hit-call", post(quick_dial))
        .route("/api/leads/{id}/stage", post(move_lead_stage))
        .route("/api/leads/{id}/drop", post(drop_lead))

        // Call log routes
        .route("/api/calls/{id}", delete(delete_call))

        // Assignment rules
        .route("/api/assignment-rules", get(get_rules).put(update_rules))

        // Pipeline routes
        .route("/api/pipelines", get(get_pipelines).post(create_pipeline))
        .route("/api/pipelines/{id}", get(get_pipeline))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// Health check
async fn health_check() -> &'static str {
    "OK"
}

// ============== Lead Routes ==============

async fn get_leads(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Lead>>, StatusCode> {
    db::leads::get_all(&state.db)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn get_lead(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Result<Json<Lead>, StatusCode> {
    db::leads::get_by_id(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLeadRequest>,
) -> Result<Json<Lead>, StatusCode> {
    db::leads::create(&state.db, req)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn update_lead(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
    Json(req): Json<UpdateLeadRequest>,
) -> Result<Json<Lead>, StatusCode> {
    db::leads::update(&state.db, id, req)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn delete_lead(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Result<StatusCode, StatusCode> {
    db::leads::delete(&state.db, id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Debug, Serialize)]
struct LeadStagesResponse {
    stages: Vec<EffectiveStage>,
    state: engine::LeadState,
    #[serde(rename = "canDrop")]
    can_drop: bool,
}

/// The derived stage strip, the collapsed lifecycle state, and the
/// drop-eligibility flag the caller needs to enable or disable its drop
/// action.
async fn get_lead_stages(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Result<Json<LeadStagesResponse>, StatusCode> {
    let lead = db::leads::get_by_id(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let pipeline_stages = match lead.pipeline_id {
        Some(pipeline_id) => db::pipelines::get_stages(&state.db, pipeline_id)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
        None => Vec::new(),
    };

    let rules = db::rules::get(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LeadStagesResponse {
        stages: engine::effective_stages(&lead, &pipeline_stages),
        state: engine::classify(&lead),
        can_drop: engine::can_drop(&lead, &rules),
    }))
}

async fn set_lead_pipeline(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
    Json(req): Json<AttachPipelineRequest>,
) -> Result<Json<Lead>, StatusCode> {
    if let Some(pipeline_id) = req.pipeline_id {
        db::pipelines::get_by_id(&state.db, pipeline_id)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::NOT_FOUND)?;
    }

    db::leads::set_pipeline(&state.db, id, req.pipeline_id)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============== Lifecycle Transition Routes ==============

#[derive(Debug, Serialize)]
struct CallOutcomeResponse {
    lead: Lead,
    #[serde(rename = "callId")]
    call_id: i64,
    message: String,
    #[serde(rename = "followTaskRequested")]
    follow_task_requested: bool,
}

async fn log_call(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
    Json(req): Json<LogCallRequest>,
) -> Result<Json<CallOutcomeResponse>, StatusCode> {
    let lead = db::leads::get_by_id(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let resolution = engine::log_call_outcome(&lead, req.disposition);

    let entry = db::calls::append(
        &state.db,
        id,
        req.disposition,
        req.called_at,
        req.note.as_deref(),
        req.follow_task_requested,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to append call log for lead {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let lead = db::leads::apply_call_outcome(&state.db, id, resolution.change.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to apply call outcome for lead {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if req.follow_task_requested {
        tracing::info!("Follow-up task requested for lead {}", id);
    }

    tracing::info!(
        "Logged call for lead {}: {} -> {}",
        id,
        req.disposition.display_name(),
        lead.status.display_name()
    );

    Ok(Json(CallOutcomeResponse {
        lead,
        call_id: entry.id,
        message: resolution.message,
        follow_task_requested: req.follow_task_requested,
    }))
}

#[derive(Debug, Serialize)]
struct QuickDialResponse {
    lead: Lead,
    message: String,
}

async fn quick_dial(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
    Json(req): Json<HitCallRequest>,
) -> Result<Json<QuickDialResponse>, StatusCode> {
    let lead = db::leads::get_by_id(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let resolution = engine::hit_call(&lead, req.response);

    let lead = db::leads::apply_call_outcome(&state.db, id, resolution.change.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to apply quick dial for lead {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(QuickDialResponse {
        lead,
        message: resolution.message,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum FlowSignal {
    OpenDropFlow,
    OpenCallFlow,
}

#[derive(Debug, Serialize)]
struct StageMoveResponse {
    lead: Option<Lead>,
    signal: Option<FlowSignal>,
}

async fn move_lead_stage(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
    Json(req): Json<MoveToStageRequest>,
) -> Result<Json<StageMoveResponse>, StatusCode> {
    // 404 before resolving, so a click on a deleted lead is not reported as
    // a flow signal.
    let current = db::leads::get_by_id(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    // Settled leads can still be re-staged; worth a trace when it happens.
    if engine::is_terminal(&current) {
        tracing::warn!(
            "Stage move on settled lead {} ({:?})",
            id,
            engine::classify(&current)
        );
    }

    match engine::move_to_stage(&req) {
        StageAction::Apply { change, stage_id } => {
            let lead = db::leads::apply_stage_move(&state.db, id, &change, stage_id)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to apply stage move for lead {}: {}", id, e);
                    StatusCode::INTERNAL_SERVER_ERROR
                })?;
            tracing::info!("Lead {} moved to stage '{}'", id, req.label);
            Ok(Json(StageMoveResponse {
                lead: Some(lead),
                signal: None,
            }))
        }
        StageAction::OpenDropFlow => Ok(Json(StageMoveResponse {
            lead: None,
            signal: Some(FlowSignal::OpenDropFlow),
        })),
        StageAction::OpenCallFlow => Ok(Json(StageMoveResponse {
            lead: None,
            signal: Some(FlowSignal::OpenCallFlow),
        })),
    }
}

#[derive(Debug, Serialize)]
struct DropLeadResponse {
    lead: Lead,
    #[serde(rename = "reassignedTo")]
    reassigned_to: String,
    message: String,
}

async fn drop_lead(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
    Json(req): Json<DropLeadRequest>,
) -> Result<Json<DropLeadResponse>, StatusCode> {
    let lead = db::leads::get_by_id(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let rules = db::rules::get(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let outcome = engine::drop_lead(&lead, &req.reason, &req.remarks, req.confirmed, &rules)
        .map_err(|e| {
            tracing::warn!("Drop rejected for lead {}: {}", id, e);
            StatusCode::UNPROCESSABLE_ENTITY
        })?;

    let lead = db::leads::apply_drop(&state.db, id, &outcome.change, &outcome.reason, &outcome.remarks)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist drop for lead {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    // The drop is already durable; a dispatch failure is logged, not rolled
    // back.
    match state.reassign.reassign(&outcome.reassign).await {
        Ok(()) => {}
        Err(ReassignError::NotConfigured) => {
            tracing::warn!(
                "Lead {} dropped; reassignment to '{}' not dispatched (no assignment service)",
                id,
                outcome.reassign.to_role
            );
        }
        Err(e) => {
            tracing::error!("Reassignment dispatch failed for lead {}: {}", id, e);
        }
    }

    tracing::info!("Lead {} ({}) dropped: {}", id, lead.full_name(), outcome.reason);

    Ok(Json(DropLeadResponse {
        lead,
        reassigned_to: outcome.reassign.to_role,
        message: "Lead dropped and handed to investigation".to_string(),
    }))
}

// ============== Call Log Routes ==============

async fn get_lead_calls(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Result<Json<Vec<CallLogEntry>>, StatusCode> {
    db::calls::get_by_lead(&state.db, id)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn delete_call(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Result<StatusCode, StatusCode> {
    db::calls::delete(&state.db, id)
        .await
        .map(|deleted| if deleted { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND })
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============== Assignment Rules Routes ==============

async fn get_rules(State(state): State<Arc<AppState>>) -> Result<Json<AssignmentRules>, StatusCode> {
    db::rules::get(&state.db)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn update_rules(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateRulesRequest>,
) -> Result<Json<AssignmentRules>, StatusCode> {
    if req.max_call_attempts < 1 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    db::rules::update(&state.db, req)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============== Pipeline Routes ==============

async fn get_pipelines(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Pipeline>>, StatusCode> {
    db::pipelines::get_all(&state.db)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn create_pipeline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePipelineRequest>,
) -> Result<Json<Pipeline>, StatusCode> {
    if req.name.trim().is_empty() || req.stages.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    db::pipelines::create(&state.db, req)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn get_pipeline(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Result<Json<PipelineDetail>, StatusCode> {
    let pipeline = db::pipelines::get_by_id(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let stages = db::pipelines::get_stages(&state.db, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(PipelineDetail {
        id: pipeline.id,
        name: pipeline.name,
        stages,
    }))
}

/// Initialize and start the server
pub async fn run_server(database_url: &str, port: u16) -> anyhow::Result<()> {
    // Initialize database
    let pool = db::init_pool(database_url).await?;

    // Run migrations (non-fatal if already applied)
    if let Err(e) = db::run_migrations(&pool).await {
        tracing::warn!("Migration warning (may be already applied): {}", e);
    }

    // Reassignment dispatch is optional; without it drops still land, they
    // just are not handed to the assignment service.
    let reassign: Arc<dyn ReassignmentService> = match std::env::var("ASSIGNMENT_SERVICE_URL") {
        Ok(url) if !url.is_empty() => {
            tracing::info!("Assignment service configured: {}", url);
            Arc::new(assignment::HttpReassignmentClient::new(
                url,
                std::env::var("ASSIGNMENT_API_KEY").ok(),
            ))
        }
        _ => {
            tracing::warn!("ASSIGNMENT_SERVICE_URL not set; drop reassignment will be logged only");
            Arc::new(assignment::DisabledReassignment)
        }
    };

    let state = AppState { db: pool, reassign };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
