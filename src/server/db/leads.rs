//! Lead database operations
//!
//! Lifecycle fields (`status`, `tag`, `call_count`) are only written by the
//! `apply_*` functions below, each of which persists one engine transition
//! in a single UPDATE so a racing reader never sees a partial delta.

use sqlx::PgPool;

use crate::engine::StatusChange;
use crate::models::{CreateLeadRequest, Lead, UpdateLeadRequest};

pub async fn get_all(pool: &PgPool) -> Result<Vec<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        SELECT id, first_name, last_name, phone, email, company,
               status, tag, call_count, pipeline_id, stage_id,
               drop_reason, remarks, last_call_at, created_at, updated_at
        FROM leads
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Option<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        SELECT id, first_name, last_name, phone, email, company,
               status, tag, call_count, pipeline_id, stage_id,
               drop_reason, remarks, last_call_at, created_at, updated_at
        FROM leads
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, req: CreateLeadRequest) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads (first_name, last_name, phone, email, company, pipeline_id, status, tag)
        VALUES ($1, $2, $3, $4, $5, $6, 'New', 'Not Contacted')
        RETURNING id, first_name, last_name, phone, email, company,
                  status, tag, call_count, pipeline_id, stage_id,
                  drop_reason, remarks, last_call_at, created_at, updated_at
        "#,
    )
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.phone)
    .bind(&req.email)
    .bind(&req.company)
    .bind(req.pipeline_id)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: i64, req: UpdateLeadRequest) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            phone = COALESCE($4, phone),
            email = COALESCE($5, email),
            company = COALESCE($6, company),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, first_name, last_name, phone, email, company,
                  status, tag, call_count, pipeline_id, stage_id,
                  drop_reason, remarks, last_call_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.phone)
    .bind(&req.email)
    .bind(&req.company)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM leads WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Persist a call-classifying transition: bump the attempt counter, stamp
/// the call time, and apply the status/tag delta when the engine produced
/// one.
pub async fn apply_call_outcome(
    pool: &PgPool,
    id: i64,
    change: Option<&StatusChange>,
) -> Result<Lead, sqlx::Error> {
    match change {
        Some(change) => {
            sqlx::query_as::<_, Lead>(
                r#"
                UPDATE leads
                SET status = $2, tag = $3,
                    call_count = call_count + 1, last_call_at = NOW(), updated_at = NOW()
                WHERE id = $1
                RETURNING id, first_name, last_name, phone, email, company,
                          status, tag, call_count, pipeline_id, stage_id,
                          drop_reason, remarks, last_call_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(change.status)
            .bind(&change.tag)
            .fetch_one(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Lead>(
                r#"
                UPDATE leads
                SET call_count = call_count + 1, last_call_at = NOW(), updated_at = NOW()
                WHERE id = $1
                RETURNING id, first_name, last_name, phone, email, company,
                          status, tag, call_count, pipeline_id, stage_id,
                          drop_reason, remarks, last_call_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .fetch_one(pool)
            .await
        }
    }
}

/// Persist a manual stage move. `stage_id` is written only for
/// pipeline-driven targets.
pub async fn apply_stage_move(
    pool: &PgPool,
    id: i64,
    change: &StatusChange,
    stage_id: Option<i64>,
) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads
        SET status = $2, tag = $3,
            stage_id = COALESCE($4, stage_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, first_name, last_name, phone, email, company,
                  status, tag, call_count, pipeline_id, stage_id,
                  drop_reason, remarks, last_call_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(change.status)
    .bind(&change.tag)
    .bind(stage_id)
    .fetch_one(pool)
    .await
}

/// Persist a confirmed drop with its mandatory reason and remarks.
pub async fn apply_drop(
    pool: &PgPool,
    id: i64,
    change: &StatusChange,
    reason: &str,
    remarks: &str,
) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads
        SET status = $2, tag = $3, drop_reason = $4, remarks = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING id, first_name, last_name, phone, email, company,
                  status, tag, call_count, pipeline_id, stage_id,
                  drop_reason, remarks, last_call_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(change.status)
    .bind(&change.tag)
    .bind(reason)
    .bind(remarks)
    .fetch_one(pool)
    .await
}

/// Attach or detach a custom pipeline. Switching pipelines clears the
/// stage pointer; the stage strip falls back to the default model until the
/// next stage move.
pub async fn set_pipeline(
    pool: &PgPool,
    id: i64,
    pipeline_id: Option<i64>,
) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads
        SET pipeline_id = $2, stage_id = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING id, first_name, last_name, phone, email, company,
                  status, tag, call_count, pipeline_id, stage_id,
                  drop_reason, remarks, last_call_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(pipeline_id)
    .fetch_one(pool)
    .await
}
