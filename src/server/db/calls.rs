//! Call log database operations
//!
//! The log is append-only: rows are inserted and deleted whole, never
//! updated.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{CallDisposition, CallLogEntry};

pub async fn append(
    pool: &PgPool,
    lead_id: i64,
    disposition: CallDisposition,
    called_at: Option<DateTime<Utc>>,
    note: Option<&str>,
    follow_task_requested: bool,
) -> Result<CallLogEntry, sqlx::Error> {
    sqlx::query_as::<_, CallLogEntry>(
        r#"
        INSERT INTO call_log (lead_id, disposition, called_at, note, follow_task_requested)
        VALUES ($1, $2, COALESCE($3, NOW()), $4, $5)
        RETURNING id, lead_id, disposition, called_at, note, follow_task_requested, created_at
        "#,
    )
    .bind(lead_id)
    .bind(disposition)
    .bind(called_at)
    .bind(note)
    .bind(follow_task_requested)
    .fetch_one(pool)
    .await
}

pub async fn get_by_lead(pool: &PgPool, lead_id: i64) -> Result<Vec<CallLogEntry>, sqlx::Error> {
    sqlx::query_as::<_, CallLogEntry>(
        r#"
        SELECT id, lead_id, disposition, called_at, note, follow_task_requested, created_at
        FROM call_log
        WHERE lead_id = $1
        ORDER BY called_at DESC
        "#,
    )
    .bind(lead_id)
    .fetch_all(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM call_log WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
