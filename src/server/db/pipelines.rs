//! Pipeline database operations

use sqlx::PgPool;

use crate::models::{CreatePipelineRequest, Pipeline, PipelineStage};

pub async fn get_all(pool: &PgPool) -> Result<Vec<Pipeline>, sqlx::Error> {
    sqlx::query_as::<_, Pipeline>(
        r#"
        SELECT id, name, created_at
        FROM pipelines
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Option<Pipeline>, sqlx::Error> {
    sqlx::query_as::<_, Pipeline>(
        r#"
        SELECT id, name, created_at
        FROM pipelines
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_stages(pool: &PgPool, pipeline_id: i64) -> Result<Vec<PipelineStage>, sqlx::Error> {
    sqlx::query_as::<_, PipelineStage>(
        r#"
        SELECT id, pipeline_id, name, sort_order, is_final
        FROM pipeline_stages
        WHERE pipeline_id = $1
        ORDER BY sort_order ASC
        "#,
    )
    .bind(pipeline_id)
    .fetch_all(pool)
    .await
}

/// Create a pipeline with its ordered stages in one transaction.
pub async fn create(pool: &PgPool, req: CreatePipelineRequest) -> Result<Pipeline, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let pipeline = sqlx::query_as::<_, Pipeline>(
        r#"
        INSERT INTO pipelines (name)
        VALUES ($1)
        RETURNING id, name, created_at
        "#,
    )
    .bind(&req.name)
    .fetch_one(&mut *tx)
    .await?;

    for (position, stage) in req.stages.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO pipeline_stages (pipeline_id, name, sort_order, is_final)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(pipeline.id)
        .bind(&stage.name)
        .bind(position as i32)
        .bind(stage.is_final)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(pipeline)
}
