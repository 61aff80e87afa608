//! Assignment rules database operations
//!
//! A single row seeded by the migration; updates overwrite it in place.

use sqlx::PgPool;

use crate::models::{AssignmentRules, UpdateRulesRequest};

pub async fn get(pool: &PgPool) -> Result<AssignmentRules, sqlx::Error> {
    sqlx::query_as::<_, AssignmentRules>(
        r#"
        SELECT max_call_attempts, investigation_role, updated_at
        FROM assignment_rules
        WHERE id = 1
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, req: UpdateRulesRequest) -> Result<AssignmentRules, sqlx::Error> {
    sqlx::query_as::<_, AssignmentRules>(
        r#"
        UPDATE assignment_rules
        SET max_call_attempts = $1,
            investigation_role = COALESCE($2, investigation_role),
            updated_at = NOW()
        WHERE id = 1
        RETURNING max_call_attempts, investigation_role, updated_at
        "#,
    )
    .bind(req.max_call_attempts)
    .bind(&req.investigation_role)
    .fetch_one(pool)
    .await
}
