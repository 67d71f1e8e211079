use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

pub async fn log_audit(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: &str,
    resource: &str,
    resource_id: Option<Uuid>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, resource_id, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action)
    .bind(resource)
    .bind(resource_id)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Audit writes happen after the business commit; a failure here is logged, not returned.
pub async fn record(
    pool: &DbPool,
    user_id: Uuid,
    action: &str,
    resource: &str,
    resource_id: Uuid,
    metadata: Value,
) {
    if let Err(err) = log_audit(
        pool,
        Some(user_id),
        action,
        resource,
        Some(resource_id),
        Some(metadata),
    )
    .await
    {
        tracing::warn!(error = %err, action, resource, "audit log failed");
    }
}
