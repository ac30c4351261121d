//! # Delete Executor
//!
//! Applies [`stockbook_core::RELATIONS`] when a tenant-owned row is
//! deleted.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                 │
//! │    1. Row exists for this tenant?          no  → NotFound              │
//! │    2. For every RESTRICT relation:                                     │
//! │         COUNT children referencing the row  > 0 → DeleteRestricted     │
//! │    3. DELETE the row                                                   │
//! │         CASCADE / SET NULL children handled by ON DELETE clauses       │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Children of a tenant's row can only belong to that same tenant, so the
//! restrict counts in step 2 are tenant-scoped through the parent check in
//! step 1.

use sqlx::SqlitePool;
use stockbook_core::relations::restrictions_on;
use stockbook_core::{CoreError, Entity, TenantId};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};

/// Deletes a row of a tenant-rooted table (product, supplier, customer).
pub(crate) async fn delete_owned(
    pool: &SqlitePool,
    tenant_id: &TenantId,
    entity: Entity,
    id: &str,
) -> DbResult<()> {
    if !matches!(entity, Entity::Product | Entity::Supplier | Entity::Customer) {
        return Err(DbError::Internal(format!(
            "{} rows are not deleted directly",
            entity
        )));
    }

    debug!(tenant = %tenant_id, entity = %entity, id = %id, "Deleting");

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    // Take the write lock first so the restrict counts cannot go stale
    let claimed = sqlx::query(&format!(
        "UPDATE {} SET updated_at = updated_at WHERE id = ?1 AND tenant_id = ?2",
        entity.table()
    ))
    .bind(id)
    .bind(tenant_id.as_str())
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        return Err(DbError::not_found(entity.name(), id));
    }

    for relation in restrictions_on(entity) {
        let dependents: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            relation.child.table(),
            relation.foreign_key
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if dependents > 0 {
            warn!(
                tenant = %tenant_id,
                entity = %entity,
                id = %id,
                dependent = %relation.child,
                dependents,
                "Delete restricted"
            );
            return Err(CoreError::DeleteRestricted {
                entity: entity.name().to_string(),
                id: id.to_string(),
                dependent_entity: relation.child.name().to_string(),
                dependents,
            }
            .into());
        }
    }

    sqlx::query(&format!(
        "DELETE FROM {} WHERE id = ?1 AND tenant_id = ?2",
        entity.table()
    ))
    .bind(id)
    .bind(tenant_id.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    info!(tenant = %tenant_id, entity = %entity, id = %id, "Deleted");
    Ok(())
}
