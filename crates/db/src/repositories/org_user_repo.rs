//! Read-only queries against the `users` directory table.

use herald_core::types::DbId;
use sqlx::PgPool;

/// Resolves the active members of an organization for broadcast fan-out.
pub struct OrgUserRepo;

impl OrgUserRepo {
    /// IDs of every active user in the organization.
    pub async fn list_user_ids(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM users \
             WHERE organization_id = $1 AND is_active = true \
             ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }

    /// IDs of the active users in the organization holding `role`.
    pub async fn list_user_ids_by_role(
        pool: &PgPool,
        organization_id: DbId,
        role: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM users \
             WHERE organization_id = $1 AND is_active = true AND role = $2 \
             ORDER BY id",
        )
        .bind(organization_id)
        .bind(role)
        .fetch_all(pool)
        .await
    }
}
