//! Repository for the append-only `notification_logs` table.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification_log::{
    CreateNotificationLog, NotificationLog, NotificationLogFilter,
};

/// Column list for `notification_logs` queries.
const COLUMNS: &str = "id, organization_id, user_id, event_type, channel, target, \
    status, error, payload, created_at";

/// Provides append and filtered listing for the delivery audit trail.
pub struct NotificationLogRepo;

impl NotificationLogRepo {
    /// Append one delivery attempt, returning the generated ID.
    pub async fn insert(pool: &PgPool, input: &CreateNotificationLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notification_logs \
                (organization_id, user_id, event_type, channel, target, status, error, payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(input.organization_id)
        .bind(input.user_id)
        .bind(&input.event_type)
        .bind(&input.channel)
        .bind(&input.target)
        .bind(&input.status)
        .bind(&input.error)
        .bind(&input.payload)
        .fetch_one(pool)
        .await
    }

    /// List attempts matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &NotificationLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_logs \
             WHERE ($1 <= 0 OR organization_id = $1) \
               AND ($2 = '' OR event_type = $2) \
               AND ($3 = '' OR status = $3) \
               AND ($4 = '' OR channel = $4) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, NotificationLog>(&query)
            .bind(filter.organization_id)
            .bind(&filter.event_type)
            .bind(&filter.status)
            .bind(&filter.channel)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
