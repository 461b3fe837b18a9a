//! Repository for the `notification_preferences` table.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::preference::{NotificationPreference, SavePreference};

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "id, organization_id, user_id, event_type, channel, target, \
    enabled, severity_min, created_at, updated_at";

/// Provides lookup and save operations for routing preferences.
pub struct PreferenceRepo;

impl PreferenceRepo {
    /// List preferences matching an organization, optional user and event type.
    ///
    /// `organization_id <= 0` and an empty `event_type` disable those
    /// filters. When `user_id` is given, both org-wide rows (`user_id IS
    /// NULL`) and that user's rows match.
    pub async fn list(
        pool: &PgPool,
        organization_id: DbId,
        user_id: Option<DbId>,
        event_type: &str,
    ) -> Result<Vec<NotificationPreference>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_preferences \
             WHERE ($1 <= 0 OR organization_id = $1) \
               AND ($2 = '' OR event_type = $2) \
               AND ($3::BIGINT IS NULL OR user_id IS NULL OR user_id = $3) \
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(organization_id)
            .bind(event_type)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Save a preference.
    ///
    /// A positive `id` updates that row and fails with `RowNotFound` when it
    /// does not exist. Otherwise the row is upserted by scope.
    pub async fn save(
        pool: &PgPool,
        input: &SavePreference,
    ) -> Result<NotificationPreference, sqlx::Error> {
        match input.id.filter(|id| *id > 0) {
            Some(id) => Self::update(pool, id, input).await,
            None => Self::upsert_by_scope(pool, input).await,
        }
    }

    async fn update(
        pool: &PgPool,
        id: DbId,
        input: &SavePreference,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "UPDATE notification_preferences SET \
                organization_id = $2, user_id = $3, event_type = $4, channel = $5, \
                target = $6, enabled = $7, severity_min = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(id)
            .bind(input.organization_id)
            .bind(input.user_id)
            .bind(&input.event_type)
            .bind(&input.channel)
            .bind(&input.target)
            .bind(input.enabled)
            .bind(&input.severity_min)
            .fetch_one(pool)
            .await
    }

    async fn upsert_by_scope(
        pool: &PgPool,
        input: &SavePreference,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences \
                (organization_id, user_id, event_type, channel, target, enabled, severity_min) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT ON CONSTRAINT ux_notification_preferences_scope DO UPDATE SET \
                target = EXCLUDED.target, \
                enabled = EXCLUDED.enabled, \
                severity_min = EXCLUDED.severity_min, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(input.organization_id)
            .bind(input.user_id)
            .bind(&input.event_type)
            .bind(&input.channel)
            .bind(&input.target)
            .bind(input.enabled)
            .bind(&input.severity_min)
            .fetch_one(pool)
            .await
    }
}
