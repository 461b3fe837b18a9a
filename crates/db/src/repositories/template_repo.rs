//! Repository for the `notification_templates` table.

use sqlx::PgPool;

use crate::models::template::{NotificationTemplate, UpsertTemplate};

/// Column list for `notification_templates` queries.
const COLUMNS: &str =
    "id, name, event_type, channel, subject, body, is_default, created_at, updated_at";

/// Provides list/upsert/lookup for stored template overrides.
pub struct TemplateRepo;

impl TemplateRepo {
    /// List templates, most recently updated first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_templates \
             ORDER BY updated_at DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, NotificationTemplate>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Insert a template or replace the one already keyed by `(event_type, channel)`.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertTemplate,
    ) -> Result<NotificationTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_templates \
                (name, event_type, channel, subject, body, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (event_type, channel) DO UPDATE SET \
                name = EXCLUDED.name, \
                subject = EXCLUDED.subject, \
                body = EXCLUDED.body, \
                is_default = EXCLUDED.is_default, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationTemplate>(&query)
            .bind(&input.name)
            .bind(&input.event_type)
            .bind(&input.channel)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(input.is_default)
            .fetch_one(pool)
            .await
    }

    /// Find the override for an event type and channel.
    ///
    /// Rows flagged `is_default` win, then the most recently updated.
    pub async fn find_by_event_and_channel(
        pool: &PgPool,
        event_type: &str,
        channel: &str,
    ) -> Result<Option<NotificationTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_templates \
             WHERE event_type = $1 AND channel = $2 \
             ORDER BY is_default DESC, updated_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, NotificationTemplate>(&query)
            .bind(event_type)
            .bind(channel)
            .fetch_optional(pool)
            .await
    }
}
