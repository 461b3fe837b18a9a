//! Repository for the `user_notifications` (in-app inbox) table.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::user_notification::{CreateUserNotification, InboxPage, UserNotification};

/// Column list for `user_notifications` queries.
const COLUMNS: &str = "id, user_id, organization_id, title, message, type, severity, \
    action_url, payload, read, created_at, read_at";

/// Provides create, paging and read-state transitions for inbox rows.
pub struct InboxRepo;

impl InboxRepo {
    /// Create an unread inbox entry.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUserNotification,
    ) -> Result<UserNotification, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_notifications \
                (user_id, organization_id, title, message, type, severity, action_url, payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserNotification>(&query)
            .bind(input.user_id)
            .bind(input.organization_id)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.notification_type)
            .bind(&input.severity)
            .bind(&input.action_url)
            .bind(&input.payload)
            .fetch_one(pool)
            .await
    }

    /// List one page of a user's inbox, newest first.
    ///
    /// `organization_id <= 0` matches every organization. The returned
    /// counts ignore `unread_only` and paging.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        organization_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<InboxPage, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_notifications \
             WHERE user_id = $1 \
               AND ($2 <= 0 OR organization_id = $2) \
               AND ($3 = false OR read = false) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        let notifications = sqlx::query_as::<_, UserNotification>(&query)
            .bind(user_id)
            .bind(organization_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let (total, unread_count): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE read = false) \
             FROM user_notifications \
             WHERE user_id = $1 AND ($2 <= 0 OR organization_id = $2)",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(pool)
        .await?;

        Ok(InboxPage {
            notifications,
            total,
            unread_count,
        })
    }

    /// Mark a single entry as read.
    ///
    /// Returns `true` if the entry exists for the given user, `false`
    /// otherwise. Re-reading an already read entry keeps its `read_at`.
    pub async fn mark_read(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_notifications \
             SET read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a user's unread entries as read, returning how many changed.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_notifications \
             SET read = true, read_at = NOW() \
             WHERE user_id = $1 AND read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete an entry owned by the user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
