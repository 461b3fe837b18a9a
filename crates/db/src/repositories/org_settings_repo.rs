//! Read-only access to the `organization_settings` table.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::org_settings::OrgSettings;

/// Loads per-organization notification toggles.
pub struct OrgSettingsRepo;

impl OrgSettingsRepo {
    /// Fetch the settings row for an organization.
    ///
    /// NULL toggles read as `true` and a NULL `admin_email` as empty.
    /// Returns `None` when no row exists.
    pub async fn find(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Option<OrgSettings>, sqlx::Error> {
        sqlx::query_as::<_, OrgSettings>(
            "SELECT organization_id, \
                    COALESCE(email_notifications, TRUE) AS email_notifications, \
                    COALESCE(vulnerability_alerts, TRUE) AS vulnerability_alerts, \
                    COALESCE(weekly_reports, TRUE) AS weekly_reports, \
                    COALESCE(user_activity_alerts, TRUE) AS user_activity_alerts, \
                    COALESCE(admin_email, '') AS admin_email \
             FROM organization_settings \
             WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_optional(pool)
        .await
    }
}
