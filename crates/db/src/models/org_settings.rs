//! Organization notification settings read model.

use herald_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Per-organization notification toggles from `organization_settings`.
///
/// Columns are nullable upstream; the repository coalesces a NULL toggle to
/// `true`, so only an explicit `false` switches a notification kind off.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct OrgSettings {
    pub organization_id: DbId,
    pub email_notifications: bool,
    pub vulnerability_alerts: bool,
    pub weekly_reports: bool,
    pub user_activity_alerts: bool,
    pub admin_email: String,
}
