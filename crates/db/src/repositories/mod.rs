//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod inbox_repo;
pub mod notification_log_repo;
pub mod org_settings_repo;
pub mod org_user_repo;
pub mod preference_repo;
pub mod template_repo;

pub use inbox_repo::InboxRepo;
pub use notification_log_repo::NotificationLogRepo;
pub use org_settings_repo::OrgSettingsRepo;
pub use org_user_repo::OrgUserRepo;
pub use preference_repo::PreferenceRepo;
pub use template_repo::TemplateRepo;
