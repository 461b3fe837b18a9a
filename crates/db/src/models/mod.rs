//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and the `Deserialize` input DTOs used for writes.

pub mod notification_log;
pub mod org_settings;
pub mod preference;
pub mod template;
pub mod user_notification;
