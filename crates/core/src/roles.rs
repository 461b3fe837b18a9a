//! Well-known user role name constants.
//!
//! These must match the `users.role` values owned by the identity service.

pub const ROLE_DEVELOPER: &str = "developer";

/// Role that receives scan broadcasts when the event does not name one.
pub const DEFAULT_SCAN_ROLE: &str = ROLE_DEVELOPER;
