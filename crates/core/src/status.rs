//! Delivery attempt status values written to `notification_logs.status`.

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";
