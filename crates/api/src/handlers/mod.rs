pub mod event;
pub mod inbox;
pub mod log;
pub mod preference;
pub mod template;
