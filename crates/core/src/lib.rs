//! Shared domain primitives for the Herald notification service.
//!
//! Nothing in this crate performs I/O. It holds the types, constants and
//! pure policy functions that the persistence, routing and HTTP layers all
//! agree on.

pub mod channels;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod severity;
pub mod status;
pub mod types;
pub mod validation;
