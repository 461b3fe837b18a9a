use crate::types::DbId;

/// Domain-level failures shared by the persistence, routing and HTTP layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A collaborator the request depends on is not wired in this process.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}
