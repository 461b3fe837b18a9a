//! Caller identification for the inbox endpoints.
//!
//! Authentication happens upstream at the gateway, which forwards the user
//! id in `X-User-Id`. Direct callers may pass `?user_id=` instead.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use herald_core::types::DbId;
use serde::Deserialize;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The user an inbox request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub DbId);

#[derive(Deserialize)]
struct UserIdQuery {
    user_id: Option<String>,
}

fn parse_user_id(raw: &str) -> Option<DbId> {
    raw.trim().parse::<DbId>().ok().filter(|id| *id > 0)
}

impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_user_id);

        let user_id = from_header.or_else(|| {
            Query::<UserIdQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.user_id)
                .and_then(|raw| parse_user_id(&raw))
        });

        user_id
            .map(CallerId)
            .ok_or_else(|| AppError::BadRequest("missing user id".into()))
    }
}
