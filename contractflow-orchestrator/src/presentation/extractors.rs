//! Caller identity extractor
//!
//! Authentication is out of scope for this service; an upstream gateway is
//! expected to put the caller's user id in the `X-User-Id` header. The id must
//! belong to an active user in the directory.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::Response,
};
use uuid::Uuid;

use contractflow_core::domain::directory::{User, UserId};

use crate::presentation::controllers::AppState;
use crate::presentation::errors::error_response;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user making the request
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
}

impl Actor {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

fn unauthorized(message: &str) -> Response {
    error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
}

impl<S> FromRequestParts<S> for Actor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing X-User-Id header"))?;
        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| unauthorized("X-User-Id is not a valid UUID"))?;

        let user = state
            .repositories
            .users
            .find_by_id(&UserId::new(id))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to look up request user");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                )
            })?
            .ok_or_else(|| unauthorized("Unknown user"))?;

        if !user.active {
            return Err(unauthorized("User is inactive"));
        }

        Ok(Actor { user })
    }
}
