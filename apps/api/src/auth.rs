//! Authenticated principal extraction. Identity is owned by the upstream
//! gateway; the pipeline only needs an opaque user id per invocation, read
//! from the `x-user-id` header the gateway injects.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

const USER_ID_HEADER: &str = "x-user-id";

/// The opaque principal id attached to every pipeline invocation.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| AuthenticatedUser(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}
