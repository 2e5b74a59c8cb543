use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use tubely_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Verified caller, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Uuid,
}

// Extracted from parts rather than `Extension` so it can sit next to `Multipart`.
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<UserContext>().copied().ok_or_else(|| {
            HttpAppError(AppError::Unauthorized(
                "Authentication context missing".to_string(),
            ))
            .into_response()
        })
    }
}
