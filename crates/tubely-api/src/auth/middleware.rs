use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

use super::{IdentityResolver, UserContext};
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<dyn IdentityResolver>,
}

fn reject(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return reject("Missing authorization header"),
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => return reject("Invalid authorization header format"),
    };

    match auth_state.identity.resolve(token).await {
        Ok(user_id) => {
            tracing::debug!(user_id = %user_id, "Request authenticated");
            request.extensions_mut().insert(UserContext { user_id });
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
