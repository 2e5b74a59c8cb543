//! Bearer-token identity resolution.
//!
//! The upload pipeline only needs "who is calling"; how that is established is
//! hidden behind [`IdentityResolver`]. The shipped resolver validates HS256 JWTs.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{JwtClaims, JwtIdentityResolver};
pub use middleware::{auth_middleware, AuthState};
pub use models::UserContext;

use async_trait::async_trait;
use tubely_core::AppError;
use uuid::Uuid;

/// Maps a bearer token to a verified user ID, or rejects it with
/// [`AppError::Unauthorized`].
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Uuid, AppError>;
}
