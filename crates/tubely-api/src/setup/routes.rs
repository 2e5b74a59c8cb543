//! Route configuration and setup

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::{API_PREFIX, MEDIA_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router<()> {
    let auth_state = AuthState {
        identity: state.identity.clone(),
    };

    let protected_routes = protected_routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(Arc::new(auth_state), auth_middleware),
    );

    public_routes(state.clone())
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            &format!("{}/{{bucket}}/{{*key}}", MEDIA_PREFIX),
            get(handlers::media::serve_media),
        )
        .with_state(state)
}

fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::videos::create_video).get(handlers::videos::list_videos),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::videos::get_video),
        )
        .merge(upload_routes(state.clone()))
        .with_state(state)
}

/// The upload route streams bodies up to the configured size instead of axum's
/// default 2 MB cap.
fn upload_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let max_upload = state.config.max_video_size_bytes();

    Router::new()
        .route(
            &format!("{}/video_upload/{{video_id}}", API_PREFIX),
            post(handlers::video_upload::upload_video),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload))
        .with_state(state)
}
