use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tubely_core::constants::VIDEO_CONTENT_TYPE;
use tubely_core::AppError;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: u64,
    pub signature: String,
}

/// Serve an object from the local backend behind a presigned URL.
///
/// Unknown routes and S3 deployments answer 404; a bad or stale signature is 403.
pub async fn serve_media(
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignedQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let local = state
        .local_media
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Media serving is not enabled".to_string()))?;

    local
        .verify_presigned(&bucket, &key, query.expires, &query.signature)
        .map_err(AppError::from)?;

    let (file, len) = local.open(&bucket, &key).await.map_err(AppError::from)?;
    tracing::debug!(bucket = %bucket, key = %key, size_bytes = len, "Serving media object");

    Ok((
        [
            (header::CONTENT_TYPE, VIDEO_CONTENT_TYPE.to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}
