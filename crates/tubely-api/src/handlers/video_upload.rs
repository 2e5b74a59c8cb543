use crate::auth::UserContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::AppError;
use uuid::Uuid;

/// Multipart field carrying the video bytes.
pub const VIDEO_FIELD: &str = "video";

fn body_too_large(state: &AppState) -> AppError {
    AppError::PayloadTooLarge(format!(
        "Upload exceeds the {} byte limit",
        state.config.max_video_size_bytes()
    ))
}

fn multipart_failure(state: &AppState, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        body_too_large(state)
    } else {
        AppError::InvalidInput(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// `POST /api/video_upload/{video_id}`: replace the video's stored object.
///
/// The form part is streamed straight into the staging area; it is never buffered
/// in memory. Responds with the updated record and a freshly signed URL.
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id, video_id = %video_id))]
pub async fn upload_video(
    user: UserContext,
    Path(video_id): Path<String>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_failure(&state, e))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let overflowed = Arc::new(AtomicBool::new(false));
        let flag = overflowed.clone();
        let mut body = StreamReader::new(Box::pin(field.map_err(move |e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                flag.store(true, Ordering::Relaxed);
            }
            io::Error::other(e)
        })));

        let outcome = state
            .orchestrator
            .upload_video(video_id, user.user_id, content_type.as_deref(), &mut body)
            .await;
        if overflowed.load(Ordering::Relaxed) {
            return Err(body_too_large(&state).into());
        }
        let video = outcome?;

        let response = state.resolver.sign_video(video).await?;
        return Ok(Json(response));
    }

    Err(AppError::InvalidInput(format!("Missing '{}' form field", VIDEO_FIELD)).into())
}
