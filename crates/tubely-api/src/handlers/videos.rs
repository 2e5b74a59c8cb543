use crate::auth::UserContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, CreateVideoRequest, Video, VideoResponse};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 255;

#[tracing::instrument(skip(state, request), fields(user_id = %user.user_id))]
pub async fn create_video(
    user: UserContext,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        ))
        .into());
    }

    let video = Video::new(user.user_id, title.to_string(), request.description);
    let video = state.videos.create_video(video).await?;
    tracing::info!(video_id = %video.id, "Video record created");

    Ok((
        StatusCode::CREATED,
        Json(VideoResponse::from_video(video, None)),
    ))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, video_id = %id))]
pub async fn get_video(
    user: UserContext,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = Uuid::parse_str(&id)?;

    let video = state
        .videos
        .get_video(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Forbidden("You don't own this video".to_string()).into());
    }

    let response = state.resolver.sign_video(video).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_videos(
    user: UserContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_videos_for_user(user.user_id).await?;
    let responses = state.resolver.sign_videos(videos).await?;
    Ok(Json(responses))
}
