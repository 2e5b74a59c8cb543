//! Upload route integration tests.
//!
//! Run with: `cargo test -p tubely-api --test video_upload_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{setup_test_app, setup_test_app_with, setup_test_app_with_limit, TEST_BUCKET};
use std::sync::Arc;
use tubely_api::error::ErrorResponse;
use tubely_core::VideoResponse;
use tubely_processing::test_helpers::{FakeMediaToolkit, FlakyVideoRepository};
use uuid::Uuid;

const CLIP: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake mp4 payload";

#[tokio::test]
async fn test_upload_landscape_video_end_to_end() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "holiday").await;
    assert!(video.video_url.is_none());

    let response = app
        .upload(&token, &video.id.to_string(), "video/mp4", CLIP)
        .await;
    response.assert_status_ok();

    let uploaded: VideoResponse = response.json();
    let signed = uploaded.video_url.expect("uploaded video has a signed URL");
    assert!(signed.contains(&format!("/media/{}/landscape/", TEST_BUCKET)));
    assert!(signed.contains(".mp4?expires="));

    let objects = app.stored_objects();
    assert_eq!(objects.len(), 1);
    let key = &objects[0];
    let name = key.strip_prefix("landscape/").unwrap();
    let hex = name.strip_suffix(".mp4").unwrap();
    assert_eq!(hex.len(), 32);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    assert_eq!(app.staging_entries(), 0);

    let media = app.fetch_signed(&signed).await;
    media.assert_status_ok();
    assert_eq!(media.header("content-type"), "video/mp4");
    assert_eq!(media.as_bytes().as_ref(), CLIP);
}

#[tokio::test]
async fn test_upload_portrait_and_other_buckets() {
    let cases = [
        (1080, 1920, "portrait"),
        (640, 480, "other"),
        (1920, 0, "other"),
    ];
    for (width, height, bucket) in cases {
        let app = setup_test_app_with(
            FakeMediaToolkit::with_geometry(width, height),
            Arc::new(tubely_db::InMemoryVideoRepository::new()),
        )
        .await;
        let token = app.token_for(Uuid::new_v4());
        let video = app.create_video(&token, "clip").await;

        app.upload(&token, &video.id.to_string(), "video/mp4", CLIP)
            .await
            .assert_status_ok();

        let objects = app.stored_objects();
        assert_eq!(objects.len(), 1, "{}x{}", width, height);
        assert!(
            objects[0].starts_with(&format!("{}/", bucket)),
            "{}x{} stored as {}",
            width,
            height,
            objects[0]
        );
    }
}

#[tokio::test]
async fn test_content_type_parameters_are_ignored() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;

    app.upload(&token, &video.id.to_string(), "Video/MP4; codecs=avc1", CLIP)
        .await
        .assert_status_ok();
    assert_eq!(app.stored_objects().len(), 1);
}

#[tokio::test]
async fn test_wrong_content_type_rejected_before_staging() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;

    let response = app
        .upload(&token, &video.id.to_string(), "video/quicktime", CLIP)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "INVALID_INPUT");
    assert!(app.stored_objects().is_empty());
    assert_eq!(app.staging_entries(), 0);

    let fetched: VideoResponse = app
        .client()
        .get(&format!("/api/videos/{}", video.id))
        .authorization_bearer(&token)
        .await
        .json();
    assert!(fetched.video_url.is_none());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .upload("not-a-jwt", &video.id.to_string(), "video/mp4", CLIP)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.stored_objects().is_empty());
}

#[tokio::test]
async fn test_non_owner_is_forbidden() {
    let app = setup_test_app().await;
    let owner = app.token_for(Uuid::new_v4());
    let intruder = app.token_for(Uuid::new_v4());
    let video = app.create_video(&owner, "mine").await;

    let response = app
        .upload(&intruder, &video.id.to_string(), "video/mp4", CLIP)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(app.stored_objects().is_empty());
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());

    let response = app
        .upload(&token, &Uuid::new_v4().to_string(), "video/mp4", CLIP)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_video_id_is_bad_request() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());

    let response = app.upload(&token, "12345", "video/mp4", CLIP).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_video_field_is_bad_request() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;

    let form = axum_test::multipart::MultipartForm::new().add_text("title", "no file here");
    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_probe_failure_hides_tool_output_and_cleans_up() {
    let app = setup_test_app_with(
        FakeMediaToolkit::with_geometry(1920, 1080)
            .failing_probe("Invalid data found when processing input"),
        Arc::new(tubely_db::InMemoryVideoRepository::new()),
    )
    .await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;

    let response = app
        .upload(&token, &video.id.to_string(), "video/mp4", CLIP)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "PROBE_FAILED");
    assert!(!response.text().contains("Invalid data found"));
    assert!(app.stored_objects().is_empty());
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_remux_failure_cleans_up_both_files() {
    let app = setup_test_app_with(
        FakeMediaToolkit::with_geometry(1920, 1080).failing_remux("moov atom not found"),
        Arc::new(tubely_db::InMemoryVideoRepository::new()),
    )
    .await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;

    let response = app
        .upload(&token, &video.id.to_string(), "video/mp4", CLIP)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "REMUX_FAILED");
    assert!(app.stored_objects().is_empty());
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;

    let response = app.upload(&token, &video.id.to_string(), "video/mp4", b"").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.stored_objects().is_empty());
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_commit_failure_leaves_orphaned_object() {
    let videos = FlakyVideoRepository::new();
    let app = setup_test_app_with(
        FakeMediaToolkit::with_geometry(1920, 1080),
        Arc::new(videos.clone()),
    )
    .await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;
    videos.set_fail_updates(true);

    let response = app
        .upload(&token, &video.id.to_string(), "video/mp4", CLIP)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "PERSISTENCE_ERROR");
    assert_eq!(app.stored_objects().len(), 1);
    assert_eq!(app.staging_entries(), 0);

    videos.set_fail_updates(false);
    let fetched: VideoResponse = app
        .client()
        .get(&format!("/api/videos/{}", video.id))
        .authorization_bearer(&token)
        .await
        .json();
    assert!(fetched.video_url.is_none());
}

#[tokio::test]
async fn test_reupload_replaces_reference() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "clip").await;
    let id = video.id.to_string();

    let first: VideoResponse = app.upload(&token, &id, "video/mp4", CLIP).await.json();
    let second: VideoResponse = app
        .upload(&token, &id, "video/mp4", b"second take")
        .await
        .json();

    let first_path = helpers::split_signed_url(first.video_url.as_deref().unwrap()).0;
    let second_path = helpers::split_signed_url(second.video_url.as_deref().unwrap()).0;
    assert_ne!(first_path, second_path);

    // The first object is not deleted; the record just stops pointing at it.
    assert_eq!(app.stored_objects().len(), 2);

    let media = app.fetch_signed(second.video_url.as_deref().unwrap()).await;
    assert_eq!(media.as_bytes().as_ref(), b"second take");
}

#[tokio::test]
async fn test_oversized_body_is_rejected_without_leftovers() {
    let app = setup_test_app_with_limit(4 * 1024).await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "long take").await;
    let oversized = vec![0x42u8; 64 * 1024];

    let response = app
        .upload(&token, &video.id.to_string(), "video/mp4", &oversized)
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.stored_objects().is_empty());
    assert_eq!(app.staging_entries(), 0);

    let fetched: VideoResponse = app
        .client()
        .get(&format!("/api/videos/{}", video.id))
        .authorization_bearer(&token)
        .await
        .json();
    assert!(fetched.video_url.is_none());
}

#[tokio::test]
async fn test_body_within_limit_is_accepted() {
    let app = setup_test_app_with_limit(4 * 1024).await;
    let token = app.token_for(Uuid::new_v4());
    let video = app.create_video(&token, "short take").await;

    app.upload(&token, &video.id.to_string(), "video/mp4", CLIP)
        .await
        .assert_status_ok();
    assert_eq!(app.stored_objects().len(), 1);
}
