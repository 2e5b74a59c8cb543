//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets its own temp directory holding local object storage and the
//! staging area, an in-memory record store and a scripted media toolkit.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtIdentityResolver;
use tubely_api::setup::storage::StorageSetup;
use tubely_api::setup::{build_state, routes, Components};
use tubely_core::{
    BaseConfig, Config, StorageBackend, UploadServiceConfig, VideoResponse,
};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::test_helpers::FakeMediaToolkit;
use tubely_storage::LocalStorage;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-with-at-least-32-chars";
pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_BASE_URL: &str = "http://localhost:8091/media";

pub struct TestApp {
    pub server: TestServer,
    pub identity: JwtIdentityResolver,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> PathBuf {
        self.temp_dir.path().join("objects")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.temp_dir.path().join("staging")
    }

    /// Bearer token for a fresh user.
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.identity
            .create_access_token(user_id, chrono::Duration::hours(1))
            .unwrap()
    }

    /// Every stored object, as paths relative to the bucket directory.
    pub fn stored_objects(&self) -> Vec<String> {
        let root = self.storage_root().join(TEST_BUCKET);
        let mut found = Vec::new();
        collect_files(&root, &root, &mut found);
        found.sort();
        found
    }

    pub fn staging_entries(&self) -> usize {
        std::fs::read_dir(self.staging_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn create_video(&self, token: &str, title: &str) -> VideoResponse {
        let response = self
            .server
            .post("/api/videos")
            .authorization_bearer(token)
            .json(&serde_json::json!({ "title": title, "description": "test clip" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<VideoResponse>()
    }

    pub async fn upload(
        &self,
        token: &str,
        video_id: &str,
        content_type: &str,
        body: &[u8],
    ) -> TestResponse {
        let form = MultipartForm::new().add_part(
            "video",
            Part::bytes(body.to_vec())
                .file_name("clip.mp4")
                .mime_type(content_type),
        );
        self.server
            .post(&format!("/api/video_upload/{}", video_id))
            .authorization_bearer(token)
            .multipart(form)
            .await
    }

    /// Follow a signed local media URL through the API.
    pub async fn fetch_signed(&self, signed_url: &str) -> TestResponse {
        let (path, query) = split_signed_url(signed_url);
        let mut request = self.server.get(&path);
        for (name, value) in query {
            request = request.add_query_param(&name, value);
        }
        request.await
    }
}

pub fn split_signed_url(signed_url: &str) -> (String, Vec<(String, String)>) {
    let without_host = signed_url
        .strip_prefix("http://localhost:8091")
        .expect("signed URL should point at the local API");
    let (path, query) = without_host
        .split_once('?')
        .expect("signed URL should carry a query");
    let params = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (path.to_string(), params)
}

fn collect_files(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, found);
        } else if let Ok(relative) = path.strip_prefix(root) {
            found.push(relative.to_string_lossy().into_owned());
        }
    }
}

pub fn create_test_config(temp_dir: &Path) -> Config {
    Config(Box::new(UploadServiceConfig {
        base: BaseConfig {
            server_port: 0,
            environment: "test".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
        },
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some(temp_dir.join("objects").to_string_lossy().into_owned()),
        local_storage_base_url: Some(TEST_BASE_URL.to_string()),
        local_storage_bucket: TEST_BUCKET.to_string(),
        url_signing_secret: TEST_JWT_SECRET.to_string(),
        presigned_url_ttl_secs: 60,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        staging_dir: Some(temp_dir.join("staging")),
        max_video_size_bytes: 8 * 1024 * 1024,
    }))
}

/// App with a 1920x1080 fake toolkit and the in-memory record store.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(
        FakeMediaToolkit::with_geometry(1920, 1080),
        Arc::new(InMemoryVideoRepository::new()),
    )
    .await
}

pub async fn setup_test_app_with(
    toolkit: FakeMediaToolkit,
    videos: Arc<dyn VideoRepository>,
) -> TestApp {
    build_test_app(toolkit, videos, None).await
}

/// Default app whose upload route accepts at most `max_bytes` of request body.
pub async fn setup_test_app_with_limit(max_bytes: usize) -> TestApp {
    build_test_app(
        FakeMediaToolkit::with_geometry(1920, 1080),
        Arc::new(InMemoryVideoRepository::new()),
        Some(max_bytes),
    )
    .await
}

async fn build_test_app(
    toolkit: FakeMediaToolkit,
    videos: Arc<dyn VideoRepository>,
    max_bytes: Option<usize>,
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = create_test_config(temp_dir.path());
    if let Some(max_bytes) = max_bytes {
        config.0.max_video_size_bytes = max_bytes;
    }

    let local = LocalStorage::new(
        temp_dir.path().join("objects"),
        TEST_BASE_URL.to_string(),
        TEST_BUCKET.to_string(),
        TEST_JWT_SECRET.as_bytes(),
    )
    .await
    .expect("Failed to create local storage");

    let identity = JwtIdentityResolver::new(TEST_JWT_SECRET);
    let components = Components {
        videos,
        storage: StorageSetup::local(local),
        toolkit: Arc::new(toolkit),
        identity: Arc::new(identity.clone()),
    };

    let state = build_state(config, components)
        .await
        .expect("Failed to build app state");
    let server = TestServer::new(routes::setup_routes(state)).expect("Failed to start test server");

    TestApp {
        server,
        identity,
        temp_dir,
    }
}
