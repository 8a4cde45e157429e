//! Test helpers: build AppState and router for integration tests.
//!
//! The catalog is a `MemoryStore`, storage is `LocalStorage` on a temp dir and
//! ffprobe/ffmpeg are replaced by fakes, so no database or media tools are needed.

#![allow(dead_code)]

pub mod auth;
pub mod media;

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use themtube_api::setup::routes::setup_routes;
use themtube_api::setup::services::{build_state, Backends};
use themtube_api::AppState;
use themtube_core::config::{AuthConfig, Config, DatabaseSettings, ServerConfig, VideoConfig};
use themtube_db::MemoryStore;
use themtube_processing::HlsTranscoder;
use themtube_storage::LocalStorage;

pub use themtube_api::constants::api_path;

pub const TEST_SECRET_KEY: &str = "test-secret-key-that-is-at-least-32-chars";
pub const TEST_PUBLIC_BASE_URL: &str = "http://videos.test";
pub const TEST_MAX_VIDEO_BYTES: usize = 64 * 1024;

pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryStore,
    pub storage: Arc<LocalStorage>,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Poll until the video is available or gone; returns whether it became available.
    pub async fn wait_for_transcode(&self, id: uuid::Uuid) -> bool {
        use themtube_db::VideoCatalog;

        for _ in 0..200 {
            match self.store.get_video(id).await.expect("store read failed") {
                Some(video) if video.available => return true,
                None => return false,
                Some(_) => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        panic!("video {} was neither transcoded nor removed in time", id);
    }
}

pub fn test_config(video_directory: &str) -> Config {
    Config {
        server: ServerConfig {
            version: "1.0".to_string(),
            release_id: "0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            public_base_url: TEST_PUBLIC_BASE_URL.to_string(),
        },
        auth: AuthConfig {
            secret_key: TEST_SECRET_KEY.to_string(),
            jwt_algorithm: "HS256".to_string(),
            access_token_expire_days: 7,
        },
        video: VideoConfig {
            video_directory: video_directory.to_string(),
            max_video_size_bytes: TEST_MAX_VIDEO_BYTES,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            hls_segment_duration: 10,
            max_concurrent_transcodes: 2,
            job_queue_size: 16,
            transcode_max_attempts: 1,
            transcode_retry_base_delay_ms: 10,
        },
        database: DatabaseSettings {
            database_url: "postgres://unused".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 1,
        },
    }
}

/// App whose transcoder succeeds.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(media::FakeTranscoder), |_| {}).await
}

pub async fn setup_test_app_with(
    transcoder: Arc<dyn HlsTranscoder>,
    customize: impl FnOnce(&mut Config),
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let video_directory = temp_dir.path().to_string_lossy().to_string();

    let mut config = test_config(&video_directory);
    customize(&mut config);

    let store = MemoryStore::new();
    let storage = Arc::new(
        LocalStorage::new(temp_dir.path())
            .await
            .expect("Failed to create local storage"),
    );

    let state = build_state(
        &config,
        Backends {
            users: Arc::new(store.clone()),
            videos: Arc::new(store.clone()),
            storage: storage.clone(),
            probe: Arc::new(media::FakeProbe),
            transcoder,
        },
    )
    .expect("Failed to build state");

    let app = setup_routes(&config, state.clone()).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        store,
        storage,
        state,
        _temp_dir: temp_dir,
    }
}
