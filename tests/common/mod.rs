#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;

use toolshed::app::AppState;
use toolshed::config::AppConfig;
use toolshed::db::content_store::ContentStore;
use toolshed::db::memory_store::MemoryContentStore;
use toolshed::db::models::{ContentStatus, NewContent};
use toolshed::db::settings_repository::MemorySettingsRepository;

pub const SITE_URL: &str = "https://x.test";

/// Router wired to in-memory stores, bootstrapped the same way `main` does.
pub struct TestEnv {
    pub router: Router,
    pub content_store: Arc<MemoryContentStore>,
    pub settings_repo: Arc<MemorySettingsRepository>,
}

impl TestEnv {
    pub async fn start() -> Self {
        let content_store = Arc::new(MemoryContentStore::new());
        let settings_repo = Arc::new(MemorySettingsRepository::new());

        toolshed::install::run(content_store.as_ref(), settings_repo.as_ref())
            .await
            .expect("Install bootstrap failed");

        let config = AppConfig {
            site_url: SITE_URL.to_string(),
            session_secret: Some("integration-test-secret".to_string()),
            ..AppConfig::default()
        };

        let app_state = AppState::new(&config, content_store.clone(), settings_repo.clone());
        let router = toolshed::api::routes::build_router(app_state);

        Self {
            router,
            content_store,
            settings_repo,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .build(self.router.clone())
    }

    /// Helper: insert a content item directly into the store.
    pub async fn add_content(&self, type_name: &str, slug: &str, title: &str) {
        self.content_store
            .create(NewContent {
                title: title.to_string(),
                slug: Some(slug.to_string()),
                type_name: type_name.to_string(),
                status: ContentStatus::Publish,
            })
            .await
            .expect("Failed to insert content");
    }
}

/// Log in as a demo user (password equals username) and return the
/// anti-forgery token of the new session.
pub async fn login(server: &axum_test::TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "username": username,
            "password": username,
        }))
        .await;

    response.json::<serde_json::Value>()["csrf_token"]
        .as_str()
        .expect("Login response without csrf_token")
        .to_string()
}

/// The anti-forgery header for `token`.
pub fn csrf(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-csrf-token"),
        HeaderValue::from_str(token).expect("Invalid header value"),
    )
}
