use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::api::links::SiteLinks;
use crate::config::AppConfig;
use crate::db::content_store::ContentStore;
use crate::db::settings_repository::SettingsRepository;

/// Shared state handed to every handler.
///
/// Built once at startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub content_store: Arc<dyn ContentStore>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub links: SiteLinks,
    /// Signs the session cookie.
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        content_store: Arc<dyn ContentStore>,
        settings_repo: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            content_store,
            settings_repo,
            links: SiteLinks::new(&config.site_url, &config.admin_path),
            cookie_key: cookie_key(config.session_secret.as_deref()),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie signing key from `secret`, or generate a random one.
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            tracing::warn!("No session secret configured; sessions will not survive a restart");
            Key::generate()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_is_stable_for_secret() {
        let a = cookie_key(Some("correct horse battery staple"));
        let b = cookie_key(Some("correct horse battery staple"));
        let c = cookie_key(Some("another secret"));

        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }

    #[test]
    fn test_cookie_key_generated_without_secret() {
        assert_ne!(cookie_key(None).master(), cookie_key(None).master());
    }
}
