use chrono::Utc;

use crate::db::content_store::ContentStore;
use crate::db::models::ContentType;
use crate::db::settings_repository::{AppSettings, SettingsRepository};
use crate::error::AppError;

/// Prepare a store for use. Runs on every start and never overwrites data
/// an administrator has changed.
///
/// Writes the default settings when none exist, records the running version
/// and registers any missing default content type. Returns whether this was
/// a first install.
pub async fn run(
    content_store: &dyn ContentStore,
    settings_repo: &dyn SettingsRepository,
) -> Result<bool, AppError> {
    let defaults = AppSettings {
        installed_at: Some(Utc::now()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        ..AppSettings::default()
    };

    let first_install = settings_repo.insert_if_missing(&defaults).await?;
    settings_repo.set_version(env!("CARGO_PKG_VERSION")).await?;

    let existing = content_store.list_types().await?;
    for content_type in ContentType::defaults() {
        if existing.iter().any(|t| t.name == content_type.name) {
            continue;
        }
        tracing::info!(name = %content_type.name, "Registering content type");
        content_store.register_type(content_type).await?;
    }

    if first_install {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            "First start: default settings written"
        );
    }

    Ok(first_install)
}
