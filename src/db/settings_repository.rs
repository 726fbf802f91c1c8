use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::memory_store::lock;
use crate::error::AppError;

/// Application-level settings, stored as a single key-value document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Settings document key (always "global").
    pub key: String,
    /// Master switch for the tool directory.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub debug_mode: bool,
    /// Ids of the tools the administrator switched on.
    #[serde(default)]
    pub enabled_tools: Vec<String>,
    /// When the defaults were first written.
    #[serde(default)]
    pub installed_at: Option<DateTime<Utc>>,
    /// Crate version that last started against this store.
    #[serde(default)]
    pub version: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            key: "global".to_string(),
            enabled: true,
            debug_mode: false,
            enabled_tools: Vec::new(),
            installed_at: None,
            version: None,
        }
    }
}

/// Repository trait for application settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Get the global application settings, or the defaults if none are stored.
    async fn get_settings(&self) -> Result<AppSettings, AppError>;

    /// Store `settings` only if nothing is stored yet. Returns whether it was
    /// written.
    async fn insert_if_missing(&self, settings: &AppSettings) -> Result<bool, AppError>;

    /// Replace the list of enabled tools.
    async fn set_enabled_tools(&self, tools: &[String]) -> Result<(), AppError>;

    /// Record the running version.
    async fn set_version(&self, version: &str) -> Result<(), AppError>;
}

/// MongoDB implementation of the SettingsRepository.
pub struct MongoSettingsRepository {
    collection: mongodb::Collection<AppSettings>,
}

impl MongoSettingsRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("settings"),
        }
    }

    async fn set_field(&self, field: &str, value: mongodb::bson::Bson) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::UpdateOptions;

        let options = UpdateOptions::builder().upsert(true).build();

        let mut set = doc! { "key": "global" };
        set.insert(field, value);

        self.collection
            .update_one(doc! { "key": "global" }, doc! { "$set": set })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for MongoSettingsRepository {
    async fn get_settings(&self) -> Result<AppSettings, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .find_one(doc! { "key": "global" })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.unwrap_or_default())
    }

    async fn insert_if_missing(&self, settings: &AppSettings) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let existing = self
            .collection
            .find_one(doc! { "key": "global" })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_some() {
            return Ok(false);
        }

        self.collection
            .insert_one(settings)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    async fn set_enabled_tools(&self, tools: &[String]) -> Result<(), AppError> {
        self.set_field("enabled_tools", tools.to_vec().into()).await
    }

    async fn set_version(&self, version: &str) -> Result<(), AppError> {
        self.set_field("version", version.into()).await
    }
}

/// In-process SettingsRepository for demo mode and tests.
#[derive(Default)]
pub struct MemorySettingsRepository {
    settings: Mutex<Option<AppSettings>>,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, apply: impl FnOnce(&mut AppSettings)) -> Result<(), AppError> {
        let mut stored = lock(&self.settings)?;
        apply(stored.get_or_insert_with(AppSettings::default));
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn get_settings(&self) -> Result<AppSettings, AppError> {
        Ok(lock(&self.settings)?.clone().unwrap_or_default())
    }

    async fn insert_if_missing(&self, settings: &AppSettings) -> Result<bool, AppError> {
        let mut stored = lock(&self.settings)?;
        if stored.is_some() {
            return Ok(false);
        }
        *stored = Some(settings.clone());
        Ok(true)
    }

    async fn set_enabled_tools(&self, tools: &[String]) -> Result<(), AppError> {
        self.update(|s| s.enabled_tools = tools.to_vec())
    }

    async fn set_version(&self, version: &str) -> Result<(), AppError> {
        self.update(|s| s.version = Some(version.to_string()))
    }
}
