use serde::Deserialize;

use crate::error::AppError;

/// Which content store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store; contents are lost on restart.
    Memory,
    Mongo,
}

/// Runtime configuration.
///
/// Sources, later ones winning: built-in defaults, an optional
/// `toolshed.{toml,yaml,json}` in the working directory, then environment
/// variables prefixed with `TOOLSHED__` (e.g. `TOOLSHED__SITE_URL`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Public base URL used to build view and edit links.
    pub site_url: String,
    /// Path under `site_url` where the admin UI lives.
    pub admin_path: String,
    pub store: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Secret the session cookie signing key is derived from. A random key
    /// is generated when unset, so sessions do not survive a restart.
    pub session_secret: Option<String>,
    /// Seed sample content on startup.
    pub demo_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            site_url: "http://localhost:3000".to_string(),
            admin_path: "/admin".to_string(),
            store: StoreBackend::Memory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "toolshed".to_string(),
            session_secret: None,
            demo_mode: false,
        }
    }
}

impl AppConfig {
    /// Load from the config file and environment.
    pub fn load() -> Result<Self, AppError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("toolshed").required(false))
            .add_source(::config::Environment::with_prefix("TOOLSHED").separator("__"))
            .build()?;

        Self::from_config(settings)
    }

    /// Deserialize and validate an already assembled configuration.
    pub fn from_config(settings: ::config::Config) -> Result<Self, AppError> {
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if url::Url::parse(&self.site_url).is_err() {
            return Err(AppError::Config(format!(
                "site_url '{}' is not an absolute URL",
                self.site_url
            )));
        }

        if matches!(&self.session_secret, Some(secret) if secret.trim().is_empty()) {
            return Err(AppError::Config("session_secret must not be empty".into()));
        }

        Ok(())
    }
}
