use std::path::Path;

use log::info;
use serde::Deserialize;

/// Default location of the config file; override with `HOMEPAGE_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "homepage.toml";

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub uploads: UploadConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Mongo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sqlite_path: String,
    pub mongo_uri: String,
    pub mongo_database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: StoreBackend::Sqlite,
            sqlite_path: "website/db/homepage.db".to_string(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: "homepage".to_string(),
        }
    }
}

/// How uploaded assets end up in the content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStrategy {
    /// Written under `uploads.dir`, referenced as `/uploads/<name>`.
    Disk,
    /// Embedded in the document as a base64 `data:` URI.
    Inline,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: String,
    pub strategy: StorageStrategy,
    /// Cap for hero uploads under the disk strategy.
    pub hero_max_mb: u64,
    /// Rocket's `file` / `data-form` limits; must stay above `hero_max_mb`.
    pub request_limit_mb: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            dir: "website/uploads".to_string(),
            strategy: StorageStrategy::Disk,
            hero_max_mb: 200,
            request_limit_mb: 256,
        }
    }
}

impl UploadConfig {
    pub fn hero_max_bytes(&self) -> u64 {
        self.hero_max_mb * MIB
    }

    pub fn request_limit_bytes(&self) -> u64 {
        self.request_limit_mb.max(self.hero_max_mb + 1) * MIB
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token required on admin routes. Unset means every request passes.
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allow_origin: "*".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| format!("Invalid config: {}", e))
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    pub fn load(path: &str) -> Result<Self, String> {
        let config = if Path::new(path).exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
            info!("Loading config from {}", path);
            Self::from_toml(&raw)?
        } else {
            info!("{} not found, using default config", path);
            AppConfig::default()
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load from `HOMEPAGE_CONFIG` or `homepage.toml`.
    pub fn load_default() -> Result<Self, String> {
        let path =
            std::env::var("HOMEPAGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&path)
    }

    /// `MONGO_URL` + `DB_NAME` switch to the Mongo backend; `HOMEPAGE_ADMIN_TOKEN`
    /// sets the admin token.
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(uri) = var("MONGO_URL").filter(|v| !v.is_empty()) {
            self.store.backend = StoreBackend::Mongo;
            self.store.mongo_uri = uri;
            if let Some(db) = var("DB_NAME").filter(|v| !v.is_empty()) {
                self.store.mongo_database = db;
            }
        }
        if let Some(token) = var("HOMEPAGE_ADMIN_TOKEN").filter(|v| !v.is_empty()) {
            self.auth.admin_token = Some(token);
        }
        self
    }
}
