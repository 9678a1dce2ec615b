use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::models::homepage::HomepageContent;

pub mod mongo;
pub mod sqlite;

/// Data-access trait for the homepage document.
/// Implementations: `SqliteStore` (wraps rusqlite/r2d2) and `MongoStore` (wraps mongodb).
///
/// There is no locking across a get/upsert pair; concurrent writers race and the
/// last upsert wins.
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn backend_name(&self) -> &'static str;
    fn run_migrations(&self) -> Result<(), String>;

    // ── Homepage content ────────────────────────────────────────────
    /// Load the stored document, `None` if it was never written.
    fn homepage_get(&self) -> Result<Option<HomepageContent>, String>;
    /// Insert or overwrite the document under its fixed key.
    fn homepage_upsert(&self, content: &HomepageContent) -> Result<(), String>;
}

/// Open the configured backend. Mongo connections are pinged before use.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn Store>, String> {
    match config.backend {
        StoreBackend::Sqlite => Ok(Arc::new(sqlite::SqliteStore::new_at(&config.sqlite_path)?)),
        StoreBackend::Mongo => {
            let store = mongo::MongoStore::new(&config.mongo_uri, &config.mongo_database)?;
            store.test_connection()?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteStore;

    /// Create a fresh in-memory SqliteStore with migrations applied.
    fn test_store() -> SqliteStore {
        let manager = r2d2_sqlite::SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("Failed to create in-memory pool");
        let store = SqliteStore::new(pool);
        store.run_migrations().expect("migrations failed");
        store
    }

    #[test]
    fn test_homepage_get_empty() {
        let s = test_store();
        assert!(s.homepage_get().unwrap().is_none());
    }

    #[test]
    fn test_homepage_upsert_inserts_then_overwrites() {
        let s = test_store();
        let mut content = HomepageContent::defaults();
        s.homepage_upsert(&content).unwrap();
        assert_eq!(s.homepage_get().unwrap().as_ref(), Some(&content));

        content.hero.headline = "Second".to_string();
        content.features.truncate(1);
        s.homepage_upsert(&content).unwrap();

        let stored = s.homepage_get().unwrap().expect("content missing");
        assert_eq!(stored.hero.headline, "Second");
        assert_eq!(stored.features.len(), 1);

        let conn = s.pool.get().unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM homepage_content", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_migrations_are_repeatable() {
        let s = test_store();
        s.run_migrations().unwrap();
        s.homepage_upsert(&HomepageContent::defaults()).unwrap();
        s.run_migrations().unwrap();
        assert!(s.homepage_get().unwrap().is_some());
    }

    #[test]
    fn test_open_sqlite_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            sqlite_path: dir.path().join("db/homepage.db").to_string_lossy().to_string(),
            ..StoreConfig::default()
        };
        let s = open(&config).unwrap();
        assert_eq!(s.backend_name(), "sqlite");
        s.run_migrations().unwrap();
        s.homepage_upsert(&HomepageContent::defaults()).unwrap();
        assert!(s.homepage_get().unwrap().is_some());
    }

    #[test]
    fn test_corrupt_row_is_an_error() {
        let s = test_store();
        let conn = s.pool.get().unwrap();
        conn.execute(
            "INSERT INTO homepage_content (id, content_json, updated_at) VALUES ('main', 'not json', '')",
            [],
        )
        .unwrap();
        drop(conn);
        assert!(s.homepage_get().is_err());
    }
}
