use rusqlite::{params, OptionalExtension};

use crate::db::DbPool;
use crate::models::homepage::{HomepageContent, CONTENT_KEY};

use super::Store;

/// SQLite-backed implementation of the Store trait.
/// The document is kept as one JSON row keyed by `CONTENT_KEY`.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        crate::db::init_pool_at(path).map(Self::new)
    }
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool)
    }

    // ── Homepage content ────────────────────────────────────────────

    fn homepage_get(&self) -> Result<Option<HomepageContent>, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT content_json FROM homepage_content WHERE id = ?1",
                params![CONTENT_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| e.to_string())?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| format!("Stored homepage content is unreadable: {}", e)),
            None => Ok(None),
        }
    }

    fn homepage_upsert(&self, content: &HomepageContent) -> Result<(), String> {
        let json = serde_json::to_string(content).map_err(|e| e.to_string())?;
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO homepage_content (id, content_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET content_json = ?2, updated_at = ?3",
            params![CONTENT_KEY, json, content.updated_at.to_rfc3339()],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}
