use chrono::{DateTime, TimeZone, Utc};
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::{ClientOptions, IndexOptions, UpdateOptions};
use mongodb::sync::{Client, Collection, Database};
use mongodb::IndexModel;

use crate::models::homepage::{HomepageContent, CONTENT_KEY};

use super::Store;

const COLLECTION: &str = "homepage_content";
const UPDATED_AT: &str = "updated_at";

/// Encode for the collection. `updated_at` is written as a BSON date.
fn to_stored(content: &HomepageContent) -> Result<Document, String> {
    let mut d = bson::to_document(content).map_err(|e| e.to_string())?;
    d.insert(
        UPDATED_AT,
        Bson::DateTime(bson::DateTime::from_millis(content.updated_at.timestamp_millis())),
    );
    Ok(d)
}

/// Decode a stored document. `updated_at` may be a BSON date or an RFC 3339 string.
fn from_stored(mut d: Document) -> Result<HomepageContent, String> {
    let updated_at: DateTime<Utc> = match d.remove(UPDATED_AT) {
        Some(Bson::DateTime(dt)) => Utc
            .timestamp_millis_opt(dt.timestamp_millis())
            .single()
            .ok_or_else(|| format!("updated_at out of range: {}", dt))?,
        Some(Bson::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("updated_at is not RFC 3339: {}", e))?,
        Some(other) => return Err(format!("updated_at has unexpected type {:?}", other.element_type())),
        None => return Err("updated_at is missing".to_string()),
    };
    d.insert(UPDATED_AT, updated_at.to_rfc3339());
    bson::from_document(d).map_err(|e| e.to_string())
}

/// MongoDB-backed implementation of the Store trait.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Create a new MongoStore by connecting to the given URI and database name.
    pub fn new(uri: &str, db_name: &str) -> Result<Self, String> {
        let client_options = ClientOptions::parse(uri).map_err(|e| e.to_string())?;
        let client = Client::with_options(client_options).map_err(|e| e.to_string())?;
        let db = client.database(db_name);
        Ok(Self { db })
    }

    /// Test connectivity by pinging the server.
    pub fn test_connection(&self) -> Result<(), String> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|e| format!("MongoDB connection test failed: {}", e))?;
        Ok(())
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection::<Document>(COLLECTION)
    }
}

impl Store for MongoStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    fn run_migrations(&self) -> Result<(), String> {
        self.collection()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    // ── Homepage content ────────────────────────────────────────────

    fn homepage_get(&self) -> Result<Option<HomepageContent>, String> {
        let found = self
            .collection()
            .find_one(doc! { "id": CONTENT_KEY }, None)
            .map_err(|e| e.to_string())?;
        match found {
            // `_id` and any legacy keys are ignored by the deserializer
            Some(d) => from_stored(d)
                .map(Some)
                .map_err(|e| format!("Stored homepage content is unreadable: {}", e)),
            None => Ok(None),
        }
    }

    fn homepage_upsert(&self, content: &HomepageContent) -> Result<(), String> {
        let fields = to_stored(content)?;
        let opts = UpdateOptions::builder().upsert(true).build();
        self.collection()
            .update_one(doc! { "id": CONTENT_KEY }, doc! { "$set": fields }, opts)
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
