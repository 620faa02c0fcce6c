//! SQLite storage implementation.
//!
//! A file-based backend good for single-process crawls and local
//! analysis; in-memory databases back the tests.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};
use crate::store::{LinkStore, ListingStore};
use crate::types::{RawRecord, TypedRecord};

/// SQLite-backed link and listing store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://listings.db?mode=rwc` - File database, created if missing
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        Self::with_pool_size(database_url, 5).await
    }

    /// Create an in-memory store (for testing).
    ///
    /// A single connection, since every pooled connection would otherwise
    /// see its own empty in-memory database.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::with_pool_size("sqlite::memory:", 1).await
    }

    async fn with_pool_size(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create the three tables if they do not exist yet.
    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                url TEXT PRIMARY KEY,
                visited INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS raw_listings (
                url TEXT PRIMARY KEY,
                post_id TEXT,
                price TEXT,
                description TEXT,
                image_count TEXT,
                post_time TEXT,
                title TEXT,
                placename TEXT,
                latlon TEXT,
                location TEXT,
                housing TEXT,
                attrs TEXT,
                fetched_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                url TEXT PRIMARY KEY,
                post_id TEXT,
                price REAL,
                description TEXT,
                image_count INTEGER,
                post_time TEXT,
                title TEXT,
                placename TEXT,
                lat REAL,
                lon REAL,
                location TEXT,
                housing TEXT,
                attrs TEXT,
                beds INTEGER,
                sqft INTEGER,
                dogs_ok INTEGER,
                cats_ok INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct RawRow {
    url: String,
    post_id: Option<String>,
    price: Option<String>,
    description: Option<String>,
    image_count: Option<String>,
    post_time: Option<String>,
    title: Option<String>,
    placename: Option<String>,
    latlon: Option<String>,
    location: Option<String>,
    housing: Option<String>,
    attrs: Option<String>,
    fetched_at: String,
}

impl RawRow {
    fn into_record(self) -> StoreResult<RawRecord> {
        let fetched_at = chrono::DateTime::parse_from_rfc3339(&self.fetched_at)
            .map_err(|e| StoreError::Corrupt(format!("invalid fetched_at: {}", e)))?
            .with_timezone(&chrono::Utc);

        Ok(RawRecord {
            url: self.url,
            post_id: self.post_id,
            price: self.price,
            description: self.description,
            image_count: self.image_count,
            post_time: self.post_time,
            title: self.title,
            placename: self.placename,
            latlon: self.latlon,
            location: self.location,
            housing: self.housing,
            attrs: self.attrs,
            fetched_at,
        })
    }
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn register_link(&self, url: &str) -> StoreResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO links (url, visited) VALUES (?, 0)")
            .bind(url)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pending_links(&self) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT url FROM links
            WHERE visited = 0 AND url NOT IN (SELECT url FROM raw_listings)
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(url,)| url).collect())
    }

    async fn mark_visited(&self, url: &str) -> StoreResult<()> {
        sqlx::query("UPDATE links SET visited = 1 WHERE url = ?")
            .bind(url)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ListingStore for SqliteStore {
    async fn insert_raw(&self, record: &RawRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO raw_listings (
                url, post_id, price, description, image_count, post_time,
                title, placename, latlon, location, housing, attrs, fetched_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.url)
        .bind(&record.post_id)
        .bind(&record.price)
        .bind(&record.description)
        .bind(&record.image_count)
        .bind(&record.post_time)
        .bind(&record.title)
        .bind(&record.placename)
        .bind(&record.latlon)
        .bind(&record.location)
        .bind(&record.housing)
        .bind(&record.attrs)
        .bind(record.fetched_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_listing(&self, record: &TypedRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO listings (
                url, post_id, price, description, image_count, post_time,
                title, placename, lat, lon, location, housing, attrs,
                beds, sqft, dogs_ok, cats_ok
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.url)
        .bind(&record.post_id)
        .bind(record.price)
        .bind(&record.description)
        .bind(record.image_count)
        .bind(&record.post_time)
        .bind(&record.title)
        .bind(&record.placename)
        .bind(record.lat)
        .bind(record.lon)
        .bind(&record.location)
        .bind(&record.housing)
        .bind(&record.attrs)
        .bind(record.beds)
        .bind(record.sqft)
        .bind(record.dogs_ok)
        .bind(record.cats_ok)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unprocessed_raw(&self) -> StoreResult<Vec<RawRecord>> {
        let rows: Vec<RawRow> = sqlx::query_as(
            r#"
            SELECT url, post_id, price, description, image_count, post_time,
                   title, placename, latlon, location, housing, attrs, fetched_at
            FROM raw_listings
            WHERE url NOT IN (SELECT url FROM listings)
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_record()).collect()
    }
}
