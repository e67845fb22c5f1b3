//! SQLite document store
//!
//! Each document type gets two tables:
//!
//! ```sql
//! <table>       (id TEXT PRIMARY KEY, value TEXT, created_at TEXT, updated_at TEXT)
//! <table>_index (doc_id TEXT, name TEXT, value TEXT)
//! ```
//!
//! `value` holds the document serialized as JSON. Index rows are rewritten
//! on every save inside the same transaction as the document row.

use super::init::{init_database, init_memory_database};
use super::store::{Document, Store};
use crate::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database file at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(init_database(path).await?))
    }

    /// Fresh private in-memory store
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(init_memory_database().await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn decode<T: Document>(rows: Vec<String>) -> Result<Vec<T>> {
        rows.iter()
            .map(|value| {
                let mut doc: T = serde_json::from_str(value)?;
                doc.after_load();
                Ok(doc)
            })
            .collect()
    }
}

impl Store for SqliteStore {
    async fn ensure_table<T: Document>(&self) -> Result<()> {
        let table = T::TABLE;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table}_index (
                doc_id TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_index_lookup ON {table}_index (name, value)"
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_index_doc ON {table}_index (doc_id)"
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_one<T: Document>(&self, id: &str) -> Result<Option<T>> {
        let sql = format!("SELECT value FROM {} WHERE id = ?", T::TABLE);
        let row: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(Self::decode::<T>(row.into_iter().collect())?.pop())
    }

    async fn find_all<T: Document>(&self) -> Result<Vec<T>> {
        let sql = format!("SELECT value FROM {} ORDER BY rowid", T::TABLE);
        let rows: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Self::decode(rows)
    }

    async fn find_by_index<T: Document>(&self, index: &str, value: &str) -> Result<Vec<T>> {
        let table = T::TABLE;
        let sql = format!(
            r#"
            SELECT t.value FROM {table} t
            WHERE t.id IN (SELECT doc_id FROM {table}_index WHERE name = ? AND value = ?)
            ORDER BY t.rowid
            "#
        );
        let rows: Vec<String> = sqlx::query_scalar(&sql)
            .bind(index)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Self::decode(rows)
    }

    async fn save<T: Document>(&self, doc: &mut T) -> Result<()> {
        if doc.id().map_or(true, str::is_empty) {
            doc.set_id(Uuid::new_v4().to_string());
        }
        let now = Utc::now();
        doc.before_save(now);

        let id = doc.id().unwrap_or_default().to_string();
        let value = serde_json::to_string(&*doc)?;
        let indexes = doc.indexes();
        let stamp = now.to_rfc3339();
        let table = T::TABLE;

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {table} (id, value, created_at, updated_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#
        ))
        .bind(&id)
        .bind(&value)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!("DELETE FROM {table}_index WHERE doc_id = ?"))
            .bind(&id)
            .execute(&mut *tx)
            .await?;

        let insert = format!("INSERT INTO {table}_index (doc_id, name, value) VALUES (?, ?, ?)");
        for (name, index_value) in &indexes {
            sqlx::query(&insert)
                .bind(&id)
                .bind(*name)
                .bind(index_value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(table, id = %id, "Saved document");
        Ok(())
    }

    async fn delete<T: Document>(&self, doc: &T) -> Result<()> {
        let Some(id) = doc.id().filter(|id| !id.is_empty()) else {
            return Ok(());
        };
        let table = T::TABLE;

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {table}_index WHERE doc_id = ?"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(table, id = %id, "Deleted document");
        Ok(())
    }
}
