//! Store and document traits

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

/// A record kept in the document store
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table holding documents of this type
    const TABLE: &'static str;

    /// Document id; `None` until first saved
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Secondary index values as `(index name, value)` pairs
    fn indexes(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Called on every document read back from the store
    fn after_load(&mut self) {}

    /// Called just before the document is written
    fn before_save(&mut self, _now: DateTime<Utc>) {}
}

/// Persistence collaborator
///
/// Reads return documents in insertion order.
pub trait Store: Send + Sync {
    /// Create the tables for `T` if they do not exist
    fn ensure_table<T: Document>(&self) -> impl Future<Output = Result<()>> + Send;

    fn find_one<T: Document>(&self, id: &str) -> impl Future<Output = Result<Option<T>>> + Send;

    fn find_all<T: Document>(&self) -> impl Future<Output = Result<Vec<T>>> + Send;

    /// Documents whose index `index` equals `value`
    fn find_by_index<T: Document>(
        &self,
        index: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<T>>> + Send;

    /// Insert or replace `doc`, assigning an id when it has none
    fn save<T: Document>(&self, doc: &mut T) -> impl Future<Output = Result<()>> + Send;

    /// Remove `doc`; deleting an unsaved document is a no-op
    fn delete<T: Document>(&self, doc: &T) -> impl Future<Output = Result<()>> + Send;
}
