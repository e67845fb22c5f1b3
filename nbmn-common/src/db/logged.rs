//! Save-logging store decorator

use super::store::{Document, Store};
use crate::Result;
use std::future::Future;
use tracing::info;

/// Wraps a store and logs every saved document
///
/// Enabled with `log_saves = true`; reads and deletes pass straight through.
#[derive(Debug, Clone)]
pub struct LoggedStore<S> {
    inner: S,
}

impl<S: Store> LoggedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> Store for LoggedStore<S> {
    fn ensure_table<T: Document>(&self) -> impl Future<Output = Result<()>> + Send {
        self.inner.ensure_table::<T>()
    }

    fn find_one<T: Document>(&self, id: &str) -> impl Future<Output = Result<Option<T>>> + Send {
        self.inner.find_one(id)
    }

    fn find_all<T: Document>(&self) -> impl Future<Output = Result<Vec<T>>> + Send {
        self.inner.find_all()
    }

    fn find_by_index<T: Document>(
        &self,
        index: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<T>>> + Send {
        self.inner.find_by_index(index, value)
    }

    async fn save<T: Document>(&self, doc: &mut T) -> Result<()> {
        self.inner.save(doc).await?;
        let body = serde_json::to_string(&*doc)?;
        info!(
            table = T::TABLE,
            id = doc.id().unwrap_or_default(),
            "Saved: {}",
            body
        );
        Ok(())
    }

    fn delete<T: Document>(&self, doc: &T) -> impl Future<Output = Result<()>> + Send {
        self.inner.delete(doc)
    }
}
