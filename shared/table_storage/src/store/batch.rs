//! Concurrent batch put

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{items::PutOptions, DocumentStore};
use crate::error::StoreError;
use crate::schema::TableSchema;

/// A write that failed inside a batch
#[derive(Debug)]
pub struct BatchPutFailure {
    /// Position of the item in the submitted slice
    pub index: usize,
    pub error: StoreError,
}

/// Outcome of [`DocumentStore::put_items`]
#[derive(Debug, Default)]
pub struct BatchPutReport {
    pub written: usize,
    /// Failed writes, ordered by index
    pub failures: Vec<BatchPutFailure>,
}

impl BatchPutReport {
    /// Whether every item was written
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.written + self.failures.len()
    }
}

impl DocumentStore {
    /// Writes every item concurrently and waits for all of them
    ///
    /// At most `max_concurrent_writes` requests are in flight. Writes are
    /// independent: there is no ordering or atomicity across items, and one
    /// failure does not stop the others.
    ///
    /// # Arguments
    ///
    /// * `schema` - Schema of the target table
    /// * `items` - Items to write
    /// * `options` - Options applied to every single put
    #[instrument(skip(self, schema, items), fields(table = %schema.name, count = items.len()))]
    pub async fn put_items<T: Serialize + Sync>(
        &self,
        schema: &TableSchema,
        items: &[T],
        options: PutOptions,
    ) -> BatchPutReport {
        let results: Vec<_> = stream::iter(items.iter().enumerate())
            .map(|(index, item)| async move {
                (index, self.write_item(schema, item, options).await)
            })
            .buffer_unordered(self.max_concurrent_writes)
            .collect()
            .await;

        let mut report = BatchPutReport::default();
        for (index, result) in results {
            match result {
                Ok(_) => report.written += 1,
                Err(error) => {
                    warn!(index, %error, "Failed to put item");
                    report.failures.push(BatchPutFailure { index, error });
                }
            }
        }
        report.failures.sort_by_key(|failure| failure.index);

        info!(
            written = report.written,
            failed = report.failures.len(),
            "Batch put finished"
        );
        report
    }
}
