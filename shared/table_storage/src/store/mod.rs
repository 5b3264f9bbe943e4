//! Document store over a DynamoDB-compatible service
//!
//! [`DocumentStore`] exposes table administration (create, delete, list,
//! describe) and item operations (put, get, update, delete, scan). It holds
//! nothing but the injected client, so one instance can be shared by every
//! caller.

mod batch;
mod items;
mod tables;

use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;

pub use batch::{BatchPutFailure, BatchPutReport};
pub use items::{PutOptions, ScanPage};

/// Default number of in-flight writes for [`DocumentStore::put_items`]
pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 8;

/// Store client for Dynamo DB table and item operations
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dynamodb_client: Arc<DynamoDbClient>,
    max_concurrent_writes: usize,
}

impl DocumentStore {
    /// Creates a new store
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>) -> Self {
        Self {
            dynamodb_client,
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
        }
    }

    /// Limits how many writes a batch put keeps in flight (at least one)
    #[must_use]
    pub const fn with_max_concurrent_writes(mut self, max_concurrent_writes: usize) -> Self {
        self.max_concurrent_writes = if max_concurrent_writes == 0 {
            1
        } else {
            max_concurrent_writes
        };
        self
    }

    #[must_use]
    pub const fn max_concurrent_writes(&self) -> usize {
        self.max_concurrent_writes
    }

    /// Underlying Dynamo DB client
    #[must_use]
    pub fn client(&self) -> &DynamoDbClient {
        &self.dynamodb_client
    }
}
