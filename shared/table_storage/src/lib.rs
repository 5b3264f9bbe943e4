//! Table storage for DynamoDB-compatible services
//!
//! This crate wraps an injected Dynamo DB client with typed table
//! administration and item operations. Every operation returns a
//! [`StoreResult`]; nothing is swallowed or only logged.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

mod error;
pub mod schema;
mod store;
pub mod update;

pub use error::{Operation, StoreError, StoreResult};
pub use schema::{
    AttributeType, CapacityMode, DeletedTable, Item, ItemKey, KeyAttribute, KeyValue, TableInfo,
    TableSchema, TableStatus,
};
pub use store::{
    BatchPutFailure, BatchPutReport, DocumentStore, PutOptions, ScanPage,
    DEFAULT_MAX_CONCURRENT_WRITES,
};
pub use update::{UpdateImage, UpdateItem};
