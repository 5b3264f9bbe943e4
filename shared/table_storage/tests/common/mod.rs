#![allow(dead_code)]

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::{Deserialize, Serialize};
use table_storage::{DocumentStore, KeyAttribute, TableSchema};
use uuid::Uuid;

/// Local DynamoDB endpoint, overridable for CI
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
const TEST_REGION: &str = "ap-northeast-1";

/// Order record with the same shape as the seed data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub customer_id: String,
    pub order_number: i64,
    pub product: String,
    pub price: i64,
}

impl Order {
    pub fn new(customer_id: &str, order_number: i64, product: &str, price: i64) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            order_number,
            product: product.to_string(),
            price,
        }
    }
}

/// Builds a client for the local endpoint with dummy credentials
pub async fn local_client() -> Arc<DynamoDbClient> {
    let endpoint =
        std::env::var("DYNAMODB_ENDPOINT_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let credentials = Credentials::from_keys("dummy", "dummy", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(endpoint)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    Arc::new(DynamoDbClient::new(&config))
}

/// Builds a store whose client is never used for network calls
pub fn offline_store() -> DocumentStore {
    let config = aws_sdk_dynamodb::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(Credentials::from_keys("dummy", "dummy", None))
        .build();
    DocumentStore::new(Arc::new(DynamoDbClient::from_conf(config)))
}

/// Order history schema under a unique table name
pub fn unique_orders_schema() -> TableSchema {
    TableSchema::new(
        format!("test-order-history-{}", Uuid::new_v4()),
        KeyAttribute::string("CustomerId"),
    )
    .with_sort_key(KeyAttribute::number("OrderNumber"))
}

/// Test context that deletes its table on drop
pub struct TestContext {
    pub store: DocumentStore,
    pub schema: TableSchema,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let table = self.schema.name.clone();

        // Own thread and runtime: the test runtime is gone once the test body returns
        let cleanup = std::thread::spawn(move || {
            let Ok(runtime) = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            else {
                return;
            };
            runtime.block_on(async move {
                let client = local_client().await;
                let _ = client.delete_table().table_name(&table).send().await;
            });
        });
        let _ = cleanup.join();
    }
}

/// Creates the order history table under a unique name
pub async fn setup_test() -> TestContext {
    let store = DocumentStore::new(local_client().await);
    let schema = unique_orders_schema();

    store
        .create_table(&schema)
        .await
        .expect("Failed to create test table");

    TestContext { store, schema }
}
