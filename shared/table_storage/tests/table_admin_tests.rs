mod common;

use std::time::Duration;

use common::{local_client, setup_test, unique_orders_schema};
use pretty_assertions::assert_eq;
use table_storage::{
    AttributeType, CapacityMode, DocumentStore, KeyAttribute, StoreError, TableStatus,
};

#[tokio::test]
#[ignore = "requires a local DynamoDB endpoint"]
async fn test_create_then_describe_reports_same_keys() {
    let context = setup_test().await;

    let info = context
        .store
        .describe_table(&context.schema.name)
        .await
        .expect("Failed to describe table");

    assert_eq!(info.name, context.schema.name);
    assert_eq!(info.partition_key, KeyAttribute::string("CustomerId"));
    assert_eq!(info.sort_key, Some(KeyAttribute::number("OrderNumber")));
    assert_eq!(info.partition_key.attribute_type, AttributeType::String);
    assert_eq!(info.capacity, CapacityMode::provisioned(1, 1));
    assert_eq!(info.schema(), context.schema);
}

#[tokio::test]
#[ignore = "requires a local DynamoDB endpoint"]
async fn test_create_existing_table_fails() {
    let context = setup_test().await;

    let err = context
        .store
        .create_table(&context.schema)
        .await
        .expect_err("Second create should fail");

    assert!(
        matches!(err, StoreError::TableAlreadyExists { ref table } if *table == context.schema.name)
    );
}

#[tokio::test]
#[ignore = "requires a local DynamoDB endpoint"]
async fn test_on_demand_table() {
    let store = DocumentStore::new(local_client().await);
    let schema = unique_orders_schema().with_capacity(CapacityMode::OnDemand);

    let created = store
        .create_table(&schema)
        .await
        .expect("Failed to create table");
    assert_eq!(created.capacity, CapacityMode::OnDemand);

    let active = store
        .wait_for_active(&schema.name, 10, Duration::from_millis(200))
        .await
        .expect("Table never became active");
    assert_eq!(active.status, TableStatus::Active);

    store
        .delete_table(&schema.name)
        .await
        .expect("Failed to delete table");
}

#[tokio::test]
#[ignore = "requires a local DynamoDB endpoint"]
async fn test_delete_then_list_excludes_table() {
    let store = DocumentStore::new(local_client().await);
    let schema = unique_orders_schema();

    store
        .create_table(&schema)
        .await
        .expect("Failed to create table");
    let tables = store.list_tables().await.expect("Failed to list tables");
    assert!(tables.contains(&schema.name));

    let deleted = store
        .delete_table(&schema.name)
        .await
        .expect("Failed to delete table");
    assert_eq!(deleted.name, schema.name);

    let tables = store.list_tables().await.expect("Failed to list tables");
    assert!(!tables.contains(&schema.name));
}

#[tokio::test]
#[ignore = "requires a local DynamoDB endpoint"]
async fn test_list_tables_is_sorted() {
    let context = setup_test().await;

    let tables = context
        .store
        .list_tables()
        .await
        .expect("Failed to list tables");

    let mut sorted = tables.clone();
    sorted.sort();
    assert_eq!(tables, sorted);
    assert!(tables.contains(&context.schema.name));
}

#[tokio::test]
#[ignore = "requires a local DynamoDB endpoint"]
async fn test_missing_table_is_not_found() {
    let store = DocumentStore::new(local_client().await);
    let name = unique_orders_schema().name;

    let err = store
        .describe_table(&name)
        .await
        .expect_err("Describe should fail");
    assert!(matches!(err, StoreError::TableNotFound { ref table } if *table == name));

    let err = store
        .delete_table(&name)
        .await
        .expect_err("Delete should fail");
    assert!(matches!(err, StoreError::TableNotFound { .. }));
}

#[tokio::test]
#[ignore = "requires a local DynamoDB endpoint"]
async fn test_context_drop_deletes_table() {
    let store = DocumentStore::new(local_client().await);
    let context = setup_test().await;
    let name = context.schema.name.clone();
    drop(context);

    let tables = store.list_tables().await.expect("Failed to list tables");
    assert!(!tables.contains(&name));
}
