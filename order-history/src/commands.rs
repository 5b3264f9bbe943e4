//! Runs one CLI command against the store

use std::time::Duration;

use anyhow::bail;
use serde_json::{json, Value};
use table_storage::{CapacityMode, DocumentStore, PutOptions, TableSchema, UpdateImage, UpdateItem};
use tracing::info;

use crate::cli::{
    Command, CreateTableArgs, DeleteItemArgs, GetItemArgs, PutItemsArgs, ScanArgs, UpdateItemArgs,
};
use crate::order::{load_orders, order_table_schema, seed_orders, OrderAttribute};

const ACTIVATION_ATTEMPTS: u32 = 30;
const ACTIVATION_DELAY: Duration = Duration::from_secs(2);

/// Runs `command` against `table_name`
///
/// # Returns
///
/// The JSON document printed in the success block
///
/// # Errors
///
/// Returns the store error of the operation, or a summary of the failed
/// writes for `put-items`
pub async fn run(store: &DocumentStore, table_name: &str, command: Command) -> anyhow::Result<Value> {
    let schema = order_table_schema(table_name, CapacityMode::default());

    match command {
        Command::CreateTable(args) => create_table(store, schema, args).await,
        Command::DeleteTable => {
            let info = store.delete_table(table_name).await?;
            Ok(json!({ "TableDescription": info }))
        }
        Command::ListTables => {
            let names = store.list_tables().await?;
            Ok(json!({ "TableNames": names }))
        }
        Command::DescribeTable => {
            let info = store.describe_table(table_name).await?;
            Ok(json!({ "Table": info }))
        }
        Command::PutItems(args) => put_items(store, &schema, args).await,
        Command::GetItem(args) => get_item(store, &schema, args).await,
        Command::UpdateItem(args) => update_item(store, &schema, args).await,
        Command::DeleteItem(args) => delete_item(store, &schema, args).await,
        Command::Scan(args) => scan(store, table_name, args).await,
    }
}

async fn create_table(
    store: &DocumentStore,
    schema: TableSchema,
    args: CreateTableArgs,
) -> anyhow::Result<Value> {
    let capacity = if args.on_demand {
        CapacityMode::OnDemand
    } else {
        CapacityMode::provisioned(args.read_capacity, args.write_capacity)
    };
    let schema = schema.with_capacity(capacity);

    let mut info = store.create_table(&schema).await?;
    if args.wait {
        info = store
            .wait_for_active(&schema.name, ACTIVATION_ATTEMPTS, ACTIVATION_DELAY)
            .await?;
    }

    Ok(json!({ "TableDescription": info }))
}

async fn put_items(
    store: &DocumentStore,
    schema: &TableSchema,
    args: PutItemsArgs,
) -> anyhow::Result<Value> {
    let orders = match &args.file {
        Some(path) => load_orders(path)?,
        None => seed_orders()?,
    };
    let options = PutOptions {
        if_not_exists: args.if_not_exists,
        return_previous: false,
    };

    let report = store.put_items(schema, &orders, options).await;
    if !report.is_complete() {
        let details = report
            .failures
            .iter()
            .map(|failure| format!("  #{}: {}", failure.index, failure.error))
            .collect::<Vec<_>>()
            .join("\n");
        bail!(
            "{} of {} orders failed to write:\n{details}",
            report.failures.len(),
            report.total()
        );
    }

    info!(written = report.written, "Orders written");
    Ok(json!({ "Written": report.written }))
}

async fn get_item(
    store: &DocumentStore,
    schema: &TableSchema,
    args: GetItemArgs,
) -> anyhow::Result<Value> {
    let key = schema.composite_key(args.customer_id, args.order_number)?;
    let item: Option<Value> = store.get_item(&key, args.consistent).await?;
    Ok(json!({ "Item": item }))
}

async fn update_item(
    store: &DocumentStore,
    schema: &TableSchema,
    args: UpdateItemArgs,
) -> anyhow::Result<Value> {
    let key = schema.composite_key(args.customer_id, args.order_number)?;
    let image = if args.return_old {
        UpdateImage::Old
    } else {
        UpdateImage::New
    };
    let update = UpdateItem::new(key)
        .try_set(OrderAttribute::Product.to_string(), &args.product)?
        .try_set(OrderAttribute::Price.to_string(), &args.price)?
        .upsert(args.upsert)
        .return_image(image);

    let attributes: Option<Value> = store.update_item(&update).await?;
    Ok(json!({ "Attributes": attributes }))
}

async fn delete_item(
    store: &DocumentStore,
    schema: &TableSchema,
    args: DeleteItemArgs,
) -> anyhow::Result<Value> {
    let key = schema.composite_key(args.customer_id, args.order_number)?;
    let removed: Option<Value> = store.delete_item(&key).await?;
    Ok(json!({ "Attributes": removed }))
}

async fn scan(store: &DocumentStore, table_name: &str, args: ScanArgs) -> anyhow::Result<Value> {
    if args.all {
        let items: Vec<Value> = store.scan_all(table_name).await?;
        return Ok(json!({ "Count": items.len(), "Items": items }));
    }

    let page = store.scan::<Value>(table_name, args.limit, None).await?;
    Ok(json!({
        "Count": page.items.len(),
        "HasMore": page.has_more(),
        "Items": page.items,
    }))
}
