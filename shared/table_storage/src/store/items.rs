//! Item operations

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{put_item::PutItemError, update_item::UpdateItemError};
use aws_sdk_dynamodb::types::ReturnValue;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use super::DocumentStore;
use crate::error::{Operation, StoreError, StoreResult};
use crate::schema::{Item, ItemKey, TableSchema};
use crate::update::UpdateItem;

/// Options for [`DocumentStore::put_item`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Fail with `StoreError::ItemAlreadyExists` instead of replacing an item
    /// stored under the same key
    pub if_not_exists: bool,
    /// Return the replaced item, if any
    pub return_previous: bool,
}

/// One page of a scan
#[derive(Debug, Clone)]
pub struct ScanPage<T> {
    pub items: Vec<T>,
    /// Key to resume from; `None` once the table is exhausted
    pub last_evaluated_key: Option<Item>,
}

impl<T> ScanPage<T> {
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

/// A failed `attribute_not_exists` guard means the key is taken
fn put_item_error(table: &str, err: SdkError<PutItemError, HttpResponse>) -> StoreError {
    match err {
        SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception() => {
            StoreError::ItemAlreadyExists {
                table: table.to_string(),
            }
        }
        err => StoreError::from_sdk(Operation::PutItem, table, err),
    }
}

/// A failed `attribute_exists` guard means the key is not stored
fn update_item_error(table: &str, err: SdkError<UpdateItemError, HttpResponse>) -> StoreError {
    match err {
        SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception() => {
            StoreError::ItemNotFound {
                table: table.to_string(),
            }
        }
        err => StoreError::from_sdk(Operation::UpdateItem, table, err),
    }
}

fn decode<T: DeserializeOwned>(item: Option<Item>) -> StoreResult<Option<T>> {
    item.map(serde_dynamo::from_item)
        .transpose()
        .map_err(StoreError::from)
}

impl DocumentStore {
    /// Writes a full item, replacing any item stored under the same key
    ///
    /// # Arguments
    ///
    /// * `schema` - Schema of the target table, used to check the key attributes
    /// * `item` - The item to write
    /// * `options` - Optional precondition and return value
    ///
    /// # Returns
    ///
    /// The replaced item when `options.return_previous` is set and an item was replaced
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingKeyAttribute` or `StoreError::KeyTypeMismatch`
    /// if the item does not carry the table's key, `StoreError::ItemAlreadyExists`
    /// if `options.if_not_exists` is set and the key is taken, or another
    /// `StoreError` if the Dynamo DB operation fails or the replaced item
    /// cannot be deserialized into `T`
    #[instrument(skip(self, schema, item), fields(table = %schema.name))]
    pub async fn put_item<T: DeserializeOwned>(
        &self,
        schema: &TableSchema,
        item: &(impl Serialize + Sync),
        options: PutOptions,
    ) -> StoreResult<Option<T>> {
        decode(self.write_item(schema, item, options).await?)
    }

    /// Writes `item` and hands back the raw replaced item, if requested
    pub(super) async fn write_item(
        &self,
        schema: &TableSchema,
        item: &(impl Serialize + Sync),
        options: PutOptions,
    ) -> StoreResult<Option<Item>> {
        let item: Item = serde_dynamo::to_item(item)?;
        schema.validate_item(&item)?;

        let mut request = self
            .dynamodb_client
            .put_item()
            .table_name(&schema.name)
            .set_item(Some(item));

        if options.if_not_exists {
            request = request
                .condition_expression("attribute_not_exists(#pk)")
                .expression_attribute_names("#pk", &schema.partition_key.name);
        }
        if options.return_previous {
            request = request.return_values(ReturnValue::AllOld);
        }

        let output = request
            .send()
            .await
            .map_err(|err| put_item_error(&schema.name, err))?;

        debug!("Put item");
        Ok(output.attributes)
    }

    /// Gets a single item by key
    ///
    /// # Arguments
    ///
    /// * `key` - Key built from the table schema
    /// * `consistent_read` - Use a strongly consistent read
    ///
    /// # Returns
    ///
    /// The item, or `None` if no item is stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the Dynamo DB operation fails or the item
    /// cannot be deserialized into `T`
    #[instrument(skip(self, key), fields(table = %key.table()))]
    pub async fn get_item<T: DeserializeOwned>(
        &self,
        key: &ItemKey,
        consistent_read: bool,
    ) -> StoreResult<Option<T>> {
        let output = self
            .dynamodb_client
            .get_item()
            .table_name(key.table())
            .set_key(Some(key.to_item()))
            .consistent_read(consistent_read)
            .send()
            .await
            .map_err(|err| StoreError::from_sdk(Operation::GetItem, key.table(), err))?;

        debug!(found = output.item.is_some(), "Got item");
        decode(output.item)
    }

    /// Sets named attributes on an existing item
    ///
    /// # Returns
    ///
    /// The item image selected by the update (new by default)
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyUpdate` or `StoreError::KeyAttributeUpdate` for
    /// an invalid update, `StoreError::ItemNotFound` if the key is not stored and
    /// upsert was not requested, or another `StoreError` if the Dynamo DB
    /// operation fails
    #[instrument(skip(self, update), fields(table = %update.key().table()))]
    pub async fn update_item<T: DeserializeOwned>(
        &self,
        update: &UpdateItem,
    ) -> StoreResult<Option<T>> {
        let expression = update.expression()?;
        let table = update.key().table();

        let mut request = self
            .dynamodb_client
            .update_item()
            .table_name(table)
            .set_key(Some(update.key().to_item()))
            .update_expression(expression.expression)
            .set_expression_attribute_names(Some(expression.names))
            .set_expression_attribute_values(Some(expression.values))
            .return_values(update.image().return_value());

        if let Some(condition) = expression.condition {
            request = request.condition_expression(condition);
        }

        let output = request
            .send()
            .await
            .map_err(|err| update_item_error(table, err))?;

        debug!("Updated item");
        decode(output.attributes)
    }

    /// Deletes a single item by key
    ///
    /// # Returns
    ///
    /// The removed item, or `None` if nothing was stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the Dynamo DB operation fails
    #[instrument(skip(self, key), fields(table = %key.table()))]
    pub async fn delete_item<T: DeserializeOwned>(&self, key: &ItemKey) -> StoreResult<Option<T>> {
        let output = self
            .dynamodb_client
            .delete_item()
            .table_name(key.table())
            .set_key(Some(key.to_item()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|err| StoreError::from_sdk(Operation::DeleteItem, key.table(), err))?;

        debug!(removed = output.attributes.is_some(), "Deleted item");
        decode(output.attributes)
    }

    /// Reads one page of items in no particular order
    ///
    /// # Arguments
    ///
    /// * `table` - Table name
    /// * `limit` - Maximum number of items to evaluate for this page
    /// * `start_key` - `last_evaluated_key` of the previous page
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the Dynamo DB operation fails or an item
    /// cannot be deserialized into `T`
    #[instrument(skip(self, start_key))]
    pub async fn scan<T: DeserializeOwned>(
        &self,
        table: &str,
        limit: Option<i32>,
        start_key: Option<Item>,
    ) -> StoreResult<ScanPage<T>> {
        let output = self
            .dynamodb_client
            .scan()
            .table_name(table)
            .set_limit(limit)
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|err| StoreError::from_sdk(Operation::Scan, table, err))?;

        let items = serde_dynamo::from_items(output.items.unwrap_or_default())?;
        Ok(ScanPage {
            items,
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    /// Reads every item of the table, page after page
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if any page fails
    #[instrument(skip(self))]
    pub async fn scan_all<T: DeserializeOwned>(&self, table: &str) -> StoreResult<Vec<T>> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let page = self.scan(table, None, start_key).await?;
            items.extend(page.items);
            match page.last_evaluated_key {
                Some(key) => start_key = Some(key),
                None => break,
            }
        }

        debug!(count = items.len(), "Scanned table");
        Ok(items)
    }
}
