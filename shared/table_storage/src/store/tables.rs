//! Table administration

use std::future::Future;
use std::time::Duration;

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::types::{BillingMode, ProvisionedThroughput, TableDescription};
use tracing::{debug, info, instrument};

use super::DocumentStore;
use crate::error::{Operation, StoreError, StoreResult};
use crate::schema::{create_table_build_error, CapacityMode, DeletedTable, TableInfo, TableSchema};

fn table_info<'a, T>(description: Option<&'a TableDescription>, table: &str) -> StoreResult<T>
where
    T: TryFrom<&'a TableDescription, Error = StoreError>,
{
    description
        .ok_or_else(|| {
            StoreError::MalformedResponse(format!("no table description returned for {table}"))
        })
        .and_then(T::try_from)
}

/// `ResourceInUseException` on create means the name is taken
fn create_table_error(table: &str, err: SdkError<CreateTableError, HttpResponse>) -> StoreError {
    match err {
        SdkError::ServiceError(ref svc) if svc.err().is_resource_in_use_exception() => {
            StoreError::TableAlreadyExists {
                table: table.to_string(),
            }
        }
        err => StoreError::from_sdk(Operation::CreateTable, table, err),
    }
}

impl DocumentStore {
    /// Creates a table with the schema's key attributes and capacity mode
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableAlreadyExists` if a table with the same name
    /// exists, or another `StoreError` if the Dynamo DB operation fails
    #[instrument(skip(self, schema), fields(table = %schema.name))]
    pub async fn create_table(&self, schema: &TableSchema) -> StoreResult<TableInfo> {
        let mut request = self
            .dynamodb_client
            .create_table()
            .table_name(&schema.name)
            .set_key_schema(Some(schema.key_schema_elements()?))
            .set_attribute_definitions(Some(schema.attribute_definitions()?));

        request = match schema.capacity {
            CapacityMode::Provisioned {
                read_capacity_units,
                write_capacity_units,
            } => request.billing_mode(BillingMode::Provisioned).provisioned_throughput(
                ProvisionedThroughput::builder()
                    .read_capacity_units(read_capacity_units)
                    .write_capacity_units(write_capacity_units)
                    .build()
                    .map_err(create_table_build_error)?,
            ),
            CapacityMode::OnDemand => request.billing_mode(BillingMode::PayPerRequest),
        };

        let output = request
            .send()
            .await
            .map_err(|err| create_table_error(&schema.name, err))?;

        let info: TableInfo = table_info(output.table_description(), &schema.name)?;
        info!(status = ?info.status, "Created table");
        Ok(info)
    }

    /// Deletes a table and all of its items
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableNotFound` if the table does not exist, or
    /// another `StoreError` if the Dynamo DB operation fails
    #[instrument(skip(self))]
    pub async fn delete_table(&self, table: &str) -> StoreResult<DeletedTable> {
        let output = self
            .dynamodb_client
            .delete_table()
            .table_name(table)
            .send()
            .await
            .map_err(|err| StoreError::from_sdk(Operation::DeleteTable, table, err))?;

        let deleted: DeletedTable = table_info(output.table_description(), table)?;
        info!(status = ?deleted.status, "Deleted table");
        Ok(deleted)
    }

    /// Lists every table name, following pagination to the end
    ///
    /// # Returns
    ///
    /// Table names in the order the service returns them (ascending)
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the Dynamo DB operation fails
    #[instrument(skip(self))]
    pub async fn list_tables(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        let mut start_table: Option<String> = None;

        loop {
            let output = self
                .dynamodb_client
                .list_tables()
                .set_exclusive_start_table_name(start_table.take())
                .send()
                .await
                .map_err(|err| StoreError::from_sdk(Operation::ListTables, "", err))?;

            names.extend(output.table_names().iter().cloned());

            match output.last_evaluated_table_name() {
                Some(last) => start_table = Some(last.to_string()),
                None => break,
            }
        }

        debug!(count = names.len(), "Listed tables");
        Ok(names)
    }

    /// Describes a table
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableNotFound` if the table does not exist, or
    /// another `StoreError` if the Dynamo DB operation fails
    #[instrument(skip(self))]
    pub async fn describe_table(&self, table: &str) -> StoreResult<TableInfo> {
        let output = self
            .dynamodb_client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|err| StoreError::from_sdk(Operation::DescribeTable, table, err))?;

        table_info(output.table(), table)
    }

    /// Polls the table until it reports the ACTIVE status
    ///
    /// # Arguments
    ///
    /// * `table` - Table name
    /// * `max_attempts` - Number of describe calls before giving up
    /// * `delay` - Pause between two describe calls
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableActivationTimeout` if the table is still not
    /// active after `max_attempts`, or the error of a failed describe call
    #[instrument(skip(self, delay))]
    pub async fn wait_for_active(
        &self,
        table: &str,
        max_attempts: u32,
        delay: Duration,
    ) -> StoreResult<TableInfo> {
        poll_until_active(table, max_attempts, delay, || self.describe_table(table)).await
    }
}

async fn poll_until_active<F, Fut>(
    table: &str,
    max_attempts: u32,
    delay: Duration,
    mut describe: F,
) -> StoreResult<TableInfo>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<TableInfo>>,
{
    for attempt in 1..=max_attempts {
        let info = describe().await?;
        if info.is_active() {
            return Ok(info);
        }
        debug!(attempt, status = ?info.status, "Table not active yet");
        if attempt < max_attempts {
            tokio::time::sleep(delay).await;
        }
    }

    Err(StoreError::TableActivationTimeout {
        table: table.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Instant;

    use aws_sdk_dynamodb::types::error::{LimitExceededException, ResourceInUseException};

    use super::*;
    use crate::error::service_error;
    use crate::schema::{KeyAttribute, TableStatus};

    fn table_with_status(status: TableStatus) -> TableInfo {
        TableInfo {
            name: "OrderHistory".to_string(),
            status,
            partition_key: KeyAttribute::string("CustomerId"),
            sort_key: Some(KeyAttribute::number("OrderNumber")),
            capacity: CapacityMode::default(),
            item_count: None,
        }
    }

    #[test]
    fn test_resource_in_use_is_table_already_exists() {
        let err = service_error(CreateTableError::ResourceInUseException(
            ResourceInUseException::builder()
                .message("Table already exists: OrderHistory")
                .build(),
        ));

        let mapped = create_table_error("OrderHistory", err);
        assert!(
            matches!(mapped, StoreError::TableAlreadyExists { ref table } if table == "OrderHistory")
        );
    }

    #[test]
    fn test_other_create_failures_stay_service_errors() {
        let err = service_error(CreateTableError::LimitExceededException(
            LimitExceededException::builder().build(),
        ));

        let mapped = create_table_error("OrderHistory", err);
        assert!(matches!(
            mapped,
            StoreError::Service {
                operation: Operation::CreateTable,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_poll_returns_once_active() {
        let calls = Cell::new(0);
        let info = poll_until_active("OrderHistory", 5, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            let status = if calls.get() < 3 {
                TableStatus::Creating
            } else {
                TableStatus::Active
            };
            async move { Ok(table_with_status(status)) }
        })
        .await
        .unwrap();

        assert!(info.is_active());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_poll_timeout_skips_final_delay() {
        let delay = Duration::from_millis(500);
        let started = Instant::now();

        let err = poll_until_active("OrderHistory", 1, delay, || async {
            Ok(table_with_status(TableStatus::Creating))
        })
        .await
        .unwrap_err();

        assert!(
            matches!(err, StoreError::TableActivationTimeout { ref table } if table == "OrderHistory")
        );
        assert!(started.elapsed() < delay);
    }
}
