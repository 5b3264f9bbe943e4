//! Error types for table storage operations

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use strum::Display;
use thiserror::Error;

use crate::schema::AttributeType;

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operations, used to label errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    CreateTable,
    DeleteTable,
    ListTables,
    DescribeTable,
    PutItem,
    GetItem,
    UpdateItem,
    DeleteItem,
    Scan,
}

/// Errors that can occur during table storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Table already exists (or is still being created)
    #[error("Table {table} already exists")]
    TableAlreadyExists { table: String },

    /// Table does not exist
    #[error("Table {table} not found")]
    TableNotFound { table: String },

    /// Conditional put rejected because an item with the same key exists
    #[error("Item already exists in table {table}")]
    ItemAlreadyExists { table: String },

    /// Update without upsert targeted a key that is not stored
    #[error("Item not found in table {table}")]
    ItemNotFound { table: String },

    /// Item or key is missing one of the table's key attributes
    #[error("Missing key attribute {attribute}")]
    MissingKeyAttribute { attribute: String },

    /// Composite key requested for a table without a sort key
    #[error("Table {table} has no sort key")]
    SortKeyNotDefined { table: String },

    /// Key attribute carries a value of the wrong scalar type
    #[error("Key attribute {attribute} must be of type {expected}, got {found}")]
    KeyTypeMismatch {
        attribute: String,
        expected: AttributeType,
        found: String,
    },

    /// Update tried to assign a key attribute
    #[error("Key attribute {attribute} cannot be updated")]
    KeyAttributeUpdate { attribute: String },

    /// Update without any assignment
    #[error("Update has no attribute assignments")]
    EmptyUpdate,

    /// The service rejected the request
    #[error("{operation} failed with service error {}: {message}", .code.as_deref().unwrap_or("Unknown"))]
    Service {
        operation: Operation,
        code: Option<String>,
        message: String,
    },

    /// The request never got a response from the service
    #[error("{operation} failed to reach the service: {message}")]
    Transport { operation: Operation, message: String },

    /// The request could not be built
    #[error("{operation} request is invalid: {message}")]
    InvalidRequest { operation: Operation, message: String },

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The service answered without a field the operation relies on
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Table did not reach the ACTIVE status in time
    #[error("Timeout waiting for table {table} to become active")]
    TableActivationTimeout { table: String },
}

impl From<serde_dynamo::Error> for StoreError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl StoreError {
    /// Maps an SDK failure onto the generic taxonomy.
    ///
    /// Callers match the operation-specific error kinds (conditional check,
    /// resource in use) before falling back to this.
    pub(crate) fn from_sdk<E>(
        operation: Operation,
        table: &str,
        err: SdkError<E, HttpResponse>,
    ) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let message = DisplayErrorContext(&err).to_string();
        match &err {
            SdkError::ServiceError(svc) => {
                let code = svc.err().code().map(str::to_owned);
                if code.as_deref() == Some("ResourceNotFoundException") {
                    return Self::TableNotFound {
                        table: table.to_owned(),
                    };
                }
                Self::Service {
                    operation,
                    code,
                    message,
                }
            }
            SdkError::TimeoutError(_)
            | SdkError::DispatchFailure(_)
            | SdkError::ResponseError(_) => Self::Transport { operation, message },
            SdkError::ConstructionFailure(_) => Self::InvalidRequest { operation, message },
            _ => Self::Service {
                operation,
                code: None,
                message,
            },
        }
    }

    /// Whether the error came from the network rather than the service
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Wraps an operation error as if the service had answered with it
#[cfg(test)]
pub(crate) fn service_error<E>(err: E) -> SdkError<E, HttpResponse> {
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    let status = StatusCode::try_from(400_u16).expect("valid status code");
    SdkError::service_error(err, HttpResponse::new(status, SdkBody::empty()))
}
