//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_sdk_dynamodb::config::Credentials;
use table_storage::DEFAULT_MAX_CONCURRENT_WRITES;
use tracing::Level;

/// Local DynamoDB endpoint used in development
pub const LOCAL_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";

/// Region used when `AWS_REGION` is not set
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses a local DynamoDB)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the DynamoDB endpoint, with `DYNAMODB_ENDPOINT_URL` override support
    #[must_use]
    pub fn dynamodb_endpoint_url(&self) -> Option<String> {
        env::var("DYNAMODB_ENDPOINT_URL").ok().or_else(|| match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            Self::Development => Some(LOCAL_DYNAMODB_ENDPOINT.to_string()),
        })
    }

    /// Returns the AWS region
    #[must_use]
    pub fn region(&self) -> String {
        env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string())
    }

    /// Local DynamoDB accepts any key pair; real environments use the default chain
    #[must_use]
    pub const fn uses_static_credentials(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Maximum number of writes a batch put keeps in flight
    #[must_use]
    pub fn max_concurrent_writes(&self) -> usize {
        env::var("MAX_CONCURRENT_WRITES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_WRITES)
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region()))
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.dynamodb_endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }

        if self.uses_static_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                "dummy",
                "dummy",
                None,
                None,
                "order-history-local",
            ));
        }

        loader.load().await
    }

    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}
