use std::process::ExitCode;
use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use order_history::{cli::Cli, commands, report, types::Environment};
use table_storage::DocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let environment = Environment::from_env();

    let filter = EnvFilter::builder()
        .with_default_directive(environment.tracing_level().into())
        .from_env_lossy();

    // JSON logs for staging/production, regular format for development.
    // stdout is reserved for the result block.
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    info!(?environment, table = %cli.table_name, "Starting order history driver");

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let store = DocumentStore::new(dynamodb_client)
        .with_max_concurrent_writes(environment.max_concurrent_writes());

    let label = cli.command.label();
    match commands::run(&store, &cli.table_name, cli.command).await {
        Ok(output) => {
            println!("{}", report::success_block(label, &output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(operation = label, "Operation failed: {e:#}");
            eprintln!("{}", report::error_block(label, &e));
            Ok(ExitCode::FAILURE)
        }
    }
}
