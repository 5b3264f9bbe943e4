//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::order::DEFAULT_TABLE_NAME;

/// Runs a single operation against the order history table.
#[derive(Debug, Parser)]
#[command(
    name = "order-history",
    version,
    long_about = "Runs a single table or item operation against a DynamoDB-compatible service.

Environment variables:
  APP_ENV                - development (default), staging or production
  DYNAMODB_ENDPOINT_URL  - Endpoint override (development defaults to http://localhost:8000)
  AWS_REGION             - AWS region (defaults to ap-northeast-1)
  ORDER_TABLE_NAME       - Table name (defaults to OrderHistory)
  MAX_CONCURRENT_WRITES  - In-flight writes for put-items
  TRACING_LEVEL          - Default log level
  RUST_LOG               - Log filter"
)]
pub struct Cli {
    /// Table name to use.
    #[arg(long, global = true, env = "ORDER_TABLE_NAME", default_value = DEFAULT_TABLE_NAME)]
    pub table_name: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the order history table.
    CreateTable(CreateTableArgs),

    /// Delete the table and all of its items.
    DeleteTable,

    /// List every table name.
    ListTables,

    /// Show table status, key schema and throughput.
    DescribeTable,

    /// Write the seed orders (or the orders of a JSON file).
    PutItems(PutItemsArgs),

    /// Read one order by key.
    GetItem(GetItemArgs),

    /// Set the product and price of an order.
    UpdateItem(UpdateItemArgs),

    /// Delete one order by key.
    DeleteItem(DeleteItemArgs),

    /// Read the orders of the table.
    Scan(ScanArgs),
}

impl Command {
    /// Label printed around the operation result
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "createTable",
            Self::DeleteTable => "deleteTable",
            Self::ListTables => "listTables",
            Self::DescribeTable => "describeTable",
            Self::PutItems(_) => "putItem",
            Self::GetItem(_) => "getItem",
            Self::UpdateItem(_) => "updateItem",
            Self::DeleteItem(_) => "deleteItem",
            Self::Scan(_) => "scan",
        }
    }
}

#[derive(Debug, Args)]
pub struct CreateTableArgs {
    /// Provisioned read capacity units.
    #[arg(long, default_value_t = 1)]
    pub read_capacity: i64,

    /// Provisioned write capacity units.
    #[arg(long, default_value_t = 1)]
    pub write_capacity: i64,

    /// Use on-demand capacity instead of provisioned throughput.
    #[arg(long, conflicts_with_all = ["read_capacity", "write_capacity"])]
    pub on_demand: bool,

    /// Wait until the table is ACTIVE.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Args)]
pub struct PutItemsArgs {
    /// JSON array of orders to write instead of the seed orders.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Fail for orders whose key is already stored.
    #[arg(long)]
    pub if_not_exists: bool,
}

#[derive(Debug, Args)]
pub struct GetItemArgs {
    #[arg(long, default_value = "A001")]
    pub customer_id: String,

    #[arg(long, default_value_t = 1)]
    pub order_number: i64,

    /// Use a strongly consistent read.
    #[arg(long)]
    pub consistent: bool,
}

#[derive(Debug, Args)]
pub struct UpdateItemArgs {
    #[arg(long, default_value = "A001")]
    pub customer_id: String,

    #[arg(long, default_value_t = 1)]
    pub order_number: i64,

    #[arg(long, default_value = "pine")]
    pub product: String,

    /// Stored as a string attribute.
    #[arg(long, default_value = "110")]
    pub price: String,

    /// Create the order if it does not exist.
    #[arg(long)]
    pub upsert: bool,

    /// Print the order as it was before the update.
    #[arg(long)]
    pub return_old: bool,
}

#[derive(Debug, Args)]
pub struct DeleteItemArgs {
    #[arg(long, default_value = "A002")]
    pub customer_id: String,

    #[arg(long, default_value_t = 2)]
    pub order_number: i64,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Maximum number of items to read in a single page.
    #[arg(long, conflicts_with = "all")]
    pub limit: Option<i32>,

    /// Follow pagination until the whole table is read.
    #[arg(long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("order-history").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_demo_keys() {
        let cli = parse(&["get-item"]);
        assert_eq!(cli.command.label(), "getItem");
        let Command::GetItem(args) = cli.command else {
            panic!("expected get-item");
        };
        assert_eq!(args.customer_id, "A001");
        assert_eq!(args.order_number, 1);
        assert!(!args.consistent);

        let Command::DeleteItem(args) = parse(&["delete-item"]).command else {
            panic!("expected delete-item");
        };
        assert_eq!(args.customer_id, "A002");
        assert_eq!(args.order_number, 2);

        let Command::UpdateItem(args) = parse(&["update-item"]).command else {
            panic!("expected update-item");
        };
        assert_eq!(args.product, "pine");
        assert_eq!(args.price, "110");
        assert!(!args.upsert);
    }

    #[test]
    fn test_table_name_is_global() {
        let cli = parse(&["describe-table", "--table-name", "Orders2"]);
        assert_eq!(cli.table_name, "Orders2");
        assert_eq!(cli.command.label(), "describeTable");
    }

    #[test]
    fn test_create_table_options() {
        let Command::CreateTable(args) =
            parse(&["create-table", "--read-capacity", "5", "--wait"]).command
        else {
            panic!("expected create-table");
        };
        assert_eq!(args.read_capacity, 5);
        assert_eq!(args.write_capacity, 1);
        assert!(args.wait);
        assert!(!args.on_demand);

        let result = Cli::try_parse_from([
            "order-history",
            "create-table",
            "--on-demand",
            "--read-capacity",
            "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_limit_conflicts_with_all() {
        let result = Cli::try_parse_from(["order-history", "scan", "--all", "--limit", "3"]);
        assert!(result.is_err());

        let Command::Scan(args) = parse(&["scan", "--limit", "3"]).command else {
            panic!("expected scan");
        };
        assert_eq!(args.limit, Some(3));
    }

    #[test]
    fn test_operation_is_required() {
        assert!(Cli::try_parse_from(["order-history"]).is_err());
    }
}
