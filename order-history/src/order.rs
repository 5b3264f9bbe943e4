//! Order history table: schema, record type and seed data

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use strum::Display;
use table_storage::{CapacityMode, KeyAttribute, TableSchema};

/// Table name used when none is configured
pub const DEFAULT_TABLE_NAME: &str = "OrderHistory";

const SEED_ORDERS: &str = include_str!("../data/orders.json");

/// Attribute names for the order history table
#[derive(Debug, Clone, Copy, Display)]
pub enum OrderAttribute {
    /// Customer identifier (Partition Key)
    CustomerId,
    /// Order number within the customer (Sort Key)
    OrderNumber,
    Product,
    Price,
}

/// Order history item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    /// Customer identifier (Partition Key)
    pub customer_id: String,
    /// Order number (Sort Key)
    pub order_number: i64,
    pub product: String,
    pub price: i64,
}

/// Schema of the order history table
#[must_use]
pub fn order_table_schema(table_name: &str, capacity: CapacityMode) -> TableSchema {
    TableSchema::new(
        table_name,
        KeyAttribute::string(OrderAttribute::CustomerId.to_string()),
    )
    .with_sort_key(KeyAttribute::number(OrderAttribute::OrderNumber.to_string()))
    .with_capacity(capacity)
}

/// Orders shipped with the binary
///
/// # Errors
///
/// Returns an error if the embedded JSON does not match [`Order`]
pub fn seed_orders() -> serde_json::Result<Vec<Order>> {
    serde_json::from_str(SEED_ORDERS)
}

/// Reads orders from a JSON array file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed
pub fn load_orders(path: &Path) -> anyhow::Result<Vec<Order>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read orders from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse orders from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use table_storage::AttributeType;

    use super::*;

    #[test]
    fn test_seed_orders_parse() {
        let orders = seed_orders().unwrap();

        assert_eq!(orders.len(), 5);
        assert_eq!(
            orders[0],
            Order {
                customer_id: "A001".to_string(),
                order_number: 1,
                product: "apple".to_string(),
                price: 100,
            }
        );
        assert!(orders
            .iter()
            .any(|o| o.customer_id == "A002" && o.order_number == 2));
    }

    #[test]
    fn test_seed_orders_have_unique_keys() {
        let orders = seed_orders().unwrap();
        let mut keys: Vec<_> = orders
            .iter()
            .map(|o| (o.customer_id.as_str(), o.order_number))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), orders.len());
    }

    #[test]
    fn test_order_table_schema() {
        let schema = order_table_schema(DEFAULT_TABLE_NAME, CapacityMode::default());

        assert_eq!(schema.name, "OrderHistory");
        assert_eq!(schema.partition_key.name, "CustomerId");
        assert_eq!(schema.partition_key.attribute_type, AttributeType::String);
        let sort_key = schema.sort_key.unwrap();
        assert_eq!(sort_key.name, "OrderNumber");
        assert_eq!(sort_key.attribute_type, AttributeType::Number);
        assert_eq!(schema.capacity, CapacityMode::provisioned(1, 1));
    }

    #[test]
    fn test_order_serializes_with_table_attribute_names() {
        let order = Order {
            customer_id: "A001".to_string(),
            order_number: 1,
            product: "apple".to_string(),
            price: 100,
        };
        let json = serde_json::to_value(&order).unwrap();

        for attribute in [
            OrderAttribute::CustomerId,
            OrderAttribute::OrderNumber,
            OrderAttribute::Product,
            OrderAttribute::Price,
        ] {
            assert!(json.get(attribute.to_string()).is_some(), "{attribute}");
        }
    }

    #[test]
    fn test_load_orders_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"CustomerId":"B001","OrderNumber":7,"Product":"pear","Price":90}}]"#
        )
        .unwrap();

        let orders = load_orders(file.path()).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].customer_id, "B001");

        let err = load_orders(Path::new("/nonexistent/orders.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read orders"));
    }
}
