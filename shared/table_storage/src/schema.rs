//! Table schema, key and description types
//!
//! A [`TableSchema`] is the client-side view of a table: its name, key
//! attributes and capacity mode. Keys are always built from a schema so that
//! attribute names and scalar types are checked before a request is sent.

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableDescription, TableStatus as SdkTableStatus,
};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{Operation, StoreError, StoreResult};

/// A stored item: attribute name to typed value
pub type Item = HashMap<String, AttributeValue>;

/// Scalar types allowed for key attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum AttributeType {
    /// `S`
    String,
    /// `N`
    Number,
    /// `B`
    Binary,
}

impl AttributeType {
    pub(crate) const fn to_scalar(self) -> ScalarAttributeType {
        match self {
            Self::String => ScalarAttributeType::S,
            Self::Number => ScalarAttributeType::N,
            Self::Binary => ScalarAttributeType::B,
        }
    }

    pub(crate) fn from_scalar(scalar: &ScalarAttributeType) -> StoreResult<Self> {
        match scalar {
            ScalarAttributeType::S => Ok(Self::String),
            ScalarAttributeType::N => Ok(Self::Number),
            ScalarAttributeType::B => Ok(Self::Binary),
            other => Err(StoreError::MalformedResponse(format!(
                "unsupported key attribute type {}",
                other.as_str()
            ))),
        }
    }

    fn matches(self, value: &AttributeValue) -> bool {
        matches!(
            (self, value),
            (Self::String, AttributeValue::S(_))
                | (Self::Number, AttributeValue::N(_))
                | (Self::Binary, AttributeValue::B(_))
        )
    }
}

/// Name of the variant an attribute value holds, for error messages
pub(crate) fn value_kind(value: &AttributeValue) -> &'static str {
    match value {
        AttributeValue::S(_) => "String",
        AttributeValue::N(_) => "Number",
        AttributeValue::B(_) => "Binary",
        AttributeValue::Bool(_) => "Boolean",
        AttributeValue::Null(_) => "Null",
        AttributeValue::L(_) => "List",
        AttributeValue::M(_) => "Map",
        AttributeValue::Ss(_) => "StringSet",
        AttributeValue::Ns(_) => "NumberSet",
        AttributeValue::Bs(_) => "BinarySet",
        _ => "Unknown",
    }
}

/// A key attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    #[must_use]
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::String)
    }

    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Number)
    }

    #[must_use]
    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Binary)
    }

    fn check(&self, value: &AttributeValue) -> StoreResult<()> {
        if self.attribute_type.matches(value) {
            Ok(())
        } else {
            Err(StoreError::KeyTypeMismatch {
                attribute: self.name.clone(),
                expected: self.attribute_type,
                found: value_kind(value).to_string(),
            })
        }
    }
}

/// Table capacity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CapacityMode {
    /// Pre-allocated read/write capacity units
    Provisioned {
        read_capacity_units: i64,
        write_capacity_units: i64,
    },
    /// Pay per request
    OnDemand,
}

impl CapacityMode {
    #[must_use]
    pub const fn provisioned(read_capacity_units: i64, write_capacity_units: i64) -> Self {
        Self::Provisioned {
            read_capacity_units,
            write_capacity_units,
        }
    }
}

impl Default for CapacityMode {
    fn default() -> Self {
        Self::provisioned(1, 1)
    }
}

/// Table schema configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub capacity: CapacityMode,
}

impl TableSchema {
    /// Creates a schema with only a partition key and the default capacity
    #[must_use]
    pub fn new(name: impl Into<String>, partition_key: KeyAttribute) -> Self {
        Self {
            name: name.into(),
            partition_key,
            sort_key: None,
            capacity: CapacityMode::default(),
        }
    }

    #[must_use]
    pub fn with_sort_key(mut self, sort_key: KeyAttribute) -> Self {
        self.sort_key = Some(sort_key);
        self
    }

    #[must_use]
    pub const fn with_capacity(mut self, capacity: CapacityMode) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Partition key first, then the sort key if any
    pub fn key_attributes(&self) -> impl Iterator<Item = &KeyAttribute> {
        std::iter::once(&self.partition_key).chain(self.sort_key.as_ref())
    }

    /// Whether `name` is one of the table's key attributes
    #[must_use]
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.key_attributes().any(|k| k.name == name)
    }

    /// Builds the key of an item in a table without a sort key
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingKeyAttribute` if the table has a sort key,
    /// or `StoreError::KeyTypeMismatch` if the value has the wrong type
    pub fn key(&self, partition: impl Into<KeyValue>) -> StoreResult<ItemKey> {
        if let Some(sort_key) = &self.sort_key {
            return Err(StoreError::MissingKeyAttribute {
                attribute: sort_key.name.clone(),
            });
        }
        let mut attributes = HashMap::with_capacity(1);
        insert_key_value(&mut attributes, &self.partition_key, partition.into())?;
        Ok(ItemKey {
            table: self.name.clone(),
            partition_key: self.partition_key.name.clone(),
            attributes,
        })
    }

    /// Builds the key of an item from its partition and sort key values
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SortKeyNotDefined` if the table has no sort key,
    /// or `StoreError::KeyTypeMismatch` if a value has the wrong type
    pub fn composite_key(
        &self,
        partition: impl Into<KeyValue>,
        sort: impl Into<KeyValue>,
    ) -> StoreResult<ItemKey> {
        let sort_key = self
            .sort_key
            .as_ref()
            .ok_or_else(|| StoreError::SortKeyNotDefined {
                table: self.name.clone(),
            })?;
        let mut attributes = HashMap::with_capacity(2);
        insert_key_value(&mut attributes, &self.partition_key, partition.into())?;
        insert_key_value(&mut attributes, sort_key, sort.into())?;
        Ok(ItemKey {
            table: self.name.clone(),
            partition_key: self.partition_key.name.clone(),
            attributes,
        })
    }

    /// Checks that an item carries every key attribute with its declared type
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingKeyAttribute` or `StoreError::KeyTypeMismatch`
    pub fn validate_item(&self, item: &Item) -> StoreResult<()> {
        for key in self.key_attributes() {
            let value = item
                .get(&key.name)
                .ok_or_else(|| StoreError::MissingKeyAttribute {
                    attribute: key.name.clone(),
                })?;
            key.check(value)?;
        }
        Ok(())
    }

    /// Extracts the key of a full item
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate_item`]
    pub fn key_of(&self, item: &Item) -> StoreResult<ItemKey> {
        self.validate_item(item)?;
        let attributes = self
            .key_attributes()
            .filter_map(|k| item.get(&k.name).map(|v| (k.name.clone(), v.clone())))
            .collect();
        Ok(ItemKey {
            table: self.name.clone(),
            partition_key: self.partition_key.name.clone(),
            attributes,
        })
    }

    pub(crate) fn key_schema_elements(&self) -> StoreResult<Vec<KeySchemaElement>> {
        let mut elements = vec![KeySchemaElement::builder()
            .attribute_name(&self.partition_key.name)
            .key_type(KeyType::Hash)
            .build()
            .map_err(create_table_build_error)?];

        if let Some(sk) = &self.sort_key {
            elements.push(
                KeySchemaElement::builder()
                    .attribute_name(&sk.name)
                    .key_type(KeyType::Range)
                    .build()
                    .map_err(create_table_build_error)?,
            );
        }

        Ok(elements)
    }

    pub(crate) fn attribute_definitions(&self) -> StoreResult<Vec<AttributeDefinition>> {
        self.key_attributes()
            .map(|k| {
                AttributeDefinition::builder()
                    .attribute_name(&k.name)
                    .attribute_type(k.attribute_type.to_scalar())
                    .build()
                    .map_err(create_table_build_error)
            })
            .collect()
    }
}

fn insert_key_value(
    attributes: &mut Item,
    attribute: &KeyAttribute,
    value: KeyValue,
) -> StoreResult<()> {
    let value = value.into_attribute_value();
    attribute.check(&value)?;
    attributes.insert(attribute.name.clone(), value);
    Ok(())
}

pub(crate) fn create_table_build_error(err: aws_sdk_dynamodb::error::BuildError) -> StoreError {
    StoreError::InvalidRequest {
        operation: Operation::CreateTable,
        message: err.to_string(),
    }
}

/// A key attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue {
    String(String),
    /// Numbers travel as their decimal string form
    Number(String),
    Binary(Vec<u8>),
}

impl KeyValue {
    fn into_attribute_value(self) -> AttributeValue {
        match self {
            Self::String(s) => AttributeValue::S(s),
            Self::Number(n) => AttributeValue::N(n),
            Self::Binary(b) => AttributeValue::B(Blob::new(b)),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for KeyValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

macro_rules! number_key_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for KeyValue {
                fn from(value: $t) -> Self {
                    Self::Number(value.to_string())
                }
            }
        )*
    };
}

number_key_value!(i32, i64, u32, u64, f64);

/// Key of a single item, checked against its table schema
#[derive(Debug, Clone, PartialEq)]
pub struct ItemKey {
    table: String,
    partition_key: String,
    attributes: Item,
}

impl ItemKey {
    /// Name of the table the key was built for
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn partition_key_name(&self) -> &str {
        &self.partition_key
    }

    #[must_use]
    pub const fn attributes(&self) -> &Item {
        &self.attributes
    }

    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    pub(crate) fn to_item(&self) -> Item {
        self.attributes.clone()
    }
}

/// Table lifecycle status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Creating,
    Updating,
    Deleting,
    Active,
    /// Any other status reported by the service
    Other(String),
}

impl From<&SdkTableStatus> for TableStatus {
    fn from(status: &SdkTableStatus) -> Self {
        match status {
            SdkTableStatus::Creating => Self::Creating,
            SdkTableStatus::Updating => Self::Updating,
            SdkTableStatus::Deleting => Self::Deleting,
            SdkTableStatus::Active => Self::Active,
            other => Self::Other(other.as_str().to_string()),
        }
    }
}

/// Table metadata as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub status: TableStatus,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub capacity: CapacityMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
}

impl TableInfo {
    /// Schema the table was created with
    #[must_use]
    pub fn schema(&self) -> TableSchema {
        TableSchema {
            name: self.name.clone(),
            partition_key: self.partition_key.clone(),
            sort_key: self.sort_key.clone(),
            capacity: self.capacity,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TableStatus::Active
    }
}

fn description_name(table: &TableDescription) -> StoreResult<String> {
    table
        .table_name()
        .map(str::to_string)
        .ok_or_else(|| StoreError::MalformedResponse("table description without name".into()))
}

fn description_status(table: &TableDescription) -> TableStatus {
    table
        .table_status()
        .map_or_else(|| TableStatus::Other("UNKNOWN".to_string()), TableStatus::from)
}

impl TryFrom<&TableDescription> for TableInfo {
    type Error = StoreError;

    fn try_from(table: &TableDescription) -> StoreResult<Self> {
        let name = description_name(table)?;
        let status = description_status(table);

        let key_attribute = |key_type: &KeyType| -> StoreResult<Option<KeyAttribute>> {
            let Some(element) = table.key_schema().iter().find(|e| e.key_type() == key_type)
            else {
                return Ok(None);
            };
            let definition = table
                .attribute_definitions()
                .iter()
                .find(|d| d.attribute_name() == element.attribute_name())
                .ok_or_else(|| {
                    StoreError::MalformedResponse(format!(
                        "no attribute definition for key {}",
                        element.attribute_name()
                    ))
                })?;
            Ok(Some(KeyAttribute::new(
                element.attribute_name(),
                AttributeType::from_scalar(definition.attribute_type())?,
            )))
        };

        let partition_key = key_attribute(&KeyType::Hash)?.ok_or_else(|| {
            StoreError::MalformedResponse(format!("table {name} has no partition key"))
        })?;
        let sort_key = key_attribute(&KeyType::Range)?;

        let on_demand = table
            .billing_mode_summary()
            .and_then(|summary| summary.billing_mode())
            == Some(&BillingMode::PayPerRequest);
        let capacity = if on_demand {
            CapacityMode::OnDemand
        } else {
            let throughput = table.provisioned_throughput();
            CapacityMode::provisioned(
                throughput
                    .and_then(|t| t.read_capacity_units())
                    .unwrap_or_default(),
                throughput
                    .and_then(|t| t.write_capacity_units())
                    .unwrap_or_default(),
            )
        };

        Ok(Self {
            name,
            status,
            partition_key,
            sort_key,
            capacity,
            item_count: table.item_count(),
        })
    }
}

/// Acknowledgment of a table deletion
///
/// DeleteTable answers with the name and status only; key schema and
/// attribute definitions may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTable {
    pub name: String,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
}

impl TryFrom<&TableDescription> for DeletedTable {
    type Error = StoreError;

    fn try_from(table: &TableDescription) -> StoreResult<Self> {
        Ok(Self {
            name: description_name(table)?,
            status: description_status(table),
            item_count: table.item_count(),
        })
    }
}
