//! Named attribute assignments for `UpdateItem`

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::schema::ItemKey;

/// Which image of the item an update returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateImage {
    /// Item as it is after the update
    #[default]
    New,
    /// Item as it was before the update
    Old,
}

impl UpdateImage {
    pub(crate) const fn return_value(self) -> ReturnValue {
        match self {
            Self::New => ReturnValue::AllNew,
            Self::Old => ReturnValue::AllOld,
        }
    }
}

/// Update request for a single item
///
/// ```ignore
/// let update = UpdateItem::new(schema.composite_key("A001", 1)?)
///     .set("Product", AttributeValue::S("pine".into()))
///     .set("Price", AttributeValue::S("110".into()));
/// ```
#[derive(Debug, Clone)]
pub struct UpdateItem {
    key: ItemKey,
    assignments: Vec<(String, AttributeValue)>,
    upsert: bool,
    return_image: UpdateImage,
}

/// `UpdateExpression` with its placeholder maps
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
    pub condition: Option<String>,
}

impl UpdateItem {
    #[must_use]
    pub const fn new(key: ItemKey) -> Self {
        Self {
            key,
            assignments: Vec::new(),
            upsert: false,
            return_image: UpdateImage::New,
        }
    }

    /// Assigns `value` to `attribute`; a later assignment to the same
    /// attribute replaces the earlier one
    #[must_use]
    pub fn set(mut self, attribute: impl Into<String>, value: AttributeValue) -> Self {
        let attribute = attribute.into();
        if let Some(slot) = self.assignments.iter_mut().find(|(name, _)| *name == attribute) {
            slot.1 = value;
        } else {
            self.assignments.push((attribute, value));
        }
        self
    }

    /// Same as [`Self::set`] for any serializable value
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if `value` cannot be represented
    /// as an attribute value
    pub fn try_set<V: Serialize + ?Sized>(
        self,
        attribute: impl Into<String>,
        value: &V,
    ) -> StoreResult<Self> {
        let value: AttributeValue = serde_dynamo::to_attribute_value(value)?;
        Ok(self.set(attribute, value))
    }

    /// Create the item when the key is not stored yet
    #[must_use]
    pub const fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    #[must_use]
    pub const fn return_image(mut self, image: UpdateImage) -> Self {
        self.return_image = image;
        self
    }

    #[must_use]
    pub const fn key(&self) -> &ItemKey {
        &self.key
    }

    #[must_use]
    pub const fn image(&self) -> UpdateImage {
        self.return_image
    }

    #[must_use]
    pub const fn is_upsert(&self) -> bool {
        self.upsert
    }

    pub(crate) fn expression(&self) -> StoreResult<UpdateExpression> {
        if self.assignments.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }
        if let Some((name, _)) = self
            .assignments
            .iter()
            .find(|(name, _)| self.key.get(name).is_some())
        {
            return Err(StoreError::KeyAttributeUpdate {
                attribute: name.clone(),
            });
        }

        let mut names = HashMap::with_capacity(self.assignments.len() + 1);
        let mut values = HashMap::with_capacity(self.assignments.len());
        let mut clauses = Vec::with_capacity(self.assignments.len());

        for (index, (attribute, value)) in self.assignments.iter().enumerate() {
            let name = format!("#a{index}");
            let placeholder = format!(":v{index}");
            clauses.push(format!("{name} = {placeholder}"));
            names.insert(name, attribute.clone());
            values.insert(placeholder, value.clone());
        }

        let condition = if self.upsert {
            None
        } else {
            names.insert("#pk".to_string(), self.key.partition_key_name().to_string());
            Some("attribute_exists(#pk)".to_string())
        };

        Ok(UpdateExpression {
            expression: format!("SET {}", clauses.join(", ")),
            names,
            values,
            condition,
        })
    }
}
