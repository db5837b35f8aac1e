//! Combos
//!
//! A combo is a flat discount granted for buying a fixed multiset of items
//! together. Combos live in an ordered [`catalog::ComboCatalog`].

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use slotmap::new_key_type;

use crate::{items::ItemId, quantities::RequiredQuantities};

pub mod catalog;

new_key_type! {
    /// Combo Key
    pub struct ComboKey;
}

/// Business identifier of a combo (e.g. `"combo3"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ComboId(String);

impl ComboId {
    /// Create a combo id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComboId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComboId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Combo definition
#[derive(Debug, Clone)]
pub struct ComboDefinition<'a> {
    id: ComboId,
    name: String,
    required_items: Vec<ItemId>,
    discount: Money<'a, Currency>,
}

impl<'a> ComboDefinition<'a> {
    /// Create a new combo definition.
    ///
    /// `required_items` may repeat an id to require more than one unit of it.
    pub fn new(
        id: impl Into<ComboId>,
        name: impl Into<String>,
        required_items: impl IntoIterator<Item = u32>,
        discount: Money<'a, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required_items: required_items.into_iter().map(ItemId).collect(),
            discount,
        }
    }

    /// Combo id
    pub fn id(&self) -> &ComboId {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required items, repeats included
    pub fn required_items(&self) -> &[ItemId] {
        &self.required_items
    }

    /// Discount granted per application
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }

    /// Multiplicity of each required item
    pub fn required_quantities(&self) -> RequiredQuantities {
        RequiredQuantities::from_ids(&self.required_items)
    }
}
