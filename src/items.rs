//! Items

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::pricing::TotalPriceError;

/// Catalog identifier of a sellable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A line in the cart.
///
/// Lines without an [`ItemId`] can never take part in a combo, but they are
/// still charged.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem<'a> {
    id: Option<ItemId>,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartItem<'a> {
    /// Creates a new cart line for a catalog item
    pub fn new(
        id: u32,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            id: Some(ItemId(id)),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Creates a cart line that has no catalog identifier
    pub fn unidentified(
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the item identifier, if any
    pub fn id(&self) -> Option<ItemId> {
        self.id
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the price of a single unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the number of units on this line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns `unit_price * quantity`
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::Overflow`] if the line total does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(TotalPriceError::Overflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }

    /// Returns true if this line carries one of the given identifiers
    pub fn is_any_of(&self, ids: &[ItemId]) -> bool {
        self.id.is_some_and(|id| ids.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn line_total_multiplies_unit_price_by_quantity() -> TestResult {
        let item = CartItem::new(1, "Notebook", Money::from_minor(12_000, iso::TWD), 3);

        assert_eq!(item.line_total()?, Money::from_minor(36_000, iso::TWD));

        Ok(())
    }

    #[test]
    fn line_total_overflow_errors() {
        let item = CartItem::new(1, "Notebook", Money::from_minor(i64::MAX, iso::TWD), 2);

        assert!(matches!(item.line_total(), Err(TotalPriceError::Overflow)));
    }

    #[test]
    fn unidentified_items_match_no_ids() {
        let item = CartItem::unidentified("Gift wrap", Money::from_minor(2_000, iso::TWD), 1);

        assert_eq!(item.id(), None);
        assert!(!item.is_any_of(&[ItemId(7), ItemId(8)]));
    }

    #[test]
    fn is_any_of_matches_listed_ids() {
        let item = CartItem::new(8, "Keychain", Money::from_minor(6_000, iso::TWD), 1);

        assert!(item.is_any_of(&[ItemId(7), ItemId(8)]));
        assert!(!item.is_any_of(&[ItemId(1)]));
    }
}
