//! Basket

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::{CartItem, ItemId},
    pricing::{TotalPriceError, total_price},
};

/// Errors related to basket construction or totals.
#[derive(Debug, Error)]
pub enum BasketError {
    /// An item's currency differs from the basket currency (index, item currency, basket currency).
    #[error("Item {0} has currency {1}, but basket has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A cart line was created with a quantity of zero (index).
    #[error("Item {0} has a quantity of zero")]
    ZeroQuantity(usize),

    /// A cart line has a negative unit price (index).
    #[error("Item {0} has a negative unit price")]
    NegativePrice(usize),
}

/// Basket
#[derive(Debug, Clone)]
pub struct Basket<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Basket<'a> {
    /// Create a new empty basket.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Basket {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new basket with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if an item has a mismatched currency, a zero
    /// quantity or a negative unit price.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, BasketError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.unit_price().currency();

            if item_currency != currency {
                return Err(BasketError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.quantity() == 0 {
                return Err(BasketError::ZeroQuantity(i));
            }

            if item.unit_price().to_minor_units() < 0 {
                return Err(BasketError::NegativePrice(i));
            }

            Ok(())
        })?;

        Ok(Basket { items, currency })
    }

    /// Calculate the subtotal of the basket.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic or overflow error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        total_price(&self.items)
    }

    /// Lines whose identifier is one of `ids`, in cart order.
    pub fn lines_matching<'b, 'c>(
        &'b self,
        ids: &'c [ItemId],
    ) -> impl Iterator<Item = &'b CartItem<'a>> + use<'a, 'b, 'c> {
        self.items.iter().filter(move |item| item.is_any_of(ids))
    }

    /// Iterate over the items in the basket.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem<'a>> {
        self.items.iter()
    }

    /// Borrow the items as a slice.
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Get the number of lines in the basket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the basket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the basket.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{TWD, USD},
    };
    use testresult::TestResult;

    use super::*;

    fn test_items<'a>() -> [CartItem<'a>; 3] {
        [
            CartItem::new(1, "Notebook", Money::from_minor(12_000, TWD), 1),
            CartItem::new(7, "Sticker pack", Money::from_minor(5_000, TWD), 2),
            CartItem::unidentified("Gift wrap", Money::from_minor(2_000, TWD), 1),
        ]
    }

    #[test]
    fn new_with_currency() {
        let basket = Basket::new(TWD);

        assert_eq!(basket.currency(), TWD);
        assert!(basket.is_empty());
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let items = [
            CartItem::new(1, "Notebook", Money::from_minor(100, TWD), 1),
            CartItem::new(2, "Pen set", Money::from_minor(100, USD), 1),
        ];

        let result = Basket::with_items(items, TWD);

        assert!(
            matches!(
                result,
                Err(BasketError::CurrencyMismatch(1, item_currency, basket_currency))
                    if item_currency == USD.iso_alpha_code && basket_currency == TWD.iso_alpha_code
            ),
            "expected CurrencyMismatch error, got {result:?}"
        );
    }

    #[test]
    fn with_items_zero_quantity_errors() {
        let items = [CartItem::new(1, "Notebook", Money::from_minor(100, TWD), 0)];

        assert!(matches!(
            Basket::with_items(items, TWD),
            Err(BasketError::ZeroQuantity(0))
        ));
    }

    #[test]
    fn with_items_negative_price_errors() {
        let items = [
            CartItem::new(1, "Notebook", Money::from_minor(100, TWD), 1),
            CartItem::new(2, "Pen set", Money::from_minor(-100, TWD), 1),
        ];

        assert!(matches!(
            Basket::with_items(items, TWD),
            Err(BasketError::NegativePrice(1))
        ));
    }

    #[test]
    fn subtotal_counts_every_line_including_unidentified() -> TestResult {
        let basket = Basket::with_items(test_items(), TWD)?;

        assert_eq!(basket.subtotal()?, Money::from_minor(24_000, TWD));

        Ok(())
    }

    #[test]
    fn subtotal_with_no_items() -> TestResult {
        let basket = Basket::new(TWD);

        assert_eq!(basket.subtotal()?, Money::from_minor(0, TWD));

        Ok(())
    }

    #[test]
    fn lines_matching_keeps_cart_order() -> TestResult {
        let basket = Basket::with_items(
            [
                CartItem::new(8, "Keychain", Money::from_minor(6_000, TWD), 1),
                CartItem::new(1, "Notebook", Money::from_minor(12_000, TWD), 1),
                CartItem::new(7, "Sticker pack", Money::from_minor(5_000, TWD), 1),
            ],
            TWD,
        )?;

        let ids = [ItemId(7), ItemId(8)];
        let names: Vec<&str> = basket.lines_matching(&ids).map(CartItem::name).collect();

        assert_eq!(names, ["Keychain", "Sticker pack"]);

        Ok(())
    }

    #[test]
    fn matched_lines_outlive_the_id_list() -> TestResult {
        let basket = Basket::with_items(test_items(), TWD)?;

        let first_gift = {
            let ids = vec![ItemId(7), ItemId(8)];

            basket.lines_matching(&ids).next()
        };

        assert_eq!(first_gift.map(CartItem::name), Some("Sticker pack"));

        Ok(())
    }

    #[test]
    fn len_and_is_empty() -> TestResult {
        let empty_basket = Basket::with_items([], TWD)?;
        let non_empty_basket = Basket::with_items(test_items(), TWD)?;

        assert!(empty_basket.is_empty());
        assert_eq!(non_empty_basket.len(), 3);

        Ok(())
    }
}
