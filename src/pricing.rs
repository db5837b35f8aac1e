//! Prices

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::info_span;

use crate::{
    basket::Basket,
    combos::catalog::ComboCatalog,
    items::CartItem,
    promotions::threshold_gift::ThresholdGiftPromotion,
    receipt::{Receipt, ReceiptError},
    solvers::{Solver, SolverError},
};

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// No items were provided, so currency could not be determined.
    #[error("no items provided; cannot determine currency")]
    NoItems,

    /// A line total or running sum does not fit in minor units.
    #[error("price total overflows minor units")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Errors from a full pricing pass.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Wrapped combo resolution error.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Wrapped receipt construction error.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// Calculates the total price of a list of cart lines
///
/// # Errors
///
/// - [`TotalPriceError::NoItems`]: No items were provided, so currency could not be determined.
/// - [`TotalPriceError::Overflow`]: A line total does not fit in minor units.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(items: &[CartItem<'a>]) -> Result<Money<'a, Currency>, TotalPriceError> {
    let first = items.first().ok_or(TotalPriceError::NoItems)?;

    let total = items.iter().try_fold(
        Money::from_minor(0, first.unit_price().currency()),
        |acc, item| -> Result<_, TotalPriceError> { Ok(acc.add(item.line_total()?)?) },
    )?;

    Ok(total)
}

/// Resolve combos for the basket with solver `S`, then apply the threshold gift rule.
///
/// # Errors
///
/// Returns a [`PricingError`] if combo resolution or receipt construction fails.
pub fn price_basket<'a, S: Solver>(
    basket: &Basket<'a>,
    catalog: &ComboCatalog<'a>,
    gift_promotion: &ThresholdGiftPromotion<'a>,
) -> Result<Receipt<'a>, PricingError> {
    let span = info_span!("price_basket", lines = basket.len(), combos = catalog.len());
    let _guard = span.enter();

    let resolution = S::solve(catalog, basket)?;

    Ok(Receipt::from_resolution(basket, resolution, gift_promotion)?)
}
