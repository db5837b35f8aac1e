//! Spend-threshold Gift Promotion
//!
//! Reserved gift items in the cart are deducted (one unit, priced at the first
//! gift line in cart order) when the post-combo total still meets the spend
//! threshold after the deduction. One named combo may consume gift stock; its
//! application count is subtracted from the gift units available.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    basket::Basket,
    combos::ComboId,
    items::{CartItem, ItemId},
    solvers::ComboResolution,
};

/// Threshold gift errors
#[derive(Debug, Error, PartialEq)]
pub enum GiftError {
    /// The threshold currency differs from the basket currency (threshold currency, basket currency).
    #[error("threshold has currency {0}, but basket has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Threshold gift promotion rules
#[derive(Debug, Clone)]
pub struct ThresholdGiftPromotion<'a> {
    gift_items: SmallVec<[ItemId; 2]>,
    gift_consuming_combo: Option<ComboId>,
    threshold: Money<'a, Currency>,
}

/// Outcome of checking a basket against the gift rules.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftAssessment<'a> {
    /// Units of gift items in the cart
    pub total_gift_quantity: u64,

    /// Gift units consumed by the gift-consuming combo
    pub gift_used_in_combo: u32,

    /// `total_gift_quantity - gift_used_in_combo`
    pub available_gift_count: i64,

    /// True when at least one gift unit is left over
    pub has_available_gift: bool,

    /// True when the gift deduction was granted
    pub qualifies_for_gift: bool,

    /// Amount deducted for the gift (zero when not granted)
    pub gift_discount: Money<'a, Currency>,

    /// True when the post-combo total meets the threshold, ignoring the gift
    pub reached_threshold: bool,
}

impl<'a> ThresholdGiftPromotion<'a> {
    /// Create gift rules.
    #[must_use]
    pub fn new(
        gift_items: impl IntoIterator<Item = u32>,
        gift_consuming_combo: Option<ComboId>,
        threshold: Money<'a, Currency>,
    ) -> Self {
        Self {
            gift_items: gift_items.into_iter().map(ItemId).collect(),
            gift_consuming_combo,
            threshold,
        }
    }

    /// Storefront defaults: items 7 and 8 are gifts, `combo3` consumes gift
    /// stock, and the threshold is 1000.00 in `currency`.
    #[must_use]
    pub fn storefront(currency: &'a Currency) -> Self {
        Self::new(
            [7, 8],
            Some(ComboId::new("combo3")),
            Money::from_minor(100_000, currency),
        )
    }

    /// Reserved gift item ids
    pub fn gift_items(&self) -> &[ItemId] {
        &self.gift_items
    }

    /// Combo whose applications consume gift stock, if any
    pub fn gift_consuming_combo(&self) -> Option<&ComboId> {
        self.gift_consuming_combo.as_ref()
    }

    /// Spend threshold
    pub fn threshold(&self) -> &Money<'a, Currency> {
        &self.threshold
    }

    /// Check the basket against the gift rules.
    ///
    /// `total_after_combo` is the basket subtotal minus the combo discount.
    ///
    /// # Errors
    ///
    /// Returns a [`GiftError`] if the threshold currency differs from the
    /// basket currency or money arithmetic fails.
    pub fn assess(
        &self,
        basket: &Basket<'a>,
        resolution: &ComboResolution<'a>,
        total_after_combo: Money<'a, Currency>,
    ) -> Result<GiftAssessment<'a>, GiftError> {
        let currency = basket.currency();

        if self.threshold.currency() != currency {
            return Err(GiftError::CurrencyMismatch(
                self.threshold.currency().iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let total_gift_quantity: u64 = basket
            .lines_matching(&self.gift_items)
            .map(|item| u64::from(item.quantity()))
            .sum();

        let gift_used_in_combo = self
            .gift_consuming_combo
            .as_ref()
            .and_then(|id| resolution.applied(id))
            .map_or(0, |applied| applied.applicable_count);

        let available_gift_count = i64::try_from(total_gift_quantity)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::from(gift_used_in_combo));

        let has_available_gift = available_gift_count > 0;
        let threshold_minor = self.threshold.to_minor_units();

        let mut gift_discount = Money::from_minor(0, currency);
        let mut qualifies_for_gift = false;

        // The first gift line in cart order prices the deduction.
        let gift = has_available_gift
            .then(|| self.first_gift_line(basket))
            .flatten();

        if let Some(gift) = gift {
            let after_gift = total_after_combo.sub(*gift.unit_price())?;

            if after_gift.to_minor_units() >= threshold_minor {
                qualifies_for_gift = true;
                gift_discount = *gift.unit_price();
            }
        }

        let reached_threshold = total_after_combo.to_minor_units() >= threshold_minor;

        debug!(
            total_gift_quantity,
            gift_used_in_combo,
            available_gift_count,
            qualifies_for_gift,
            reached_threshold,
            "assessed threshold gift"
        );

        Ok(GiftAssessment {
            total_gift_quantity,
            gift_used_in_combo,
            available_gift_count,
            has_available_gift,
            qualifies_for_gift,
            gift_discount,
            reached_threshold,
        })
    }

    /// First gift line in cart order, if any.
    pub fn first_gift_line<'b>(&self, basket: &'b Basket<'a>) -> Option<&'b CartItem<'a>> {
        basket
            .iter()
            .find(|item| item.is_any_of(&self.gift_items))
    }
}
