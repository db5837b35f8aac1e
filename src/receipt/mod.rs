//! Receipt

use std::{fmt, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    basket::Basket,
    pricing::TotalPriceError,
    promotions::threshold_gift::{GiftAssessment, GiftError, ThresholdGiftPromotion},
    quantities::QuantityMap,
    solvers::{AppliedCombo, ComboResolution},
};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating total price from basket items.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Wrapper for threshold gift errors.
    #[error(transparent)]
    Gift(#[from] GiftError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Where the basket stands against the spend-threshold gift promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftStatus {
    /// A gift unit was deducted.
    Applied,

    /// The post-combo total met the threshold but no gift was deducted.
    ReachedWithoutGift {
        /// A gift unit is in the cart, but deducting it drops below the threshold.
        gift_available: bool,
    },

    /// The post-combo total is under the threshold.
    BelowThreshold,
}

impl fmt::Display for GiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GiftStatus::Applied => f.write_str("gift deducted"),
            GiftStatus::ReachedWithoutGift {
                gift_available: true,
            } => f.write_str("threshold reached, but not after deducting the gift"),
            GiftStatus::ReachedWithoutGift {
                gift_available: false,
            } => f.write_str("threshold reached, no gift in cart"),
            GiftStatus::BelowThreshold => f.write_str("spend more to reach the threshold"),
        }
    }
}

/// Final pricing breakdown for a basket.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Total cost before any discount
    original_total: Money<'a, Currency>,

    /// Amount payable after combos and the gift deduction
    final_total: Money<'a, Currency>,

    /// Discount from combos
    total_discount: Money<'a, Currency>,

    /// Combos in the winning solution
    applied_combos: SmallVec<[AppliedCombo<'a>; 4]>,

    /// Item quantities not consumed by combos
    remaining_items: QuantityMap,

    /// Threshold gift outcome
    gift: GiftAssessment<'a>,

    /// Spend threshold the gift was checked against
    threshold: Money<'a, Currency>,

    /// Currency used for all monetary values
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a basket and its combo resolution.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the basket subtotal cannot be calculated,
    /// money arithmetic fails, or the gift rules use another currency.
    pub fn from_resolution(
        basket: &Basket<'a>,
        resolution: ComboResolution<'a>,
        gift_promotion: &ThresholdGiftPromotion<'a>,
    ) -> Result<Self, ReceiptError> {
        let original_total = basket.subtotal()?;
        let total_after_combo = original_total.sub(resolution.total_discount)?;

        let gift = gift_promotion.assess(basket, &resolution, total_after_combo)?;
        let final_total = total_after_combo.sub(gift.gift_discount)?;

        Ok(Self {
            original_total,
            final_total,
            total_discount: resolution.total_discount,
            applied_combos: resolution.applied_combos,
            remaining_items: resolution.remaining_items,
            gift,
            threshold: *gift_promotion.threshold(),
            currency: basket.currency(),
        })
    }

    /// Total cost before any discount
    #[must_use]
    pub fn original_total(&self) -> Money<'a, Currency> {
        self.original_total
    }

    /// Amount payable
    #[must_use]
    pub fn final_total(&self) -> Money<'a, Currency> {
        self.final_total
    }

    /// Discount from combos
    #[must_use]
    pub fn total_discount(&self) -> Money<'a, Currency> {
        self.total_discount
    }

    /// Combos in the winning solution
    #[must_use]
    pub fn applied_combos(&self) -> &[AppliedCombo<'a>] {
        &self.applied_combos
    }

    /// Item quantities not consumed by combos
    #[must_use]
    pub fn remaining_items(&self) -> &QuantityMap {
        &self.remaining_items
    }

    /// Amount deducted for the gift
    #[must_use]
    pub fn gift_discount(&self) -> Money<'a, Currency> {
        self.gift.gift_discount
    }

    /// True when the gift deduction was granted
    #[must_use]
    pub fn qualifies_for_gift(&self) -> bool {
        self.gift.qualifies_for_gift
    }

    /// True when a gift unit is left after the gift-consuming combo
    #[must_use]
    pub fn has_available_gift(&self) -> bool {
        self.gift.has_available_gift
    }

    /// Units of gift items in the cart
    #[must_use]
    pub fn total_gift_quantity(&self) -> u64 {
        self.gift.total_gift_quantity
    }

    /// Gift units consumed by the gift-consuming combo
    #[must_use]
    pub fn gift_used_in_combo(&self) -> u32 {
        self.gift.gift_used_in_combo
    }

    /// Gift units left over
    #[must_use]
    pub fn available_gift_count(&self) -> i64 {
        self.gift.available_gift_count
    }

    /// True when the post-combo total met the threshold
    #[must_use]
    pub fn reached_threshold(&self) -> bool {
        self.gift.reached_threshold
    }

    /// Spend threshold
    #[must_use]
    pub fn threshold(&self) -> Money<'a, Currency> {
        self.threshold
    }

    /// Currency of every amount on the receipt
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Threshold gift status for display
    #[must_use]
    pub fn gift_status(&self) -> GiftStatus {
        if self.gift.qualifies_for_gift && self.gift.has_available_gift {
            GiftStatus::Applied
        } else if self.gift.reached_threshold {
            GiftStatus::ReachedWithoutGift {
                gift_available: self.gift.has_available_gift,
            }
        } else {
            GiftStatus::BelowThreshold
        }
    }

    /// Total saved: combo discount plus gift deduction.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.original_total.sub(self.final_total)
    }

    /// Savings as a fraction of the original total
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let original_minor = self.original_total.to_minor_units();

        if original_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        Ok(Percentage::from(
            Decimal::from(savings_minor) / Decimal::from(original_minor),
        ))
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        basket: &Basket<'_>,
    ) -> Result<(), ReceiptError> {
        write_item_table(&mut out, basket)?;

        if !self.applied_combos.is_empty() {
            write_combo_table(&mut out, &self.applied_combos)?;
        }

        write_receipt_summary(&mut out, self)
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

fn write_item_table(out: &mut impl io::Write, basket: &Basket<'_>) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "ID", "Unit Price", "Qty", "Subtotal"]);

    for (idx, item) in basket.iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            item.name().to_string(),
            item.id().map(|id| id.to_string()).unwrap_or_default(),
            format!("{}", item.unit_price()),
            item.quantity().to_string(),
            format!("{}", item.line_total()?),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_combo_table(
    out: &mut impl io::Write,
    applied_combos: &[AppliedCombo<'_>],
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Combo", "Discount", "Count", "Savings"]);

    for applied in applied_combos {
        builder.push_record([
            format!("{} ({})", applied.name, applied.combo_id),
            format!("{}", applied.discount),
            format!("x{}", applied.applicable_count),
            format!("-{}", applied.savings()),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..4), Alignment::right());
    table.modify(Columns::new(3..4), Color::FG_GREEN);

    writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let savings = receipt.savings()?;
    let savings_percent_points = percent_points(receipt.savings_percent()?);

    let rows = [
        ("Subtotal:", format!("{}", receipt.original_total())),
        ("Combo discount:", format!("-{}", receipt.total_discount())),
        ("Gift deduction:", format!("-{}", receipt.gift_discount())),
        ("Total:", format!("{}", receipt.final_total())),
        ("Savings:", format!("({savings_percent_points:.2}%) {savings}")),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(
        out,
        "\n Gift (spend {}): {}",
        receipt.threshold(),
        receipt.gift_status()
    )
    .map_err(|_err| ReceiptError::IO)
}
