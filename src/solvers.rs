//! Solvers for Combos

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    basket::Basket,
    combos::{ComboDefinition, ComboId, ComboKey, catalog::ComboCatalog},
    quantities::{QuantityError, QuantityMap},
};

pub mod exhaustive;
pub mod observer;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// Catalog and basket use different currencies (catalog currency, basket currency).
    #[error("catalog has currency {0}, but basket has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Accumulated discount does not fit in minor units.
    #[error("discount for combo {combo} overflows minor units")]
    DiscountOverflow {
        /// Combo whose contribution overflowed
        combo: ComboId,
    },

    /// Wrapped quantity aggregation error
    #[error(transparent)]
    Quantity(#[from] QuantityError),

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// One combo in a winning solution, with how many times it was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCombo<'a> {
    /// Catalog key of the applied combo
    pub combo_key: ComboKey,

    /// Combo id
    pub combo_id: ComboId,

    /// Combo display name
    pub name: String,

    /// Discount per application
    pub discount: Money<'a, Currency>,

    /// Number of applications (always at least 1)
    pub applicable_count: u32,
}

impl<'a> AppliedCombo<'a> {
    /// Record `count` applications of the catalog combo at `key`.
    pub fn new(key: ComboKey, combo: &ComboDefinition<'a>, count: u32) -> Self {
        Self {
            combo_key: key,
            combo_id: combo.id().clone(),
            name: combo.name().to_string(),
            discount: *combo.discount(),
            applicable_count: count,
        }
    }

    /// Total saved by this combo: `discount * applicable_count`.
    pub fn savings(&self) -> Money<'a, Currency> {
        let minor = self
            .discount
            .to_minor_units()
            .saturating_mul(i64::from(self.applicable_count));

        Money::from_minor(minor, self.discount.currency())
    }
}

/// Outcome of combo resolution for a basket
#[derive(Debug, Clone, PartialEq)]
pub struct ComboResolution<'a> {
    /// Applied combos, in the order the search chose them
    pub applied_combos: SmallVec<[AppliedCombo<'a>; 4]>,

    /// Quantities left over after all applied combos
    pub remaining_items: QuantityMap,

    /// Sum of `discount * applicable_count` over applied combos
    pub total_discount: Money<'a, Currency>,
}

impl<'a> ComboResolution<'a> {
    /// A resolution that applies nothing.
    pub fn empty(remaining_items: QuantityMap, currency: &'a Currency) -> Self {
        Self {
            applied_combos: SmallVec::new(),
            remaining_items,
            total_discount: Money::from_minor(0, currency),
        }
    }

    /// Applied record for `id`, if that combo is part of the solution.
    pub fn applied(&self, id: &ComboId) -> Option<&AppliedCombo<'a>> {
        self.applied_combos
            .iter()
            .find(|applied| &applied.combo_id == id)
    }
}

/// Trait for resolving combos on a basket
pub trait Solver {
    /// Resolve the best combo assignment for the given basket
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the solver encounters an error.
    fn solve<'a>(
        catalog: &ComboCatalog<'a>,
        basket: &Basket<'a>,
    ) -> Result<ComboResolution<'a>, SolverError>;
}
