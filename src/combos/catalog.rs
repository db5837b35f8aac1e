//! Combo Catalog

use rustc_hash::FxHashSet;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::combos::{ComboDefinition, ComboId, ComboKey};

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two combos share the same id.
    #[error("duplicate combo id: {0}")]
    DuplicateId(ComboId),

    /// A combo requires no items.
    #[error("combo {0} has no required items")]
    EmptyRequirements(ComboId),

    /// A combo's discount is negative.
    #[error("combo {0} has a negative discount")]
    NegativeDiscount(ComboId),

    /// A combo's discount currency differs from the catalog currency (combo, combo currency, catalog currency).
    #[error("combo {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(ComboId, &'static str, &'static str),
}

/// Ordered, validated set of combos.
///
/// Order matters: when two combo assignments give the same discount, the one
/// reached first in catalog order wins.
#[derive(Debug, Clone)]
pub struct ComboCatalog<'a> {
    combos: SlotMap<ComboKey, ComboDefinition<'a>>,
    order: SmallVec<[ComboKey; 16]>,
    currency: &'static Currency,
}

impl<'a> ComboCatalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            combos: SlotMap::with_key(),
            order: SmallVec::new(),
            currency,
        }
    }

    /// Create a catalog from combos, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for duplicate ids, empty requirements,
    /// negative discounts or mismatched currencies.
    pub fn with_combos(
        combos: impl IntoIterator<Item = ComboDefinition<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);
        let mut seen = FxHashSet::default();

        for combo in combos {
            if !seen.insert(combo.id().clone()) {
                return Err(CatalogError::DuplicateId(combo.id().clone()));
            }

            if combo.required_items().is_empty() {
                return Err(CatalogError::EmptyRequirements(combo.id().clone()));
            }

            if combo.discount().to_minor_units() < 0 {
                return Err(CatalogError::NegativeDiscount(combo.id().clone()));
            }

            let combo_currency = combo.discount().currency();

            if combo_currency != currency {
                return Err(CatalogError::CurrencyMismatch(
                    combo.id().clone(),
                    combo_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            let key = catalog.combos.insert(combo);
            catalog.order.push(key);
        }

        Ok(catalog)
    }

    /// Iterate `(key, combo)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ComboKey, &ComboDefinition<'a>)> {
        self.order
            .iter()
            .filter_map(|key| self.combos.get(*key).map(|combo| (*key, combo)))
    }

    /// Look up a combo by key.
    pub fn get(&self, key: ComboKey) -> Option<&ComboDefinition<'a>> {
        self.combos.get(key)
    }

    /// Look up a combo by its business id.
    pub fn find(&self, id: &ComboId) -> Option<&ComboDefinition<'a>> {
        self.iter()
            .map(|(_, combo)| combo)
            .find(|combo| combo.id() == id)
    }

    /// Number of combos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the catalog holds no combos.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency all discounts are expressed in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
