//! Item quantity bookkeeping for combo resolution.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::items::{CartItem, ItemId};

/// Quantity errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Summed quantity for an item does not fit in `u32`.
    #[error("quantity for item {0} overflows")]
    Overflow(ItemId),
}

/// Multiplicity of each item a combo requires, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequiredQuantities(SmallVec<[(ItemId, u32); 4]>);

impl RequiredQuantities {
    /// Count repeats in an ordered list of required items.
    pub fn from_ids(ids: &[ItemId]) -> Self {
        let mut required: SmallVec<[(ItemId, u32); 4]> = SmallVec::new();

        for id in ids {
            match required.iter_mut().find(|(existing, _)| existing == id) {
                Some((_, qty)) => *qty = qty.saturating_add(1),
                None => required.push((*id, 1)),
            }
        }

        Self(required)
    }

    /// Iterate `(item, multiplicity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.0.iter().copied()
    }

    /// Multiplicity required for `id` (zero when not required).
    pub fn get(&self, id: ItemId) -> u32 {
        self.0
            .iter()
            .find(|(existing, _)| *existing == id)
            .map_or(0, |(_, qty)| *qty)
    }

    /// True when nothing is required.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Remaining quantity per item.
///
/// Deduction returns a new map, so every search branch owns its own snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuantityMap(FxHashMap<ItemId, u32>);

impl QuantityMap {
    /// Sum quantities per item id; lines without an id are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Overflow`] if a summed quantity does not fit in `u32`.
    pub fn from_items(items: &[CartItem<'_>]) -> Result<Self, QuantityError> {
        let mut quantities: FxHashMap<ItemId, u32> = FxHashMap::default();

        for item in items {
            let Some(id) = item.id() else {
                continue;
            };

            let entry = quantities.entry(id).or_default();

            *entry = entry
                .checked_add(item.quantity())
                .ok_or(QuantityError::Overflow(id))?;
        }

        Ok(Self(quantities))
    }

    /// Available quantity for `id` (zero when absent).
    pub fn get(&self, id: ItemId) -> u32 {
        self.0.get(&id).copied().unwrap_or_default()
    }

    /// True when every required item is available in at least its multiplicity.
    pub fn satisfies(&self, required: &RequiredQuantities) -> bool {
        required.iter().all(|(id, qty)| self.get(id) >= qty)
    }

    /// How many whole times `required` can be taken from this map.
    pub fn max_applications(&self, required: &RequiredQuantities) -> u32 {
        required
            .iter()
            .map(|(id, qty)| self.get(id).checked_div(qty).unwrap_or(0))
            .min()
            .unwrap_or(0)
    }

    /// A copy of this map with `required * count` taken out.
    ///
    /// Returns `None` if any item would go negative.
    #[must_use]
    pub fn deducted(&self, required: &RequiredQuantities, count: u32) -> Option<Self> {
        let mut next = self.clone();

        for (id, qty) in required.iter() {
            let take = qty.checked_mul(count)?;
            let slot = next.0.get_mut(&id)?;

            *slot = slot.checked_sub(take)?;
        }

        Some(next)
    }

    /// Iterate `(item, remaining)` pairs in ascending item order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (ItemId, u32)> {
        let mut entries: Vec<(ItemId, u32)> = self.0.iter().map(|(id, qty)| (*id, *qty)).collect();
        entries.sort_unstable_by_key(|(id, _)| *id);

        entries.into_iter()
    }

    /// Number of distinct items tracked.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no items are tracked.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ItemId, u32)> for QuantityMap {
    fn from_iter<I: IntoIterator<Item = (ItemId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
