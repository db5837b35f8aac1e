//! Combo pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, BasketError},
    combos::{
        ComboDefinition, ComboId, ComboKey,
        catalog::{CatalogError, ComboCatalog},
    },
    items::{CartItem, ItemId},
    pricing::{PricingError, TotalPriceError, price_basket, total_price},
    promotions::threshold_gift::{GiftAssessment, GiftError, ThresholdGiftPromotion},
    quantities::{QuantityError, QuantityMap, RequiredQuantities},
    receipt::{GiftStatus, Receipt, ReceiptError},
    solvers::{
        AppliedCombo, ComboResolution, Solver, SolverError,
        exhaustive::ExhaustiveSolver,
        observer::{BranchCounter, NoopObserver, SearchObserver},
    },
};
