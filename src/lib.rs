//! Combo Pricing
//!
//! Resolves the best set of combo bundle discounts for a shopping cart, then
//! applies a spend-threshold gift rule on top and produces a receipt.

pub mod basket;
pub mod combos;
pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod quantities;
pub mod receipt;
pub mod solvers;
