//! Promotions
//!
//! Promotions applied after combo resolution.

pub mod threshold_gift;
