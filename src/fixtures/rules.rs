//! Gift Rule Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    combos::ComboId,
    fixtures::{FixtureError, prices::parse_price},
    promotions::threshold_gift::ThresholdGiftPromotion,
};

/// Threshold gift rules in YAML
#[derive(Debug, Deserialize)]
pub struct RulesFixture {
    /// Reserved gift item ids
    pub gift_items: Vec<u32>,

    /// Combo whose applications consume gift stock
    #[serde(default)]
    pub gift_consuming_combo: Option<ComboId>,

    /// Spend threshold (e.g., "1000 TWD")
    pub threshold: String,
}

impl TryFrom<RulesFixture> for ThresholdGiftPromotion<'static> {
    type Error = FixtureError;

    fn try_from(fixture: RulesFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.threshold)?;

        Ok(ThresholdGiftPromotion::new(
            fixture.gift_items,
            fixture.gift_consuming_combo,
            Money::from_minor(minor_units, currency),
        ))
    }
}
