//! Combo Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    combos::{ComboDefinition, ComboId},
    fixtures::{FixtureError, prices::parse_price},
};

/// Wrapper for combos in YAML
#[derive(Debug, Deserialize)]
pub struct CombosFixture {
    /// Combos in catalog order
    pub combos: Vec<ComboFixture>,
}

/// Combo fixture
#[derive(Debug, Deserialize)]
pub struct ComboFixture {
    /// Unique combo id
    pub id: ComboId,

    /// Display name
    pub name: String,

    /// Required item ids; repeat an id to require several units
    pub items: Vec<u32>,

    /// Flat discount per application (e.g., "30 TWD")
    pub discount: String,
}

impl TryFrom<ComboFixture> for ComboDefinition<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ComboFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.discount)?;

        Ok(ComboDefinition::new(
            fixture.id,
            fixture.name,
            fixture.items,
            Money::from_minor(minor_units, currency),
        ))
    }
}
