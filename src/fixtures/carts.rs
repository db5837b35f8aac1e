//! Cart Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, prices::parse_price},
    items::CartItem,
};

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in cart order
    pub items: Vec<CartItemFixture>,
}

/// Cart line fixture
#[derive(Debug, Deserialize)]
pub struct CartItemFixture {
    /// Catalog item id; omitted for lines that cannot join a combo
    #[serde(default)]
    pub id: Option<u32>,

    /// Display name
    pub name: String,

    /// Unit price (e.g., "120 TWD")
    pub price: String,

    /// Number of units
    pub quantity: u32,
}

impl TryFrom<CartItemFixture> for CartItem<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CartItemFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let price = Money::from_minor(minor_units, currency);

        Ok(match fixture.id {
            Some(id) => CartItem::new(id, fixture.name, price, fixture.quantity),
            None => CartItem::unidentified(fixture.name, price, fixture.quantity),
        })
    }
}
