//! Fixtures
//!
//! YAML fixture sets live under a base directory as
//! `carts/<name>.yml`, `combos/<name>.yml` and `rules/<name>.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    basket::{Basket, BasketError},
    combos::{
        ComboDefinition,
        catalog::{CatalogError, ComboCatalog},
    },
    fixtures::{carts::CartFixture, combos::CombosFixture, rules::RulesFixture},
    items::CartItem,
    promotions::threshold_gift::ThresholdGiftPromotion,
};

pub mod carts;
pub mod combos;
pub mod prices;
pub mod rules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Combo not found
    #[error("Combo not found: {0}")]
    ComboNotFound(String),

    /// Currency mismatch between fixture files
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No cart or combos loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// No gift rules loaded
    #[error("No gift rules loaded")]
    NoRules,

    /// Basket creation error
    #[error("Failed to create basket: {0}")]
    Basket(#[from] BasketError),

    /// Catalog creation error
    #[error("Failed to create combo catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Cart lines in file order
    items: Vec<CartItem<'static>>,

    /// Combos in file order
    combos: Vec<ComboDefinition<'static>>,

    /// Gift rule, if loaded
    rules: Option<ThresholdGiftPromotion<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            items: Vec::new(),
            combos: Vec::new(),
            rules: None,
            currency: None,
        }
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        Ok(fs::read_to_string(&file_path)?)
    }

    fn track_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);

                Ok(())
            }
        }
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        for line in fixture.items {
            let item = CartItem::try_from(line)?;

            self.track_currency(item.unit_price().currency())?;
            self.items.push(item);
        }

        Ok(self)
    }

    /// Load combos from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_combos(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CombosFixture = serde_norway::from_str(&self.read("combos", name)?)?;

        for combo_fixture in fixture.combos {
            let combo = ComboDefinition::try_from(combo_fixture)?;

            self.track_currency(combo.discount().currency())?;
            self.combos.push(combo);
        }

        Ok(self)
    }

    /// Load the threshold gift rule from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, if the
    /// threshold currency differs from the rest of the set, or if the
    /// gift-consuming combo is not among the loaded combos.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: RulesFixture = serde_norway::from_str(&self.read("rules", name)?)?;
        let rules = ThresholdGiftPromotion::try_from(fixture)?;

        self.track_currency(rules.threshold().currency())?;

        if let Some(combo_id) = rules.gift_consuming_combo()
            && !self.combos.iter().any(|combo| combo.id() == combo_id)
        {
            return Err(FixtureError::ComboNotFound(combo_id.to_string()));
        }

        self.rules = Some(rules);

        Ok(self)
    }

    /// Load a complete fixture set (cart, combos, and rules with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_cart(name)?
            .load_combos(name)?
            .load_rules(name)?;

        Ok(fixture)
    }

    /// Get all cart lines
    pub fn items(&self) -> &[CartItem<'static>] {
        &self.items
    }

    /// Get all combos
    pub fn combos(&self) -> &[ComboDefinition<'static>] {
        &self.combos
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Create a basket from the loaded cart lines
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown or basket validation fails.
    pub fn basket(&self) -> Result<Basket<'static>, FixtureError> {
        Ok(Basket::with_items(self.items.clone(), self.currency()?)?)
    }

    /// Create a combo catalog from the loaded combos
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown or catalog validation fails.
    pub fn catalog(&self) -> Result<ComboCatalog<'static>, FixtureError> {
        Ok(ComboCatalog::with_combos(
            self.combos.iter().cloned(),
            self.currency()?,
        )?)
    }

    /// Get the loaded gift rule
    ///
    /// # Errors
    ///
    /// Returns an error if no rules file has been loaded.
    pub fn gift_promotion(&self) -> Result<&ThresholdGiftPromotion<'static>, FixtureError> {
        self.rules.as_ref().ok_or(FixtureError::NoRules)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
