//! Read capabilities the ledger consumes from collaborators.
//!
//! Transfers, mints and burns never happen here: every transition returns an
//! effects struct listing them, and the embedder executes them after the
//! ledger state is final. Only the two read-side lookups below are invoked
//! mid-transition, and neither may re-enter the ledger.

use std::collections::HashMap;

use crate::{state::Address, state::Price, LendingError};

/// USD quote per whole unit of an asset, plus the asset's decimals.
pub trait PriceSource {
    fn price_usd(&self, asset: &Address) -> Result<Price, LendingError>;
    fn decimals(&self, asset: &Address) -> Result<u8, LendingError>;
}

/// Claim-token balance lookup, owned by the claim-token collaborator.
pub trait ClaimTokenSource {
    fn claim_balance_of(&self, claim_token: &Address, account: &Address) -> u64;
}

/// Quotes one fixed price for every asset.
///
/// A bootstrap stand-in, not an oracle. Embedders replace it with a real
/// quote source once one exists.
#[derive(Debug, Clone)]
pub struct ConstantPriceSource {
    pub price: Price,
    pub decimals: u8,
}

impl ConstantPriceSource {
    pub fn new(price: Price, decimals: u8) -> Self {
        Self { price, decimals }
    }
}

impl PriceSource for ConstantPriceSource {
    fn price_usd(&self, _asset: &Address) -> Result<Price, LendingError> {
        Ok(self.price)
    }

    fn decimals(&self, _asset: &Address) -> Result<u8, LendingError> {
        Ok(self.decimals)
    }
}

/// Table-backed price source for embedders that quote per asset.
#[derive(Debug, Default, Clone)]
pub struct PriceTable {
    quotes: HashMap<Address, (Price, u8)>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, asset: Address, price: Price, decimals: u8) {
        self.quotes.insert(asset, (price, decimals));
    }
}

impl PriceSource for PriceTable {
    fn price_usd(&self, asset: &Address) -> Result<Price, LendingError> {
        self.quotes
            .get(asset)
            .map(|(price, _)| *price)
            .ok_or(LendingError::PriceNotValid)
    }

    fn decimals(&self, asset: &Address) -> Result<u8, LendingError> {
        self.quotes
            .get(asset)
            .map(|(_, decimals)| *decimals)
            .ok_or(LendingError::PriceNotValid)
    }
}
