use std::collections::HashMap;

use decimal_wad::decimal::Decimal;

use crate::LendingError;

use super::Address;

/// Per-asset aggregate ledger.
///
/// All amounts are in the asset's base units. `borrow_index` starts at 1.0
/// and only grows; the ratio of two index readings gives the compounded
/// borrow growth between those times.
#[derive(Debug, Clone)]
pub struct Market {
    pub listed: bool,
    pub collateral_factor_bps: u16,
    pub total_supply: u64,
    pub total_borrows: u64,
    pub reserve_amount: u64,
    pub last_update: u64,
    pub borrow_index: Decimal,
    pub claim_token: Address,
}

impl Market {
    pub fn new(claim_token: Address, collateral_factor_bps: u16, now: u64) -> Self {
        Market {
            listed: true,
            collateral_factor_bps,
            total_supply: 0,
            total_borrows: 0,
            reserve_amount: 0,
            last_update: now,
            borrow_index: Decimal::one(),
            claim_token,
        }
    }
}

/// Market table plus the insertion-ordered list of listed assets.
///
/// Liquidity scans iterate `listing_order`, so the scan is deterministic
/// across calls; ordering does not affect the computed values.
#[derive(Debug, Default, Clone)]
pub struct MarketLedger {
    markets: HashMap<Address, Market>,
    listing_order: Vec<Address>,
}

impl MarketLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&mut self, asset: Address, market: Market) -> Result<(), LendingError> {
        if self.markets.contains_key(&asset) {
            return Err(LendingError::MarketAlreadyListed);
        }
        self.markets.insert(asset, market);
        self.listing_order.push(asset);
        Ok(())
    }

    pub fn market(&self, asset: &Address) -> Result<&Market, LendingError> {
        self.markets
            .get(asset)
            .filter(|m| m.listed)
            .ok_or(LendingError::MarketNotListed)
    }

    pub fn market_mut(&mut self, asset: &Address) -> Result<&mut Market, LendingError> {
        self.markets
            .get_mut(asset)
            .filter(|m| m.listed)
            .ok_or(LendingError::MarketNotListed)
    }

    pub fn is_listed(&self, asset: &Address) -> bool {
        self.markets.get(asset).map_or(false, |m| m.listed)
    }

    /// Listed assets in listing order.
    pub fn listed_assets(&self) -> impl Iterator<Item = &Address> {
        self.listing_order.iter()
    }

    pub fn len(&self) -> usize {
        self.listing_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listing_order.is_empty()
    }
}
