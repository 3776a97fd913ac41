//! Every transition returns the external moves the embedder must execute
//! once the call has succeeded. Ledger state is final before any of these
//! run, so a capability can never observe or re-enter a half-applied
//! transition.

use serde::Serialize;

use crate::state::Address;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DepositEffects {
    pub amount_to_transfer_in: u64,
    pub claim_tokens_to_mint: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawEffects {
    pub claim_tokens_to_burn: u64,
    pub amount_to_transfer_out: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BorrowEffects {
    /// The requested principal; the origination fee stays in the market.
    pub amount_to_transfer_out: u64,
    pub origination_fee: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepayEffects {
    pub amount_to_transfer_in: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationEffects {
    pub repay_to_transfer_in: u64,
    /// Burn from the borrower, mint to the liquidator.
    pub claim_tokens_to_seize: u64,
    pub collateral_claim_token: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawReservesEffects {
    pub amount_to_transfer_out: u64,
    pub fee_collector: Address,
}

/// Read model of one market, rates included (WAD-scaled, per second).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketSnapshot {
    pub listed: bool,
    pub collateral_factor_bps: u16,
    pub total_supply: u64,
    pub total_borrows: u64,
    pub reserve_amount: u64,
    pub borrow_rate_per_second: u64,
    pub supply_rate_per_second: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserSnapshot {
    pub realized_borrow_balance: u64,
    pub is_collateral: bool,
}
