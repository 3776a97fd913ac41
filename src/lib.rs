//! Accounting core of a pooled collateralized lending market.
//!
//! Users deposit assets into per-asset markets, receive claim tokens 1:1,
//! may flag deposits as collateral, borrow against the discounted USD value
//! of that collateral, and get liquidated once debt outgrows it. Interest
//! accrues lazily: every transition first touches the markets it reads, then
//! mutates, then hands back an effects struct naming the token moves the
//! embedder must execute. Transfers, claim-token mint/burn, prices and
//! authorization all live outside this crate, behind the capabilities in
//! [`token_interface`].

use decimal_wad::error::DecimalError;
use thiserror::Error;

pub mod lending_market;
pub mod state;
pub mod token_interface;
pub mod utils;

pub use lending_market::liquidity_calcs::AccountLiquidity;
pub use lending_market::types::{
    BorrowEffects, DepositEffects, LiquidationEffects, MarketSnapshot, RepayEffects, UserSnapshot,
    WithdrawEffects, WithdrawReservesEffects,
};
pub use state::{
    Address, GlobalConfig, InterestParams, Market, MarketLedger, PositionStore, Price, UserPosition,
};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingError {
    #[error("market is not listed")]
    MarketNotListed,

    #[error("market is already listed")]
    MarketAlreadyListed,

    #[error("address must not be zero")]
    InvalidAddress,

    #[error("collateral factor must be in (0, 90%]")]
    InvalidCollateralFactor,

    #[error("interest parameters out of range")]
    InvalidInterestParams,

    #[error("amount must not be zero")]
    ZeroAmount,

    #[error("insufficient collateral to cover debt")]
    InsufficientCollateral,

    #[error("repay amount exceeds outstanding debt")]
    RepayExceedsDebt,

    #[error("cannot liquidate own position")]
    SelfLiquidation,

    #[error("asset is not enabled as the borrower's collateral")]
    NotCollateralForBorrower,

    #[error("account has no shortfall")]
    AccountNotLiquidatable,

    #[error("repay amount exceeds the close factor cap")]
    LiquidationAmountTooHigh,

    #[error("insufficient reserves")]
    InsufficientReserves,

    #[error("caller is not authorized")]
    Unauthorized,

    #[error("price is not valid")]
    PriceNotValid,

    #[error("mathematical operation with overflow")]
    MathOverflow,

    #[error("numeric conversion failure")]
    ConversionFailure,
}

impl From<DecimalError> for LendingError {
    fn from(err: DecimalError) -> LendingError {
        match err {
            DecimalError::MathOverflow => LendingError::MathOverflow,
        }
    }
}
