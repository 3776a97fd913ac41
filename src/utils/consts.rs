// no point to add further complexity with leap years and seconds for this particular case
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// USD values are expressed as u64 integers with 6 decimals.
pub const USD_DECIMALS: u8 = 6;
pub const USD_FACTOR: u64 = 1_000_000;

pub const BPS_FACTOR: u64 = 10_000;

/// Flat fee added to every borrow, 10 bps (0.1%).
pub const ORIGINATION_FEE_BPS: u16 = 10;

/// At most half of a borrower's debt can be repaid per liquidation call.
pub const CLOSE_FACTOR_BPS: u16 = 5_000;

/// Discount the liquidator buys collateral at, 5%.
pub const LIQUIDATION_BONUS_BPS: u16 = 500;

/// Collateral factors are capped at 90%.
pub const MAX_COLLATERAL_FACTOR_BPS: u16 = 9_000;

/// Sentinel meaning "repay the full realized balance".
pub const REPAY_ALL: u64 = u64::MAX;

/// Sentinel meaning "drain the reserve in full".
pub const WITHDRAW_ALL_RESERVES: u64 = u64::MAX;
