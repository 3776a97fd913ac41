//! State transitions over the market ledger and position store.
//!
//! Every public operation is one atomic transition: it accrues interest on
//! each market it touches, checks its preconditions against the accrued
//! state, and only then commits mutations. All fallible arithmetic runs
//! before the first write, so a failed call leaves both stores untouched
//! (interest accrual excepted; accrual is idempotent and valid on its own).
//! External moves come back in an effects struct for the caller to execute.

use decimal_wad::{
    common::{TryMul, WAD},
    decimal::Decimal,
};
use tracing::info;

use crate::{
    state::{Address, GlobalConfig, InterestParams, Market, MarketLedger, PositionStore},
    token_interface::{ClaimTokenSource, PriceSource},
    utils::{
        consts::{
            BPS_FACTOR, CLOSE_FACTOR_BPS, MAX_COLLATERAL_FACTOR_BPS, ORIGINATION_FEE_BPS,
            REPAY_ALL, WITHDRAW_ALL_RESERVES,
        },
        coretypes::{mul_bps, CheckedAssign},
    },
    LendingError,
};

use super::{
    interest_rate::{self, accrue_interest},
    liquidity_calcs::{self, account_liquidity, seize_claim_amount, AccountLiquidity},
    types::{
        BorrowEffects, DepositEffects, LiquidationEffects, MarketSnapshot, RepayEffects,
        UserSnapshot, WithdrawEffects, WithdrawReservesEffects,
    },
};

pub fn list_market(
    markets: &mut MarketLedger,
    asset: Address,
    claim_token: Address,
    collateral_factor_bps: u16,
    now: u64,
) -> Result<(), LendingError> {
    if asset.is_zero() || claim_token.is_zero() {
        return Err(LendingError::InvalidAddress);
    }
    if collateral_factor_bps == 0 || collateral_factor_bps > MAX_COLLATERAL_FACTOR_BPS {
        return Err(LendingError::InvalidCollateralFactor);
    }
    markets.list(asset, Market::new(claim_token, collateral_factor_bps, now))?;
    info!(%asset, collateral_factor_bps, "listed market");
    Ok(())
}

/// New curve parameters apply from the next accrual on; interest already
/// accrued is never recomputed.
pub fn update_interest_params(
    config: &mut GlobalConfig,
    params: InterestParams,
) -> Result<(), LendingError> {
    if params.optimal_utilization_bps > BPS_FACTOR as u16
        || params.reserve_factor_bps > BPS_FACTOR as u16
    {
        return Err(LendingError::InvalidInterestParams);
    }
    config.interest_params = params;
    Ok(())
}

pub fn update_fee_collector(
    config: &mut GlobalConfig,
    fee_collector: Address,
) -> Result<(), LendingError> {
    if fee_collector.is_zero() {
        return Err(LendingError::InvalidAddress);
    }
    config.fee_collector = fee_collector;
    Ok(())
}

/// `WITHDRAW_ALL_RESERVES` drains the reserve in full.
pub fn withdraw_reserves(
    markets: &mut MarketLedger,
    config: &GlobalConfig,
    asset: &Address,
    requested: u64,
    now: u64,
) -> Result<WithdrawReservesEffects, LendingError> {
    if config.fee_collector.is_zero() {
        return Err(LendingError::InvalidAddress);
    }
    let market = markets.market_mut(asset)?;
    accrue_interest(market, &config.interest_params, now)?;

    let amount = if requested == WITHDRAW_ALL_RESERVES {
        market.reserve_amount
    } else {
        requested
    };
    if amount > market.reserve_amount {
        return Err(LendingError::InsufficientReserves);
    }
    market.reserve_amount -= amount;

    Ok(WithdrawReservesEffects {
        amount_to_transfer_out: amount,
        fee_collector: config.fee_collector,
    })
}

pub fn deposit(
    markets: &mut MarketLedger,
    config: &GlobalConfig,
    asset: &Address,
    amount: u64,
    now: u64,
) -> Result<DepositEffects, LendingError> {
    assert_not_zero(amount, LendingError::ZeroAmount)?;

    let market = markets.market_mut(asset)?;
    accrue_interest(market, &config.interest_params, now)?;
    market.total_supply.checked_add_assign(amount)?;

    Ok(DepositEffects {
        amount_to_transfer_in: amount,
        claim_tokens_to_mint: amount,
    })
}

pub fn withdraw(
    markets: &mut MarketLedger,
    positions: &PositionStore,
    config: &GlobalConfig,
    user: &Address,
    asset: &Address,
    amount: u64,
    prices: &impl PriceSource,
    claims: &impl ClaimTokenSource,
    now: u64,
) -> Result<WithdrawEffects, LendingError> {
    assert_not_zero(amount, LendingError::ZeroAmount)?;

    accrue_interest(markets.market_mut(asset)?, &config.interest_params, now)?;

    // Withdrawing non-collateral never weakens the account
    if positions.is_collateral(user, asset) {
        liquidity_calcs::try_withdraw(markets, positions, user, asset, amount, prices, claims)?;
    }

    let market = markets.market_mut(asset)?;
    market.total_supply.checked_sub_assign(amount)?;

    Ok(WithdrawEffects {
        claim_tokens_to_burn: amount,
        amount_to_transfer_out: amount,
    })
}

pub fn borrow(
    markets: &mut MarketLedger,
    positions: &mut PositionStore,
    config: &GlobalConfig,
    user: &Address,
    asset: &Address,
    amount: u64,
    prices: &impl PriceSource,
    claims: &impl ClaimTokenSource,
    now: u64,
) -> Result<BorrowEffects, LendingError> {
    assert_not_zero(amount, LendingError::ZeroAmount)?;

    accrue_interest(markets.market_mut(asset)?, &config.interest_params, now)?;

    let fee = mul_bps(amount, ORIGINATION_FEE_BPS);
    let new_debt = amount.checked_add(fee).ok_or(LendingError::MathOverflow)?;

    // The full new debt, fee included, must fit inside current excess.
    // Equivalent to requiring non-negative excess after the mutation below.
    liquidity_calcs::try_borrow(markets, positions, user, asset, new_debt, prices, claims)?;

    let market = markets.market_mut(asset)?;
    let new_total_borrows = market
        .total_borrows
        .checked_add(new_debt)
        .ok_or(LendingError::MathOverflow)?;
    let new_reserves = market
        .reserve_amount
        .checked_add(fee)
        .ok_or(LendingError::MathOverflow)?;
    let borrow_index = market.borrow_index;

    positions
        .position_mut(user, asset)
        .apply_borrow(borrow_index, new_debt)?;
    let market = markets.market_mut(asset)?;
    market.total_borrows = new_total_borrows;
    market.reserve_amount = new_reserves;

    info!(%user, %asset, amount, fee, "borrow");

    Ok(BorrowEffects {
        amount_to_transfer_out: amount,
        origination_fee: fee,
    })
}

/// `REPAY_ALL` clamps to the realized balance; any explicit amount above it
/// is rejected. Repaying to zero keeps the position record around.
pub fn repay(
    markets: &mut MarketLedger,
    positions: &mut PositionStore,
    config: &GlobalConfig,
    user: &Address,
    asset: &Address,
    requested: u64,
    now: u64,
) -> Result<RepayEffects, LendingError> {
    accrue_interest(markets.market_mut(asset)?, &config.interest_params, now)?;

    let borrow_index = markets.market(asset)?.borrow_index;
    let realized = positions.realized_borrow_balance(user, asset, borrow_index)?;
    let repaid = if requested == REPAY_ALL {
        realized
    } else {
        requested
    };
    if repaid > realized {
        return Err(LendingError::RepayExceedsDebt);
    }

    positions
        .position_mut(user, asset)
        .apply_repay(borrow_index, repaid)?;
    let market = markets.market_mut(asset)?;
    // per-user floor rounding can run a hair ahead of the aggregate
    market.total_borrows = market.total_borrows.saturating_sub(repaid);

    Ok(RepayEffects {
        amount_to_transfer_in: repaid,
    })
}

/// Repay up to half of an underwater borrower's debt in `repay_asset` and
/// seize collateral claim tokens worth the repayment plus the bonus.
///
/// A deeply underwater account may need several calls to become healthy.
#[allow(clippy::too_many_arguments)]
pub fn liquidate(
    markets: &mut MarketLedger,
    positions: &mut PositionStore,
    config: &GlobalConfig,
    liquidator: &Address,
    borrower: &Address,
    repay_asset: &Address,
    collateral_asset: &Address,
    repay_amount: u64,
    prices: &impl PriceSource,
    claims: &impl ClaimTokenSource,
    now: u64,
) -> Result<LiquidationEffects, LendingError> {
    assert_not_zero(repay_amount, LendingError::ZeroAmount)?;
    if liquidator == borrower {
        return Err(LendingError::SelfLiquidation);
    }
    markets.market(collateral_asset)?;
    if !positions.is_collateral(borrower, collateral_asset) {
        return Err(LendingError::NotCollateralForBorrower);
    }

    accrue_interest(
        markets.market_mut(repay_asset)?,
        &config.interest_params,
        now,
    )?;
    if collateral_asset != repay_asset {
        accrue_interest(
            markets.market_mut(collateral_asset)?,
            &config.interest_params,
            now,
        )?;
    }

    let AccountLiquidity { shortfall_usd, .. } =
        account_liquidity(markets, positions, borrower, prices, claims)?;
    if shortfall_usd == 0 {
        return Err(LendingError::AccountNotLiquidatable);
    }

    let borrow_index = markets.market(repay_asset)?.borrow_index;
    let realized = positions.realized_borrow_balance(borrower, repay_asset, borrow_index)?;
    let max_close = mul_bps(realized, CLOSE_FACTOR_BPS);
    if repay_amount > max_close {
        return Err(LendingError::LiquidationAmountTooHigh);
    }

    let seize = seize_claim_amount(
        repay_amount,
        &prices.price_usd(repay_asset)?,
        prices.decimals(repay_asset)?,
        &prices.price_usd(collateral_asset)?,
        prices.decimals(collateral_asset)?,
    )?;
    let collateral_claim_token = markets.market(collateral_asset)?.claim_token;
    if claims.claim_balance_of(&collateral_claim_token, borrower) < seize {
        return Err(LendingError::InsufficientCollateral);
    }

    positions
        .position_mut(borrower, repay_asset)
        .apply_repay(borrow_index, repay_amount)?;
    let repay_market = markets.market_mut(repay_asset)?;
    repay_market.total_borrows = repay_market.total_borrows.saturating_sub(repay_amount);

    info!(
        %liquidator,
        %borrower,
        repay_amount,
        seize,
        shortfall_usd,
        "liquidation"
    );

    Ok(LiquidationEffects {
        repay_to_transfer_in: repay_amount,
        claim_tokens_to_seize: seize,
        collateral_claim_token,
    })
}

pub fn enable_collateral(
    markets: &MarketLedger,
    positions: &mut PositionStore,
    user: &Address,
    asset: &Address,
) -> Result<(), LendingError> {
    markets.market(asset)?;
    positions.set_collateral(user, asset, true);
    Ok(())
}

/// Clearing the flag must not leave the account underwater; on shortfall the
/// flag is restored and the call fails.
pub fn disable_collateral(
    markets: &MarketLedger,
    positions: &mut PositionStore,
    user: &Address,
    asset: &Address,
    prices: &impl PriceSource,
    claims: &impl ClaimTokenSource,
) -> Result<(), LendingError> {
    markets.market(asset)?;
    positions.set_collateral(user, asset, false);
    match account_liquidity(markets, positions, user, prices, claims) {
        Ok(liquidity) if liquidity.shortfall_usd == 0 => Ok(()),
        Ok(_) => {
            positions.set_collateral(user, asset, true);
            Err(LendingError::InsufficientCollateral)
        }
        Err(err) => {
            positions.set_collateral(user, asset, true);
            Err(err)
        }
    }
}

/// Read-only view; rates are computed from the current aggregates without
/// accruing first.
pub fn market_snapshot(
    markets: &MarketLedger,
    config: &GlobalConfig,
    asset: &Address,
) -> Result<MarketSnapshot, LendingError> {
    let market = markets.market(asset)?;
    Ok(MarketSnapshot {
        listed: market.listed,
        collateral_factor_bps: market.collateral_factor_bps,
        total_supply: market.total_supply,
        total_borrows: market.total_borrows,
        reserve_amount: market.reserve_amount,
        borrow_rate_per_second: wad_scaled(interest_rate::borrow_rate(
            market,
            &config.interest_params,
        )?)?,
        supply_rate_per_second: wad_scaled(interest_rate::supply_rate(
            market,
            &config.interest_params,
        )?)?,
    })
}

/// WAD-scaled integer reading of a sub-1.0 per-second rate.
fn wad_scaled(rate: Decimal) -> Result<u64, LendingError> {
    Ok(rate.try_mul(WAD)?.try_floor_u64()?)
}

pub fn user_snapshot(
    markets: &MarketLedger,
    positions: &PositionStore,
    user: &Address,
    asset: &Address,
) -> Result<UserSnapshot, LendingError> {
    let market = markets.market(asset)?;
    Ok(UserSnapshot {
        realized_borrow_balance: positions.realized_borrow_balance(
            user,
            asset,
            market.borrow_index,
        )?,
        is_collateral: positions.is_collateral(user, asset),
    })
}

fn assert_not_zero(value: u64, err: LendingError) -> Result<(), LendingError> {
    if value == 0 {
        Err(err)
    } else {
        Ok(())
    }
}
